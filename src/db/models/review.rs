use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::pool::DbError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: f64,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub revision: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateReview {
    pub title: String,
    pub text: String,
    pub rating: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReview {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<f64>,
}

impl Review {
    /// One review per (bootcamp, user): the unique index turns a second
    /// insert into a conflict error.
    pub async fn insert(
        pool: &PgPool,
        bootcamp_id: Uuid,
        author: Uuid,
        payload: &CreateReview,
    ) -> Result<Review, DbError> {
        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (title, text, rating, bootcamp_id, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&payload.title)
        .bind(&payload.text)
        .bind(payload.rating)
        .bind(bootcamp_id)
        .bind(author)
        .fetch_one(pool)
        .await?;
        Ok(review)
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Review>, DbError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(review)
    }

    pub async fn list_by_bootcamp(
        pool: &PgPool,
        bootcamp_id: Uuid,
    ) -> Result<Vec<Review>, DbError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE bootcamp_id = $1 \
             ORDER BY created_at DESC, id ASC",
        )
        .bind(bootcamp_id)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateReview,
    ) -> Result<Option<Review>, DbError> {
        let review = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET \
                title = COALESCE($2, title), \
                text = COALESCE($3, text), \
                rating = COALESCE($4, rating), \
                revision = revision + 1 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.text)
        .bind(payload.rating)
        .fetch_optional(pool)
        .await?;
        Ok(review)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
