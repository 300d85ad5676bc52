use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::pool::DbError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: String,
    pub scholarships_available: bool,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub revision: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: String,
    #[serde(default)]
    pub scholarships_available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarships_available: Option<bool>,
}

impl Course {
    pub async fn insert(
        pool: &PgPool,
        bootcamp_id: Uuid,
        owner: Uuid,
        payload: &CreateCourse,
    ) -> Result<Course, DbError> {
        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses \
                (title, description, weeks, tuition, minimum_skill, \
                 scholarships_available, bootcamp_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.weeks)
        .bind(payload.tuition)
        .bind(&payload.minimum_skill)
        .bind(payload.scholarships_available)
        .bind(bootcamp_id)
        .bind(owner)
        .fetch_one(pool)
        .await?;
        Ok(course)
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Course>, DbError> {
        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(course)
    }

    pub async fn list_by_bootcamp(
        pool: &PgPool,
        bootcamp_id: Uuid,
    ) -> Result<Vec<Course>, DbError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE bootcamp_id = $1 \
             ORDER BY created_at DESC, id ASC",
        )
        .bind(bootcamp_id)
        .fetch_all(pool)
        .await?;
        Ok(courses)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateCourse,
    ) -> Result<Option<Course>, DbError> {
        let course = sqlx::query_as::<_, Course>(
            "UPDATE courses SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                weeks = COALESCE($4, weeks), \
                tuition = COALESCE($5, tuition), \
                minimum_skill = COALESCE($6, minimum_skill), \
                scholarships_available = COALESCE($7, scholarships_available), \
                revision = revision + 1 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.weeks)
        .bind(payload.tuition)
        .bind(&payload.minimum_skill)
        .bind(payload.scholarships_available)
        .fetch_optional(pool)
        .await?;
        Ok(course)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
