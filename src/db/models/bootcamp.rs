use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::pool::DbError;
use crate::geocode::GeoPoint;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub formatted_address: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub photo: Option<String>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub revision: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateBootcamp {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub careers: Vec<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBootcamp {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl Bootcamp {
    pub async fn insert(
        pool: &PgPool,
        owner: Uuid,
        payload: &CreateBootcamp,
        location: Option<&GeoPoint>,
    ) -> Result<Bootcamp, DbError> {
        let bootcamp = sqlx::query_as::<_, Bootcamp>(
            "INSERT INTO bootcamps \
                (name, slug, description, website, phone, email, address, \
                 latitude, longitude, formatted_address, city, zipcode, country, \
                 careers, housing, job_assistance, job_guarantee, accept_gi, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
                     $14, $15, $16, $17, $18, $19) \
             RETURNING *",
        )
        .bind(&payload.name)
        .bind(slugify(&payload.name))
        .bind(&payload.description)
        .bind(&payload.website)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .bind(location.map(|g| g.latitude))
        .bind(location.map(|g| g.longitude))
        .bind(location.and_then(|g| g.formatted_address.clone()))
        .bind(location.and_then(|g| g.city.clone()))
        .bind(location.and_then(|g| g.zipcode.clone()))
        .bind(location.and_then(|g| g.country.clone()))
        .bind(&payload.careers)
        .bind(payload.housing)
        .bind(payload.job_assistance)
        .bind(payload.job_guarantee)
        .bind(payload.accept_gi)
        .bind(owner)
        .fetch_one(pool)
        .await?;
        Ok(bootcamp)
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Bootcamp>, DbError> {
        let bootcamp = sqlx::query_as::<_, Bootcamp>("SELECT * FROM bootcamps WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(bootcamp)
    }

    /// First bootcamp published by the given user, if any.
    pub async fn find_by_owner(pool: &PgPool, owner: Uuid) -> Result<Option<Bootcamp>, DbError> {
        let bootcamp =
            sqlx::query_as::<_, Bootcamp>("SELECT * FROM bootcamps WHERE user_id = $1 LIMIT 1")
                .bind(owner)
                .fetch_optional(pool)
                .await?;
        Ok(bootcamp)
    }

    /// Partial update. The slug follows the name; the stored location is
    /// left untouched, geocoding runs on create only.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateBootcamp,
    ) -> Result<Option<Bootcamp>, DbError> {
        let slug = payload.name.as_deref().map(slugify);
        let bootcamp = sqlx::query_as::<_, Bootcamp>(
            "UPDATE bootcamps SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug), \
                description = COALESCE($4, description), \
                website = COALESCE($5, website), \
                phone = COALESCE($6, phone), \
                email = COALESCE($7, email), \
                careers = COALESCE($8, careers), \
                housing = COALESCE($9, housing), \
                job_assistance = COALESCE($10, job_assistance), \
                job_guarantee = COALESCE($11, job_guarantee), \
                accept_gi = COALESCE($12, accept_gi), \
                revision = revision + 1 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&payload.name)
        .bind(slug)
        .bind(&payload.description)
        .bind(&payload.website)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.careers)
        .bind(payload.housing)
        .bind(payload.job_assistance)
        .bind(payload.job_guarantee)
        .bind(payload.accept_gi)
        .fetch_optional(pool)
        .await?;
        Ok(bootcamp)
    }

    /// Child courses and reviews go with it via ON DELETE CASCADE.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM bootcamps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bootcamps whose stored location falls within `radius_radians` of the
    /// center, measured as the haversine central angle on the unit sphere.
    pub async fn within_radius(
        pool: &PgPool,
        latitude: f64,
        longitude: f64,
        radius_radians: f64,
    ) -> Result<Vec<Bootcamp>, DbError> {
        let bootcamps = sqlx::query_as::<_, Bootcamp>(
            "SELECT * FROM bootcamps \
             WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
               AND acos(LEAST(1.0, GREATEST(-1.0, \
                     sin(radians($1)) * sin(radians(latitude)) \
                   + cos(radians($1)) * cos(radians(latitude)) \
                   * cos(radians(longitude) - radians($2))))) <= $3 \
             ORDER BY created_at DESC, id ASC",
        )
        .bind(latitude)
        .bind(longitude)
        .bind(radius_radians)
        .fetch_all(pool)
        .await?;
        Ok(bootcamps)
    }
}

/// Lowercased, dash-separated URL slug of a bootcamp name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Devworks Bootcamp"), "devworks-bootcamp");
        assert_eq!(slugify("ModernTech  Bootcamp!"), "moderntech-bootcamp");
        assert_eq!(slugify("--Already--Dashed--"), "already-dashed");
    }
}
