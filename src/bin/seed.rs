//! Seeds or wipes the database from JSON fixture files.
//!
//! Fixture records carry explicit ids so cross-file references resolve
//! without a lookup pass.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use bootcamp_api::aggregate;
use bootcamp_api::auth::hash_password;
use bootcamp_api::db::models::bootcamp::slugify;
use bootcamp_api::db::pool;

#[derive(Parser)]
#[command(name = "seed", about = "Import or destroy fixture data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load users, bootcamps, courses and reviews from a fixture directory
    Import {
        /// Directory holding users.json, bootcamps.json, courses.json, reviews.json
        #[arg(long, default_value = "data")]
        dir: PathBuf,
    },
    /// Delete all seeded data
    Destroy,
}

#[derive(Deserialize)]
struct UserFixture {
    id: Uuid,
    name: String,
    email: String,
    password: String,
    role: String,
}

#[derive(Deserialize)]
struct BootcampFixture {
    id: Uuid,
    name: String,
    description: String,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    careers: Vec<String>,
    #[serde(default)]
    housing: bool,
    #[serde(default)]
    job_assistance: bool,
    #[serde(default)]
    job_guarantee: bool,
    #[serde(default)]
    accept_gi: bool,
    user_id: Uuid,
}

#[derive(Deserialize)]
struct CourseFixture {
    id: Uuid,
    title: String,
    description: String,
    weeks: String,
    tuition: f64,
    minimum_skill: String,
    #[serde(default)]
    scholarships_available: bool,
    bootcamp_id: Uuid,
    user_id: Uuid,
}

#[derive(Deserialize)]
struct ReviewFixture {
    id: Uuid,
    title: String,
    text: String,
    rating: f64,
    bootcamp_id: Uuid,
    user_id: Uuid,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let pool = pool().await?;

    match cli.command {
        Command::Import { dir } => import(&pool, &dir).await?,
        Command::Destroy => destroy(&pool).await?,
    }

    Ok(())
}

async fn import(pool: &PgPool, dir: &Path) -> Result<()> {
    let users: Vec<UserFixture> = load(dir, "users.json")?;
    let bootcamps: Vec<BootcampFixture> = load(dir, "bootcamps.json")?;
    let courses: Vec<CourseFixture> = load(dir, "courses.json")?;
    let reviews: Vec<ReviewFixture> = load(dir, "reviews.json")?;

    for user in &users {
        let password_hash = hash_password(&user.password)?;
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(&user.role)
        .execute(pool)
        .await
        .with_context(|| format!("inserting user {}", user.email))?;
    }
    println!("imported {} users", users.len());

    for bootcamp in &bootcamps {
        sqlx::query(
            "INSERT INTO bootcamps \
                (id, name, slug, description, website, phone, email, address, \
                 latitude, longitude, careers, housing, job_assistance, \
                 job_guarantee, accept_gi, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(bootcamp.id)
        .bind(&bootcamp.name)
        .bind(slugify(&bootcamp.name))
        .bind(&bootcamp.description)
        .bind(&bootcamp.website)
        .bind(&bootcamp.phone)
        .bind(&bootcamp.email)
        .bind(&bootcamp.address)
        .bind(bootcamp.latitude)
        .bind(bootcamp.longitude)
        .bind(&bootcamp.careers)
        .bind(bootcamp.housing)
        .bind(bootcamp.job_assistance)
        .bind(bootcamp.job_guarantee)
        .bind(bootcamp.accept_gi)
        .bind(bootcamp.user_id)
        .execute(pool)
        .await
        .with_context(|| format!("inserting bootcamp {}", bootcamp.name))?;
    }
    println!("imported {} bootcamps", bootcamps.len());

    for course in &courses {
        sqlx::query(
            "INSERT INTO courses \
                (id, title, description, weeks, tuition, minimum_skill, \
                 scholarships_available, bootcamp_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.weeks)
        .bind(course.tuition)
        .bind(&course.minimum_skill)
        .bind(course.scholarships_available)
        .bind(course.bootcamp_id)
        .bind(course.user_id)
        .execute(pool)
        .await
        .with_context(|| format!("inserting course {}", course.title))?;
    }
    println!("imported {} courses", courses.len());

    for review in &reviews {
        sqlx::query(
            "INSERT INTO reviews (id, title, text, rating, bootcamp_id, user_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, now()))",
        )
        .bind(review.id)
        .bind(&review.title)
        .bind(&review.text)
        .bind(review.rating)
        .bind(review.bootcamp_id)
        .bind(review.user_id)
        .bind(review.created_at)
        .execute(pool)
        .await
        .with_context(|| format!("inserting review {}", review.title))?;
    }
    println!("imported {} reviews", reviews.len());

    // Stored averages must reflect the seeded child sets.
    for bootcamp in &bootcamps {
        aggregate::recalculate_average_cost(pool, bootcamp.id).await;
        aggregate::recalculate_average_rating(pool, bootcamp.id).await;
    }
    println!("recalculated aggregates");

    Ok(())
}

async fn destroy(pool: &PgPool) -> Result<()> {
    // Users go last; bootcamps cascade to courses and reviews.
    sqlx::query("DELETE FROM bootcamps").execute(pool).await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    println!("destroyed all data");
    Ok(())
}

fn load<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = dir.join(file);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
