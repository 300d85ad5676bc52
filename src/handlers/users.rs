//! Admin-only user administration.

use std::collections::BTreeMap;

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::hash_password;
use crate::db::collection::USERS;
use crate::db::models::{Role, User};
use crate::db::{pool, Repository};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{require_role, ApiResponse, ApiResult, CurrentUser};
use crate::query::plan::QueryPlan;

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// GET /api/v1/users
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Vec<Value>> {
    require_role(&user, &[Role::Admin])?;

    let pool = pool().await?;
    let repo = Repository::new(&USERS, pool);

    let total = repo.count_all().await?;
    let (plan, pagination) = QueryPlan::shape(&USERS, &params, total)?;
    let rows = repo.fetch_page(&plan).await?;

    let count = rows.len();
    Ok(ApiResponse::page(rows, count, pagination))
}

/// GET /api/v1/users/:id
pub async fn get(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    require_role(&user, &[Role::Admin])?;

    let id = parse_id(&id)?;
    let pool = pool().await?;
    let found = User::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(found))
}

/// POST /api/v1/users
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateUser>,
) -> ApiResult<User> {
    require_role(&user, &[Role::Admin])?;

    let pool = pool().await?;
    let password_hash = hash_password(&payload.password)?;
    let created = User::insert(
        &pool,
        &payload.name,
        &payload.email,
        &password_hash,
        payload.role.unwrap_or(Role::User),
    )
    .await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/v1/users/:id
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> ApiResult<User> {
    require_role(&user, &[Role::Admin])?;

    let id = parse_id(&id)?;
    let pool = pool().await?;
    let updated = User::update_admin(
        &pool,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.role,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/users/:id
pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    require_role(&user, &[Role::Admin])?;

    let id = parse_id(&id)?;
    let pool = pool().await?;
    if !User::delete(&pool, id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(ApiResponse::success(json!({})))
}
