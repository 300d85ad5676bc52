use std::collections::BTreeMap;

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde_json::{json, Value};

use crate::aggregate;
use crate::db::collection::COURSES;
use crate::db::models::{Bootcamp, Course, CreateCourse, Role, UpdateCourse};
use crate::db::{pool, Repository};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{require_owner, require_role, ApiResponse, ApiResult, CurrentUser};
use crate::query::plan::QueryPlan;

/// GET /api/v1/courses
pub async fn list(Query(params): Query<BTreeMap<String, String>>) -> ApiResult<Vec<Value>> {
    let pool = pool().await?;
    let repo = Repository::new(&COURSES, pool);

    let total = repo.count_all().await?;
    let (plan, pagination) = QueryPlan::shape(&COURSES, &params, total)?;
    let rows = repo.fetch_page(&plan).await?;

    let count = rows.len();
    Ok(ApiResponse::page(rows, count, pagination))
}

/// GET /api/v1/bootcamps/:bootcampId/courses
///
/// Parent-scoped listing without query shaping.
pub async fn list_by_bootcamp(Path(bootcamp_id): Path<String>) -> ApiResult<Vec<Course>> {
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let pool = pool().await?;

    Bootcamp::find(&pool, bootcamp_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;

    let courses = Course::list_by_bootcamp(&pool, bootcamp_id).await?;
    let count = courses.len();
    Ok(ApiResponse::list(courses, count))
}

/// GET /api/v1/courses/:id
pub async fn get(Path(id): Path<String>) -> ApiResult<Course> {
    let id = parse_id(&id)?;
    let pool = pool().await?;
    let course = Course::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    Ok(ApiResponse::success(course))
}

/// POST /api/v1/bootcamps/:bootcampId/courses
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    Path(bootcamp_id): Path<String>,
    Json(payload): Json<CreateCourse>,
) -> ApiResult<Course> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;

    let bootcamp_id = parse_id(&bootcamp_id)?;
    let pool = pool().await?;

    let bootcamp = Bootcamp::find(&pool, bootcamp_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;
    require_owner(&user, bootcamp.user_id)?;

    let course = Course::insert(&pool, bootcamp_id, user.id, &payload).await?;
    aggregate::recalculate_average_cost(&pool, bootcamp_id).await;

    Ok(ApiResponse::created(course))
}

/// PATCH /api/v1/courses/:id
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCourse>,
) -> ApiResult<Course> {
    let id = parse_id(&id)?;
    let pool = pool().await?;

    let course = Course::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    require_owner(&user, course.user_id)?;

    let updated = Course::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    aggregate::recalculate_average_cost(&pool, updated.bootcamp_id).await;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/courses/:id
pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let pool = pool().await?;

    let course = Course::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    require_owner(&user, course.user_id)?;

    Course::delete(&pool, id).await?;
    aggregate::recalculate_average_cost(&pool, course.bootcamp_id).await;

    Ok(ApiResponse::success(json!({})))
}
