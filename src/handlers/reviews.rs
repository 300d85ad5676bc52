use std::collections::BTreeMap;

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde_json::{json, Value};

use crate::aggregate;
use crate::db::collection::REVIEWS;
use crate::db::models::{Bootcamp, CreateReview, Review, Role, UpdateReview};
use crate::db::{pool, Repository};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{require_owner, require_role, ApiResponse, ApiResult, CurrentUser};
use crate::query::plan::QueryPlan;

/// GET /api/v1/reviews
pub async fn list(Query(params): Query<BTreeMap<String, String>>) -> ApiResult<Vec<Value>> {
    let pool = pool().await?;
    let repo = Repository::new(&REVIEWS, pool);

    let total = repo.count_all().await?;
    let (plan, pagination) = QueryPlan::shape(&REVIEWS, &params, total)?;
    let rows = repo.fetch_page(&plan).await?;

    let count = rows.len();
    Ok(ApiResponse::page(rows, count, pagination))
}

/// GET /api/v1/bootcamps/:bootcampId/reviews
pub async fn list_by_bootcamp(Path(bootcamp_id): Path<String>) -> ApiResult<Vec<Review>> {
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let pool = pool().await?;

    Bootcamp::find(&pool, bootcamp_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;

    let reviews = Review::list_by_bootcamp(&pool, bootcamp_id).await?;
    let count = reviews.len();
    Ok(ApiResponse::list(reviews, count))
}

/// GET /api/v1/reviews/:id
pub async fn get(Path(id): Path<String>) -> ApiResult<Review> {
    let id = parse_id(&id)?;
    let pool = pool().await?;
    let review = Review::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    Ok(ApiResponse::success(review))
}

/// POST /api/v1/bootcamps/:bootcampId/reviews
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    Path(bootcamp_id): Path<String>,
    Json(payload): Json<CreateReview>,
) -> ApiResult<Review> {
    require_role(&user, &[Role::User, Role::Admin])?;

    let bootcamp_id = parse_id(&bootcamp_id)?;
    let pool = pool().await?;

    Bootcamp::find(&pool, bootcamp_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;

    // A second review for the same bootcamp by the same user trips the
    // unique index and surfaces as 409.
    let review = Review::insert(&pool, bootcamp_id, user.id, &payload).await?;
    aggregate::recalculate_average_rating(&pool, bootcamp_id).await;

    Ok(ApiResponse::created(review))
}

/// PATCH /api/v1/reviews/:id
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReview>,
) -> ApiResult<Review> {
    let id = parse_id(&id)?;
    let pool = pool().await?;

    let review = Review::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    require_owner(&user, review.user_id)?;

    let updated = Review::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    aggregate::recalculate_average_rating(&pool, updated.bootcamp_id).await;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/reviews/:id
pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let pool = pool().await?;

    let review = Review::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    require_owner(&user, review.user_id)?;

    Review::delete(&pool, id).await?;
    aggregate::recalculate_average_rating(&pool, review.bootcamp_id).await;

    Ok(ApiResponse::success(json!({})))
}
