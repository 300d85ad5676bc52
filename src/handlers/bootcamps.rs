use std::collections::BTreeMap;

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde_json::{json, Value};

use crate::db::collection::BOOTCAMPS;
use crate::db::models::{Bootcamp, CreateBootcamp, Role, UpdateBootcamp};
use crate::db::{pool, Repository};
use crate::error::ApiError;
use crate::geocode::geocoder;
use crate::handlers::parse_id;
use crate::middleware::{require_owner, require_role, ApiResponse, ApiResult, CurrentUser};
use crate::query::plan::QueryPlan;

/// GET /api/v1/bootcamps
pub async fn list(Query(params): Query<BTreeMap<String, String>>) -> ApiResult<Vec<Value>> {
    let pool = pool().await?;
    let repo = Repository::new(&BOOTCAMPS, pool);

    let total = repo.count_all().await?;
    let (plan, pagination) = QueryPlan::shape(&BOOTCAMPS, &params, total)?;
    let rows = repo.fetch_page(&plan).await?;

    let count = rows.len();
    Ok(ApiResponse::page(rows, count, pagination))
}

/// GET /api/v1/bootcamps/:id
pub async fn get(Path(id): Path<String>) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    let pool = pool().await?;
    let bootcamp = Bootcamp::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;
    Ok(ApiResponse::success(bootcamp))
}

/// POST /api/v1/bootcamps
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateBootcamp>,
) -> ApiResult<Bootcamp> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;

    let pool = pool().await?;

    // One bootcamp per publisher; admins are exempt.
    if user.role != Role::Admin && Bootcamp::find_by_owner(&pool, user.id).await?.is_some() {
        return Err(ApiError::forbidden(
            "The user has already published a bootcamp",
        ));
    }

    let location = match payload.address.as_deref() {
        Some(address) => Some(geocoder().geocode(address).await?),
        None => None,
    };

    let bootcamp = Bootcamp::insert(&pool, user.id, &payload, location.as_ref()).await?;
    Ok(ApiResponse::created(bootcamp))
}

/// PATCH /api/v1/bootcamps/:id
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBootcamp>,
) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    let pool = pool().await?;

    let bootcamp = Bootcamp::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;
    require_owner(&user, bootcamp.user_id)?;

    let updated = Bootcamp::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/bootcamps/:id
pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let pool = pool().await?;

    let bootcamp = Bootcamp::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp not found"))?;
    require_owner(&user, bootcamp.user_id)?;

    Bootcamp::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({})))
}

/// GET /api/v1/bootcamps/radius/:zipcode/:distance
///
/// `distance` is in miles; dividing by the Earth's radius in miles gives
/// the central angle in radians compared against the haversine distance.
pub async fn radius(Path((zipcode, distance)): Path<(String, String)>) -> ApiResult<Vec<Bootcamp>> {
    const EARTH_RADIUS_MILES: f64 = 3963.0;

    let distance: f64 = distance
        .parse()
        .map_err(|_| ApiError::validation_error(format!("Invalid distance: {}", distance)))?;

    let center = geocoder().geocode(&zipcode).await?;
    let radius_radians = distance / EARTH_RADIUS_MILES;

    let pool = pool().await?;
    let bootcamps =
        Bootcamp::within_radius(&pool, center.latitude, center.longitude, radius_radians).await?;

    let count = bootcamps.len();
    Ok(ApiResponse::list(bootcamps, count))
}
