//! Registration, login and account self-service.

use axum::extract::{Extension, Path};
use axum::http::{header::SET_COOKIE, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{
    generate_reset_token, hash_password, hash_reset_token, sign_token, verify_password, Claims,
};
use crate::config::config;
use crate::db::models::{Role, User};
use crate::db::pool;
use crate::error::ApiError;
use crate::is_production;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordPayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    pub password: String,
}

/// POST /api/v1/auth/register
pub async fn register(Json(payload): Json<RegisterPayload>) -> Result<Response, ApiError> {
    let role = payload.role.unwrap_or(Role::User);
    // Admin accounts are seeded or promoted, never self-registered.
    if role == Role::Admin {
        return Err(ApiError::validation_error(
            "Role must be user or publisher",
        ));
    }

    let pool = pool().await?;
    let password_hash = hash_password(&payload.password)?;
    let user = User::insert(&pool, &payload.name, &payload.email, &password_hash, role).await?;

    token_response(&user, StatusCode::CREATED)
}

/// POST /api/v1/auth/login
pub async fn login(Json(payload): Json<LoginPayload>) -> Result<Response, ApiError> {
    let pool = pool().await?;

    let user = User::find_by_email(&pool, &payload.email)
        .await?
        .filter(|u| verify_password(&payload.password, &u.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    token_response(&user, StatusCode::OK)
}

/// GET /api/v1/auth/logout
pub async fn logout() -> Response {
    let cookie = "token=none; Max-Age=10; Path=/; HttpOnly".to_string();
    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "success": true, "data": {} })),
    )
        .into_response()
}

/// GET /api/v1/auth/me
pub async fn me(Extension(current): Extension<CurrentUser>) -> ApiResult<User> {
    let pool = pool().await?;
    let user = User::find(&pool, current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user))
}

/// PATCH /api/v1/auth/updatedetails
pub async fn update_details(
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateDetailsPayload>,
) -> ApiResult<User> {
    let pool = pool().await?;
    let user = User::update_details(
        &pool,
        current.id,
        payload.name.as_deref(),
        payload.email.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/auth/updatepassword
pub async fn update_password(
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Result<Response, ApiError> {
    let pool = pool().await?;

    let user = User::find(&pool, current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if !verify_password(&payload.current_password, &user.password_hash) {
        return Err(ApiError::unauthorized("Password is incorrect"));
    }

    let password_hash = hash_password(&payload.new_password)?;
    let user = User::update_password(&pool, current.id, &password_hash)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    token_response(&user, StatusCode::OK)
}

/// POST /api/v1/auth/forgotpassword
///
/// Email dispatch is out of scope; the plain token is returned outside
/// production so the reset flow stays exercisable end to end.
pub async fn forgot_password(
    Json(payload): Json<ForgotPasswordPayload>,
) -> ApiResult<serde_json::Value> {
    let pool = pool().await?;

    let user = User::find_by_email(&pool, &payload.email)
        .await?
        .ok_or_else(|| ApiError::not_found("There is no user with that email"))?;

    let token = generate_reset_token();
    User::set_reset_token(&pool, user.id, &token.hashed, token.expires_at).await?;
    tracing::info!(user_id = %user.id, "password reset token issued");

    let data = if is_production!() {
        json!({ "message": "Reset token generated" })
    } else {
        json!({ "message": "Reset token generated", "reset_token": token.plain })
    };
    Ok(ApiResponse::success(data))
}

/// PUT /api/v1/auth/resetpassword/:token
pub async fn reset_password(
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Response, ApiError> {
    let pool = pool().await?;

    let user = User::find_by_reset_token(&pool, &hash_reset_token(&token))
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid token"))?;

    let password_hash = hash_password(&payload.password)?;
    let user = User::reset_password(&pool, user.id, &password_hash)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    token_response(&user, StatusCode::OK)
}

/// Signs a session token and sets it both in the body and as an http-only
/// cookie.
fn token_response(user: &User, status: StatusCode) -> Result<Response, ApiError> {
    let token = sign_token(&Claims::new(user))?;
    Ok((
        status,
        AppendHeaders([(SET_COOKIE, auth_cookie(&token))]),
        Json(json!({ "success": true, "token": token })),
    )
        .into_response())
}

fn auth_cookie(token: &str) -> String {
    let max_age_secs = config().security.cookie_expiry_days * 24 * 60 * 60;
    let mut cookie = format!("token={}; Max-Age={}; Path=/; HttpOnly", token, max_age_secs);
    if is_production!() {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookie_is_http_only() {
        let cookie = auth_cookie("abc");
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
    }
}
