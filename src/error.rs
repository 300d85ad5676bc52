// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::is_production;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Internal error whose cause is echoed to the client outside
    /// production and suppressed in production.
    pub fn internal_with_detail(detail: impl std::fmt::Display) -> Self {
        if is_production!() {
            ApiError::internal_server_error("An error occurred while processing your request")
        } else {
            ApiError::internal_server_error(format!(
                "An error occurred while processing your request: {}",
                detail
            ))
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<crate::query::QueryError> for ApiError {
    fn from(err: crate::query::QueryError) -> Self {
        ApiError::validation_error(err.to_string())
    }
}

impl From<crate::db::DbError> for ApiError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Sqlx(sqlx::Error::RowNotFound) => {
                ApiError::not_found("Resource not found")
            }
            crate::db::DbError::Sqlx(sqlx::Error::Database(db_err)) => {
                match db_err.code().as_deref().and_then(constraint_error) {
                    Some(err) => err,
                    None => {
                        tracing::error!("database error: {}", db_err);
                        ApiError::internal_with_detail(db_err)
                    }
                }
            }
            crate::db::DbError::Sqlx(sqlx_err) => {
                tracing::error!("database error: {}", sqlx_err);
                ApiError::internal_with_detail(sqlx_err)
            }
            crate::db::DbError::Migration(err) => {
                tracing::error!("migration error: {}", err);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            crate::db::DbError::MissingDatabaseUrl => {
                tracing::error!("DATABASE_URL is not set");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            crate::db::DbError::Decode(msg) => {
                tracing::error!("row decode error: {}", msg);
                ApiError::internal_server_error("Failed to format response")
            }
        }
    }
}

/// Maps Postgres constraint-violation SQLSTATE codes to client errors.
/// Unique violations are conflicts; check violations are malformed input.
fn constraint_error(code: &str) -> Option<ApiError> {
    match code {
        "23505" => Some(ApiError::conflict("Duplicate value for a unique field")),
        "23514" => Some(ApiError::validation_error(
            "A field value is outside the allowed range",
        )),
        _ => None,
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        match err {
            crate::auth::AuthError::InvalidToken | crate::auth::AuthError::Expired => {
                ApiError::unauthorized("Not authorized to access this route")
            }
            crate::auth::AuthError::MissingSecret => {
                tracing::error!("JWT_SECRET is not configured");
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            crate::auth::AuthError::Hash(msg) => {
                tracing::error!("password hashing error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::geocode::GeocodeError> for ApiError {
    fn from(err: crate::geocode::GeocodeError) -> Self {
        match err {
            crate::geocode::GeocodeError::NoResult(address) => {
                // Full addresses stay out of responses outside development.
                if is_production!() {
                    ApiError::bad_request("Could not geocode the supplied address")
                } else {
                    ApiError::bad_request(format!("Could not geocode address: {}", address))
                }
            }
            crate::geocode::GeocodeError::Upstream(msg) => {
                tracing::error!("geocoder error: {}", msg);
                ApiError::bad_gateway("Geocoding service unavailable")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(ApiError::validation_error("x").status_code(), 400);
        assert_eq!(ApiError::unauthorized("x").status_code(), 401);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = constraint_error("23505").unwrap();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn check_violation_maps_to_validation_error() {
        // e.g. a review rating outside 1..=10 or an unknown minimum_skill.
        let err = constraint_error("23514").unwrap();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn other_sqlstate_codes_stay_internal() {
        assert!(constraint_error("40001").is_none());
    }

    #[test]
    fn body_carries_success_false_and_code() {
        let body = ApiError::not_found("Bootcamp not found").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["error"], "Bootcamp not found");
    }
}
