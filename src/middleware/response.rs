use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::query::types::Pagination;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub count: Option<usize>,
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
            count: None,
            pagination: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self {
            data,
            status_code: Some(StatusCode::CREATED),
            count: None,
            pagination: None,
        }
    }

    /// List response carrying a result count and page navigation.
    pub fn page(data: T, count: usize, pagination: Pagination) -> Self {
        Self {
            data,
            status_code: None,
            count: Some(count),
            pagination: Some(pagination),
        }
    }

    /// List response with a count but no page navigation.
    pub fn list(data: T, count: usize) -> Self {
        Self {
            data,
            status_code: None,
            count: Some(count),
            pagination: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({
            "success": true,
            "data": data_value
        });

        if let Some(count) = self.count {
            envelope["count"] = json!(count);
        }
        if let Some(pagination) = self.pagination {
            envelope["pagination"] = json!(pagination);
        }

        (status, Json(envelope)).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::{PageRef, Pagination};

    #[test]
    fn page_envelope_carries_count_and_pagination() {
        let pagination = Pagination {
            next: Some(PageRef { page: 2, limit: 2 }),
            prev: None,
        };
        let response = ApiResponse::page(vec![1, 2], 2, pagination);
        assert_eq!(response.count, Some(2));
        assert!(response.pagination.as_ref().unwrap().next.is_some());
    }

    #[test]
    fn pagination_omits_absent_links() {
        let pagination = Pagination {
            next: Some(PageRef { page: 3, limit: 2 }),
            prev: None,
        };
        let value = serde_json::to_value(&pagination).unwrap();
        assert!(value.get("next").is_some());
        assert!(value.get("prev").is_none());
    }
}
