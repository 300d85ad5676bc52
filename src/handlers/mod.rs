pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;

use uuid::Uuid;

use crate::error::ApiError;

/// Path ids arrive as strings so a malformed UUID maps to a 400 rather
/// than the extractor's default rejection.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation_error(format!("Invalid id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_a_validation_error() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
