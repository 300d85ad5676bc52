pub mod auth;
pub mod response;

pub use auth::{require_auth, require_owner, require_role, CurrentUser};
pub use response::{ApiResponse, ApiResult};
