pub mod auth;
pub mod response;

pub use auth::{authenticate, require_bearer, Principal};
pub use response::{ApiResponse, ApiResult};
