// handlers/public/ignore.rs - paths answered without logging a visit

use crate::error::ApiError;

/// GET /favicon.ico - always 404, so browsers don't record a visit per page load
pub async fn favicon() -> ApiError {
    ApiError::not_found("Not Found")
}
