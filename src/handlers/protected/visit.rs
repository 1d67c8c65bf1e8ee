// handlers/protected/visit.rs - GET /{any path} handler

use axum::{extract::State, http::Uri, Extension};
use percent_encoding::percent_decode_str;

use crate::database::VisitedPath;
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;

/// GET /{any path} - log the requested path for the caller and echo the record
pub async fn log_visit(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    uri: Uri,
) -> ApiResult<VisitedPath> {
    let user = principal.require_known()?;

    let visit = VisitedPath::now(decoded_path(&uri), user.id);
    state.store.add_visited_path(&visit).await?;
    tracing::debug!("User {} visited {}", user.id, visit.path);

    Ok(ApiResponse::success(visit))
}

/// The path with percent-escapes resolved. Kept as sent when the escapes
/// do not decode to UTF-8.
fn decoded_path(uri: &Uri) -> String {
    let raw = uri.path();
    match percent_decode_str(raw).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => {
            tracing::debug!("Path {} is not UTF-8 once decoded, logging it raw", raw);
            raw.to_string()
        }
    }
}
