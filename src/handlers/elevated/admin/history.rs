// handlers/elevated/admin/history.rs - GET /admin/history handler

use axum::{extract::State, Extension};

use crate::database::VisitedPath;
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;

/// GET /admin/history - every logged visit, newest first
pub async fn history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<VisitedPath>> {
    principal.require_admin()?;

    let visits = state.store.all_visited_paths().await?;
    Ok(ApiResponse::success(visits))
}
