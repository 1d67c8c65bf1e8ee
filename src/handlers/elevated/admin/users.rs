// handlers/elevated/admin/users.rs - GET and POST /admin/users handlers

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Extension,
};
use serde::Deserialize;

use crate::database::User;
use crate::error::ApiError;
use crate::middleware::{authenticate, ApiResponse, ApiResult, Principal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// GET /admin/users - all users, sorted by id
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<User>> {
    principal.require_admin()?;

    let users = state.store.all_users().await?;
    Ok(ApiResponse::success(users))
}

/// POST /admin/users - create a user
///
/// Expected Input:
/// ```json
/// { "email": "janedoe@example.com", "name": "Jane Doe" }
/// ```
///
/// While no users exist the call needs no credential and the new user is an
/// admin. Afterwards the caller must be an admin and new users are not.
/// This route sits outside the bearer middleware so that the first call can
/// get through; authentication happens here once bootstrap is ruled out.
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<User> {
    let provisioning = state.users.begin().await?;

    if provisioning.is_bootstrap() {
        tracing::info!("No users yet, creating first user as admin without authentication");
    } else {
        let principal = authenticate(&state, &headers).await?;
        principal.require_admin()?;
    }

    let request: NewUserRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Rejected new user body: {}", e);
        ApiError::bad_request("Bad Request")
    })?;

    if request.email.is_empty() {
        return Err(ApiError::bad_request("Must supply email address for new user"));
    }

    let user = provisioning.create(&request.email, &request.name).await?;
    Ok(ApiResponse::created(user))
}
