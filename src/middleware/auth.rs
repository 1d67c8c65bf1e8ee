use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity attached to a request once its bearer token has verified.
///
/// The token proves the caller holds a credential for `email`; whether that
/// email belongs to a stored user is a separate question, answered by the
/// variant. Handlers decide what an unknown principal may do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Principal {
    Known(User),
    Unknown { email: String },
}

impl Principal {
    /// 0 for an unknown principal.
    pub fn id(&self) -> u32 {
        match self {
            Principal::Known(user) => user.id,
            Principal::Unknown { .. } => 0,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Known(user) => &user.email,
            Principal::Unknown { email } => email,
        }
    }

    /// The principal as a user record; id 0 with no name for an unknown email.
    pub fn to_user(&self) -> User {
        match self {
            Principal::Known(user) => user.clone(),
            Principal::Unknown { email } => User::new(0, email.as_str(), "", false),
        }
    }

    /// Any stored user.
    pub fn require_known(&self) -> Result<&User, ApiError> {
        match self {
            Principal::Known(user) => Ok(user),
            Principal::Unknown { email } => {
                tracing::debug!("Rejecting unknown user {}", email);
                Err(ApiError::unknown_user(email))
            }
        }
    }

    /// A stored user with the admin flag. Non-admins get 403, unknown
    /// emails 401.
    pub fn require_admin(&self) -> Result<&User, ApiError> {
        let user = self.require_known()?;
        if !user.is_admin {
            tracing::warn!("User {} ({}) denied admin resource", user.id, user.email);
            return Err(ApiError::admin_required());
        }
        Ok(user)
    }
}

/// Resolve the request's bearer token to a [`Principal`].
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = extract_bearer_token(headers)?;
    let claims = state.signer.verify(token)?;

    match state.store.user_by_email(&claims.email).await? {
        Some(user) => Ok(Principal::Known(user)),
        None => Ok(Principal::Unknown { email: claims.email }),
    }
}

/// Bearer authentication middleware. Requests without a verifiable token
/// are answered with 401; all others continue with a [`Principal`] in their
/// extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers.get(header::AUTHORIZATION).ok_or_else(|| {
        tracing::debug!("Missing Authorization header");
        ApiError::bearer_required()
    })?;

    let auth_str = auth_header.to_str().map_err(|_| ApiError::bearer_required())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => {
            tracing::debug!("Authorization header is not a Bearer token");
            Err(ApiError::bearer_required())
        }
    }
}
