// handlers/public/oauth.rs - GitHub OAuth login round-trip
//
// The callback only records which GitHub account signed in; linking that
// account to a user record is not done here.

use axum::{
    extract::{Query, State},
    http::header,
    response::Redirect,
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::OAuthConfig;
use crate::error::ApiError;
use crate::state::AppState;

const USER_AGENT: &str = concat!("visitlog-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider refused the exchange: {0}")]
    Refused(String),
}

fn oauth_config(state: &AppState) -> Result<&OAuthConfig, ApiError> {
    state
        .config
        .oauth
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("OAuth login is not configured"))
}

/// GET /oauth/login?state=... - redirect the browser to GitHub's consent page
pub async fn github_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Redirect, ApiError> {
    let oauth = oauth_config(&state)?;

    let login_state = query
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Must send a state query parameter"))?;

    let url = authorize_url(oauth, &login_state)?;
    Ok(Redirect::temporary(url.as_str()))
}

/// GET /oauth/callback?code=...&state=... - finish the GitHub round-trip
///
/// An empty `state` is accepted; checking it is left to the client that
/// chose it.
pub async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let oauth = oauth_config(&state)?;
    let code = query.code.unwrap_or_default();
    tracing::debug!("OAuth callback with state {:?}", query.state);

    let access_token = exchange_code(&state.http, oauth, &code).await.map_err(|e| {
        tracing::warn!("OAuth code exchange failed: {}", e);
        ApiError::bad_request("Couldn't convert auth code to OAuth token")
    })?;

    match fetch_user(&state.http, oauth, &access_token).await {
        Ok(user) => tracing::info!("Logged in as GitHub user: {}", user.login),
        Err(e) => tracing::warn!("Fetching GitHub user failed: {}", e),
    }

    Ok(Redirect::temporary("/"))
}

fn authorize_url(oauth: &OAuthConfig, login_state: &str) -> Result<Url, ApiError> {
    Url::parse_with_params(
        &oauth.authorize_url,
        &[("client_id", oauth.client_id.as_str()), ("state", login_state)],
    )
    .map_err(|e| {
        tracing::error!("Bad OAuth authorize URL {}: {}", oauth.authorize_url, e);
        ApiError::internal_server_error("Internal Server Error")
    })
}

async fn exchange_code(client: &reqwest::Client, oauth: &OAuthConfig, code: &str) -> Result<String, OAuthError> {
    let response: AccessTokenResponse = client
        .post(&oauth.token_url)
        .header(header::ACCEPT, "application/json")
        .form(&[
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
            ("code", code),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    match response.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(OAuthError::Refused(
            response.error.unwrap_or_else(|| "no access token".to_string()),
        )),
    }
}

async fn fetch_user(client: &reqwest::Client, oauth: &OAuthConfig, access_token: &str) -> Result<GithubUser, OAuthError> {
    let user = client
        .get(&oauth.user_api_url)
        .bearer_auth(access_token)
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(user)
}
