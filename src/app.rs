use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{elevated, protected, public};
use crate::middleware::require_bearer;
use crate::state::AppState;

/// Build the full router over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        // Global middleware
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/favicon.ico", get(public::favicon))
        .route("/health", get(public::health))
        // Token acquisition
        .route("/oauth/getToken", post(public::create_token))
        .route("/getToken", post(public::create_token))
        .route("/oauth/login", get(public::github_login))
        .route("/oauth/callback", get(public::github_callback))
        // Authenticates inside the handler once bootstrap is ruled out
        .route("/admin/users", post(elevated::create_user))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/landing", get(protected::landing))
        // Admin only; the handlers check the flag
        .route("/admin/history", get(elevated::history))
        .route("/admin/users", get(elevated::list_users))
        // Everything else is a visit
        .route("/", get(protected::log_visit))
        .route("/*path", get(protected::log_visit))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::HEAD, Method::OPTIONS])
        .allow_headers([
            header::HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ])
}
