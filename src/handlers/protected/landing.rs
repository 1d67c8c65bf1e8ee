// handlers/protected/landing.rs - GET /landing handler

use axum::Extension;

use crate::database::User;
use crate::middleware::{ApiResponse, ApiResult, Principal};

/// GET /landing - echo the resolved identity
///
/// Unknown emails are echoed with id 0 rather than rejected, so a client
/// can tell "token fine, no account yet" apart from a bad token.
pub async fn landing(Extension(principal): Extension<Principal>) -> ApiResult<User> {
    Ok(ApiResponse::success(principal.to_user()))
}

#[cfg(test)]
mod tests {
    use crate::app::app;
    use crate::testing;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::json;

    fn landing_request(authorization: &str) -> Request<Body> {
        Request::builder()
            .uri("/landing")
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn echoes_known_user() {
        let state = testing::seeded_state();
        let auth = testing::bearer(&state, testing::ADMIN_EMAIL);
        let (status, _, body) = testing::send(app(state.clone()), landing_request(&auth)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::to_value(testing::admin_user()).unwrap());
        // landing is not a logged visit
        assert!(state.store.all_visited_paths().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn echoes_unknown_email_as_id_zero() {
        let state = testing::seeded_state();
        let auth = testing::bearer(&state, "new@example.com");
        let (status, _, body) = testing::send(app(state), landing_request(&auth)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "id": 0, "email": "new@example.com", "name": "", "is_admin": false })
        );
    }

    #[tokio::test]
    async fn wrong_scheme_is_challenged() {
        let (status, headers, _) =
            testing::send(app(testing::seeded_state()), landing_request("Token abc")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");
    }
}
