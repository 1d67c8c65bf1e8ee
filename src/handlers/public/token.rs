// handlers/public/token.rs - POST /oauth/getToken handler

use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header, HeaderMap},
    Form,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /oauth/getToken - issue a bearer token for the submitted email
///
/// The `email` field is read from a URL-encoded body, or from the query
/// string when the body has no such field. Other body types are ignored.
/// Answers `{"token": "..."}`. The email does not need to belong to a user
/// yet; protected endpoints decide what an unknown email may do.
pub async fn create_token(State(state): State<AppState>, request: Request) -> ApiResult<TokenResponse> {
    let Query(from_query) = Query::<TokenRequest>::try_from_uri(request.uri()).map_err(|e| {
        tracing::debug!("Token request query rejected: {}", e);
        ApiError::bad_request("Couldn't parse form")
    })?;

    let from_body = if is_form_body(request.headers()) {
        let Form(body) = Form::<TokenRequest>::from_request(request, &state).await.map_err(|e| {
            tracing::debug!("Token request form rejected: {}", e);
            ApiError::bad_request("Couldn't parse form")
        })?;
        body
    } else {
        TokenRequest::default()
    };

    // A body field wins over the query, even when empty
    let email = from_body
        .email
        .or(from_query.email)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ApiError::bad_request("Must supply login email address in token request"))?;

    let token = state.signer.issue(&email)?;
    tracing::info!("Issued token for {}", email);

    Ok(ApiResponse::success(TokenResponse { token }))
}

fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

#[cfg(test)]
mod tests {
    use crate::app::app;
    use crate::testing;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn issues_token_for_submitted_email() {
        let state = testing::seeded_state();
        let (status, headers, body) =
            testing::send(app(state.clone()), form_post("/oauth/getToken", "email=janedoe%40example.com")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        let fields = body.as_object().unwrap();
        assert_eq!(fields.len(), 1);
        let token = fields["token"].as_str().unwrap();
        assert!(!token.is_empty());
        assert_eq!(state.signer.verify(token).unwrap().email, "janedoe@example.com");
    }

    #[tokio::test]
    async fn legacy_path_also_issues_tokens() {
        let (status, _, body) = testing::send(
            app(testing::seeded_state()),
            form_post("/getToken", "email=someone@example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn rejects_missing_or_empty_email() {
        for body in ["", "email=", "name=Jane"] {
            let (status, _, json) =
                testing::send(app(testing::seeded_state()), form_post("/oauth/getToken", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(json["error"], "Must supply login email address in token request");
        }
    }

    #[tokio::test]
    async fn ignores_non_form_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/oauth/getToken")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"janedoe@example.com"}"#))
            .unwrap();
        let (status, _, json) = testing::send(app(testing::seeded_state()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Must supply login email address in token request");
    }

    #[tokio::test]
    async fn reads_email_from_query_without_body() {
        let state = testing::seeded_state();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/oauth/getToken?email=janedoe%40example.com")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = testing::send(app(state.clone()), request).await;

        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap();
        assert_eq!(state.signer.verify(token).unwrap().email, "janedoe@example.com");
    }

    #[tokio::test]
    async fn body_email_wins_over_query() {
        let state = testing::seeded_state();
        let (status, _, body) = testing::send(
            app(state.clone()),
            form_post("/oauth/getToken?email=other%40example.com", "email=janedoe%40example.com"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap();
        assert_eq!(state.signer.verify(token).unwrap().email, "janedoe@example.com");
    }

    #[tokio::test]
    async fn form_content_type_with_charset_is_read() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/oauth/getToken")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded; charset=UTF-8")
            .body(Body::from("email=janedoe%40example.com"))
            .unwrap();
        let (status, _, _) = testing::send(app(testing::seeded_state()), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn get_is_not_allowed() {
        let request = Request::builder()
            .uri("/oauth/getToken")
            .body(Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(app(testing::seeded_state()), request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
