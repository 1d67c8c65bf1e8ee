//! Fixtures for in-crate tests: seeded memory stores, tokens, and a helper
//! that drives the router without a socket.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::{DatabaseError, Datastore, MemoryDatastore, User, VisitedPath};
use crate::state::AppState;

pub const TEST_SECRET: &str = "keyForTesting";
pub const ADMIN_EMAIL: &str = "janedoe@example.com";
pub const MEMBER_EMAIL: &str = "johndoe@example.com";

pub fn admin_user() -> User {
    User::new(914611345, ADMIN_EMAIL, "Jane Doe", true)
}

pub fn member_user() -> User {
    User::new(91461, MEMBER_EMAIL, "John Doe", false)
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "JWTSECRETKEY" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn state_with(store: Arc<dyn Datastore>) -> AppState {
    AppState::new(test_config(), store).expect("test state")
}

/// State over a memory store holding one admin and one regular user.
pub fn seeded_state() -> AppState {
    state_with(Arc::new(MemoryDatastore::with_users([admin_user(), member_user()])))
}

pub fn empty_state() -> AppState {
    state_with(Arc::new(MemoryDatastore::new()))
}

pub fn token_for(state: &AppState, email: &str) -> String {
    state.signer.issue(email).expect("token")
}

pub fn bearer(state: &AppState, email: &str) -> String {
    format!("Bearer {}", token_for(state, email))
}

/// Run one request through the router; the body is parsed as JSON, or
/// `Value::Null` when empty.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, headers, body)
}

/// A store whose every operation fails.
pub struct FailingStore;

fn down() -> DatabaseError {
    DatabaseError::Corrupt("store unavailable".to_string())
}

#[async_trait]
impl Datastore for FailingStore {
    async fn all_users(&self) -> Result<Vec<User>, DatabaseError> {
        Err(down())
    }
    async fn user_by_id(&self, _id: u32) -> Result<Option<User>, DatabaseError> {
        Err(down())
    }
    async fn user_by_email(&self, _email: &str) -> Result<Option<User>, DatabaseError> {
        Err(down())
    }
    async fn has_users(&self) -> Result<bool, DatabaseError> {
        Err(down())
    }
    async fn add_user(&self, _user: &User) -> Result<(), DatabaseError> {
        Err(down())
    }
    async fn all_visited_paths(&self) -> Result<Vec<VisitedPath>, DatabaseError> {
        Err(down())
    }
    async fn visited_paths_for_user(&self, _user_id: u32) -> Result<Vec<VisitedPath>, DatabaseError> {
        Err(down())
    }
    async fn add_visited_path(&self, _visit: &VisitedPath) -> Result<(), DatabaseError> {
        Err(down())
    }
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Err(down())
    }
}
