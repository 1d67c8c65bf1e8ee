#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tokio::task::JoinHandle;

use visitlog_api::config::AppConfig;
use visitlog_api::database::{Datastore, MemoryDatastore};
use visitlog_api::{app, AppState};

pub const SECRET: &str = "keyForTesting";
pub const ADMIN_EMAIL: &str = "janedoe@example.com";
pub const MEMBER_EMAIL: &str = "johndoe@example.com";

/// The real router served on a free local port over a memory datastore.
/// Each test gets its own server; it stops when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(test_config()?).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn Datastore> = Arc::new(MemoryDatastore::new());
        let state = AppState::new(config, store)?;
        state.seed_initial_admin().await?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;

        let router = app(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            state,
            handle,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer header value for `email`, signed with the server's key.
    pub fn bearer(&self, email: &str) -> Result<String> {
        Ok(format!("Bearer {}", self.state.signer.issue(email)?))
    }

    /// Create the bootstrap admin through the API, then a regular member
    /// as that admin.
    pub async fn seed_users(&self) -> Result<()> {
        let client = reqwest::Client::new();

        let res = client
            .post(self.url("/admin/users"))
            .json(&serde_json::json!({ "email": ADMIN_EMAIL, "name": "Jane Doe" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "bootstrap failed: {}", res.status());

        let res = client
            .post(self.url("/admin/users"))
            .header("Authorization", self.bearer(ADMIN_EMAIL)?)
            .json(&serde_json::json!({ "email": MEMBER_EMAIL, "name": "John Doe" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "member creation failed: {}", res.status());
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn test_config() -> Result<AppConfig> {
    config_with(&[])
}

/// Test configuration plus extra variables.
pub fn config_with(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: Vec<(String, String)> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let config = AppConfig::from_lookup(|key| {
        if key == "JWTSECRETKEY" {
            return Some(SECRET.to_string());
        }
        vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    })?;
    Ok(config)
}
