use std::sync::Arc;

use crate::auth::{JwtError, TokenSigner};
use crate::config::AppConfig;
use crate::database::{Datastore, User};
use crate::services::{UserService, UserServiceError};

/// Shared, read-mostly state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Datastore>,
    pub users: Arc<UserService>,
    pub signer: Arc<TokenSigner>,
    /// Outbound client for the OAuth provider.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Datastore>) -> Result<Self, JwtError> {
        let signer = TokenSigner::new(&config.security.jwt_secret)?;
        let users = UserService::new(store.clone());
        Ok(Self {
            config: Arc::new(config),
            store,
            users: Arc::new(users),
            signer: Arc::new(signer),
            http: reqwest::Client::new(),
        })
    }
}

impl AppState {
    /// Provision `INITIAL_ADMIN_EMAIL` as an admin when the store is empty.
    /// Returns the created user, or `None` when nothing was seeded.
    pub async fn seed_initial_admin(&self) -> Result<Option<User>, UserServiceError> {
        let Some(email) = self.config.database.initial_admin_email.as_deref() else {
            return Ok(None);
        };
        let seeded = self.users.seed_initial_admin(email).await?;
        if let Some(user) = &seeded {
            tracing::info!("Seeded initial admin {} with id {}", user.email, user.id);
        }
        Ok(seeded)
    }
}
