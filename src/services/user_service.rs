use rand::Rng;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::database::{DatabaseError, Datastore, User, MAX_USER_ID};

/// Give up looking for a free id after this many collisions in a row.
pub const MAX_ID_ATTEMPTS: usize = 64;

/// Display name given to the admin seeded from `INITIAL_ADMIN_EMAIL`.
pub const INITIAL_ADMIN_NAME: &str = "Administrator";

type IdSource = Arc<dyn Fn() -> u32 + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("No free user id after {0} attempts")]
    IdSpaceExhausted(usize),
    #[error("Failed to save user: {0}")]
    Save(DatabaseError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Creates users. Every creation runs under one lock, so the empty-store
/// check, the duplicate-email check, id allocation and the insert cannot
/// interleave between requests in this process.
pub struct UserService {
    store: Arc<dyn Datastore>,
    provisioning: Mutex<()>,
    next_id: IdSource,
}

/// An open provisioning slot. Holds the lock until dropped or consumed by
/// [`Provisioning::create`].
pub struct Provisioning<'a> {
    service: &'a UserService,
    bootstrap: bool,
    _guard: MutexGuard<'a, ()>,
}

impl UserService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self::with_id_source(store, Arc::new(random_user_id))
    }

    /// Use a custom id generator instead of the random one.
    pub fn with_id_source(store: Arc<dyn Datastore>, next_id: IdSource) -> Self {
        Self {
            store,
            provisioning: Mutex::new(()),
            next_id,
        }
    }

    /// Take the provisioning lock and decide whether this is the first user.
    pub async fn begin(&self) -> Result<Provisioning<'_>, UserServiceError> {
        let guard = self.provisioning.lock().await;
        let bootstrap = !self.store.has_users().await?;
        Ok(Provisioning {
            service: self,
            bootstrap,
            _guard: guard,
        })
    }

    /// Create `email` as an admin if no users exist yet. Returns the created
    /// user, or `None` when the store was already populated.
    pub async fn seed_initial_admin(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        let provisioning = self.begin().await?;
        if !provisioning.is_bootstrap() {
            debug!("Users already present, skipping initial admin {}", email);
            return Ok(None);
        }
        provisioning.create(email, INITIAL_ADMIN_NAME).await.map(Some)
    }

    async fn allocate_id(&self) -> Result<u32, UserServiceError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = (self.next_id)();
            if !User::is_assignable_id(candidate) {
                continue;
            }
            if self.store.user_by_id(candidate).await?.is_none() {
                return Ok(candidate);
            }
            debug!("User id {} already taken, drawing again", candidate);
        }
        Err(UserServiceError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }
}

impl Provisioning<'_> {
    /// True when the store had no users at [`UserService::begin`]: no caller
    /// identity is needed and the new user becomes an admin.
    pub fn is_bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub async fn create(self, email: &str, name: &str) -> Result<User, UserServiceError> {
        let store = &self.service.store;

        if store.user_by_email(email).await?.is_some() {
            return Err(UserServiceError::AlreadyExists(email.to_string()));
        }

        let id = self.service.allocate_id().await?;
        let user = User::new(id, email, name, self.bootstrap);
        store.add_user(&user).await.map_err(UserServiceError::Save)?;

        info!(
            "Created user {} ({}){}",
            user.id,
            user.email,
            if user.is_admin { " as admin" } else { "" }
        );
        Ok(user)
    }
}

/// Uniform draw from `1..=MAX_USER_ID`.
fn random_user_id() -> u32 {
    rand::thread_rng().gen_range(1..=MAX_USER_ID)
}
