pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryDatastore;
pub use models::{User, VisitedPath, MAX_USER_ID};
pub use postgres::PgDatastore;

/// Storage operations the service needs, implemented by PostgreSQL in
/// production and by an in-memory store for tests and local runs.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// All users, sorted by id ascending.
    async fn all_users(&self) -> Result<Vec<User>, DatabaseError>;

    async fn user_by_id(&self, id: u32) -> Result<Option<User>, DatabaseError>;

    /// Exact, case-sensitive email match.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn has_users(&self) -> Result<bool, DatabaseError>;

    /// Insert a user. Fails on id 0, ids above [`MAX_USER_ID`], and
    /// duplicate ids or emails.
    async fn add_user(&self, user: &User) -> Result<(), DatabaseError>;

    /// All visits, newest first.
    async fn all_visited_paths(&self) -> Result<Vec<VisitedPath>, DatabaseError>;

    /// Visits made by one user, newest first.
    async fn visited_paths_for_user(&self, user_id: u32) -> Result<Vec<VisitedPath>, DatabaseError>;

    /// Append a visit. Fails if the owning user does not exist.
    async fn add_visited_path(&self, visit: &VisitedPath) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
