use async_trait::async_trait;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{User, VisitedPath};
use super::Datastore;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    visited_paths: Vec<VisitedPath>,
}

/// In-process [`Datastore`] enforcing the same constraints as the SQL schema.
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    tables: RwLock<Tables>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut users: Vec<User> = users.into_iter().collect();
        users.sort_by_key(|u| u.id);
        Self {
            tables: RwLock::new(Tables {
                users,
                visited_paths: Vec::new(),
            }),
        }
    }

    fn newest_first(mut visits: Vec<VisitedPath>) -> Vec<VisitedPath> {
        // Stable sort keeps later inserts ahead among equal timestamps once reversed.
        visits.reverse();
        visits.sort_by(|a, b| b.date.cmp(&a.date));
        visits
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn all_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn user_by_id(&self, id: u32) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn has_users(&self) -> Result<bool, DatabaseError> {
        Ok(!self.tables.read().await.users.is_empty())
    }

    async fn add_user(&self, user: &User) -> Result<(), DatabaseError> {
        if !User::is_assignable_id(user.id) {
            return Err(DatabaseError::InvalidUserId(user.id));
        }

        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == user.id || u.email == user.email) {
            return Err(DatabaseError::DuplicateUser(user.email.clone()));
        }

        let at = tables.users.partition_point(|u| u.id < user.id);
        tables.users.insert(at, user.clone());
        Ok(())
    }

    async fn all_visited_paths(&self) -> Result<Vec<VisitedPath>, DatabaseError> {
        let visits = self.tables.read().await.visited_paths.clone();
        Ok(Self::newest_first(visits))
    }

    async fn visited_paths_for_user(&self, user_id: u32) -> Result<Vec<VisitedPath>, DatabaseError> {
        let visits = self
            .tables
            .read()
            .await
            .visited_paths
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(visits))
    }

    async fn add_visited_path(&self, visit: &VisitedPath) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == visit.user_id) {
            return Err(DatabaseError::UnknownUser(visit.user_id));
        }
        tables.visited_paths.push(visit.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
