use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::{User, UserRow, VisitedPath, VisitedPathRow};
use super::Datastore;

/// [`Datastore`] backed by the `users` and `visitedpaths` PostgreSQL tables
#[derive(Clone)]
pub struct PgDatastore {
    pool: PgPool,
}

impl PgDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
        User::try_from(row).map_err(DatabaseError::Corrupt)
    }

    fn visit_from_row(row: VisitedPathRow) -> Result<VisitedPath, DatabaseError> {
        VisitedPath::try_from(row).map_err(DatabaseError::Corrupt)
    }

    /// Narrow a user id to the INTEGER column type.
    fn column_id(id: u32) -> Result<i32, DatabaseError> {
        if !User::is_assignable_id(id) {
            return Err(DatabaseError::InvalidUserId(id));
        }
        i32::try_from(id).map_err(|_| DatabaseError::InvalidUserId(id))
    }
}

#[async_trait]
impl Datastore for PgDatastore {
    async fn all_users(&self) -> Result<Vec<User>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, email, name, is_admin FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::user_from_row).collect()
    }

    async fn user_by_id(&self, id: u32) -> Result<Option<User>, DatabaseError> {
        // Ids outside the column range can never be stored.
        let Ok(column_id) = Self::column_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>("SELECT id, email, name, is_admin FROM users WHERE id = $1")
            .bind(column_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::user_from_row).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, email, name, is_admin FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::user_from_row).transpose()
    }

    async fn has_users(&self) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn add_user(&self, user: &User) -> Result<(), DatabaseError> {
        let column_id = Self::column_id(user.id)?;

        let result = sqlx::query("INSERT INTO users (id, email, name, is_admin) VALUES ($1, $2, $3, $4)")
            .bind(column_id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.is_admin)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DatabaseError::DuplicateUser(user.email.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn all_visited_paths(&self) -> Result<Vec<VisitedPath>, DatabaseError> {
        let rows = sqlx::query_as::<_, VisitedPathRow>(
            "SELECT path, visit_date, user_id FROM visitedpaths ORDER BY visit_date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::visit_from_row).collect()
    }

    async fn visited_paths_for_user(&self, user_id: u32) -> Result<Vec<VisitedPath>, DatabaseError> {
        let Ok(column_id) = Self::column_id(user_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query_as::<_, VisitedPathRow>(
            "SELECT path, visit_date, user_id FROM visitedpaths WHERE user_id = $1 ORDER BY visit_date DESC, id DESC",
        )
        .bind(column_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::visit_from_row).collect()
    }

    async fn add_visited_path(&self, visit: &VisitedPath) -> Result<(), DatabaseError> {
        let column_id = Self::column_id(visit.user_id).map_err(|_| DatabaseError::UnknownUser(visit.user_id))?;

        let result = sqlx::query("INSERT INTO visitedpaths (path, visit_date, user_id) VALUES ($1, $2, $3)")
            .bind(&visit.path)
            .bind(visit.date)
            .bind(column_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(DatabaseError::UnknownUser(visit.user_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
