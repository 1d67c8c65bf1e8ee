use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Largest id the `users.id INTEGER` column can hold.
pub const MAX_USER_ID: u32 = i32::MAX as u32;

/// A registered user of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

impl User {
    pub fn new(id: u32, email: impl Into<String>, name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            is_admin,
        }
    }

    /// Ids that may be written to storage: non-zero and within the column range.
    pub fn is_assignable_id(id: u32) -> bool {
        id != 0 && id <= MAX_USER_ID
    }
}

/// Raw `users` row as PostgreSQL returns it.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = u32::try_from(row.id).map_err(|_| format!("negative user id {} in users table", row.id))?;
        Ok(User::new(id, row.email, row.name, row.is_admin))
    }
}
