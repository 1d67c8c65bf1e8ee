// handlers/elevated/admin/mod.rs - /admin/history and /admin/users

pub mod history;
pub mod users;

pub use history::history;
pub use users::{create_user, list_users};
