pub mod user;
pub mod visited_path;

pub use user::{User, UserRow, MAX_USER_ID};
pub use visited_path::{VisitedPath, VisitedPathRow};
