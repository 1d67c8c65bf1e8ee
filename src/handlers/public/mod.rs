// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, the GitHub OAuth round-trip, health and ignored paths.

pub mod health;
pub mod ignore;
pub mod oauth;
pub mod token;

pub use health::health;
pub use ignore::favicon;
pub use oauth::{github_callback, github_login};
pub use token::create_token;
