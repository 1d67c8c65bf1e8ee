// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (bearer token) → Elevated (bearer token + admin)
pub mod public;
pub mod protected;
pub mod elevated;

pub use public::*;
pub use protected::*;
pub use elevated::*;
