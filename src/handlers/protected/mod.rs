// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `require_bearer`, so handlers always find a
// `Principal` in the request extensions. Whether an unknown principal may
// proceed is decided per handler.

pub mod landing;
pub mod visit;

pub use landing::landing;
pub use visit::log_visit;
