// handlers/elevated/mod.rs - Elevated handlers (admin users only)
//
// `/admin/*` operations. Each handler checks the admin flag itself so that
// a non-admin caller gets 403 while a bad credential gets 401.

pub mod admin;

pub use admin::*;
