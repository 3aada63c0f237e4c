//! # Functions Module
//!
//! Privileged operations that run with the backend's service account.

pub mod delete_user;
pub mod purge;
pub mod routes;


pub use purge::{purge_identity, PurgeReport};
pub use routes::function_routes;
