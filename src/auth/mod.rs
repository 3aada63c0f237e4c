//! # Auth Module
//!
//! Identity provider for the site: email/password and Google identities,
//! server-side sessions and the bearer-token extractors that protect routes.

pub mod extractors;
pub mod google;
pub mod handlers;
pub mod models;
pub mod passwords;
pub mod routes;
pub mod services;
pub mod tokens;
pub mod validators;

#[cfg(test)]
pub mod test_support;

pub use extractors::{authenticate_token, AdminSession, Session};
pub use routes::auth_routes;
pub use services::AuthService;
