//! # Accounts Module
//!
//! Profiles, role assignments and the admin request workflow: onboarding
//! of new identities, first-admin promotion, and review of pending requests.

pub mod approvals;
pub mod handlers;
pub mod models;
pub mod onboarding;
pub mod profiles;
pub mod requests;
pub mod roles;
pub mod routes;
pub mod validators;


pub use routes::account_routes;
