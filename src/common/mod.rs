// Common module - shared types and utilities across all modules

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use cache::QueryCache;
pub use config::Config;
pub use error::ApiError;
pub use helpers::{
    clean_optional, default_true, normalize_email, now_rfc3339, safe_email_log, safe_token_log,
};
pub use id_generator::{generate_id, generate_raw_id, EntityPrefix};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};

/// Handle to the shared state as injected into every handler
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<AppState>>;
