use axum::{routing::any, Router};

use super::delete_user::delete_user;

/// Serverless-style function endpoints
///
/// # Routes
/// - `ANY /.netlify/functions/delete-user` - Privileged user deletion
pub fn function_routes() -> Router {
    Router::new().route("/.netlify/functions/delete-user", any(delete_user))
}
