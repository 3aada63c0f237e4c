//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/signup` - Email/password sign-up
/// - `POST /api/auth/signin` - Email/password sign-in
/// - `POST /api/auth/google` - Sign in with a Google ID token
/// - `GET /auth/google` - Start the Google redirect flow
/// - `GET /auth/google/callback` - Finish the Google redirect flow
/// - `POST /api/auth/logout` - End the current session
/// - `GET /api/me` - Current user, role and request status
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/signup", post(handlers::sign_up))
        .route("/api/auth/signin", post(handlers::sign_in))
        .route("/api/auth/google", post(handlers::google_sign_in))
        .route("/auth/google", get(handlers::google_redirect_start))
        .route("/auth/google/callback", get(handlers::google_redirect_callback))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/me", get(handlers::me))
}
