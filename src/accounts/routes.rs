//! Account routes

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

/// Creates the accounts router
///
/// # Routes
/// - `GET/PUT /api/profile` - Own profile
/// - `GET /api/admin/requests?status=` - Admin requests, newest first
/// - `GET /api/admin/requests/pending/count` - Pending request count
/// - `POST /api/admin/requests/:id/approve` - Grant admin
/// - `POST /api/admin/requests/:id/reject` - Reject and remove the account
/// - `GET /api/admin/users` - Profiles with roles
/// - `PUT /api/admin/users/:id` - Patch a profile
/// - `PUT /api/admin/users/:id/role` - Set a role (super admin only)
/// - `GET /api/admin/admins` - Current role assignments
pub fn account_routes() -> Router {
    Router::new()
        .route(
            "/api/profile",
            get(handlers::get_own_profile).put(handlers::update_own_profile),
        )
        .route("/api/admin/requests", get(handlers::list_requests))
        .route("/api/admin/requests/pending/count", get(handlers::pending_count))
        .route("/api/admin/requests/:id/approve", post(handlers::approve_request))
        .route("/api/admin/requests/:id/reject", post(handlers::reject_request))
        .route("/api/admin/users", get(handlers::list_users))
        .route("/api/admin/users/:id", put(handlers::update_user))
        .route("/api/admin/users/:id/role", put(handlers::set_user_role))
        .route("/api/admin/admins", get(handlers::list_admins))
}
