use axum::{routing::get, Router};

use super::handlers;

/// Creates the notifications router
///
/// # Routes
/// - `GET /ws/admin/requests?token=` - Live admin request feed (WebSocket)
pub fn notification_routes() -> Router {
    Router::new().route("/ws/admin/requests", get(handlers::admin_requests_feed))
}
