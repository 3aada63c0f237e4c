use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;

/// Creates the contact inbox router
///
/// # Routes
/// - `POST /api/contact` - Submit the contact form
/// - `GET /api/admin/messages?unread=` - Inbox, newest first
/// - `GET /api/admin/messages/unread/count` - Unread count
/// - `PUT /api/admin/messages/:id/read` - Mark read or unread
/// - `DELETE /api/admin/messages/:id` - Delete
pub fn message_routes() -> Router {
    Router::new()
        .route("/api/contact", post(handlers::submit_message))
        .route("/api/admin/messages", get(handlers::list_messages))
        .route("/api/admin/messages/unread/count", get(handlers::unread_count))
        .route("/api/admin/messages/:id/read", put(handlers::mark_read))
        .route("/api/admin/messages/:id", delete(handlers::delete_message))
}
