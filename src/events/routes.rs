use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

/// Creates the events router
///
/// # Routes
/// - `GET /api/events?upcoming=` - Active events, soonest first
/// - `GET /api/events/:id` - One active event
/// - `GET/POST /api/admin/events` - All events, latest first / create
/// - `PUT/DELETE /api/admin/events/:id` - Update / delete
pub fn event_routes() -> Router {
    Router::new()
        .route("/api/events", get(handlers::list_public_events))
        .route("/api/events/:id", get(handlers::get_public_event))
        .route(
            "/api/admin/events",
            get(handlers::list_all_events).post(handlers::create_event),
        )
        .route(
            "/api/admin/events/:id",
            put(handlers::update_event).delete(handlers::delete_event),
        )
}
