use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

/// Creates the videos router
///
/// # Routes
/// - `GET /api/videos?category=` - Active videos by display order
/// - `GET/POST /api/admin/videos` - All videos / create
/// - `PUT/DELETE /api/admin/videos/:id` - Update / delete
pub fn video_routes() -> Router {
    Router::new()
        .route("/api/videos", get(handlers::list_public_videos))
        .route(
            "/api/admin/videos",
            get(handlers::list_all_videos).post(handlers::create_video),
        )
        .route(
            "/api/admin/videos/:id",
            put(handlers::update_video).delete(handlers::delete_video),
        )
}
