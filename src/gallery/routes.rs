use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use super::compression::MAX_UPLOAD_BYTES;
use super::handlers;

/// Photos accepted in one upload request
const MAX_IMAGES_PER_UPLOAD: usize = 10;

/// Creates the gallery router
///
/// # Routes
/// - `GET /api/gallery` - Active albums by display order
/// - `GET /api/gallery/:id` - Active album with its images
/// - `GET /uploads/gallery/:filename` - Stored photo
/// - `GET/POST /api/admin/gallery/albums` - All albums / create
/// - `GET/PUT/DELETE /api/admin/gallery/albums/:id` - Detail / update / cascade delete
/// - `POST /api/admin/gallery/albums/:id/images` - Multipart upload
/// - `PUT/DELETE /api/admin/gallery/images/:id` - Caption and order / delete
pub fn gallery_routes() -> Router {
    Router::new()
        .route("/api/gallery", get(handlers::list_public_albums))
        .route("/api/gallery/:id", get(handlers::get_public_album))
        .route("/uploads/gallery/:filename", get(handlers::serve_gallery_image))
        .route(
            "/api/admin/gallery/albums",
            get(handlers::list_all_albums).post(handlers::create_album),
        )
        .route(
            "/api/admin/gallery/albums/:id",
            get(handlers::get_album)
                .put(handlers::update_album)
                .delete(handlers::delete_album),
        )
        .route(
            "/api/admin/gallery/albums/:id/images",
            post(handlers::upload_images)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * MAX_IMAGES_PER_UPLOAD)),
        )
        .route(
            "/api/admin/gallery/images/:id",
            put(handlers::update_image).delete(handlers::delete_image),
        )
}
