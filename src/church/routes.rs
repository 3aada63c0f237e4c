use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

/// Creates the church info and service times router
///
/// # Routes
/// - `GET /api/church-info` - Church details
/// - `PUT /api/admin/church-info` - Update (creates on first write)
/// - `GET /api/service-times` - Active service times
/// - `GET/POST /api/admin/service-times` - All / create
/// - `PUT/DELETE /api/admin/service-times/:id` - Update / delete
pub fn church_routes() -> Router {
    Router::new()
        .route("/api/church-info", get(handlers::get_church_info))
        .route("/api/admin/church-info", put(handlers::update_church_info))
        .route("/api/service-times", get(handlers::list_public_service_times))
        .route(
            "/api/admin/service-times",
            get(handlers::list_all_service_times).post(handlers::create_service_time),
        )
        .route(
            "/api/admin/service-times/:id",
            put(handlers::update_service_time).delete(handlers::delete_service_time),
        )
}
