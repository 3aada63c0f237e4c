use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::models::{CreateEventRequest, Event, EventListQuery, UpdateEventRequest};
use super::services::{today, EventService};
use crate::accounts::models::MessageResponse;
use crate::auth::AdminSession;
use crate::common::{ApiError, SharedState};

const CACHE_PREFIX: &str = "events:";

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /api/events?upcoming=true
pub async fn list_public_events(
    Extension(state): Extension<SharedState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let app_state = state.read().await.clone();
    let service = EventService::new(app_state.db.clone());

    let from_date = query.upcoming.then(today);
    let key = format!(
        "{}public:{}",
        CACHE_PREFIX,
        from_date.as_deref().unwrap_or("all")
    );

    let events = app_state
        .cache
        .get_or_load(&key, || service.list_active(from_date.as_deref()))
        .await?;

    Ok(Json(events))
}

/// GET /api/events/:id - inactive events are hidden
pub async fn get_public_event(
    Extension(state): Extension<SharedState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let app_state = state.read().await.clone();
    let event = EventService::new(app_state.db.clone())
        .get_event(&event_id)
        .await?;

    if !event.is_active {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }
    Ok(Json(event))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// GET /api/admin/events
pub async fn list_all_events(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<Vec<Event>>, ApiError> {
    let app_state = state.read().await.clone();
    let events = EventService::new(app_state.db.clone()).list_all().await?;
    Ok(Json(events))
}

/// POST /api/admin/events
pub async fn create_event(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Json(request): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    let event = EventService::new(app_state.db.clone())
        .create_event(request)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/admin/events/:id
pub async fn update_event(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(event_id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let app_state = state.read().await.clone();
    let event = EventService::new(app_state.db.clone())
        .update_event(&event_id, request)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok(Json(event))
}

/// DELETE /api/admin/events/:id
pub async fn delete_event(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(event_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let app_state = state.read().await.clone();
    EventService::new(app_state.db.clone())
        .delete_event(&event_id)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok(Json(MessageResponse {
        success: true,
        message: "Event deleted successfully".to_string(),
    }))
}
