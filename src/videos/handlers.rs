use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::models::{CreateVideoRequest, UpdateVideoRequest, Video};
use super::services::VideoService;
use crate::accounts::models::MessageResponse;
use crate::auth::AdminSession;
use crate::common::{ApiError, SharedState};

const CACHE_PREFIX: &str = "videos:";

#[derive(Debug, Default, Deserialize)]
pub struct VideoListQuery {
    pub category: Option<String>,
}

/// GET /api/videos?category=
pub async fn list_public_videos(
    Extension(state): Extension<SharedState>,
    Query(query): Query<VideoListQuery>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let app_state = state.read().await.clone();
    let service = VideoService::new(app_state.db.clone());
    let category = query.category.filter(|c| !c.trim().is_empty());
    let key = format!("{}public:{}", CACHE_PREFIX, category.as_deref().unwrap_or("*"));

    let videos = app_state
        .cache
        .get_or_load(&key, || service.list_active(category.as_deref()))
        .await?;
    Ok(Json(videos))
}

/// GET /api/admin/videos
pub async fn list_all_videos(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<Vec<Video>>, ApiError> {
    let app_state = state.read().await.clone();
    let videos = VideoService::new(app_state.db.clone()).list_all().await?;
    Ok(Json(videos))
}

/// POST /api/admin/videos
pub async fn create_video(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Json(request): Json<CreateVideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    let video = VideoService::new(app_state.db.clone())
        .create_video(request)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok((StatusCode::CREATED, Json(video)))
}

/// PUT /api/admin/videos/:id
pub async fn update_video(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(video_id): Path<String>,
    Json(request): Json<UpdateVideoRequest>,
) -> Result<Json<Video>, ApiError> {
    let app_state = state.read().await.clone();
    let video = VideoService::new(app_state.db.clone())
        .update_video(&video_id, request)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok(Json(video))
}

/// DELETE /api/admin/videos/:id
pub async fn delete_video(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(video_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let app_state = state.read().await.clone();
    VideoService::new(app_state.db.clone())
        .delete_video(&video_id)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok(Json(MessageResponse {
        success: true,
        message: "Video deleted successfully".to_string(),
    }))
}
