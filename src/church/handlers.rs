use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::models::{
    ChurchInfo, CreateServiceTimeRequest, ServiceTime, UpdateChurchInfoRequest,
    UpdateServiceTimeRequest,
};
use super::services::{ChurchInfoService, ServiceTimeService};
use crate::accounts::models::MessageResponse;
use crate::auth::AdminSession;
use crate::common::{ApiError, SharedState};

const INFO_CACHE_KEY: &str = "church:info";
const SERVICE_TIMES_CACHE_PREFIX: &str = "service_times:";

// ============================================================================
// Church info
// ============================================================================

/// GET /api/church-info - `null` until an admin fills it in
pub async fn get_church_info(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Option<ChurchInfo>>, ApiError> {
    let app_state = state.read().await.clone();
    let service = ChurchInfoService::new(app_state.db.clone());
    let info = app_state
        .cache
        .get_or_load(INFO_CACHE_KEY, || service.get_info())
        .await?;
    Ok(Json(info))
}

/// PUT /api/admin/church-info
pub async fn update_church_info(
    Extension(state): Extension<SharedState>,
    AdminSession(admin): AdminSession,
    Json(request): Json<UpdateChurchInfoRequest>,
) -> Result<Json<ChurchInfo>, ApiError> {
    let app_state = state.read().await.clone();
    let info = ChurchInfoService::new(app_state.db.clone())
        .update_info(&admin.user_id, request)
        .await?;

    app_state.cache.invalidate_prefix(INFO_CACHE_KEY).await;
    Ok(Json(info))
}

// ============================================================================
// Service times
// ============================================================================

/// GET /api/service-times
pub async fn list_public_service_times(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Vec<ServiceTime>>, ApiError> {
    let app_state = state.read().await.clone();
    let service = ServiceTimeService::new(app_state.db.clone());
    let key = format!("{}public", SERVICE_TIMES_CACHE_PREFIX);
    let times = app_state
        .cache
        .get_or_load(&key, || service.list_active())
        .await?;
    Ok(Json(times))
}

/// GET /api/admin/service-times
pub async fn list_all_service_times(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<Vec<ServiceTime>>, ApiError> {
    let app_state = state.read().await.clone();
    let times = ServiceTimeService::new(app_state.db.clone()).list_all().await?;
    Ok(Json(times))
}

/// POST /api/admin/service-times
pub async fn create_service_time(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Json(request): Json<CreateServiceTimeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    let time = ServiceTimeService::new(app_state.db.clone())
        .create_service_time(request)
        .await?;

    app_state.cache.invalidate_prefix(SERVICE_TIMES_CACHE_PREFIX).await;
    Ok((StatusCode::CREATED, Json(time)))
}

/// PUT /api/admin/service-times/:id
pub async fn update_service_time(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
    Json(request): Json<UpdateServiceTimeRequest>,
) -> Result<Json<ServiceTime>, ApiError> {
    let app_state = state.read().await.clone();
    let time = ServiceTimeService::new(app_state.db.clone())
        .update_service_time(&id, request)
        .await?;

    app_state.cache.invalidate_prefix(SERVICE_TIMES_CACHE_PREFIX).await;
    Ok(Json(time))
}

/// DELETE /api/admin/service-times/:id
pub async fn delete_service_time(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let app_state = state.read().await.clone();
    ServiceTimeService::new(app_state.db.clone())
        .delete_service_time(&id)
        .await?;

    app_state.cache.invalidate_prefix(SERVICE_TIMES_CACHE_PREFIX).await;
    Ok(Json(MessageResponse {
        success: true,
        message: "Service time deleted successfully".to_string(),
    }))
}
