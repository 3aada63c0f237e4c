//! Account handlers: own profile, admin request review and user management

use axum::extract::{Extension, Json, Path, Query};
use serde::Serialize;
use tracing::info;

use super::approvals::ApprovalService;
use super::models::{
    AdminRequest, ManagedUser, Profile, RequestListQuery, Role, RoleAssignment, SetRoleRequest,
    UpdateProfileRequest,
};
use super::profiles::ProfileService;
use super::requests::{AdminRequestService, REQUESTS_CACHE_PREFIX};
use super::roles::RoleService;
use crate::auth::{AdminSession, Session};
use crate::common::{ApiError, SharedState};
use crate::functions::PurgeReport;
use crate::notifications::AdminRequestEvent;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct RejectResponse {
    pub success: bool,
    pub message: String,
    pub removed: PurgeReport,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub user_id: String,
    pub role: Role,
}

// ============================================================================
// Own profile
// ============================================================================

/// GET /api/profile
pub async fn get_own_profile(
    Extension(state_lock): Extension<SharedState>,
    session: Session,
) -> Result<Json<Profile>, ApiError> {
    let state = state_lock.read().await.clone();
    let profile = ProfileService::new(state.db.clone())
        .require_profile(&session.user_id)
        .await?;
    Ok(Json(profile))
}

/// PUT /api/profile
pub async fn update_own_profile(
    Extension(state_lock): Extension<SharedState>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let state = state_lock.read().await.clone();
    let profile = ProfileService::new(state.db.clone())
        .update_profile(&session.user_id, payload)
        .await?;
    Ok(Json(profile))
}

// ============================================================================
// Admin requests
// ============================================================================

/// GET /api/admin/requests?status=pending
pub async fn list_requests(
    Extension(state_lock): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Vec<AdminRequest>>, ApiError> {
    let state = state_lock.read().await.clone();
    let key = format!(
        "{}:list:{}",
        REQUESTS_CACHE_PREFIX,
        query.status.map(|s| s.as_str()).unwrap_or("all")
    );
    let service = AdminRequestService::new(state.db.clone());
    let requests = state
        .cache
        .get_or_load(&key, || service.list_requests(query.status))
        .await?;
    Ok(Json(requests))
}

/// GET /api/admin/requests/pending/count
pub async fn pending_count(
    Extension(state_lock): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<CountResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let key = format!("{}:pending_count", REQUESTS_CACHE_PREFIX);
    let service = AdminRequestService::new(state.db.clone());
    let count = state
        .cache
        .get_or_load(&key, || service.pending_count())
        .await?;
    Ok(Json(CountResponse { count }))
}

/// POST /api/admin/requests/:id/approve
pub async fn approve_request(
    Extension(state_lock): Extension<SharedState>,
    AdminSession(admin): AdminSession,
    Path(user_id): Path<String>,
) -> Result<Json<AdminRequest>, ApiError> {
    let state = state_lock.read().await.clone();
    let request = ApprovalService::new(state.db.clone())
        .approve(&admin.user_id, &user_id)
        .await?;

    state.cache.invalidate_prefix(REQUESTS_CACHE_PREFIX).await;
    state.notifications.publish(AdminRequestEvent::Approved {
        user_id: user_id.clone(),
        reviewed_by: admin.user_id.clone(),
    });

    Ok(Json(request))
}

/// POST /api/admin/requests/:id/reject
///
/// Rejection deletes the requester's account.
pub async fn reject_request(
    Extension(state_lock): Extension<SharedState>,
    AdminSession(admin): AdminSession,
    Path(user_id): Path<String>,
) -> Result<Json<RejectResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let removed = ApprovalService::new(state.db.clone())
        .reject(&admin.user_id, &user_id)
        .await?;

    state.cache.invalidate_prefix(REQUESTS_CACHE_PREFIX).await;
    state.notifications.publish(AdminRequestEvent::Removed {
        user_id: user_id.clone(),
    });

    Ok(Json(RejectResponse {
        success: true,
        message: "Request rejected and account removed".to_string(),
        removed,
    }))
}

// ============================================================================
// User management
// ============================================================================

/// GET /api/admin/users
pub async fn list_users(
    Extension(state_lock): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<Vec<ManagedUser>>, ApiError> {
    let state = state_lock.read().await.clone();
    let users = ProfileService::new(state.db.clone()).list_users().await?;
    Ok(Json(users))
}

/// PUT /api/admin/users/:id
pub async fn update_user(
    Extension(state_lock): Extension<SharedState>,
    AdminSession(admin): AdminSession,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let state = state_lock.read().await.clone();
    let profile = ProfileService::new(state.db.clone())
        .update_profile(&user_id, payload)
        .await?;
    info!(admin_id = %admin.user_id, user_id = %user_id, "Admin updated user profile");
    Ok(Json(profile))
}

/// PUT /api/admin/users/:id/role
pub async fn set_user_role(
    Extension(state_lock): Extension<SharedState>,
    session: Session,
    Path(user_id): Path<String>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<RoleResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let assignment = RoleService::new(state.db.clone())
        .set_role(&session.user_id, &user_id, payload.role)
        .await?;

    Ok(Json(RoleResponse {
        user_id,
        role: assignment.map(|a| a.role).unwrap_or(payload.role),
    }))
}

/// GET /api/admin/admins
pub async fn list_admins(
    Extension(state_lock): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<Vec<RoleAssignment>>, ApiError> {
    let state = state_lock.read().await.clone();
    let admins = RoleService::new(state.db.clone()).list_admins().await?;
    Ok(Json(admins))
}
