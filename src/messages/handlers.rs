use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::models::{ContactMessage, InboxQuery, MarkReadRequest, SubmitMessageRequest, UnreadCountResponse};
use super::services::ContactMessageService;
use crate::accounts::models::MessageResponse;
use crate::auth::AdminSession;
use crate::common::{ApiError, SharedState};

/// POST /api/contact - public contact form
pub async fn submit_message(
    Extension(state): Extension<SharedState>,
    Json(request): Json<SubmitMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    ContactMessageService::new(app_state.db.clone())
        .submit(request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            success: true,
            message: "Thank you! Your message has been sent.".to_string(),
        }),
    ))
}

/// GET /api/admin/messages?unread=true
pub async fn list_messages(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    let app_state = state.read().await.clone();
    let messages = ContactMessageService::new(app_state.db.clone())
        .list(query.unread)
        .await?;
    Ok(Json(messages))
}

/// GET /api/admin/messages/unread/count
pub async fn unread_count(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let app_state = state.read().await.clone();
    let count = ContactMessageService::new(app_state.db.clone())
        .unread_count()
        .await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// PUT /api/admin/messages/:id/read
pub async fn mark_read(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(message_id): Path<String>,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<ContactMessage>, ApiError> {
    let app_state = state.read().await.clone();
    let message = ContactMessageService::new(app_state.db.clone())
        .set_read(&message_id, request.is_read)
        .await?;
    Ok(Json(message))
}

/// DELETE /api/admin/messages/:id
pub async fn delete_message(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(message_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let app_state = state.read().await.clone();
    ContactMessageService::new(app_state.db.clone())
        .delete(&message_id)
        .await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Message deleted successfully".to_string(),
    }))
}
