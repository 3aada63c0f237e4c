//! Privileged user deletion endpoint
//!
//! Callable by any signed-in admin. Removes the target identity from the
//! identity provider together with all of its account records.

use axum::{
    body::Bytes,
    extract::Extension,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::purge::purge_identity;
use crate::accounts::models::MessageResponse;
use crate::accounts::requests::REQUESTS_CACHE_PREFIX;
use crate::auth::authenticate_token;
use crate::auth::tokens::bearer_token;
use crate::common::{ApiError, AppState, SharedState};
use crate::notifications::AdminRequestEvent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteUserPayload {
    user_id: Option<String>,
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response
}

/// ANY /.netlify/functions/delete-user
///
/// # Request Body
/// ```json
/// { "userId": "U-ABCDEFGH" }
/// ```
pub async fn delete_user(
    Extension(state_lock): Extension<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return with_cors(StatusCode::OK.into_response());
    }

    let state = state_lock.read().await.clone();
    let response = match handle_delete(&state, &method, &headers, &body).await {
        Ok(message) => (
            StatusCode::OK,
            Json(MessageResponse {
                success: true,
                message,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    };

    with_cors(response)
}

async fn handle_delete(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<String, ApiError> {
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed("Method not allowed".to_string()));
    }

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::Unauthorized("Missing or malformed authorization header".to_string()))?;

    let caller = authenticate_token(state, token).await.map_err(|e| match e {
        ApiError::Unauthorized(_) => ApiError::Unauthorized("Invalid token".to_string()),
        other => other,
    })?;

    if !caller.is_admin() {
        warn!(user_id = %caller.user_id, "Non-admin attempted to delete a user");
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }

    let payload: DeleteUserPayload = if body.is_empty() {
        DeleteUserPayload { user_id: None }
    } else {
        serde_json::from_slice(body)
            .map_err(|_| ApiError::BadRequest("Request body must be JSON".to_string()))?
    };

    let target_id = payload
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;

    if target_id == caller.user_id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    // Unauthenticated callers get 401 even when the service account is missing
    let service_account = state.config.service_account.as_ref().ok_or_else(|| {
        ApiError::InternalServer("Service account credentials are not configured".to_string())
    })?;

    let report = purge_identity(&state.db, &target_id).await?;

    if report.request_removed {
        state.cache.invalidate_prefix(REQUESTS_CACHE_PREFIX).await;
        state.notifications.publish(AdminRequestEvent::Removed {
            user_id: target_id.clone(),
        });
    }

    info!(
        actor = %caller.user_id,
        service_account = %service_account.client_email,
        target_id = %target_id,
        "User deleted"
    );

    Ok("User deleted successfully".to_string())
}
