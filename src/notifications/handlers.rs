//! Live admin request feed over WebSocket

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, WebSocketUpgrade,
    },
    response::IntoResponse,
    Extension,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::models::AdminRequestEvent;
use crate::accounts::models::RequestStatus;
use crate::accounts::requests::AdminRequestService;
use crate::auth::{authenticate_token, Session};
use crate::common::{ApiError, AppState, SharedState};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub token: Option<String>,
}

/// GET /ws/admin/requests?token=<jwt>
///
/// Browsers cannot set headers on WebSocket upgrades, so the session token
/// travels in the query string.
pub async fn admin_requests_feed(
    ws: WebSocketUpgrade,
    Extension(state_lock): Extension<SharedState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let token = query
        .token
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication token".to_string()))?;

    let state = state_lock.read().await.clone();
    let session = authenticate_token(&state, &token).await?;
    if !session.is_admin() {
        warn!(user_id = %session.user_id, "Non-admin attempted to open the admin request feed");
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    info!(user_id = %session.user_id, "Admin request feed authenticated");
    Ok(ws.on_upgrade(move |socket| handle_feed(socket, session, state)))
}

async fn snapshot(state: &AppState) -> Option<AdminRequestEvent> {
    AdminRequestService::new(state.db.clone())
        .list_requests(Some(RequestStatus::Pending))
        .await
        .map(|pending| AdminRequestEvent::Snapshot { pending })
        .map_err(|e| warn!(error = %e, "Failed to load pending requests for feed"))
        .ok()
}

async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &AdminRequestEvent,
) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(_) => true,
    }
}

async fn handle_feed(socket: WebSocket, session: Session, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before the snapshot so nothing falls between them
    let mut events = state.notifications.subscribe();

    if let Some(event) = snapshot(&state).await {
        if !send_event(&mut sender, &event).await {
            return;
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if !send_event(&mut sender, &event).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Admin request feed lagged, resending snapshot");
                    if let Some(event) = snapshot(&state).await {
                        if !send_event(&mut sender, &event).await {
                            break;
                        }
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!(user_id = %session.user_id, "Admin request feed closed");
}
