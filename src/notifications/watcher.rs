//! Polling watcher over pending admin requests
//!
//! Produces an endless stream of `Created` events for requests that become
//! pending after the watcher's cursor. Failed polls are retried with
//! exponential backoff; a stopped watcher can be restarted from the last
//! cursor it reported.

use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::hub::NotificationHub;
use super::models::AdminRequestEvent;
use crate::accounts::models::AdminRequest;
use crate::accounts::requests::{AdminRequestService, REQUESTS_CACHE_PREFIX};
use crate::common::{now_rfc3339, AppState};

const BATCH_SIZE: i64 = 50;
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Position in the `(created_at, user_id)` ordering of requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchCursor {
    pub created_at: String,
    pub user_id: String,
}

impl WatchCursor {
    /// Cursor that skips everything created before now
    pub fn now() -> Self {
        Self {
            created_at: now_rfc3339(),
            user_id: String::new(),
        }
    }

    fn after(request: &AdminRequest) -> Self {
        Self {
            created_at: request.created_at.clone(),
            user_id: request.user_id.clone(),
        }
    }
}

/// Delay before the next retry after a failed poll
pub fn next_backoff(previous: Option<Duration>) -> Duration {
    match previous {
        None => INITIAL_BACKOFF,
        Some(delay) => (delay * 2).min(MAX_BACKOFF),
    }
}

pub struct PendingRequestWatcher {
    requests: AdminRequestService,
    interval: Duration,
    cursor: WatchCursor,
}

struct WatchState {
    requests: AdminRequestService,
    interval: Duration,
    cursor: WatchCursor,
    buffered: VecDeque<AdminRequest>,
    backoff: Option<Duration>,
    polled: bool,
}

impl PendingRequestWatcher {
    pub fn new(requests: AdminRequestService, interval: Duration, cursor: WatchCursor) -> Self {
        Self {
            requests,
            interval,
            cursor,
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = AdminRequestEvent> + Send {
        let state = WatchState {
            requests: self.requests,
            interval: self.interval,
            cursor: self.cursor,
            buffered: VecDeque::new(),
            backoff: None,
            polled: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(request) = state.buffered.pop_front() {
                    return Some((AdminRequestEvent::Created { request }, state));
                }

                if state.polled {
                    sleep(state.backoff.unwrap_or(state.interval)).await;
                }
                state.polled = true;

                match state
                    .requests
                    .pending_after(&state.cursor.created_at, &state.cursor.user_id, BATCH_SIZE)
                    .await
                {
                    Ok(batch) => {
                        if state.backoff.take().is_some() {
                            info!("Pending request watcher recovered");
                        }
                        if let Some(last) = batch.last() {
                            state.cursor = WatchCursor::after(last);
                            debug!(count = batch.len(), "Pending request watcher found new requests");
                        }
                        state.buffered.extend(batch);
                    }
                    Err(e) => {
                        let delay = next_backoff(state.backoff);
                        warn!(error = %e, retry_in_ms = delay.as_millis() as u64, "Pending request poll failed");
                        state.backoff = Some(delay);
                    }
                }
            }
        })
    }
}

/// Runs the watcher for the life of the process, forwarding its events to
/// the notification hub and dropping cached request listings
pub fn spawn_request_watcher(state: &AppState) -> JoinHandle<()> {
    let watcher = PendingRequestWatcher::new(
        AdminRequestService::new(state.db.clone()),
        Duration::from_secs(state.config.request_watch_interval_secs.max(1)),
        WatchCursor::now(),
    );
    let hub: NotificationHub = state.notifications.clone();
    let cache = state.cache.clone();

    tokio::spawn(async move {
        let mut events = Box::pin(watcher.into_stream());
        while let Some(event) = events.next().await {
            cache.invalidate_prefix(REQUESTS_CACHE_PREFIX).await;
            hub.publish(event);
        }
    })
}
