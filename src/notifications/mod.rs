//! # Notifications Module
//!
//! Pushes admin request changes to admin dashboards: a polling watcher
//! feeds newly pending requests into a broadcast hub, and review actions
//! publish their outcome to the same hub.

pub mod handlers;
pub mod hub;
pub mod models;
pub mod routes;
pub mod watcher;

#[cfg(test)]
mod tests;

pub use hub::NotificationHub;
pub use models::AdminRequestEvent;
pub use routes::notification_routes;
pub use watcher::{spawn_request_watcher, PendingRequestWatcher, WatchCursor};
