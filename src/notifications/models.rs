use serde::Serialize;

use crate::accounts::models::AdminRequest;

/// Change to the set of admin requests, as pushed to admin dashboards
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdminRequestEvent {
    /// Pending requests at the moment a subscriber connects
    Snapshot { pending: Vec<AdminRequest> },
    Created { request: AdminRequest },
    Approved { user_id: String, reviewed_by: String },
    /// Request gone because the requester was rejected or deleted
    Removed { user_id: String },
}
