//! Complete removal of an identity and every record keyed by it

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::accounts::{profiles, requests, roles};
use crate::auth::services::{delete_identity, delete_sessions_for};
use crate::common::ApiError;

/// What a purge actually removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub user_id: String,
    pub role_removed: bool,
    pub request_removed: bool,
    pub profile_removed: bool,
    pub sessions_removed: u64,
    pub identity_removed: bool,
}

/// Deletes the role assignment, admin request, profile, sessions and the
/// identity in a single transaction. Either all of them go or none do.
/// Records that are already absent are skipped, so repeating a purge is safe.
pub async fn purge_identity(db: &SqlitePool, user_id: &str) -> Result<PurgeReport, ApiError> {
    let mut tx = db.begin().await?;

    let report = PurgeReport {
        user_id: user_id.to_string(),
        role_removed: roles::delete_role(&mut tx, user_id).await? > 0,
        request_removed: requests::delete_request(&mut tx, user_id).await? > 0,
        profile_removed: profiles::delete_profile(&mut tx, user_id).await? > 0,
        sessions_removed: delete_sessions_for(&mut tx, user_id).await?,
        identity_removed: delete_identity(&mut tx, user_id).await? > 0,
    };

    tx.commit().await.map_err(|e| {
        error!(error = %e, user_id = %user_id, "Failed to commit identity purge");
        ApiError::DatabaseError(e)
    })?;

    info!(
        user_id = %user_id,
        role_removed = report.role_removed,
        request_removed = report.request_removed,
        profile_removed = report.profile_removed,
        sessions_removed = report.sessions_removed,
        identity_removed = report.identity_removed,
        "Identity purged"
    );

    Ok(report)
}
