//! Review of pending admin requests

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{AdminRequest, RequestStatus, Role};
use super::requests::{self, AdminRequestService};
use super::roles::{self, RoleService};
use crate::common::ApiError;
use crate::functions::purge::{purge_identity, PurgeReport};

#[derive(Clone)]
pub struct ApprovalService {
    db: SqlitePool,
}

impl ApprovalService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Guards shared by approve and reject: the reviewer must currently be an
    /// admin, must not review themselves, and the request must be pending.
    async fn pending_request_for_review(
        &self,
        reviewer_id: &str,
        target_id: &str,
    ) -> Result<AdminRequest, ApiError> {
        if reviewer_id == target_id {
            warn!(user_id = %reviewer_id, "Admin attempted to review their own request");
            return Err(ApiError::BadRequest(
                "You cannot approve, reject or delete your own account".to_string(),
            ));
        }

        let reviewer_role = RoleService::new(self.db.clone())
            .effective_role(reviewer_id)
            .await?;
        if !reviewer_role.is_admin() {
            return Err(ApiError::Forbidden("Admin privileges required".to_string()));
        }

        let request = AdminRequestService::new(self.db.clone())
            .get_request(target_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Admin request not found".to_string()))?;

        if request.status != RequestStatus::Pending {
            return Err(ApiError::Conflict(format!(
                "Admin request is already {}",
                request.status.as_str()
            )));
        }

        Ok(request)
    }

    /// Grants `admin` to the requester and closes the request as approved
    pub async fn approve(&self, reviewer_id: &str, target_id: &str) -> Result<AdminRequest, ApiError> {
        self.pending_request_for_review(reviewer_id, target_id).await?;

        let mut tx = self.db.begin().await?;
        roles::upsert_role(&mut tx, target_id, Role::Admin, reviewer_id).await?;
        if !requests::mark_approved(&mut tx, target_id, reviewer_id).await? {
            // Reviewed concurrently; the transaction rolls back on drop
            return Err(ApiError::Conflict(
                "Admin request was already reviewed".to_string(),
            ));
        }
        tx.commit().await?;

        info!(reviewer_id = %reviewer_id, target_id = %target_id, "Admin request approved");

        AdminRequestService::new(self.db.clone())
            .get_request(target_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Admin request not found".to_string()))
    }

    /// Rejection removes the requester entirely: profile, role, request,
    /// sessions and the identity itself
    pub async fn reject(&self, reviewer_id: &str, target_id: &str) -> Result<PurgeReport, ApiError> {
        self.pending_request_for_review(reviewer_id, target_id).await?;

        let report = purge_identity(&self.db, target_id).await?;
        info!(reviewer_id = %reviewer_id, target_id = %target_id, "Admin request rejected");
        Ok(report)
    }
}
