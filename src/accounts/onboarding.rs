//! Onboarding of newly authenticated identities
//!
//! The first identity of a fresh deployment becomes super admin; everyone
//! after that gets a pending admin request and stays a regular user until
//! an admin approves it.

use sqlx::SqlitePool;
use tracing::{error, info};

use super::models::{NewMember, OnboardingOutcome};
use super::{profiles, requests, roles};
use crate::common::{safe_email_log, ApiError};

#[derive(Clone)]
pub struct OnboardingService {
    db: SqlitePool,
}

impl OnboardingService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Writes the profile and either the super admin assignment or a pending
    /// request, all in one transaction. Identities that already have a
    /// profile are left untouched, and an existing request is never duplicated.
    pub async fn onboard(&self, member: &NewMember) -> Result<OnboardingOutcome, ApiError> {
        let mut tx = self.db.begin().await?;

        // The first statement must be a write: a deferred transaction that
        // reads first cannot wait for the write lock and fails as busy.
        if !profiles::insert_profile_if_absent(&mut tx, member).await? {
            return Ok(OnboardingOutcome::AlreadyOnboarded);
        }

        let outcome = if roles::promote_if_first_admin(&mut tx, &member.user_id).await? {
            OnboardingOutcome::PromotedToSuperAdmin
        } else {
            requests::insert_pending_if_absent(
                &mut tx,
                &member.user_id,
                &member.email,
                member.display_name.as_deref(),
            )
            .await?;
            OnboardingOutcome::PendingApproval
        };

        tx.commit().await.map_err(|e| {
            error!(error = %e, user_id = %member.user_id, "Failed to commit onboarding");
            ApiError::DatabaseError(e)
        })?;

        info!(
            user_id = %member.user_id,
            email = %safe_email_log(&member.email),
            outcome = ?outcome,
            "Identity onboarded"
        );

        Ok(outcome)
    }
}
