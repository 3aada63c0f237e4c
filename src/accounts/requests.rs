//! Admin-request store: promotion requests keyed by identity

use sqlx::{SqliteConnection, SqlitePool};

use super::models::{AdminRequest, RequestStatus};
use crate::common::{now_rfc3339, ApiError};

const REQUEST_COLUMNS: &str =
    "user_id, email, display_name, status, reviewed_by, created_at, reviewed_at";

/// Cache key prefix for request listings and counts
pub const REQUESTS_CACHE_PREFIX: &str = "admin:requests";

#[derive(Clone)]
pub struct AdminRequestService {
    db: SqlitePool,
}

impl AdminRequestService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_request(&self, user_id: &str) -> Result<Option<AdminRequest>, ApiError> {
        let request = sqlx::query_as::<_, AdminRequest>(&format!(
            "SELECT {} FROM admin_requests WHERE user_id = ?",
            REQUEST_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(request)
    }

    /// Newest first, optionally filtered by status
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<AdminRequest>, ApiError> {
        let requests = match status {
            Some(status) => {
                sqlx::query_as::<_, AdminRequest>(&format!(
                    "SELECT {} FROM admin_requests WHERE status = ? ORDER BY created_at DESC",
                    REQUEST_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, AdminRequest>(&format!(
                    "SELECT {} FROM admin_requests ORDER BY created_at DESC",
                    REQUEST_COLUMNS
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(requests)
    }

    pub async fn pending_count(&self) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM admin_requests WHERE status = 'pending'",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Pending requests strictly after the `(created_at, user_id)` cursor, oldest first
    pub async fn pending_after(
        &self,
        created_at: &str,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<AdminRequest>, sqlx::Error> {
        sqlx::query_as::<_, AdminRequest>(&format!(
            r#"
            SELECT {} FROM admin_requests
            WHERE status = 'pending'
              AND (created_at > ? OR (created_at = ? AND user_id > ?))
            ORDER BY created_at ASC, user_id ASC
            LIMIT ?
            "#,
            REQUEST_COLUMNS
        ))
        .bind(created_at)
        .bind(created_at)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await
    }
}

/// Creates a pending request unless the identity already has one.
/// Returns whether a row was written.
pub(crate) async fn insert_pending_if_absent(
    conn: &mut SqliteConnection,
    user_id: &str,
    email: &str,
    display_name: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_requests (user_id, email, display_name, status, created_at)
        VALUES (?, ?, ?, 'pending', ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(display_name)
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Marks a pending request approved. Returns false when no pending row matched.
pub(crate) async fn mark_approved(
    conn: &mut SqliteConnection,
    user_id: &str,
    reviewer_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE admin_requests
        SET status = 'approved', reviewed_by = ?, reviewed_at = ?
        WHERE user_id = ? AND status = 'pending'
        "#,
    )
    .bind(reviewer_id)
    .bind(now_rfc3339())
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn delete_request(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM admin_requests WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
