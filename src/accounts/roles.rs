//! Role store: one assignment per identity, keyed by the identity id

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info};

use super::models::{Role, RoleAssignment, SYSTEM_ACTOR};
use crate::common::{now_rfc3339, ApiError};

#[derive(Clone)]
pub struct RoleService {
    db: SqlitePool,
}

impl RoleService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_assignment(&self, user_id: &str) -> Result<Option<RoleAssignment>, ApiError> {
        sqlx::query_as::<_, RoleAssignment>(
            "SELECT user_id, role, assigned_by, assigned_at FROM user_roles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "Database error loading role assignment");
            ApiError::DatabaseError(e)
        })
    }

    /// Role as seen by authorization checks; no assignment means `User`
    pub async fn effective_role(&self, user_id: &str) -> Result<Role, ApiError> {
        Ok(self
            .get_assignment(user_id)
            .await?
            .map(|a| a.role)
            .unwrap_or(Role::User))
    }

    pub async fn list_admins(&self) -> Result<Vec<RoleAssignment>, ApiError> {
        let admins = sqlx::query_as::<_, RoleAssignment>(
            r#"
            SELECT user_id, role, assigned_by, assigned_at
            FROM user_roles
            WHERE role IN ('admin', 'super_admin')
            ORDER BY assigned_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(admins)
    }

    /// Sets `target`'s role on behalf of a super admin.
    /// `Role::User` removes the assignment instead of storing it.
    pub async fn set_role(
        &self,
        actor_id: &str,
        target_id: &str,
        role: Role,
    ) -> Result<Option<RoleAssignment>, ApiError> {
        if actor_id == target_id {
            return Err(ApiError::BadRequest(
                "You cannot change your own role".to_string(),
            ));
        }

        let actor_role = self.effective_role(actor_id).await?;
        if actor_role != Role::SuperAdmin {
            return Err(ApiError::Forbidden(
                "Super admin privileges required".to_string(),
            ));
        }

        let mut conn = self.db.acquire().await?;
        if !super::profiles::profile_exists(&mut conn, target_id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        if role == Role::User {
            delete_role(&mut conn, target_id).await?;
            info!(actor_id = %actor_id, target_id = %target_id, "Role assignment removed");
            return Ok(None);
        }

        let assignment = upsert_role(&mut conn, target_id, role, actor_id).await?;
        info!(
            actor_id = %actor_id,
            target_id = %target_id,
            role = %role,
            "Role assigned"
        );
        Ok(Some(assignment))
    }
}

/// Grants super_admin to `user_id` only if no admin of any level exists yet.
///
/// Check and write are one statement, so two concurrent first sign-ups
/// cannot both be promoted.
pub(crate) async fn promote_if_first_admin(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role, assigned_by, assigned_at)
        SELECT ?, 'super_admin', ?, ?
        WHERE NOT EXISTS (
            SELECT 1 FROM user_roles WHERE role IN ('admin', 'super_admin')
        )
        "#,
    )
    .bind(user_id)
    .bind(SYSTEM_ACTOR)
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn upsert_role(
    conn: &mut SqliteConnection,
    user_id: &str,
    role: Role,
    assigned_by: &str,
) -> Result<RoleAssignment, sqlx::Error> {
    let assignment = RoleAssignment {
        user_id: user_id.to_string(),
        role,
        assigned_by: assigned_by.to_string(),
        assigned_at: now_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role, assigned_by, assigned_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            role = excluded.role,
            assigned_by = excluded.assigned_by,
            assigned_at = excluded.assigned_at
        "#,
    )
    .bind(&assignment.user_id)
    .bind(assignment.role.as_str())
    .bind(&assignment.assigned_by)
    .bind(&assignment.assigned_at)
    .execute(&mut *conn)
    .await?;

    Ok(assignment)
}

pub(crate) async fn delete_role(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
