//! Profile store: one profile document per identity

use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::info;

use super::models::{ManagedUser, NewMember, Profile, Role, RoleAssignment, UpdateProfileRequest};
use super::validators::ProfileValidator;
use crate::common::{clean_optional, now_rfc3339, ApiError, Validator};

const PROFILE_COLUMNS: &str = "id, email, display_name, photo_url, created_at, updated_at";

#[derive(Clone)]
pub struct ProfileService {
    db: SqlitePool,
}

impl ProfileService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, ApiError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    pub async fn require_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        self.get_profile(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User profile not found".to_string()))
    }

    /// Every profile with its effective role, newest first
    pub async fn list_users(&self) -> Result<Vec<ManagedUser>, ApiError> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let roles: HashMap<String, Role> = sqlx::query_as::<_, RoleAssignment>(
            "SELECT user_id, role, assigned_by, assigned_at FROM user_roles",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|a| (a.user_id, a.role))
        .collect();

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let role = roles.get(&profile.id).copied().unwrap_or(Role::User);
                ManagedUser {
                    profile,
                    role,
                    is_admin: role.is_admin(),
                }
            })
            .collect())
    }

    /// Patches display name and photo; absent fields are left untouched,
    /// blank strings clear them
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<Profile, ApiError> {
        ProfileValidator.validate(&request).into_result()?;
        let existing = self.require_profile(user_id).await?;

        let display_name = match request.display_name {
            Some(name) => clean_optional(Some(name)),
            None => existing.display_name,
        };
        let photo_url = match request.photo_url {
            Some(url) => clean_optional(Some(url)),
            None => existing.photo_url,
        };

        sqlx::query("UPDATE users SET display_name = ?, photo_url = ?, updated_at = ? WHERE id = ?")
            .bind(&display_name)
            .bind(&photo_url)
            .bind(now_rfc3339())
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(user_id = %user_id, "Profile updated");

        self.require_profile(user_id).await
    }
}

pub(crate) async fn profile_exists(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

/// Inserts the profile unless one exists. Returns whether a row was written.
pub(crate) async fn insert_profile_if_absent(
    conn: &mut SqliteConnection,
    member: &NewMember,
) -> Result<bool, sqlx::Error> {
    let now = now_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, display_name, photo_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(&member.user_id)
    .bind(&member.email)
    .bind(&member.display_name)
    .bind(&member.photo_url)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub(crate) async fn delete_profile(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
