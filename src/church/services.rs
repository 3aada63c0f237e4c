use sqlx::SqlitePool;
use tracing::info;

use super::models::{
    ChurchInfo, CreateServiceTimeRequest, ServiceTime, UpdateChurchInfoRequest,
    UpdateServiceTimeRequest,
};
use super::validators::{ChurchInfoValidator, ServiceTimeValidator};
use crate::common::{clean_optional, generate_id, now_rfc3339, ApiError, EntityPrefix, Validator};

/// Key of the single church info row
const CHURCH_INFO_ID: &str = "main";

const INFO_COLUMNS: &str = "id, name, tagline, about, mission, vision, address, phone, email, \
     facebook_url, instagram_url, youtube_url, updated_by, created_at, updated_at";

const SERVICE_TIME_COLUMNS: &str = "id, name, day_of_week, time, description, location, \
     is_active, display_order, created_at, updated_at";

fn patch(current: Option<String>, update: Option<String>) -> Option<String> {
    match update {
        Some(value) => clean_optional(Some(value)),
        None => current,
    }
}

pub struct ChurchInfoService {
    db: SqlitePool,
}

impl ChurchInfoService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_info(&self) -> Result<Option<ChurchInfo>, ApiError> {
        let info = sqlx::query_as::<_, ChurchInfo>(&format!(
            "SELECT {} FROM church_info WHERE id = ?",
            INFO_COLUMNS
        ))
        .bind(CHURCH_INFO_ID)
        .fetch_optional(&self.db)
        .await?;

        Ok(info)
    }

    /// Patches the church info, creating it on the first write
    pub async fn update_info(
        &self,
        actor_id: &str,
        request: UpdateChurchInfoRequest,
    ) -> Result<ChurchInfo, ApiError> {
        ChurchInfoValidator.validate(&request).into_result()?;
        let existing = self.get_info().await?;

        let name = match (request.name, &existing) {
            (Some(name), _) => name.trim().to_string(),
            (None, Some(current)) => current.name.clone(),
            (None, None) => {
                return Err(ApiError::ValidationError(
                    "name: is required when creating church info".to_string(),
                ))
            }
        };

        let current = existing.as_ref();
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO church_info (
                id, name, tagline, about, mission, vision, address, phone, email,
                facebook_url, instagram_url, youtube_url, updated_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                tagline = excluded.tagline,
                about = excluded.about,
                mission = excluded.mission,
                vision = excluded.vision,
                address = excluded.address,
                phone = excluded.phone,
                email = excluded.email,
                facebook_url = excluded.facebook_url,
                instagram_url = excluded.instagram_url,
                youtube_url = excluded.youtube_url,
                updated_by = excluded.updated_by,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(CHURCH_INFO_ID)
        .bind(&name)
        .bind(patch(current.and_then(|i| i.tagline.clone()), request.tagline))
        .bind(patch(current.and_then(|i| i.about.clone()), request.about))
        .bind(patch(current.and_then(|i| i.mission.clone()), request.mission))
        .bind(patch(current.and_then(|i| i.vision.clone()), request.vision))
        .bind(patch(current.and_then(|i| i.address.clone()), request.address))
        .bind(patch(current.and_then(|i| i.phone.clone()), request.phone))
        .bind(patch(current.and_then(|i| i.email.clone()), request.email))
        .bind(patch(current.and_then(|i| i.facebook_url.clone()), request.facebook_url))
        .bind(patch(current.and_then(|i| i.instagram_url.clone()), request.instagram_url))
        .bind(patch(current.and_then(|i| i.youtube_url.clone()), request.youtube_url))
        .bind(actor_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(actor_id = %actor_id, "Church info updated");

        self.get_info()
            .await?
            .ok_or_else(|| ApiError::InternalServer("church info vanished after write".to_string()))
    }
}

pub struct ServiceTimeService {
    db: SqlitePool,
}

impl ServiceTimeService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_active(&self) -> Result<Vec<ServiceTime>, ApiError> {
        let times = sqlx::query_as::<_, ServiceTime>(&format!(
            "SELECT {} FROM service_times WHERE is_active = 1 ORDER BY display_order ASC, day_of_week ASC, time ASC",
            SERVICE_TIME_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(times)
    }

    pub async fn list_all(&self) -> Result<Vec<ServiceTime>, ApiError> {
        let times = sqlx::query_as::<_, ServiceTime>(&format!(
            "SELECT {} FROM service_times ORDER BY display_order ASC, day_of_week ASC, time ASC",
            SERVICE_TIME_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(times)
    }

    pub async fn get_service_time(&self, id: &str) -> Result<ServiceTime, ApiError> {
        sqlx::query_as::<_, ServiceTime>(&format!(
            "SELECT {} FROM service_times WHERE id = ?",
            SERVICE_TIME_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service time not found".to_string()))
    }

    pub async fn create_service_time(
        &self,
        request: CreateServiceTimeRequest,
    ) -> Result<ServiceTime, ApiError> {
        ServiceTimeValidator.validate(&request).into_result()?;

        let id = generate_id(EntityPrefix::ServiceTime);
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO service_times (
                id, name, day_of_week, time, description, location, is_active, display_order,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(request.name.trim())
        .bind(request.day_of_week)
        .bind(request.time.trim())
        .bind(clean_optional(request.description))
        .bind(clean_optional(request.location))
        .bind(request.is_active)
        .bind(request.display_order)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(service_time_id = %id, "Created service time");
        self.get_service_time(&id).await
    }

    pub async fn update_service_time(
        &self,
        id: &str,
        request: UpdateServiceTimeRequest,
    ) -> Result<ServiceTime, ApiError> {
        let existing = self.get_service_time(id).await?;

        let merged = CreateServiceTimeRequest {
            name: request.name.unwrap_or(existing.name),
            day_of_week: request.day_of_week.unwrap_or(existing.day_of_week),
            time: request.time.unwrap_or(existing.time),
            description: patch(existing.description, request.description),
            location: patch(existing.location, request.location),
            is_active: request.is_active.unwrap_or(existing.is_active),
            display_order: request.display_order.unwrap_or(existing.display_order),
        };
        ServiceTimeValidator.validate(&merged).into_result()?;

        sqlx::query(
            r#"
            UPDATE service_times
            SET name = ?, day_of_week = ?, time = ?, description = ?, location = ?,
                is_active = ?, display_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(merged.name.trim())
        .bind(merged.day_of_week)
        .bind(merged.time.trim())
        .bind(&merged.description)
        .bind(&merged.location)
        .bind(merged.is_active)
        .bind(merged.display_order)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        info!(service_time_id = %id, "Updated service time");
        self.get_service_time(id).await
    }

    pub async fn delete_service_time(&self, id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM service_times WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Service time not found".to_string()));
        }

        info!(service_time_id = %id, "Deleted service time");
        Ok(())
    }
}
