use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::models::{CreateEventRequest, Event, UpdateEventRequest};
use super::validators::EventValidator;
use crate::common::{clean_optional, generate_id, now_rfc3339, ApiError, EntityPrefix, Validator};

const EVENT_COLUMNS: &str = "id, title, description, event_date, start_time, end_time, location, \
     image_url, album_id, video_id, is_active, display_order, created_at, updated_at";

/// Today's date as stored in `event_date`
pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn patch(current: Option<String>, update: Option<String>) -> Option<String> {
    match update {
        Some(value) => clean_optional(Some(value)),
        None => current,
    }
}

pub struct EventService {
    db: SqlitePool,
}

impl EventService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Active events, soonest first. `from_date` drops events before it.
    pub async fn list_active(&self, from_date: Option<&str>) -> Result<Vec<Event>, ApiError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {} FROM events
            WHERE is_active = 1 AND (? IS NULL OR event_date >= ?)
            ORDER BY event_date ASC, start_time ASC, display_order ASC
            "#,
            EVENT_COLUMNS
        ))
        .bind(from_date)
        .bind(from_date)
        .fetch_all(&self.db)
        .await?;

        Ok(events)
    }

    /// Every event, latest date first
    pub async fn list_all(&self) -> Result<Vec<Event>, ApiError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events ORDER BY event_date DESC, created_at DESC",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(events)
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, ApiError> {
        sqlx::query_as::<_, Event>(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
    }

    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event, ApiError> {
        EventValidator.validate(&request).into_result()?;

        let id = generate_id(EntityPrefix::Event);
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, description, event_date, start_time, end_time, location,
                image_url, album_id, video_id, is_active, display_order, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(request.title.trim())
        .bind(clean_optional(request.description))
        .bind(&request.event_date)
        .bind(clean_optional(request.start_time))
        .bind(clean_optional(request.end_time))
        .bind(clean_optional(request.location))
        .bind(clean_optional(request.image_url))
        .bind(clean_optional(request.album_id))
        .bind(clean_optional(request.video_id))
        .bind(request.is_active)
        .bind(request.display_order)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(event_id = %id, "Created event");
        self.get_event(&id).await
    }

    pub async fn update_event(&self, id: &str, request: UpdateEventRequest) -> Result<Event, ApiError> {
        let existing = self.get_event(id).await?;

        let merged = CreateEventRequest {
            title: request.title.unwrap_or(existing.title),
            description: patch(existing.description, request.description),
            event_date: request.event_date.unwrap_or(existing.event_date),
            start_time: patch(existing.start_time, request.start_time),
            end_time: patch(existing.end_time, request.end_time),
            location: patch(existing.location, request.location),
            image_url: patch(existing.image_url, request.image_url),
            album_id: patch(existing.album_id, request.album_id),
            video_id: patch(existing.video_id, request.video_id),
            is_active: request.is_active.unwrap_or(existing.is_active),
            display_order: request.display_order.unwrap_or(existing.display_order),
        };
        EventValidator.validate(&merged).into_result()?;

        sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, event_date = ?, start_time = ?, end_time = ?,
                location = ?, image_url = ?, album_id = ?, video_id = ?, is_active = ?,
                display_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(merged.title.trim())
        .bind(&merged.description)
        .bind(&merged.event_date)
        .bind(&merged.start_time)
        .bind(&merged.end_time)
        .bind(&merged.location)
        .bind(&merged.image_url)
        .bind(&merged.album_id)
        .bind(&merged.video_id)
        .bind(merged.is_active)
        .bind(merged.display_order)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        info!(event_id = %id, "Updated event");
        self.get_event(id).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Event not found".to_string()));
        }

        info!(event_id = %id, "Deleted event");
        Ok(())
    }
}
