use sqlx::SqlitePool;
use tracing::info;

use super::models::{CreateVideoRequest, UpdateVideoRequest, Video};
use super::validators::VideoValidator;
use super::youtube::{extract_video_id, thumbnail_url};
use crate::common::{clean_optional, generate_id, now_rfc3339, ApiError, EntityPrefix, Validator};

const VIDEO_COLUMNS: &str = "id, title, description, youtube_url, youtube_id, thumbnail_url, \
     category, is_active, display_order, created_at, updated_at";

pub struct VideoService {
    db: SqlitePool,
}

impl VideoService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Active videos by display order, optionally limited to one category
    pub async fn list_active(&self, category: Option<&str>) -> Result<Vec<Video>, ApiError> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            r#"
            SELECT {} FROM videos
            WHERE is_active = 1 AND (? IS NULL OR category = ?)
            ORDER BY display_order ASC, created_at DESC
            "#,
            VIDEO_COLUMNS
        ))
        .bind(category)
        .bind(category)
        .fetch_all(&self.db)
        .await?;

        Ok(videos)
    }

    pub async fn list_all(&self) -> Result<Vec<Video>, ApiError> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {} FROM videos ORDER BY display_order ASC, created_at DESC",
            VIDEO_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(videos)
    }

    pub async fn get_video(&self, id: &str) -> Result<Video, ApiError> {
        sqlx::query_as::<_, Video>(&format!("SELECT {} FROM videos WHERE id = ?", VIDEO_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))
    }

    pub async fn create_video(&self, request: CreateVideoRequest) -> Result<Video, ApiError> {
        VideoValidator.validate(&request).into_result()?;
        let youtube_id = extract_video_id(&request.youtube_url)
            .ok_or_else(|| ApiError::ValidationError("youtube_url: must be a YouTube video link".to_string()))?;

        let id = generate_id(EntityPrefix::Video);
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO videos (
                id, title, description, youtube_url, youtube_id, thumbnail_url, category,
                is_active, display_order, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(request.title.trim())
        .bind(clean_optional(request.description))
        .bind(request.youtube_url.trim())
        .bind(&youtube_id)
        .bind(thumbnail_url(&youtube_id))
        .bind(clean_optional(request.category))
        .bind(request.is_active)
        .bind(request.display_order)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(video_id = %id, youtube_id = %youtube_id, "Created video");
        self.get_video(&id).await
    }

    pub async fn update_video(&self, id: &str, request: UpdateVideoRequest) -> Result<Video, ApiError> {
        let existing = self.get_video(id).await?;

        let merged = CreateVideoRequest {
            title: request.title.unwrap_or(existing.title),
            description: match request.description {
                Some(d) => clean_optional(Some(d)),
                None => existing.description,
            },
            youtube_url: request.youtube_url.unwrap_or(existing.youtube_url),
            category: match request.category {
                Some(c) => clean_optional(Some(c)),
                None => existing.category,
            },
            is_active: request.is_active.unwrap_or(existing.is_active),
            display_order: request.display_order.unwrap_or(existing.display_order),
        };
        VideoValidator.validate(&merged).into_result()?;
        let youtube_id = extract_video_id(&merged.youtube_url).unwrap_or(existing.youtube_id);

        sqlx::query(
            r#"
            UPDATE videos
            SET title = ?, description = ?, youtube_url = ?, youtube_id = ?, thumbnail_url = ?,
                category = ?, is_active = ?, display_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(merged.title.trim())
        .bind(&merged.description)
        .bind(merged.youtube_url.trim())
        .bind(&youtube_id)
        .bind(thumbnail_url(&youtube_id))
        .bind(&merged.category)
        .bind(merged.is_active)
        .bind(merged.display_order)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        info!(video_id = %id, "Updated video");
        self.get_video(id).await
    }

    pub async fn delete_video(&self, id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Video not found".to_string()));
        }

        info!(video_id = %id, "Deleted video");
        Ok(())
    }
}
