use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::compression::ProcessedImage;
use super::models::{
    Album, AlbumDetail, CreateAlbumRequest, DeletedAlbum, GalleryImage, UpdateAlbumRequest,
    UpdateImageRequest,
};
use super::storage::StoredFile;
use super::validators::{validate_caption, AlbumValidator};
use crate::common::{clean_optional, generate_id, now_rfc3339, ApiError, EntityPrefix, Validator};

const ALBUM_COLUMNS: &str = "id, title, description, cover_image_url, event_date, is_active, \
     display_order, created_at, updated_at";

const IMAGE_COLUMNS: &str = "id, album_id, url, filename, caption, width, height, file_size, \
     display_order, created_at";

pub struct GalleryService {
    db: SqlitePool,
}

impl GalleryService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_active_albums(&self) -> Result<Vec<Album>, ApiError> {
        let albums = sqlx::query_as::<_, Album>(&format!(
            r#"
            SELECT {} FROM gallery_albums
            WHERE is_active = 1
            ORDER BY display_order ASC, created_at DESC
            "#,
            ALBUM_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(albums)
    }

    pub async fn list_all_albums(&self) -> Result<Vec<Album>, ApiError> {
        let albums = sqlx::query_as::<_, Album>(&format!(
            "SELECT {} FROM gallery_albums ORDER BY display_order ASC, created_at DESC",
            ALBUM_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(albums)
    }

    pub async fn get_album(&self, id: &str) -> Result<Album, ApiError> {
        let mut conn = self.db.acquire().await?;
        fetch_album(&mut conn, id).await
    }

    /// Album plus images; inactive albums are hidden unless `include_inactive`
    pub async fn get_album_detail(&self, id: &str, include_inactive: bool) -> Result<AlbumDetail, ApiError> {
        let album = self.get_album(id).await?;
        if !album.is_active && !include_inactive {
            return Err(ApiError::NotFound("Album not found".to_string()));
        }
        let images = self.list_images(id).await?;
        Ok(AlbumDetail { album, images })
    }

    pub async fn list_images(&self, album_id: &str) -> Result<Vec<GalleryImage>, ApiError> {
        let images = sqlx::query_as::<_, GalleryImage>(&format!(
            r#"
            SELECT {} FROM gallery_images
            WHERE album_id = ?
            ORDER BY display_order ASC, created_at ASC
            "#,
            IMAGE_COLUMNS
        ))
        .bind(album_id)
        .fetch_all(&self.db)
        .await?;

        Ok(images)
    }

    pub async fn create_album(&self, request: CreateAlbumRequest) -> Result<Album, ApiError> {
        AlbumValidator.validate(&request).into_result()?;

        let id = generate_id(EntityPrefix::Album);
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO gallery_albums (
                id, title, description, cover_image_url, event_date, is_active, display_order,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(request.title.trim())
        .bind(clean_optional(request.description))
        .bind(clean_optional(request.cover_image_url))
        .bind(clean_optional(request.event_date))
        .bind(request.is_active)
        .bind(request.display_order)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(album_id = %id, "Created gallery album");
        self.get_album(&id).await
    }

    pub async fn update_album(&self, id: &str, request: UpdateAlbumRequest) -> Result<Album, ApiError> {
        let existing = self.get_album(id).await?;

        let merged = CreateAlbumRequest {
            title: request.title.unwrap_or(existing.title),
            description: match request.description {
                Some(d) => clean_optional(Some(d)),
                None => existing.description,
            },
            cover_image_url: match request.cover_image_url {
                Some(u) => clean_optional(Some(u)),
                None => existing.cover_image_url,
            },
            event_date: match request.event_date {
                Some(d) => clean_optional(Some(d)),
                None => existing.event_date,
            },
            is_active: request.is_active.unwrap_or(existing.is_active),
            display_order: request.display_order.unwrap_or(existing.display_order),
        };
        AlbumValidator.validate(&merged).into_result()?;

        sqlx::query(
            r#"
            UPDATE gallery_albums
            SET title = ?, description = ?, cover_image_url = ?, event_date = ?,
                is_active = ?, display_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(merged.title.trim())
        .bind(&merged.description)
        .bind(&merged.cover_image_url)
        .bind(&merged.event_date)
        .bind(merged.is_active)
        .bind(merged.display_order)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        info!(album_id = %id, "Updated gallery album");
        self.get_album(id).await
    }

    /// Removes the album and every image row in one transaction. The returned
    /// filenames still exist on disk.
    pub async fn delete_album(&self, id: &str) -> Result<DeletedAlbum, ApiError> {
        let mut tx = self.db.begin().await?;

        // Writes first so the transaction takes the write lock up front
        let filenames: Vec<String> =
            sqlx::query_scalar("DELETE FROM gallery_images WHERE album_id = ? RETURNING filename")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let removed = sqlx::query("DELETE FROM gallery_albums WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(ApiError::NotFound("Album not found".to_string()));
        }

        tx.commit().await?;

        info!(album_id = %id, images = filenames.len(), "Deleted gallery album");
        Ok(DeletedAlbum {
            album_id: id.to_string(),
            filenames,
        })
    }

    /// Records a stored photo; the album's cover is set if it has none
    pub async fn add_image(
        &self,
        album_id: &str,
        stored: &StoredFile,
        processed: &ProcessedImage,
        caption: Option<String>,
    ) -> Result<GalleryImage, ApiError> {
        let caption = clean_optional(caption);
        validate_caption(caption.as_deref()).into_result()?;

        let id = generate_id(EntityPrefix::Image);
        let now = now_rfc3339();

        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO gallery_images (
                id, album_id, url, filename, caption, width, height, file_size, display_order, created_at
            )
            SELECT ?, ?, ?, ?, ?, ?, ?, ?,
                   (SELECT COALESCE(MAX(display_order) + 1, 0) FROM gallery_images WHERE album_id = ?),
                   ?
            WHERE EXISTS (SELECT 1 FROM gallery_albums WHERE id = ?)
            "#,
        )
        .bind(&id)
        .bind(album_id)
        .bind(&stored.url)
        .bind(&stored.filename)
        .bind(&caption)
        .bind(processed.width as i64)
        .bind(processed.height as i64)
        .bind(stored.file_size)
        .bind(album_id)
        .bind(&now)
        .bind(album_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(ApiError::NotFound("Album not found".to_string()));
        }

        let cover = sqlx::query(
            r#"
            UPDATE gallery_albums SET cover_image_url = ?, updated_at = ?
            WHERE id = ? AND (cover_image_url IS NULL OR cover_image_url = '')
            "#,
        )
        .bind(&stored.url)
        .bind(&now)
        .bind(album_id)
        .execute(&mut *tx)
        .await?;

        let image = fetch_image(&mut tx, &id).await?;
        tx.commit().await?;

        info!(
            album_id = %album_id,
            image_id = %id,
            width = processed.width,
            height = processed.height,
            file_size = stored.file_size,
            set_cover = cover.rows_affected() > 0,
            "Added gallery image"
        );
        Ok(image)
    }

    pub async fn update_image(&self, id: &str, request: UpdateImageRequest) -> Result<GalleryImage, ApiError> {
        let mut conn = self.db.acquire().await?;
        let existing = fetch_image(&mut conn, id).await?;

        let caption = match request.caption {
            Some(c) => clean_optional(Some(c)),
            None => existing.caption,
        };
        validate_caption(caption.as_deref()).into_result()?;

        sqlx::query("UPDATE gallery_images SET caption = ?, display_order = ? WHERE id = ?")
            .bind(&caption)
            .bind(request.display_order.unwrap_or(existing.display_order))
            .bind(id)
            .execute(&mut *conn)
            .await?;

        fetch_image(&mut conn, id).await
    }

    /// Deletes one image row. If it was the album cover, the next image in
    /// order takes over (or the cover is cleared).
    pub async fn delete_image(&self, id: &str) -> Result<GalleryImage, ApiError> {
        let mut tx = self.db.begin().await?;
        let image = sqlx::query_as::<_, GalleryImage>(&format!(
            "DELETE FROM gallery_images WHERE id = ? RETURNING {}",
            IMAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

        let next_cover: Option<String> = sqlx::query_scalar(
            r#"
            SELECT url FROM gallery_images
            WHERE album_id = ?
            ORDER BY display_order ASC, created_at ASC
            LIMIT 1
            "#,
        )
        .bind(&image.album_id)
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE gallery_albums SET cover_image_url = ?, updated_at = ? WHERE id = ? AND cover_image_url = ?",
        )
        .bind(&next_cover)
        .bind(now_rfc3339())
        .bind(&image.album_id)
        .bind(&image.url)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(image_id = %id, album_id = %image.album_id, "Deleted gallery image");
        Ok(image)
    }
}

async fn fetch_album(conn: &mut SqliteConnection, id: &str) -> Result<Album, ApiError> {
    sqlx::query_as::<_, Album>(&format!(
        "SELECT {} FROM gallery_albums WHERE id = ?",
        ALBUM_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))
}

async fn fetch_image(conn: &mut SqliteConnection, id: &str) -> Result<GalleryImage, ApiError> {
    sqlx::query_as::<_, GalleryImage>(&format!(
        "SELECT {} FROM gallery_images WHERE id = ?",
        IMAGE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))
}
