use axum::{
    extract::{Extension, Multipart, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

use super::compression::{compress_image, ProcessedImage};
use super::models::{
    Album, AlbumDetail, CreateAlbumRequest, GalleryImage, UpdateAlbumRequest, UpdateImageRequest,
};
use super::services::GalleryService;
use super::storage::GalleryStorage;
use crate::accounts::models::MessageResponse;
use crate::auth::AdminSession;
use crate::common::{ApiError, AppState, SharedState};

const CACHE_PREFIX: &str = "gallery:";

fn storage(state: &AppState) -> GalleryStorage {
    GalleryStorage::new(state.config.gallery_dir())
}

/// GET /api/gallery
pub async fn list_public_albums(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Vec<Album>>, ApiError> {
    let app_state = state.read().await.clone();
    let service = GalleryService::new(app_state.db.clone());
    let key = format!("{}public:albums", CACHE_PREFIX);

    let albums = app_state
        .cache
        .get_or_load(&key, || service.list_active_albums())
        .await?;
    Ok(Json(albums))
}

/// GET /api/gallery/:id
pub async fn get_public_album(
    Extension(state): Extension<SharedState>,
    Path(album_id): Path<String>,
) -> Result<Json<AlbumDetail>, ApiError> {
    let app_state = state.read().await.clone();
    let service = GalleryService::new(app_state.db.clone());
    let key = format!("{}public:album:{}", CACHE_PREFIX, album_id);

    let detail = app_state
        .cache
        .get_or_load(&key, || service.get_album_detail(&album_id, false))
        .await?;
    Ok(Json(detail))
}

/// GET /uploads/gallery/:filename
pub async fn serve_gallery_image(
    Extension(state): Extension<SharedState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    let content = storage(&app_state).read(&filename).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, ProcessedImage::CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        content,
    ))
}

/// GET /api/admin/gallery/albums
pub async fn list_all_albums(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<Vec<Album>>, ApiError> {
    let app_state = state.read().await.clone();
    let albums = GalleryService::new(app_state.db.clone())
        .list_all_albums()
        .await?;
    Ok(Json(albums))
}

/// GET /api/admin/gallery/albums/:id
pub async fn get_album(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(album_id): Path<String>,
) -> Result<Json<AlbumDetail>, ApiError> {
    let app_state = state.read().await.clone();
    let detail = GalleryService::new(app_state.db.clone())
        .get_album_detail(&album_id, true)
        .await?;
    Ok(Json(detail))
}

/// POST /api/admin/gallery/albums
pub async fn create_album(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Json(request): Json<CreateAlbumRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    let album = GalleryService::new(app_state.db.clone())
        .create_album(request)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok((StatusCode::CREATED, Json(album)))
}

/// PUT /api/admin/gallery/albums/:id
pub async fn update_album(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(album_id): Path<String>,
    Json(request): Json<UpdateAlbumRequest>,
) -> Result<Json<Album>, ApiError> {
    let app_state = state.read().await.clone();
    let album = GalleryService::new(app_state.db.clone())
        .update_album(&album_id, request)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok(Json(album))
}

/// DELETE /api/admin/gallery/albums/:id
/// Rows go first in one transaction; files are cleaned up afterwards
pub async fn delete_album(
    Extension(state): Extension<SharedState>,
    AdminSession(admin): AdminSession,
    Path(album_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let app_state = state.read().await.clone();
    let deleted = GalleryService::new(app_state.db.clone())
        .delete_album(&album_id)
        .await?;
    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;

    let removed = storage(&app_state).remove_all(&deleted.filenames).await;
    info!(
        admin_id = %admin.user_id,
        album_id = %deleted.album_id,
        images = deleted.filenames.len(),
        files_removed = removed,
        "Gallery album deleted"
    );

    Ok(Json(MessageResponse {
        success: true,
        message: "Album deleted successfully".to_string(),
    }))
}

/// POST /api/admin/gallery/albums/:id/images
///
/// Multipart form: one or more `image` parts and an optional `caption`
/// applied to each of them.
pub async fn upload_images(
    Extension(state): Extension<SharedState>,
    AdminSession(admin): AdminSession,
    Path(album_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    let service = GalleryService::new(app_state.db.clone());
    service.get_album(&album_id).await?;

    let mut caption: Option<String> = None;
    let mut uploads: Vec<Vec<u8>> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("caption") => {
                caption = Some(field.text().await.unwrap_or_default());
            }
            Some("image") | Some("images") | Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?;
                uploads.push(data.to_vec());
            }
            _ => {}
        }
    }

    if uploads.is_empty() {
        return Err(ApiError::BadRequest("No image provided".to_string()));
    }

    let storage = storage(&app_state);
    let mut created: Vec<GalleryImage> = Vec::with_capacity(uploads.len());

    for data in uploads {
        let original_size = data.len();
        let processed = tokio::task::spawn_blocking(move || compress_image(&data))
            .await
            .map_err(|e| ApiError::InternalServer(format!("Image task failed: {}", e)))??;

        let stored = storage.save(&processed).await?;
        match service
            .add_image(&album_id, &stored, &processed, caption.clone())
            .await
        {
            Ok(image) => {
                info!(
                    admin_id = %admin.user_id,
                    album_id = %album_id,
                    original_size,
                    stored_size = stored.file_size,
                    "Gallery image uploaded"
                );
                created.push(image);
            }
            Err(e) => {
                warn!(error = %e, filename = %stored.filename, "Discarding stored file after failed insert");
                storage.remove(&stored.filename).await;
                return Err(e);
            }
        }
    }

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/admin/gallery/images/:id
pub async fn update_image(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(image_id): Path<String>,
    Json(request): Json<UpdateImageRequest>,
) -> Result<Json<GalleryImage>, ApiError> {
    let app_state = state.read().await.clone();
    let image = GalleryService::new(app_state.db.clone())
        .update_image(&image_id, request)
        .await?;

    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;
    Ok(Json(image))
}

/// DELETE /api/admin/gallery/images/:id
pub async fn delete_image(
    Extension(state): Extension<SharedState>,
    AdminSession(_admin): AdminSession,
    Path(image_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let app_state = state.read().await.clone();
    let image = GalleryService::new(app_state.db.clone())
        .delete_image(&image_id)
        .await?;
    app_state.cache.invalidate_prefix(CACHE_PREFIX).await;

    storage(&app_state).remove(&image.filename).await;

    Ok(Json(MessageResponse {
        success: true,
        message: "Image deleted successfully".to_string(),
    }))
}
