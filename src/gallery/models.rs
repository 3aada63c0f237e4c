use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::default_true;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    /// YYYY-MM-DD of the event the photos were taken at
    pub event_date: Option<String>,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GalleryImage {
    pub id: String,
    pub album_id: String,
    pub url: String,
    pub filename: String,
    pub caption: Option<String>,
    pub width: i64,
    pub height: i64,
    pub file_size: i64,
    pub display_order: i64,
    pub created_at: String,
}

/// Album with its images in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub album: Album,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlbumRequest {
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub event_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAlbumRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub event_date: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateImageRequest {
    pub caption: Option<String>,
    pub display_order: Option<i64>,
}

/// Files the caller should remove once the rows are gone
#[derive(Debug, Clone, Default)]
pub struct DeletedAlbum {
    pub album_id: String,
    pub filenames: Vec<String>,
}
