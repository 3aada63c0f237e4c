use super::models::CreateAlbumRequest;
use crate::common::{ValidationResult, Validator};

pub struct AlbumValidator;

impl Validator<CreateAlbumRequest> for AlbumValidator {
    fn validate(&self, data: &CreateAlbumRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require_text("title", &data.title, 200);
        result.limit_text("description", data.description.as_deref(), 2000);
        result.optional_url("cover_image_url", data.cover_image_url.as_deref());

        if let Some(date) = data.event_date.as_deref().filter(|d| !d.trim().is_empty()) {
            result.date("event_date", date);
        }

        result
    }
}

/// Captions are free text but bounded
pub fn validate_caption(caption: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.limit_text("caption", caption, 500);
    result
}
