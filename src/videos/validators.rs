use super::models::CreateVideoRequest;
use super::youtube::extract_video_id;
use crate::common::{ValidationResult, Validator};

pub struct VideoValidator;

impl Validator<CreateVideoRequest> for VideoValidator {
    fn validate(&self, data: &CreateVideoRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require_text("title", &data.title, 200);
        result.limit_text("description", data.description.as_deref(), 5000);
        result.limit_text("category", data.category.as_deref(), 50);

        if extract_video_id(&data.youtube_url).is_none() {
            result.add_error("youtube_url", "must be a YouTube video link");
        }

        result
    }
}
