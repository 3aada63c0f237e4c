use super::models::UpdateProfileRequest;
use crate::common::{ValidationResult, Validator};

pub struct ProfileValidator;

impl Validator<UpdateProfileRequest> for ProfileValidator {
    fn validate(&self, data: &UpdateProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.limit_text("display_name", data.display_name.as_deref(), 100);
        result.optional_url("photo_url", data.photo_url.as_deref());
        result
    }
}
