use super::models::{CreateServiceTimeRequest, UpdateChurchInfoRequest};
use crate::common::{ValidationResult, Validator};

pub struct ChurchInfoValidator;

impl Validator<UpdateChurchInfoRequest> for ChurchInfoValidator {
    fn validate(&self, data: &UpdateChurchInfoRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.name {
            result.require_text("name", name, 200);
        }
        result.limit_text("tagline", data.tagline.as_deref(), 300);
        for (field, value) in [
            ("about", &data.about),
            ("mission", &data.mission),
            ("vision", &data.vision),
        ] {
            result.limit_text(field, value.as_deref(), 10000);
        }
        result.limit_text("address", data.address.as_deref(), 500);
        result.limit_text("phone", data.phone.as_deref(), 30);
        if let Some(email) = data.email.as_deref().filter(|e| !e.trim().is_empty()) {
            result.email("email", email);
        }
        result.optional_url("facebook_url", data.facebook_url.as_deref());
        result.optional_url("instagram_url", data.instagram_url.as_deref());
        result.optional_url("youtube_url", data.youtube_url.as_deref());

        result
    }
}

pub struct ServiceTimeValidator;

impl Validator<CreateServiceTimeRequest> for ServiceTimeValidator {
    fn validate(&self, data: &CreateServiceTimeRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require_text("name", &data.name, 100);
        if !(0..=6).contains(&data.day_of_week) {
            result.add_error("day_of_week", "must be between 0 (Sunday) and 6 (Saturday)");
        }
        if data.time.trim().is_empty() {
            result.add_error("time", "is required");
        } else {
            result.optional_time("time", Some(data.time.trim()));
        }
        result.limit_text("description", data.description.as_deref(), 1000);
        result.limit_text("location", data.location.as_deref(), 300);

        result
    }
}
