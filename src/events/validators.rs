use super::models::CreateEventRequest;
use crate::common::{ValidationResult, Validator};

pub struct EventValidator;

impl Validator<CreateEventRequest> for EventValidator {
    fn validate(&self, data: &CreateEventRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require_text("title", &data.title, 200);
        result.date("event_date", &data.event_date);
        result.optional_time("start_time", data.start_time.as_deref());
        result.optional_time("end_time", data.end_time.as_deref());
        result.limit_text("description", data.description.as_deref(), 5000);
        result.limit_text("location", data.location.as_deref(), 300);
        result.optional_url("image_url", data.image_url.as_deref());

        if let (Some(start), Some(end)) = (data.start_time.as_deref(), data.end_time.as_deref()) {
            if !start.is_empty() && !end.is_empty() && end < start {
                result.add_error("end_time", "must not be before start_time");
            }
        }

        result
    }
}
