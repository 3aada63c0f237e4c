use super::models::SubmitMessageRequest;
use crate::common::{ValidationResult, Validator};

pub struct ContactMessageValidator;

impl Validator<SubmitMessageRequest> for ContactMessageValidator {
    fn validate(&self, data: &SubmitMessageRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require_text("name", &data.name, 100);
        result.email("email", &data.email);
        result.limit_text("phone", data.phone.as_deref(), 30);
        result.require_text("subject", &data.subject, 200);
        result.require_text("message", &data.message, 5000);

        result
    }
}
