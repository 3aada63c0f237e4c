use super::models::SignUpRequest;
use super::passwords::MIN_PASSWORD_LENGTH;
use crate::common::{ValidationResult, Validator};

pub struct SignUpValidator;

impl Validator<SignUpRequest> for SignUpValidator {
    fn validate(&self, data: &SignUpRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.email("email", &data.email);

        if data.password.chars().count() < MIN_PASSWORD_LENGTH {
            result.add_error(
                "password",
                &format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        if data.password.len() > 1024 {
            result.add_error("password", "is too long");
        }

        result.limit_text("display_name", data.display_name.as_deref(), 100);
        result
    }
}
