// Common validation types and traits

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Converts into `Err(ApiError)` when any check failed
    pub fn into_result(self) -> Result<(), super::ApiError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.into())
        }
    }

    /// Adds the standard required / max-length checks for a text field
    pub fn require_text(&mut self, field: &str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.add_error(field, "is required");
        } else if value.chars().count() > max_len {
            self.add_error(field, &format!("must not exceed {} characters", max_len));
        }
    }

    /// Max-length check for an optional text field
    pub fn limit_text(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(v) = value {
            if v.chars().count() > max_len {
                self.add_error(field, &format!("must not exceed {} characters", max_len));
            }
        }
    }

    /// URL check for an optional field; empty strings clear the field and are accepted
    pub fn optional_url(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !v.is_empty() && !v.starts_with("http://") && !v.starts_with("https://") && !v.starts_with('/') {
                self.add_error(field, "must be an absolute http(s) URL or a site path");
            }
        }
    }

    /// Calendar date in `YYYY-MM-DD` form
    pub fn date(&mut self, field: &str, value: &str) {
        if chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
            self.add_error(field, "must be a date in YYYY-MM-DD format");
        }
    }

    /// Optional clock time in `HH:MM` form
    pub fn optional_time(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            if chrono::NaiveTime::parse_from_str(v, "%H:%M").is_err() {
                self.add_error(field, "must be a time in HH:MM format");
            }
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_valid_email(value) {
            self.add_error(field, "must be a valid email address");
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}
