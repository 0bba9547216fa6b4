//! Form validation support.
//!
//! Validation failures are accumulated per field and returned together as
//! one 422 problem document; nothing is persisted when any field fails.

use std::collections::BTreeMap;

use crate::middleware::error::AppError;

/// Accumulator for field-level validation messages.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when clean, the 422 error otherwise.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.fields))
        }
    }
}

/// Non-empty after trimming.
pub fn require(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "This field is required.");
    }
}

pub fn max_len(errors: &mut FieldErrors, field: &str, value: &str, limit: usize) {
    if value.chars().count() > limit {
        errors.push(field, format!("Must be at most {limit} characters."));
    }
}

/// Usernames are URL path segments: alphanumerics, hyphen, underscore.
pub fn username_charset(errors: &mut FieldErrors, field: &str, value: &str) {
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.push(
            field,
            "Only letters, digits, hyphens and underscores are allowed.",
        );
    }
}

pub fn email_shape(errors: &mut FieldErrors, field: &str, value: &str) {
    if !value.contains('@') {
        errors.push(field, "Enter a valid email address.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_form_passes() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "title", "A title");
        max_len(&mut errors, "title", "A title", 256);
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn failures_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "title", "   ");
        max_len(&mut errors, "title", &"x".repeat(300), 256);
        require(&mut errors, "text", "");

        let err = errors.into_result().unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields["title"].len(), 2);
                assert_eq!(fields["text"].len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn username_charset_rejects_path_breaking_characters() {
        let mut ok = FieldErrors::new();
        username_charset(&mut ok, "username", "some_author-42");
        assert!(ok.is_empty());

        let mut bad = FieldErrors::new();
        username_charset(&mut bad, "username", "not/a/segment");
        assert!(!bad.is_empty());
    }

    #[test]
    fn email_shape_wants_an_at_sign() {
        let mut bad = FieldErrors::new();
        email_shape(&mut bad, "email", "nope");
        assert!(!bad.is_empty());
    }
}
