//! Validation utilities.

use crate::{FieldError, TesseraError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `TesseraError` on failure.
    fn validate_request(&self) -> Result<(), TesseraError> {
        self.validate().map_err(validation_errors_to_tessera_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();

    // HashMap iteration order is unstable
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Converts `validator::ValidationErrors` to `TesseraError`.
#[must_use]
pub fn validation_errors_to_tessera_error(errors: ValidationErrors) -> TesseraError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    TesseraError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct SignupForm {
        #[validate(custom(function = "not_blank", message = "Name is required"))]
        name: String,
        #[validate(email(message = "Invalid email address"))]
        email: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_valid_form_passes() {
        let form = SignupForm {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
        };
        assert!(form.validate_request().is_ok());
    }

    #[test]
    fn test_invalid_form_reports_every_field() {
        let form = SignupForm {
            name: " ".to_string(),
            email: "nope".to_string(),
        };
        match form.validate_request() {
            Err(TesseraError::Validation(message)) => {
                assert_eq!(message, "email: Invalid email address; name: Name is required");
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}
