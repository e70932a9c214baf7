//! Service error type shared by every service

use serde::Serialize;
use validator::ValidationErrors;

/// One rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// camelCase field name as it appears in the request body
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error types for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected before any state changed
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Unknown id or slug, or a cart line owned by another session
    #[error("{0}")]
    NotFound(String),

    /// The operation would break a reference held by other records
    #[error("{0}")]
    Conflict(String),

    /// Stored records reference each other inconsistently
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Login required
    #[error("{0}")]
    Unauthorized(String),

    /// Logged in but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Too many failed logins; retry after the given number of seconds
    #[error("Too many failed attempts, retry in {retry_after} seconds")]
    RateLimited { retry_after: i64 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Validation error for a single field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn not_found(what: &str, key: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} not found: {}", what, key))
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

/// Flatten validator output into field errors sorted by field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = to_camel_case(&field);
            errs.iter()
                .map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                    FieldError::new(field.clone(), message)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(range(min = 1, message = "Quantity must be at least 1"))]
        quantity: i64,
        #[validate(length(min = 1))]
        image_url: String,
    }

    #[test]
    fn test_field_errors_are_camel_case_and_sorted() {
        let payload = Payload {
            quantity: 0,
            image_url: String::new(),
        };
        let fields = field_errors(&payload.validate().unwrap_err());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "imageUrl");
        assert!(fields[0].message.contains("length"));
        assert_eq!(fields[1], FieldError::new("quantity", "Quantity must be at least 1"));
    }

    #[test]
    fn test_display_lists_fields() {
        let err = ServiceError::invalid("slug", "Slug already exists");
        assert_eq!(err.to_string(), "Validation failed: slug: Slug already exists");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("sale_price"), "salePrice");
        assert_eq!(to_camel_case("num_reviews"), "numReviews");
        assert_eq!(to_camel_case("quantity"), "quantity");
    }
}
