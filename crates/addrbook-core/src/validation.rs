//! # Validation Module
//!
//! Rules for the identifiers that end up inside document paths.
//!
//! ## Why Validate Ids?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  users/{uid}/addresses/{id}                                            │
//! │         │               │                                               │
//! │         │               └── "a/b" would address a sub-collection        │
//! │         └────────────────── ".." would escape the user's scope          │
//! │                                                                         │
//! │  Both segments are checked before any remote call is made.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use addrbook_core::validation::{validate_document_id, validate_uid};
//!
//! assert!(validate_uid("u1").is_ok());
//! assert!(validate_document_id("a/b").is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest id segment the document store accepts, in bytes.
pub const MAX_ID_BYTES: usize = 1500;

/// Validates a user id before it is used as a path segment.
pub fn validate_uid(uid: &str) -> ValidationResult<()> {
    validate_path_segment("uid", uid)
}

/// Validates a document id before it is used as a path segment.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_ID_BYTES`] bytes
/// - Must not contain `/`
/// - Must not be `.` or `..`
/// - Must not match the reserved form `__.*__`
pub fn validate_document_id(id: &str) -> ValidationResult<()> {
    validate_path_segment("id", id)
}

fn validate_path_segment(field: &str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_ID_BYTES {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_BYTES,
        });
    }

    if value.contains('/') {
        return Err(invalid(field, "must not contain '/'"));
    }

    if value == "." || value == ".." {
        return Err(invalid(field, "must not be '.' or '..'"));
    }

    if value.len() >= 4 && value.starts_with("__") && value.ends_with("__") {
        return Err(invalid(field, "ids of the form __name__ are reserved"));
    }

    Ok(())
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
