//! # Error Types
//!
//! Domain-specific error types for addrbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  addrbook-core errors (this file)                                      │
//! │  ├── CoreError        - Mutation misses, wrapped validation            │
//! │  └── ValidationError  - Malformed ids                                  │
//! │                                                                         │
//! │  addrbook-db errors (separate crate)                                   │
//! │  └── DbError          - Document store failures                        │
//! │                                                                         │
//! │  addrbook-store errors                                                 │
//! │  ├── BackendError     - Remote auth/document failures                  │
//! │  └── StoreError       - What the UI sees from an action                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → UI                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors reported by state mutations and domain checks.
///
/// A mutation that returns one of these has left the state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No address with this id is in the local list.
    ///
    /// ## When This Occurs
    /// - `update_address` / `delete_address` with an id that was never fetched
    /// - The entry was already removed by an earlier delete
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} bytes")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., a slash inside a document id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
