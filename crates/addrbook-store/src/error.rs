//! # Store Error Types
//!
//! Error types for store actions and the backends they call.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Session     │  │     Lookup      │  │       Remote            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Unauthenticated│  │  NotFound       │  │  RemoteFailure          │ │
//! │  │  SessionChanged │  │  Validation     │  │   └─ BackendError       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  Configuration  │   Nothing here is fatal to the process: every     │
//! │  │                 │   variant is returned to the caller, which can    │
//! │  │  InvalidConfig  │   retry, show it, or prompt a new sign-in.        │
//! │  │  ConfigLoad/Save│                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use addrbook_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for store actions.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for backend port calls.
pub type BackendResult<T> = Result<T, BackendError>;

// =============================================================================
// Backend Errors
// =============================================================================

/// Failure reported by an auth or document backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend could not be reached or is temporarily down.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Caller is not allowed to touch this path.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Document does not exist remotely.
    #[error("Document not found: {path}")]
    NotFound { path: String },

    /// Malformed path or document.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Anything else.
    #[error("Backend internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Creates a NotFound error for a document path.
    pub fn not_found(path: impl Into<String>) -> Self {
        BackendError::NotFound { path: path.into() }
    }

    /// Returns true if the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Error returned by every store action.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    // =========================================================================
    // Session Errors
    // =========================================================================
    /// An address action ran with nobody signed in.
    #[error("No signed-in user")]
    Unauthenticated,

    /// The signed-in user changed while a remote call was in flight.
    ///
    /// The remote result is not applied to the local cache.
    #[error("Signed-in user changed during request for {uid}")]
    SessionChanged { uid: String },

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    /// Keyed entity is not in the local cache.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Input failed validation before any remote call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The backend rejected or failed the call.
    #[error("Remote call failed: {0}")]
    RemoteFailure(#[from] BackendError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration is present but unusable.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true if the action can be retried as-is.
    ///
    /// Only transient backend failures qualify. Everything else needs a
    /// different input, a sign-in, or a config fix first.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::RemoteFailure(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidConfig(_)
                | StoreError::ConfigLoadFailed(_)
                | StoreError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the fix is to sign in (again).
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            StoreError::Unauthenticated | StoreError::SessionChanged { .. }
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AddressNotFound(id) => StoreError::not_found("Address", id),
            CoreError::Validation(v) => StoreError::Validation(v),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}
