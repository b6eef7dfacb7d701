//! # addrbook-core: Pure State for Addrbook
//!
//! This crate is the **heart** of the Addrbook client. It holds the state
//! shape the UI renders from, the synchronous mutations that change it, and
//! the derived getters that read it. There is zero I/O here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Addrbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI Components                                │   │
//! │  │    Side menu ──► Address list ──► Address form ──► Posts        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dispatch actions / read getters        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 addrbook-store (actions)                        │   │
//! │  │    login, fetch_addresses, add_address, delete_address ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ apply mutation on success              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ addrbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   state   │  │   error   │  │ validation│  │   │
//! │  │   │ LoginUser │  │ mutations │  │ CoreError │  │ ids/paths │  │   │
//! │  │   │ Address   │  │ getters   │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LoginUser, Address, Post, UiState)
//! - [`state`] - `StoreState` with its mutations and getters
//! - [`error`] - Domain error types
//! - [`validation`] - Document id and user id rules
//!
//! ## Example Usage
//!
//! ```rust
//! use addrbook_core::{Document, StoreState};
//!
//! let mut state = StoreState::new();
//! let mut fields = Document::new();
//! fields.insert("street".into(), "Main St".into());
//!
//! state.add_address("a1", fields);
//! assert_eq!(state.addresses.len(), 1);
//! assert!(state.address_by_id("a1").is_some());
//! assert_eq!(state.user_name(), "");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use state::StoreState;
pub use types::*;
pub use validation::{validate_document_id, validate_uid, MAX_ID_BYTES};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Top-level collection holding one document per user.
pub const USERS_COLLECTION: &str = "users";

/// Per-user sub-collection holding that user's addresses.
pub const ADDRESSES_COLLECTION: &str = "addresses";

/// Builds the user-scoped address collection path: `users/{uid}/addresses`.
///
/// The uid is expected to be validated already (see
/// [`validation::validate_uid`]); this only formats.
pub fn addresses_path(uid: &str) -> String {
    format!("{}/{}/{}", USERS_COLLECTION, uid, ADDRESSES_COLLECTION)
}
