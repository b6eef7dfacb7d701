//! # addrbook-store: State Store for Addrbook
//!
//! This crate is the state container the UI talks to. It holds the cached
//! login user, side-menu toggle, addresses and posts, and keeps addresses in
//! step with a remote document database.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store Architecture                               │
//! │                                                                         │
//! │  UI layer                                                              │
//! │    │ actions (async)                 ▲ getters / StoreChange events    │
//! │    ▼                                 │                                  │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         Store                                    │  │
//! │  │   Arc<RwLock<StoreState>>  (mutations from addrbook-core)        │  │
//! │  │   Arc<dyn StoreEventEmitter>                                     │  │
//! │  └───────────────┬──────────────────────────────┬───────────────────┘  │
//! │                  ▼                              ▼                       │
//! │        ┌──────────────────┐          ┌────────────────────┐            │
//! │        │  AuthBackend     │          │  DocumentBackend   │            │
//! │        └────────┬─────────┘          └─────────┬──────────┘            │
//! │                 │                              │                        │
//! │           MemoryBackend            MemoryBackend | SqliteDocumentBackend│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The Store and its actions and getters
//! - [`backend`] - Auth and document ports plus local implementations
//! - [`config`] - TOML/env configuration
//! - [`events`] - Change notification for UI bindings
//! - [`error`] - Store and backend error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use addrbook_store::{MemoryBackend, Store};
//!
//! let backend = Arc::new(MemoryBackend::default());
//! let store = Store::new(backend.clone(), backend);
//!
//! store.login().await?;
//! store.refresh_login_user().await?;
//! store.fetch_addresses().await?;
//! println!("{} addresses", store.addresses().await.len());
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{
    AuthBackend, CallCounts, DocumentBackend, MemoryBackend, RemoteDocument,
    SqliteDocumentBackend,
};
pub use config::{AuthSettings, BackendKind, BackendSettings, StoreConfig, UiSettings};
pub use error::{BackendError, BackendResult, StoreError, StoreResult};
pub use events::{ChannelEmitter, NoOpEmitter, StoreChange, StoreEvent, StoreEventEmitter};
pub use store::{Store, StoreBuilder};
