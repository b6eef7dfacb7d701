//! # Backend Ports
//!
//! The two external collaborators of the store: an authentication provider
//! and a document database.
//!
//! ## Port Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Backend Ports                                    │
//! │                                                                         │
//! │                         ┌──────────┐                                    │
//! │                         │  Store   │                                    │
//! │                         └────┬─────┘                                    │
//! │              ┌───────────────┴────────────────┐                         │
//! │              ▼                                ▼                         │
//! │     ┌────────────────┐              ┌──────────────────┐                │
//! │     │  AuthBackend   │              │ DocumentBackend  │                │
//! │     │                │              │                  │                │
//! │     │ sign_in_with_  │              │ list(path)       │                │
//! │     │   redirect     │              │ add(path, data)  │                │
//! │     │ sign_out       │              │ update(path,id,d)│                │
//! │     │ current_user   │              │ delete(path, id) │                │
//! │     └───────┬────────┘              └────────┬─────────┘                │
//! │             │                                │                          │
//! │     MemoryBackend                   MemoryBackend                       │
//! │     (emulator session)              SqliteDocumentBackend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Paths are collection paths such as `users/{uid}/addresses`. Documents are
//! opaque JSON objects.

pub mod memory;
pub mod sqlite;

use addrbook_core::{AuthProviderKind, Document, LoginUser};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendResult;

pub use memory::{CallCounts, MemoryBackend};
pub use sqlite::SqliteDocumentBackend;

/// A document as returned by a collection read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDocument {
    /// Backend-assigned id.
    pub id: String,

    /// Document body.
    pub data: Document,
}

impl RemoteDocument {
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        RemoteDocument {
            id: id.into(),
            data,
        }
    }
}

/// Authentication provider port.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Starts a redirect-based sign-in.
    ///
    /// Completion is observed later through [`AuthBackend::current_user`].
    async fn sign_in_with_redirect(&self, provider: AuthProviderKind) -> BackendResult<()>;

    /// Ends the current session.
    async fn sign_out(&self) -> BackendResult<()>;

    /// Returns the signed-in user, `None` when signed out.
    async fn current_user(&self) -> BackendResult<Option<LoginUser>>;
}

/// Document database port.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Reads every document in a collection.
    async fn list(&self, path: &str) -> BackendResult<Vec<RemoteDocument>>;

    /// Creates a document and returns its assigned id.
    async fn add(&self, path: &str, data: &Document) -> BackendResult<String>;

    /// Writes the given top-level fields onto an existing document.
    async fn update(&self, path: &str, id: &str, data: &Document) -> BackendResult<()>;

    /// Removes a document.
    async fn delete(&self, path: &str, id: &str) -> BackendResult<()>;
}
