//! # addrbook-db: Document Store for Addrbook
//!
//! This crate stores collections of JSON documents in SQLite, giving the
//! store a local stand-in for the hosted document database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Addrbook Data Flow                               │
//! │                                                                         │
//! │  Store action (add_address)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteDocumentBackend (addrbook-store)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    addrbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (document.rs)  │   │  (embedded)  │  │   │
//! │  │   │               │    │                │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ DocumentRepo   │   │ 001_docs.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (documents table keyed by collection path + id)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use addrbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/addrbook.db")).await?;
//!
//! let docs = db.documents();
//! let id = docs.insert("users/u1/addresses", &fields).await?;
//! let all = docs.list("users/u1/addresses").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::document::{DocumentRepository, StoredDocument};
