//! # Repository Module
//!
//! Database repository implementations for Addrbook.
//!
//! ## Collections as Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Table, Many Collections                          │
//! │                                                                         │
//! │  Store action                                                          │
//! │       │                                                                 │
//! │       │  db.documents().list("users/u1/addresses")                     │
//! │       ▼                                                                 │
//! │  DocumentRepository                                                    │
//! │  ├── list(&self, collection)                                           │
//! │  ├── get(&self, collection, id)                                        │
//! │  ├── insert(&self, collection, data)     → new UUID id                 │
//! │  ├── update(&self, collection, id, data) → top-level merge             │
//! │  ├── delete(&self, collection, id)                                     │
//! │  └── count(&self, collection)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  documents (collection, id, data JSON, created_at, updated_at)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`document::DocumentRepository`] - Schemaless JSON documents grouped by collection path

pub mod document;
