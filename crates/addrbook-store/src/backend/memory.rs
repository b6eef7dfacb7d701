//! # In-Memory Backend
//!
//! A process-local stand-in for the hosted auth provider and document
//! database. Used for development runs and throughout the tests.
//!
//! ## What It Emulates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MemoryBackend                                    │
//! │                                                                         │
//! │  Auth                                 Documents                         │
//! │  ────                                 ─────────                         │
//! │  sign_in_with_redirect(p)             collections: path → [doc, ...]    │
//! │    → session = emulator user          add: next queued id or random     │
//! │      (anonymous: uid only)            update: top-level merge           │
//! │  sign_out → session = None            update/delete on missing id       │
//! │  current_user → session                 → BackendError::NotFound        │
//! │                                                                         │
//! │  Test hooks                                                             │
//! │  ──────────                                                             │
//! │  set_failure(Some(err))  every call fails with err until cleared        │
//! │  queue_ids([..])         ids handed out by the next adds                │
//! │  calls()                 per-method call counters                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use addrbook_core::{AuthProviderKind, Document, LoginUser};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{AuthBackend, DocumentBackend, RemoteDocument};
use crate::error::{BackendError, BackendResult};

/// How many times each port method has been called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub sign_in: usize,
    pub sign_out: usize,
    pub current_user: usize,
    pub list: usize,
    pub add: usize,
    pub update: usize,
    pub delete: usize,
}

impl CallCounts {
    /// Calls made to the document port.
    pub fn document_calls(&self) -> usize {
        self.list + self.add + self.update + self.delete
    }
}

#[derive(Debug, Default)]
struct Inner {
    session: Option<LoginUser>,
    collections: HashMap<String, Vec<RemoteDocument>>,
    queued_ids: VecDeque<String>,
    failure: Option<BackendError>,
    calls: CallCounts,
}

/// In-process implementation of both backend ports.
#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,

    /// User a redirect sign-in resolves to.
    emulator_user: LoginUser,
}

impl MemoryBackend {
    /// Creates an empty backend whose sign-in resolves to `emulator_user`.
    pub fn new(emulator_user: LoginUser) -> Self {
        MemoryBackend {
            inner: Mutex::new(Inner::default()),
            emulator_user,
        }
    }

    /// Makes every subsequent call fail with `failure` (or succeed again with `None`).
    pub fn set_failure(&self, failure: Option<BackendError>) {
        self.with_inner(|inner| inner.failure = failure);
    }

    /// Ids handed out, in order, by the next `add` calls.
    pub fn queue_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_inner(|inner| inner.queued_ids.extend(ids.into_iter().map(Into::into)));
    }

    /// Replaces the session directly, as if the provider changed it out of band.
    pub fn set_session(&self, user: Option<LoginUser>) {
        self.with_inner(|inner| inner.session = user);
    }

    /// Seeds a collection with existing documents.
    pub fn insert_documents(&self, path: &str, docs: Vec<RemoteDocument>) {
        self.with_inner(|inner| {
            inner
                .collections
                .entry(path.to_string())
                .or_default()
                .extend(docs)
        });
    }

    /// Current contents of a collection.
    pub fn documents(&self, path: &str) -> Vec<RemoteDocument> {
        self.with_inner(|inner| inner.collections.get(path).cloned().unwrap_or_default())
    }

    /// Call counters so far.
    pub fn calls(&self) -> CallCounts {
        self.with_inner(|inner| inner.calls)
    }

    fn with_inner<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Inner) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    // A panic while holding the lock cannot leave Inner half-written, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(LoginUser::new("emulator-user").with_display_name("Emulator User"))
    }
}

/// Collection paths alternate collection/document segments and end on a collection.
fn check_collection_path(path: &str) -> BackendResult<()> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) || segments.len() % 2 == 0 {
        return Err(BackendError::InvalidArgument(format!(
            "'{}' is not a collection path",
            path
        )));
    }
    Ok(())
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in_with_redirect(&self, provider: AuthProviderKind) -> BackendResult<()> {
        let mut inner = self.lock();
        inner.calls.sign_in += 1;
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }

        let user = match provider {
            AuthProviderKind::Anonymous => LoginUser::new(self.emulator_user.uid.clone()),
            _ => self.emulator_user.clone(),
        };
        debug!(provider = %provider, uid = %user.uid, "Emulator sign-in");
        inner.session = Some(user);
        Ok(())
    }

    async fn sign_out(&self) -> BackendResult<()> {
        let mut inner = self.lock();
        inner.calls.sign_out += 1;
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }

        inner.session = None;
        Ok(())
    }

    async fn current_user(&self) -> BackendResult<Option<LoginUser>> {
        let mut inner = self.lock();
        inner.calls.current_user += 1;
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }

        Ok(inner.session.clone())
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn list(&self, path: &str) -> BackendResult<Vec<RemoteDocument>> {
        let mut inner = self.lock();
        inner.calls.list += 1;
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }
        check_collection_path(path)?;

        Ok(inner.collections.get(path).cloned().unwrap_or_default())
    }

    async fn add(&self, path: &str, data: &Document) -> BackendResult<String> {
        let mut inner = self.lock();
        inner.calls.add += 1;
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }
        check_collection_path(path)?;

        let id = inner
            .queued_ids
            .pop_front()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        let mut body = data.clone();
        body.remove("id");
        inner
            .collections
            .entry(path.to_string())
            .or_default()
            .push(RemoteDocument::new(id.clone(), body));

        Ok(id)
    }

    async fn update(&self, path: &str, id: &str, data: &Document) -> BackendResult<()> {
        let mut inner = self.lock();
        inner.calls.update += 1;
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }
        check_collection_path(path)?;

        let doc = inner
            .collections
            .get_mut(path)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| BackendError::not_found(format!("{}/{}", path, id)))?;

        for (key, value) in data {
            if key != "id" {
                doc.data.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, path: &str, id: &str) -> BackendResult<()> {
        let mut inner = self.lock();
        inner.calls.delete += 1;
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }
        check_collection_path(path)?;

        let docs = inner
            .collections
            .get_mut(path)
            .ok_or_else(|| BackendError::not_found(format!("{}/{}", path, id)))?;
        let index = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| BackendError::not_found(format!("{}/{}", path, id)))?;

        docs.remove(index);
        Ok(())
    }
}
