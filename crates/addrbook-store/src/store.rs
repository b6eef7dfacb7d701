//! # Store
//!
//! The state container the UI dispatches actions to and reads getters from.
//!
//! ## Action Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Address Action Lifecycle                           │
//! │                                                                         │
//! │  store.add_address(fields)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. uid guard ─────────── no user ──────► Err(Unauthenticated)          │
//! │       │                                   (no remote call)             │
//! │       ▼                                                                 │
//! │  2. remote call (no lock held) ── fails ► Err(RemoteFailure)            │
//! │       │                                   (state untouched)            │
//! │       ▼                                                                 │
//! │  3. write lock, same user still signed in? ── no ► Err(SessionChanged) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. apply exactly one mutation                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  5. emit StoreChange::Addresses                                        │
//! │                                                                         │
//! │  update/delete also check the id against the local cache before       │
//! │  step 2, so a missing id is NotFound without touching the backend.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! State sits behind a tokio `RwLock`. Locks are only taken around
//! synchronous mutations and reads, never across a backend await, so
//! in-flight actions interleave freely and each applies its mutation when
//! its own round trip completes. Nothing is updated optimistically.

use std::sync::Arc;

use addrbook_core::{
    addresses_path, validate_document_id, validate_uid, Address, AuthProviderKind, Document,
    LoginUser, Post, StoreState,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::backend::{AuthBackend, DocumentBackend, MemoryBackend, SqliteDocumentBackend};
use crate::config::{BackendKind, StoreConfig};
use crate::error::{BackendError, StoreError, StoreResult};
use crate::events::{NoOpEmitter, StoreChange, StoreEventEmitter};

// =============================================================================
// Store
// =============================================================================

/// Client-side state plus the backends that keep it in sync.
///
/// Cloning is cheap: clones share state, backends and emitter.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<StoreState>>,
    auth: Arc<dyn AuthBackend>,
    documents: Arc<dyn DocumentBackend>,
    emitter: Arc<dyn StoreEventEmitter>,

    /// Provider `login` signs in with.
    provider: AuthProviderKind,
}

impl Store {
    /// Creates a store with empty state and no change notifications.
    pub fn new(auth: Arc<dyn AuthBackend>, documents: Arc<dyn DocumentBackend>) -> Self {
        Self::with_emitter(auth, documents, Arc::new(NoOpEmitter))
    }

    /// Creates a store with a custom event emitter.
    pub fn with_emitter(
        auth: Arc<dyn AuthBackend>,
        documents: Arc<dyn DocumentBackend>,
        emitter: Arc<dyn StoreEventEmitter>,
    ) -> Self {
        Store {
            state: Arc::new(RwLock::new(StoreState::new())),
            auth,
            documents,
            emitter,
            provider: AuthProviderKind::default(),
        }
    }

    /// Builds a store from configuration.
    ///
    /// Sign-in always goes through the local emulator. Documents live in
    /// memory or in the configured SQLite file.
    pub async fn from_config(
        config: &StoreConfig,
        emitter: Arc<dyn StoreEventEmitter>,
    ) -> StoreResult<Self> {
        config.validate()?;

        let memory = Arc::new(MemoryBackend::new(config.auth.emulator_user()));

        let documents: Arc<dyn DocumentBackend> = match config.backend_kind() {
            BackendKind::Memory => memory.clone() as Arc<dyn DocumentBackend>,
            BackendKind::Sqlite => {
                let path = config.database_path().ok_or_else(|| {
                    StoreError::InvalidConfig("No database path available".into())
                })?;
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::InvalidConfig(format!(
                            "Cannot create {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }

                let db = addrbook_db::Database::new(addrbook_db::DbConfig::new(path))
                    .await
                    .map_err(BackendError::from)?;
                Arc::new(SqliteDocumentBackend::new(&db)) as Arc<dyn DocumentBackend>
            }
        };

        info!(
            backend = %config.backend_kind(),
            provider = %config.provider(),
            "Store initialized"
        );

        StoreBuilder::new()
            .with_auth(memory)
            .with_documents(documents)
            .with_emitter(emitter)
            .with_provider(config.provider())
            .with_drawer_open(config.ui.drawer_open)
            .build()
    }

    // =========================================================================
    // Session Actions
    // =========================================================================

    /// Starts a redirect sign-in with the configured provider.
    ///
    /// The user is not set here; call [`Store::refresh_login_user`] once the
    /// provider reports completion.
    pub async fn login(&self) -> StoreResult<()> {
        info!(provider = %self.provider, "Starting redirect sign-in");

        self.auth
            .sign_in_with_redirect(self.provider)
            .await
            .map_err(|e| {
                error!(error = %e, "Sign-in failed");
                self.fail(e.into())
            })
    }

    /// Requests sign-out from the provider.
    pub async fn logout(&self) -> StoreResult<()> {
        info!("Signing out");

        self.auth.sign_out().await.map_err(|e| {
            error!(error = %e, "Sign-out failed");
            self.fail(e.into())
        })
    }

    /// Reads the provider's current user into state.
    ///
    /// When the uid differs from the cached one, the address cache is
    /// cleared first so it never shows another user's documents.
    pub async fn refresh_login_user(&self) -> StoreResult<Option<LoginUser>> {
        let user = self.auth.current_user().await.map_err(|e| {
            error!(error = %e, "Failed to read current user");
            self.fail(e.into())
        })?;

        self.apply_login_user(user.clone()).await;

        info!(uid = ?user.as_ref().map(|u| u.uid.as_str()), "Login user refreshed");
        Ok(user)
    }

    /// Replaces the login user directly.
    ///
    /// Like [`Store::refresh_login_user`], a different uid drops the address cache.
    pub async fn set_login_user(&self, user: Option<LoginUser>) {
        self.apply_login_user(user).await;
        debug!("Login user set");
    }

    /// Clears the login user directly, along with the address cache.
    pub async fn delete_login_user(&self) {
        self.apply_login_user(None).await;
        debug!("Login user cleared");
    }

    // =========================================================================
    // Local Actions
    // =========================================================================

    /// Flips the side menu and returns the new value.
    pub async fn toggle_side_menu(&self) -> bool {
        let open = {
            let mut state = self.state.write().await;
            state.toggle_side_menu();
            state.drawer_open()
        };
        debug!(open, "Side menu toggled");
        self.emitter.emit_change(StoreChange::Drawer);
        open
    }

    /// Appends a post locally. Posts are never sent to the backend.
    pub async fn add_post(&self, fields: Document) {
        self.state.write().await.add_post(fields);
        debug!("Post added");
        self.emitter.emit_change(StoreChange::Posts);
    }

    // =========================================================================
    // Address Actions
    // =========================================================================

    /// Loads the signed-in user's addresses into the cache.
    ///
    /// ## Returns
    /// The number of documents read. Documents already cached under the
    /// same id are replaced, not duplicated.
    pub async fn fetch_addresses(&self) -> StoreResult<usize> {
        let uid = self.require_uid("fetch_addresses").await?;
        let path = addresses_path(&uid);

        let docs = self.documents.list(&path).await.map_err(|e| {
            error!(uid = %uid, error = %e, "Failed to fetch addresses");
            self.fail(e.into())
        })?;
        let count = docs.len();

        {
            let mut state = self.state.write().await;
            self.ensure_session(&state, &uid)?;
            for doc in docs {
                state.add_address(doc.id, doc.data);
            }
        }

        self.emitter.emit_change(StoreChange::Addresses);
        info!(uid = %uid, count, "Fetched addresses");
        Ok(count)
    }

    /// Creates an address remotely, then caches it under the assigned id.
    pub async fn add_address(&self, fields: Document) -> StoreResult<Address> {
        let uid = self.require_uid("add_address").await?;
        let path = addresses_path(&uid);

        let id = self.documents.add(&path, &fields).await.map_err(|e| {
            error!(uid = %uid, error = %e, "Failed to add address");
            self.fail(e.into())
        })?;

        let address = Address::new(id, fields);
        {
            let mut state = self.state.write().await;
            self.ensure_session(&state, &uid)?;
            state.add_address(address.id.clone(), address.fields.clone());
        }

        self.emitter.emit_change(StoreChange::Addresses);
        info!(uid = %uid, address_id = %address.id, "Address added");
        Ok(address)
    }

    /// Writes `fields` to an existing address, then replaces the cached copy.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - id not cached; the backend is not called
    pub async fn update_address(&self, id: &str, fields: Document) -> StoreResult<()> {
        let uid = self.require_uid("update_address").await?;
        self.check_cached_id(id).await?;
        let path = addresses_path(&uid);

        self.documents.update(&path, id, &fields).await.map_err(|e| {
            error!(uid = %uid, address_id = %id, error = %e, "Failed to update address");
            self.fail(e.into())
        })?;

        {
            let mut state = self.state.write().await;
            self.ensure_session(&state, &uid)?;
            state.update_address(id, fields).map_err(|e| {
                warn!(address_id = %id, "Address left the cache during update");
                self.fail(e.into())
            })?;
        }

        self.emitter.emit_change(StoreChange::Addresses);
        info!(uid = %uid, address_id = %id, "Address updated");
        Ok(())
    }

    /// Deletes an address remotely, then drops it from the cache.
    ///
    /// ## Returns
    /// * `Ok(address)` - the removed entry
    /// * `Err(NotFound)` - id not cached; the backend is not called
    pub async fn delete_address(&self, id: &str) -> StoreResult<Address> {
        let uid = self.require_uid("delete_address").await?;
        self.check_cached_id(id).await?;
        let path = addresses_path(&uid);

        self.documents.delete(&path, id).await.map_err(|e| {
            error!(uid = %uid, address_id = %id, error = %e, "Failed to delete address");
            self.fail(e.into())
        })?;

        let removed = {
            let mut state = self.state.write().await;
            self.ensure_session(&state, &uid)?;
            state.delete_address(id).map_err(|e| {
                warn!(address_id = %id, "Address left the cache during delete");
                self.fail(e.into())
            })?
        };

        self.emitter.emit_change(StoreChange::Addresses);
        info!(uid = %uid, address_id = %id, "Address deleted");
        Ok(removed)
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Runs `f` against the current state under a read lock.
    pub async fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&StoreState) -> R,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// A copy of the whole state.
    pub async fn snapshot(&self) -> StoreState {
        self.with_state(|s| s.clone()).await
    }

    pub async fn user_name(&self) -> String {
        self.with_state(|s| s.user_name().to_string()).await
    }

    pub async fn photo_url(&self) -> String {
        self.with_state(|s| s.photo_url().to_string()).await
    }

    pub async fn uid(&self) -> Option<String> {
        self.with_state(|s| s.uid().map(str::to_owned)).await
    }

    pub async fn is_logged_in(&self) -> bool {
        self.with_state(|s| s.is_logged_in()).await
    }

    pub async fn address_by_id(&self, id: &str) -> Option<Address> {
        self.with_state(|s| s.address_by_id(id).cloned()).await
    }

    pub async fn addresses(&self) -> Vec<Address> {
        self.with_state(|s| s.addresses.clone()).await
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.with_state(|s| s.posts.clone()).await
    }

    pub async fn drawer_open(&self) -> bool {
        self.with_state(|s| s.drawer_open()).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Reports a failed action to the emitter and hands the error back.
    fn fail(&self, err: StoreError) -> StoreError {
        self.emitter.emit_error(&err);
        err
    }

    /// Stores `user`, clearing cached addresses first if the uid changes.
    async fn apply_login_user(&self, user: Option<LoginUser>) {
        let cleared = {
            let mut state = self.state.write().await;
            let uid_changed = state.uid() != user.as_ref().map(|u| u.uid.as_str());
            let cleared = uid_changed && !state.addresses.is_empty();
            if cleared {
                state.clear_addresses();
            }
            match user {
                Some(user) => state.set_login_user(Some(user)),
                None => state.delete_login_user(),
            }
            cleared
        };

        if cleared {
            debug!("Cleared address cache for new session");
            self.emitter.emit_change(StoreChange::Addresses);
        }
        self.emitter.emit_change(StoreChange::LoginUser);
    }

    async fn require_uid(&self, action: &'static str) -> StoreResult<String> {
        let uid = self.uid().await;

        match uid {
            Some(uid) => {
                validate_uid(&uid).map_err(|e| self.fail(e.into()))?;
                Ok(uid)
            }
            None => {
                warn!(action, "Address action requires a signed-in user");
                Err(self.fail(StoreError::Unauthenticated))
            }
        }
    }

    async fn check_cached_id(&self, id: &str) -> StoreResult<()> {
        validate_document_id(id).map_err(|e| self.fail(e.into()))?;

        if self.address_by_id(id).await.is_none() {
            warn!(address_id = %id, "Address not in cache");
            return Err(self.fail(StoreError::not_found("Address", id)));
        }
        Ok(())
    }

    /// The user a request was issued for must still be the signed-in one.
    fn ensure_session(&self, state: &StoreState, uid: &str) -> StoreResult<()> {
        if state.uid() == Some(uid) {
            return Ok(());
        }
        warn!(uid = %uid, "Session changed while request was in flight, discarding result");
        Err(self.fail(StoreError::SessionChanged {
            uid: uid.to_string(),
        }))
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a Store with options.
#[derive(Default)]
pub struct StoreBuilder {
    auth: Option<Arc<dyn AuthBackend>>,
    documents: Option<Arc<dyn DocumentBackend>>,
    emitter: Option<Arc<dyn StoreEventEmitter>>,
    provider: AuthProviderKind,
    initial_state: StoreState,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the auth backend.
    pub fn with_auth(mut self, auth: Arc<dyn AuthBackend>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the document backend.
    pub fn with_documents(mut self, documents: Arc<dyn DocumentBackend>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn StoreEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Sets the provider `login` uses.
    pub fn with_provider(mut self, provider: AuthProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Sets whether the side menu starts open.
    pub fn with_drawer_open(mut self, open: bool) -> Self {
        self.initial_state.ui.drawer = open;
        self
    }

    /// Builds the Store.
    pub fn build(self) -> StoreResult<Store> {
        let auth = self
            .auth
            .ok_or_else(|| StoreError::InvalidConfig("Auth backend required".into()))?;
        let documents = self
            .documents
            .ok_or_else(|| StoreError::InvalidConfig("Document backend required".into()))?;
        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));

        Ok(Store {
            state: Arc::new(RwLock::new(self.initial_state)),
            auth,
            documents,
            emitter,
            provider: self.provider,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RemoteDocument;
    use crate::events::{ChannelEmitter, StoreEvent};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::{broadcast, Notify};

    const PATH: &str = "users/u1/addresses";

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn setup() -> (Store, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new(
            LoginUser::new("u1")
                .with_display_name("Taro")
                .with_photo_url("https://example.com/taro.png"),
        ));
        let store = Store::new(backend.clone(), backend.clone());
        (store, backend)
    }

    async fn signed_in() -> (Store, Arc<MemoryBackend>) {
        let (store, backend) = setup();
        store.login().await.unwrap();
        store.refresh_login_user().await.unwrap();
        (store, backend)
    }

    fn drain(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_login_and_refresh_sets_user() {
        let (store, backend) = setup();

        store.login().await.unwrap();
        assert!(!store.is_logged_in().await);

        let user = store.refresh_login_user().await.unwrap();

        assert_eq!(user.map(|u| u.uid), Some("u1".to_string()));
        assert_eq!(store.user_name().await, "Taro");
        assert_eq!(store.photo_url().await, "https://example.com/taro.png");
        assert_eq!(store.uid().await.as_deref(), Some("u1"));
        assert_eq!(backend.calls().sign_in, 1);
    }

    #[tokio::test]
    async fn test_logout_then_refresh_clears_user_and_cache() {
        let (store, backend) = signed_in().await;
        backend.queue_ids(["a1"]);
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        store.logout().await.unwrap();
        store.refresh_login_user().await.unwrap();

        assert_eq!(store.user_name().await, "");
        assert_eq!(store.photo_url().await, "");
        assert_eq!(store.uid().await, None);
        assert!(store.addresses().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_address_stamps_backend_id() {
        let (store, backend) = signed_in().await;
        backend.queue_ids(["a1"]);

        let address = store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        assert_eq!(address.id, "a1");
        let cached = store.addresses().await;
        assert_eq!(
            serde_json::to_value(&cached).unwrap(),
            json!([{"id": "a1", "street": "Main St"}])
        );
        assert_eq!(backend.documents(PATH).len(), 1);
    }

    #[tokio::test]
    async fn test_add_address_without_user() {
        let (store, backend) = setup();

        let result = store.add_address(doc(json!({"street": "Main St"}))).await;

        assert_eq!(result, Err(StoreError::Unauthenticated));
        assert_eq!(backend.calls().document_calls(), 0);
        assert!(store.addresses().await.is_empty());
    }

    #[tokio::test]
    async fn test_address_actions_all_guard_on_uid() {
        let (store, backend) = setup();

        assert_eq!(store.fetch_addresses().await, Err(StoreError::Unauthenticated));
        assert_eq!(
            store.update_address("a1", Document::new()).await,
            Err(StoreError::Unauthenticated)
        );
        assert_eq!(
            store.delete_address("a1").await,
            Err(StoreError::Unauthenticated)
        );
        assert_eq!(backend.calls().document_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_addresses_does_not_duplicate() {
        let (store, backend) = signed_in().await;
        backend.insert_documents(
            PATH,
            vec![
                RemoteDocument::new("a1", doc(json!({"street": "Main St"}))),
                RemoteDocument::new("a2", doc(json!({"street": "Side St"}))),
            ],
        );

        assert_eq!(store.fetch_addresses().await.unwrap(), 2);
        assert_eq!(store.fetch_addresses().await.unwrap(), 2);

        let ids: Vec<String> = store.addresses().await.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert_eq!(
            store.address_by_id("a2").await.unwrap().get("street"),
            Some(&json!("Side St"))
        );
    }

    #[tokio::test]
    async fn test_update_address_replaces_cached_copy() {
        let (store, backend) = signed_in().await;
        backend.queue_ids(["a1"]);
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        let replacement = doc(json!({"street": "Elm St", "city": "Kyoto"}));
        store.update_address("a1", replacement.clone()).await.unwrap();

        assert_eq!(
            store.address_by_id("a1").await,
            Some(Address::new("a1", replacement))
        );
        assert_eq!(backend.documents(PATH)[0].data.get("city"), Some(&json!("Kyoto")));
    }

    #[tokio::test]
    async fn test_update_missing_address_skips_backend() {
        let (store, backend) = signed_in().await;

        let result = store.update_address("missing", doc(json!({"street": "X"}))).await;

        assert_eq!(result, Err(StoreError::not_found("Address", "missing")));
        assert_eq!(backend.calls().update, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_address_leaves_list_intact() {
        let (store, backend) = signed_in().await;
        backend.queue_ids(["a1", "a2"]);
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();
        store.add_address(doc(json!({"street": "Side St"}))).await.unwrap();

        let result = store.delete_address("missing").await;

        assert_eq!(result, Err(StoreError::not_found("Address", "missing")));
        assert_eq!(store.addresses().await.len(), 2);
        assert_eq!(backend.calls().delete, 0);
    }

    #[tokio::test]
    async fn test_delete_address() {
        let (store, backend) = signed_in().await;
        backend.queue_ids(["a1", "a2"]);
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();
        store.add_address(doc(json!({"street": "Side St"}))).await.unwrap();

        let removed = store.delete_address("a1").await.unwrap();

        assert_eq!(removed.id, "a1");
        assert_eq!(store.addresses().await.len(), 1);
        assert!(store.address_by_id("a1").await.is_none());
        assert_eq!(backend.documents(PATH).len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_document_id_is_rejected_before_backend() {
        let (store, backend) = signed_in().await;

        let result = store.delete_address("a/b").await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(backend.calls().delete, 0);
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_state_and_notifies() {
        let backend = Arc::new(MemoryBackend::new(LoginUser::new("u1")));
        let (emitter, mut rx) = ChannelEmitter::new(16);
        let store = Store::with_emitter(backend.clone(), backend.clone(), Arc::new(emitter));
        store.login().await.unwrap();
        store.refresh_login_user().await.unwrap();
        drain(&mut rx);

        backend.set_failure(Some(BackendError::Unavailable("offline".into())));
        let err = store
            .add_address(doc(json!({"street": "Main St"})))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::RemoteFailure(BackendError::Unavailable(_))));
        assert!(err.is_retryable());
        assert!(store.addresses().await.is_empty());
        assert_eq!(
            drain(&mut rx),
            vec![StoreEvent::Error {
                message: err.to_string(),
                retryable: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_change_events_follow_mutations() {
        let backend = Arc::new(MemoryBackend::new(LoginUser::new("u1")));
        let (emitter, mut rx) = ChannelEmitter::new(16);
        let store = Store::with_emitter(backend.clone(), backend.clone(), Arc::new(emitter));

        store.login().await.unwrap();
        store.refresh_login_user().await.unwrap();
        store.toggle_side_menu().await;
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        let changes: Vec<StoreChange> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                StoreEvent::Changed { change } => Some(change),
                StoreEvent::Error { .. } => None,
            })
            .collect();
        assert_eq!(
            changes,
            vec![StoreChange::LoginUser, StoreChange::Drawer, StoreChange::Addresses]
        );
    }

    #[tokio::test]
    async fn test_local_actions() {
        let (store, backend) = setup();

        assert!(store.toggle_side_menu().await);
        assert!(!store.toggle_side_menu().await);

        store.add_post(doc(json!({"message": "hello"}))).await;
        assert_eq!(store.posts().await.len(), 1);

        store.set_login_user(Some(LoginUser::new("u7"))).await;
        assert_eq!(store.uid().await.as_deref(), Some("u7"));
        store.delete_login_user().await;
        assert_eq!(store.uid().await, None);

        assert_eq!(backend.calls().document_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_with_new_user_clears_cache() {
        let (store, backend) = signed_in().await;
        backend.queue_ids(["a1"]);
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        backend.set_session(Some(LoginUser::new("u2")));
        store.refresh_login_user().await.unwrap();

        assert_eq!(store.uid().await.as_deref(), Some("u2"));
        assert!(store.addresses().await.is_empty());
    }

    #[tokio::test]
    async fn test_set_login_user_with_new_uid_clears_cache() {
        let backend = Arc::new(MemoryBackend::new(LoginUser::new("u1")));
        let (emitter, mut rx) = ChannelEmitter::new(16);
        let store = Store::with_emitter(backend.clone(), backend.clone(), Arc::new(emitter));

        store.set_login_user(Some(LoginUser::new("u1"))).await;
        backend.queue_ids(["a1"]);
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();
        drain(&mut rx);

        store.set_login_user(Some(LoginUser::new("u2"))).await;
        assert_eq!(store.uid().await.as_deref(), Some("u2"));
        assert!(store.addresses().await.is_empty());
        assert_eq!(
            drain(&mut rx),
            vec![
                StoreEvent::Changed { change: StoreChange::Addresses },
                StoreEvent::Changed { change: StoreChange::LoginUser },
            ]
        );

        let err = store.delete_address("a1").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(backend.calls().delete, 0);
        assert_eq!(backend.documents(PATH).len(), 1);
    }

    #[tokio::test]
    async fn test_set_login_user_same_uid_keeps_cache() {
        let (store, backend) = signed_in().await;
        backend.queue_ids(["a1"]);
        store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        store
            .set_login_user(Some(LoginUser::new("u1").with_display_name("Jiro")))
            .await;
        assert_eq!(store.user_name().await, "Jiro");
        assert_eq!(store.addresses().await.len(), 1);

        store.delete_login_user().await;
        assert!(store.addresses().await.is_empty());
    }

    /// Holds `add` until released, to interleave a session change.
    struct GatedDocuments {
        inner: Arc<MemoryBackend>,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl DocumentBackend for GatedDocuments {
        async fn list(&self, path: &str) -> crate::error::BackendResult<Vec<RemoteDocument>> {
            self.inner.list(path).await
        }

        async fn add(&self, path: &str, data: &Document) -> crate::error::BackendResult<String> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.add(path, data).await
        }

        async fn update(
            &self,
            path: &str,
            id: &str,
            data: &Document,
        ) -> crate::error::BackendResult<()> {
            self.inner.update(path, id, data).await
        }

        async fn delete(&self, path: &str, id: &str) -> crate::error::BackendResult<()> {
            self.inner.delete(path, id).await
        }
    }

    #[tokio::test]
    async fn test_result_discarded_when_session_changes_mid_flight() {
        let backend = Arc::new(MemoryBackend::new(LoginUser::new("u1")));
        let gated = Arc::new(GatedDocuments {
            inner: backend.clone(),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let store = Store::new(backend.clone(), gated.clone());
        store.set_login_user(Some(LoginUser::new("u1"))).await;

        let pending = {
            let store = store.clone();
            tokio::spawn(async move { store.add_address(doc(json!({"street": "Main St"}))).await })
        };

        gated.entered.notified().await;
        store.set_login_user(Some(LoginUser::new("u2"))).await;
        gated.release.notify_one();

        let result = pending.await.unwrap();
        assert_eq!(
            result,
            Err(StoreError::SessionChanged {
                uid: "u1".to_string()
            })
        );
        assert!(store.addresses().await.is_empty());
    }

    #[tokio::test]
    async fn test_builder_requires_backends() {
        let result = StoreBuilder::new().build();
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let mut config = StoreConfig::default();
        config.auth.emulator_uid = "u9".into();
        config.ui.drawer_open = true;

        let store = Store::from_config(&config, Arc::new(NoOpEmitter)).await.unwrap();
        assert!(store.drawer_open().await);

        store.login().await.unwrap();
        store.refresh_login_user().await.unwrap();
        let address = store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        store.delete_login_user().await;
        store.refresh_login_user().await.unwrap();
        assert_eq!(store.fetch_addresses().await.unwrap(), 1);
        assert_eq!(store.address_by_id(&address.id).await, Some(address));
    }

    #[tokio::test]
    async fn test_from_config_sqlite_backend() {
        let path = std::env::temp_dir().join(format!("addrbook-store-{}.db", std::process::id()));
        let mut config = StoreConfig::default();
        config.backend.kind = BackendKind::Sqlite;
        config.backend.database_path = Some(path.clone());

        let store = Store::from_config(&config, Arc::new(NoOpEmitter)).await.unwrap();
        store.login().await.unwrap();
        store.refresh_login_user().await.unwrap();
        let address = store.add_address(doc(json!({"street": "Main St"}))).await.unwrap();

        let reopened = Store::from_config(&config, Arc::new(NoOpEmitter)).await.unwrap();
        reopened.login().await.unwrap();
        reopened.refresh_login_user().await.unwrap();
        assert_eq!(reopened.fetch_addresses().await.unwrap(), 1);
        assert_eq!(reopened.address_by_id(&address.id).await, Some(address));

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
