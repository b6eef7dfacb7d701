//! # Store State
//!
//! The client-side cache the UI renders from, with its mutations and getters.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Operations                                     │
//! │                                                                         │
//! │  Action (addrbook-store)      Mutation              State Change        │
//! │  ───────────────────────      ────────              ────────────        │
//! │                                                                         │
//! │  auth callback ─────────────► set_login_user() ───► login_user = u     │
//! │  logout observed ───────────► delete_login_user() ► login_user = None  │
//! │  menu button ───────────────► toggle_side_menu() ─► drawer = !drawer   │
//! │  remote add ok ─────────────► add_address() ──────► addresses.push(a)  │
//! │  remote update ok ──────────► update_address() ───► addresses[i] = a   │
//! │  remote delete ok ──────────► delete_address() ───► addresses.remove(i)│
//! │  compose post ──────────────► add_post() ─────────► posts.push(p)      │
//! │                                                                         │
//! │  NOTE: Mutations never suspend and never panic. A keyed mutation that   │
//! │        misses reports CoreError::AddressNotFound and changes nothing.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Address, Document, LoginUser, Post, UiState};

/// Application state shared by every UI component.
///
/// ## Invariants
/// - Address ids are unique within `addresses`
/// - `login_user` is `None` exactly when nobody is signed in
/// - `addresses` keeps retrieval/creation order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreState {
    /// Signed-in user, `None` when logged out.
    pub login_user: Option<LoginUser>,

    /// Local UI toggles.
    pub ui: UiState,

    /// Cached address documents.
    pub addresses: Vec<Address>,

    /// Locally composed posts.
    pub posts: Vec<Post>,
}

impl StoreState {
    /// Creates an empty, logged-out state with the drawer closed.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replaces the login user wholesale.
    pub fn set_login_user(&mut self, user: Option<LoginUser>) {
        self.login_user = user;
    }

    /// Clears the login user.
    pub fn delete_login_user(&mut self) {
        self.login_user = None;
    }

    /// Flips the side menu open/closed.
    pub fn toggle_side_menu(&mut self) {
        self.ui.drawer = !self.ui.drawer;
    }

    /// Stamps `id` onto `fields` and appends the address.
    ///
    /// ## Behavior
    /// - Id not in list: appended at the end
    /// - Id already in list: that entry is replaced in place, so ids stay
    ///   unique and a second fetch does not duplicate entries
    pub fn add_address(&mut self, id: impl Into<String>, fields: Document) {
        let address = Address::new(id, fields);

        match self.position_of(&address.id) {
            Some(index) => self.addresses[index] = address,
            None => self.addresses.push(address),
        }
    }

    /// Replaces the first address with a matching id, keeping the id.
    ///
    /// ## Returns
    /// - `Ok(())` on success
    /// - `Err(CoreError::AddressNotFound)` if the id is absent (state unchanged)
    pub fn update_address(&mut self, id: &str, fields: Document) -> CoreResult<()> {
        let index = self
            .position_of(id)
            .ok_or_else(|| CoreError::AddressNotFound(id.to_string()))?;

        self.addresses[index] = Address::new(id, fields);
        Ok(())
    }

    /// Removes the first address with a matching id and returns it.
    ///
    /// ## Returns
    /// - `Ok(Address)` with the removed entry
    /// - `Err(CoreError::AddressNotFound)` if the id is absent (state unchanged)
    pub fn delete_address(&mut self, id: &str) -> CoreResult<Address> {
        let index = self
            .position_of(id)
            .ok_or_else(|| CoreError::AddressNotFound(id.to_string()))?;

        Ok(self.addresses.remove(index))
    }

    /// Appends a post. Posts get no identifier.
    pub fn add_post(&mut self, fields: Document) {
        self.posts.push(Post::new(fields));
    }

    /// Drops every cached address.
    ///
    /// Used when the signed-in user changes so one user's addresses are
    /// never shown in another user's session.
    pub fn clear_addresses(&mut self) {
        self.addresses.clear();
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Display name of the signed-in user, or `""`.
    pub fn user_name(&self) -> &str {
        self.login_user
            .as_ref()
            .and_then(|u| u.display_name.as_deref())
            .unwrap_or("")
    }

    /// Avatar URL of the signed-in user, or `""`.
    pub fn photo_url(&self) -> &str {
        self.login_user
            .as_ref()
            .and_then(|u| u.photo_url.as_deref())
            .unwrap_or("")
    }

    /// Id of the signed-in user, or `None` when logged out.
    pub fn uid(&self) -> Option<&str> {
        self.login_user.as_ref().map(|u| u.uid.as_str())
    }

    /// First cached address with this id.
    pub fn address_by_id(&self, id: &str) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    /// True when a user is signed in.
    pub fn is_logged_in(&self) -> bool {
        self.login_user.is_some()
    }

    /// True when the side menu is open.
    pub fn drawer_open(&self) -> bool {
        self.ui.drawer
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.addresses.iter().position(|a| a.id == id)
    }
}
