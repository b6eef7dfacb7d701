//! # Domain Types
//!
//! The records the client caches from the backend.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   LoginUser     │   │    Address      │   │      Post       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  uid            │   │  id (backend)   │   │  fields...      │       │
//! │  │  displayName    │   │  fields...      │   │  (no id)        │       │
//! │  │  photoURL       │   │                 │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    UiState      │   │ AuthProviderKind│                             │
//! │  │  drawer: bool   │   │  Google (dflt)  │                             │
//! │  └─────────────────┘   │  GitHub, Anon   │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Opaque Documents
//! Address and post bodies are whatever the UI form put in them. They are
//! kept as a JSON object and serialized flat, so an address goes over the
//! wire as `{ "id": "a1", "street": "Main St", ... }`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// An opaque key/value document body.
pub type Document = Map<String, Value>;

// =============================================================================
// Login User
// =============================================================================

/// The authenticated user, as reported by the auth provider.
///
/// Field names on the wire follow the provider (`displayName`, `photoURL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginUser {
    /// Opaque user identifier. Scopes every per-user collection.
    pub uid: String,

    /// Name shown in the side menu. Providers may omit it.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Avatar URL. Providers may omit it.
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl LoginUser {
    /// Creates a user with only an id.
    pub fn new(uid: impl Into<String>) -> Self {
        LoginUser {
            uid: uid.into(),
            display_name: None,
            photo_url: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the photo URL.
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }
}

// =============================================================================
// Address
// =============================================================================

/// A cached address document.
///
/// `id` is assigned by the backend on creation and is unique within the
/// local address list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Backend-assigned document id.
    pub id: String,

    /// Everything else the document carries.
    #[serde(flatten)]
    pub fields: Document,
}

impl Address {
    /// Stamps `id` onto a document body.
    ///
    /// Any `id` key already inside `fields` is dropped so the flat JSON
    /// form never carries two ids.
    pub fn new(id: impl Into<String>, mut fields: Document) -> Self {
        fields.remove("id");
        Address {
            id: id.into(),
            fields,
        }
    }

    /// Returns a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

// =============================================================================
// Post
// =============================================================================

/// A locally composed post. Posts carry no identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Post {
    /// Post body.
    #[serde(flatten)]
    pub fields: Document,
}

impl Post {
    /// Wraps a document body.
    pub fn new(fields: Document) -> Self {
        Post { fields }
    }
}

// =============================================================================
// UI State
// =============================================================================

/// Purely local UI toggles. Never persisted remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UiState {
    /// Side panel open (`true`) or closed (`false`). Closed by default.
    pub drawer: bool,
}

// =============================================================================
// Auth Provider
// =============================================================================

/// Identity provider used by the redirect sign-in flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AuthProviderKind {
    /// Google accounts.
    #[default]
    Google,

    /// GitHub accounts.
    Github,

    /// Anonymous session.
    Anonymous,
}

impl std::fmt::Display for AuthProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthProviderKind::Google => write!(f, "google"),
            AuthProviderKind::Github => write!(f, "github"),
            AuthProviderKind::Anonymous => write!(f, "anonymous"),
        }
    }
}

impl std::str::FromStr for AuthProviderKind {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "google.com" => Ok(AuthProviderKind::Google),
            "github" | "github.com" => Ok(AuthProviderKind::Github),
            "anonymous" => Ok(AuthProviderKind::Anonymous),
            other => Err(crate::error::ValidationError::InvalidFormat {
                field: "auth provider".to_string(),
                reason: format!(
                    "unknown provider '{}'. Valid options: google, github, anonymous",
                    other
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_user_wire_names() {
        let user = LoginUser::new("u1")
            .with_display_name("Hanako")
            .with_photo_url("https://example.com/p.png");

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({
                "uid": "u1",
                "displayName": "Hanako",
                "photoURL": "https://example.com/p.png"
            })
        );
    }

    #[test]
    fn test_login_user_missing_optional_fields() {
        let user: LoginUser = serde_json::from_value(json!({ "uid": "u2" })).unwrap();
        assert_eq!(user, LoginUser::new("u2"));
    }

    #[test]
    fn test_address_serializes_flat() {
        let mut fields = Document::new();
        fields.insert("street".into(), json!("Main St"));

        let address = Address::new("a1", fields);
        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value, json!({ "id": "a1", "street": "Main St" }));
    }

    #[test]
    fn test_address_drops_embedded_id() {
        let mut fields = Document::new();
        fields.insert("id".into(), json!("stale"));
        fields.insert("zip".into(), json!("100-0001"));

        let address = Address::new("a1", fields);
        assert_eq!(address.id, "a1");
        assert!(address.get("id").is_none());
        assert_eq!(address.get("zip"), Some(&json!("100-0001")));
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(
            "google".parse::<AuthProviderKind>().unwrap(),
            AuthProviderKind::Google
        );
        assert_eq!(
            "GitHub.com".parse::<AuthProviderKind>().unwrap(),
            AuthProviderKind::Github
        );
        assert!("myspace".parse::<AuthProviderKind>().is_err());
    }
}
