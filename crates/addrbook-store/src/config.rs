//! # Store Configuration
//!
//! Configuration management for the store and its backends.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ADDRBOOK_BACKEND=sqlite                                            │
//! │     ADDRBOOK_AUTH_PROVIDER=github                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/addrbook/addrbook.toml (Linux)                           │
//! │     ~/Library/Application Support/com.addrbook.addrbook/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     memory backend, google sign-in, drawer closed                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # addrbook.toml
//! [auth]
//! provider = "google"            # google | github | anonymous
//! emulator_uid = "emulator-user"
//! emulator_display_name = "Emulator User"
//!
//! [backend]
//! kind = "sqlite"                # memory | sqlite
//! database_path = "./addrbook.db"
//!
//! [ui]
//! drawer_open = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use addrbook_core::{validate_uid, AuthProviderKind, LoginUser};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Backend Kind
// =============================================================================

/// Which document backend the store talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Process-local documents, lost on exit.
    #[default]
    Memory,

    /// Documents in a local SQLite file.
    Sqlite,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendKind::Memory),
            "sqlite" | "db" => Ok(BackendKind::Sqlite),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown backend: '{}'. Valid options: memory, sqlite",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Sign-in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Provider used by the `login` action.
    #[serde(default)]
    pub provider: AuthProviderKind,

    /// Uid the local auth emulator signs in as.
    #[serde(default = "default_emulator_uid")]
    pub emulator_uid: String,

    #[serde(default = "default_emulator_display_name")]
    pub emulator_display_name: Option<String>,

    #[serde(default)]
    pub emulator_photo_url: Option<String>,
}

fn default_emulator_uid() -> String {
    "emulator-user".to_string()
}

fn default_emulator_display_name() -> Option<String> {
    Some("Emulator User".to_string())
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            provider: AuthProviderKind::default(),
            emulator_uid: default_emulator_uid(),
            emulator_display_name: default_emulator_display_name(),
            emulator_photo_url: None,
        }
    }
}

impl AuthSettings {
    /// The user a redirect sign-in resolves to under the local emulator.
    pub fn emulator_user(&self) -> LoginUser {
        LoginUser {
            uid: self.emulator_uid.clone(),
            display_name: self.emulator_display_name.clone(),
            photo_url: self.emulator_photo_url.clone(),
        }
    }
}

/// Document backend settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub kind: BackendKind,

    /// SQLite file for the `sqlite` backend.
    /// Defaults to `addrbook.db` in the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Initial UI state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Whether the side menu starts open.
    #[serde(default)]
    pub drawer_open: bool,
}

// =============================================================================
// Main Store Configuration
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

impl StoreConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (addrbook.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Store config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        validate_uid(&self.auth.emulator_uid)
            .map_err(|e| StoreError::InvalidConfig(format!("auth.emulator_uid: {}", e)))?;

        if let Some(ref path) = self.backend.database_path {
            if path.as_os_str().is_empty() {
                return Err(StoreError::InvalidConfig(
                    "backend.database_path must not be empty".into(),
                ));
            }
        }

        if self.backend.kind == BackendKind::Sqlite && self.database_path().is_none() {
            return Err(StoreError::InvalidConfig(
                "sqlite backend needs backend.database_path (no platform data dir found)".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("ADDRBOOK_AUTH_PROVIDER") {
            match provider.parse() {
                Ok(parsed) => {
                    debug!(provider = %provider, "Overriding auth provider from environment");
                    self.auth.provider = parsed;
                }
                Err(_) => warn!(provider = %provider, "Unknown auth provider in environment"),
            }
        }

        if let Ok(uid) = std::env::var("ADDRBOOK_EMULATOR_UID") {
            self.auth.emulator_uid = uid;
        }

        if let Ok(name) = std::env::var("ADDRBOOK_EMULATOR_DISPLAY_NAME") {
            self.auth.emulator_display_name = Some(name);
        }

        if let Ok(kind) = std::env::var("ADDRBOOK_BACKEND") {
            match kind.parse() {
                Ok(parsed) => {
                    debug!(backend = %kind, "Overriding backend from environment");
                    self.backend.kind = parsed;
                }
                Err(_) => warn!(backend = %kind, "Unknown backend in environment"),
            }
        }

        if let Ok(path) = std::env::var("ADDRBOOK_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.backend.database_path = Some(PathBuf::from(path));
        }

        if let Ok(open) = std::env::var("ADDRBOOK_DRAWER_OPEN") {
            if let Ok(open) = open.parse::<bool>() {
                self.ui.drawer_open = open;
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "addrbook", "addrbook")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("addrbook.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// SQLite file to open: the configured one, else the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.backend.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join("addrbook.db"))
        })
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind
    }

    pub fn provider(&self) -> AuthProviderKind {
        self.auth.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!("SQLite".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert!("postgres".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.backend_kind(), BackendKind::Memory);
        assert_eq!(config.provider(), AuthProviderKind::Google);
        assert!(!config.ui.drawer_open);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            [backend]
            kind = "sqlite"
            database_path = "/tmp/addrbook-test.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend_kind(), BackendKind::Sqlite);
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/tmp/addrbook-test.db"))
        );
        assert_eq!(config.auth.emulator_uid, "emulator-user");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_auth_section_keeps_emulator_name() {
        let config: StoreConfig = toml::from_str(
            r#"
            [auth]
            provider = "github"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider(), AuthProviderKind::Github);
        assert_eq!(
            config.auth.emulator_display_name,
            AuthSettings::default().emulator_display_name
        );
        assert_eq!(config.auth.emulator_user().display_name.as_deref(), Some("Emulator User"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();

        config.auth.emulator_uid = String::new();
        assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));

        config.auth.emulator_uid = "users/u1".to_string();
        assert!(config.validate().is_err());

        config.auth.emulator_uid = "u1".to_string();
        config.backend.database_path = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_emulator_user() {
        let mut config = StoreConfig::default();
        config.auth.emulator_uid = "u1".into();
        config.auth.emulator_photo_url = Some("https://example.com/u1.png".into());

        let user = config.auth.emulator_user();
        assert_eq!(user.uid, "u1");
        assert_eq!(user.photo_url.as_deref(), Some("https://example.com/u1.png"));
    }

    #[test]
    fn test_toml_round_trip_and_missing_file() {
        let dir = std::env::temp_dir().join(format!("addrbook-config-{}", std::process::id()));
        let path = dir.join("addrbook.toml");

        let mut config = StoreConfig::default();
        config.ui.drawer_open = true;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[auth]"));
        assert!(contents.contains("[ui]"));

        let loaded: StoreConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        let missing = StoreConfig::load(Some(dir.join("nope.toml"))).unwrap();
        assert_eq!(missing.auth.emulator_uid, StoreConfig::default().auth.emulator_uid);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
