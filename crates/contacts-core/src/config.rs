//! Configuration types for the contacts system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main contacts configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// Remote sync settings (may be left empty to disable sync)
    #[serde(default)]
    pub sync: SyncConfig,

    /// Local store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ContactsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    ///
    /// An incomplete [`SyncConfig`] is valid: it simply means sync is off.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Remote sync settings
///
/// All three values are needed for a pass to do anything. When any of them
/// is empty, sync is considered "not configured" and passes are no-ops.
///
/// # Security
///
/// The Debug implementation does NOT expose the password.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the contact service (e.g. `https://contacts.example.com`)
    #[serde(default)]
    pub server_base_url: String,

    /// Basic Auth username
    #[serde(default)]
    pub username: String,

    /// Basic Auth password
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub password: String,
}

impl SyncConfig {
    /// Create sync settings
    pub fn new(
        server_base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_base_url: server_base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether every setting needed for a pass is present
    pub fn is_complete(&self) -> bool {
        !self.server_base_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("server_base_url", &self.server_base_url)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Local store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    #[default]
    Memory,

    /// SQLite-backed store
    Sqlite {
        /// Path to the database file
        path: String,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Sqlite { path } if path.is_empty() => {
                Err(crate::Error::config("SQLite store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::Sqlite { .. } => "sqlite",
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the sync event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 256 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_completeness() {
        assert!(SyncConfig::new("https://c.example.com", "user", "pass").is_complete());
        assert!(!SyncConfig::new("", "user", "pass").is_complete());
        assert!(!SyncConfig::new("https://c.example.com", "", "pass").is_complete());
        assert!(!SyncConfig::new("https://c.example.com", "user", "").is_complete());
        assert!(!SyncConfig::default().is_complete());
    }

    #[test]
    fn test_password_not_exposed_in_debug() {
        let config = SyncConfig::new("https://c.example.com", "user", "hunter2_secret");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("hunter2_secret"));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(debug_str.contains("https://c.example.com"));
    }

    #[test]
    fn test_store_config_deserialization() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"type": "sqlite", "path": "/tmp/contactBase.db"}"#).unwrap();
        assert_eq!(
            config,
            StoreConfig::Sqlite {
                path: "/tmp/contactBase.db".to_string()
            }
        );
        assert_eq!(config.type_name(), "sqlite");

        let config: StoreConfig = serde_json::from_str(r#"{"type": "memory"}"#).unwrap();
        assert_eq!(config, StoreConfig::Memory);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: ContactsConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.sync.is_complete());
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.engine.event_channel_capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ContactsConfig::new();
        config.store = StoreConfig::Sqlite {
            path: String::new(),
        };
        assert!(config.validate().is_err());

        let mut config = ContactsConfig::new();
        config.engine.event_channel_capacity = 0;
        assert!(config.validate().is_err());
    }
}
