//! Engine configuration.
//!
//! One `SyncConfig` describes one account: one CalDAV server and one logical
//! calendar collection. Multiple configurations can run side by side; nothing
//! here is a module-level singleton.

use serde::Deserialize;
use std::path::Path;

use farmhouse_core::{CodecConfig, SyncError, SyncResult};

fn default_namespace() -> String {
    "farmhouse".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_sync_window_days() -> i64 {
    90
}

fn default_priority_levels() -> u8 {
    5
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_verify_tls() -> bool {
    true
}

/// Configuration for one sync account.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// CalDAV server base URL, e.g. `https://dav.example.com/`.
    pub server_url: String,
    pub username: String,
    pub password: String,
    /// Display name of the target calendar collection.
    pub collection: String,

    /// Namespace for deterministic object identifiers.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// IANA zone name for wall-clock event times.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Dated records older than this many days are left out of a cycle.
    #[serde(default = "default_sync_window_days")]
    pub sync_window_days: i64,

    /// Size of the local priority scale (1 = high .. levels = low).
    #[serde(default = "default_priority_levels")]
    pub priority_levels: u8,

    /// Per-request timeout for remote calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl SyncConfig {
    pub fn from_toml_str(content: &str) -> SyncResult<Self> {
        toml::from_str(content).map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build the codec settings, validating the configured time zone.
    pub fn codec(&self) -> SyncResult<CodecConfig> {
        let timezone = self
            .timezone
            .parse()
            .map_err(|_| SyncError::Config(format!("unknown time zone '{}'", self.timezone)))?;
        Ok(CodecConfig {
            namespace: self.namespace.clone(),
            timezone,
            priority_levels: self.priority_levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = SyncConfig::from_toml_str(
            r#"
server_url = "https://dav.example.com/"
username = "anna"
password = "app-password"
collection = "Farmhouse Tasks"
"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "farmhouse");
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.sync_window_days, 90);
        assert_eq!(config.priority_levels, 5);
        assert_eq!(config.request_timeout_secs, 15);
        assert!(config.verify_tls);
        assert!(config.codec().is_ok());
    }

    #[test]
    fn test_unknown_timezone_is_a_config_error() {
        let config = SyncConfig::from_toml_str(
            r#"
server_url = "https://dav.example.com/"
username = "anna"
password = "app-password"
collection = "Farmhouse Tasks"
timezone = "Mars/Olympus_Mons"
"#,
        )
        .unwrap();

        assert!(matches!(config.codec(), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let result = SyncConfig::from_toml_str(r#"username = "anna""#);
        assert!(matches!(result, Err(SyncError::Config(_))));
    }
}
