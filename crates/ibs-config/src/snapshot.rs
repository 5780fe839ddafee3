//! Configuration snapshots for reproducible reports.
//!
//! A snapshot captures where the settings came from and a hash of their
//! content, so that an estimate printed by the CLI can be traced back to the
//! exact configuration that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::ConfigPaths;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path where settings were loaded from.
    #[serde(default)]
    pub settings_path: Option<String>,

    /// Source of the settings.
    pub settings_source: String,

    /// SHA-256 of the settings file content ("none" hashed for defaults).
    pub settings_hash: String,
}

impl ConfigSnapshot {
    /// Create a snapshot from resolved paths and the raw file content.
    pub fn new(paths: &ConfigPaths, settings_json: Option<&str>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            settings_path: paths.settings.as_ref().map(|p| p.display().to_string()),
            settings_source: paths.source.to_string(),
            settings_hash: hash_content(settings_json.unwrap_or("none")),
        }
    }

    /// Create a snapshot with only defaults (no config file loaded).
    pub fn defaults_only() -> Self {
        Self::new(&ConfigPaths::default(), None)
    }

    /// Check if this snapshot matches another (same config content).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.settings_hash == other.settings_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.settings_hash[..12.min(self.settings_hash.len())]
    }
}

/// Hex-encoded SHA-256 of a string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ConfigSource;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_snapshot() {
        let snap = ConfigSnapshot::defaults_only();
        assert_eq!(snap.settings_source, "builtin default");
        assert!(snap.settings_path.is_none());
        assert_eq!(snap.settings_hash.len(), 64);
        assert_eq!(snap.short_id().len(), 12);
    }

    #[test]
    fn test_same_content_matches() {
        let paths = ConfigPaths {
            settings: Some(PathBuf::from("/tmp/a/settings.json")),
            source: ConfigSource::CliArgument,
        };
        let a = ConfigSnapshot::new(&paths, Some(r#"{"ibs":{"repeats":3}}"#));
        let b = ConfigSnapshot::new(&ConfigPaths::default(), Some(r#"{"ibs":{"repeats":3}}"#));
        let c = ConfigSnapshot::new(&paths, Some(r#"{"ibs":{"repeats":4}}"#));
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
        assert_eq!(a.settings_path.as_deref(), Some("/tmp/a/settings.json"));
    }

    #[test]
    fn test_hash_known_value() {
        assert_eq!(
            hash_content(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
