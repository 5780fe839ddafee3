//! Configuration loading and validation for IBS estimators.
//!
//! This crate provides:
//! - Typed Rust structs for settings.json
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Semantic validation
//! - Config snapshots for reproducible reports

pub mod resolve;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use resolve::{load_settings, resolve_config, ConfigPaths, ConfigSource, LoadedSettings};
pub use settings::Settings;
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_settings, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
