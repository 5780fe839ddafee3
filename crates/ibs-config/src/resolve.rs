//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! system config → defaults.

use std::path::{Path, PathBuf};

use crate::settings::Settings;
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_settings, ValidationError, ValidationResult};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to settings.json (or None if not found).
    pub settings: Option<PathBuf>,

    /// Source of the settings (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/ibs-estimate/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_SETTINGS_PATH: &str = "IBS_SETTINGS";
pub const ENV_CONFIG_DIR: &str = "IBS_CONFIG_DIR";

/// Standard config file name.
const SETTINGS_FILENAME: &str = "settings.json";

/// Application name for XDG directories.
const APP_NAME: &str = "ibs-estimate";

/// Resolve the settings path using the standard resolution order.
///
/// 1. Explicit CLI path (if it exists)
/// 2. IBS_SETTINGS (direct path)
/// 3. IBS_CONFIG_DIR + settings.json
/// 4. XDG config directory (~/.config/ibs-estimate/)
/// 5. System config (/etc/ibs-estimate/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_settings: Option<&Path>) -> ConfigPaths {
    // 1. CLI argument
    if let Some(path) = cli_settings {
        if path.exists() {
            return found(path.to_path_buf(), ConfigSource::CliArgument);
        }
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_SETTINGS_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(SETTINGS_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 4. XDG config directory
    if let Some(xdg_config) = dirs::config_dir() {
        let path = xdg_config.join(APP_NAME).join(SETTINGS_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    // 5. System config
    let system_path = PathBuf::from("/etc").join(APP_NAME).join(SETTINGS_FILENAME);
    if system_path.exists() {
        return found(system_path, ConfigSource::SystemConfig);
    }

    // 6. Built-in default
    ConfigPaths::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPaths {
    ConfigPaths {
        settings: Some(path),
        source,
    }
}

/// Settings with their provenance.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub paths: ConfigPaths,
    pub snapshot: ConfigSnapshot,
}

/// Resolve, read, parse and validate settings.
///
/// An explicit CLI path that does not exist is an error rather than a
/// silent fall-through to defaults.
pub fn load_settings(cli_settings: Option<&Path>) -> ValidationResult<LoadedSettings> {
    if let Some(path) = cli_settings {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "Settings file not found: {}",
                path.display()
            )));
        }
    }

    let paths = resolve_config(cli_settings);
    let (settings, content) = match &paths.settings {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            (Settings::from_json(&content)?, Some(content))
        }
        None => (Settings::default(), None),
    };

    validate_settings(&settings)?;

    let snapshot = ConfigSnapshot::new(&paths, content.as_deref());
    Ok(LoadedSettings {
        settings,
        paths,
        snapshot,
    })
}
