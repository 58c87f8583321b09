//! YAML config file loading and writing.

use crate::schema::AppConfig;
use crate::validation;
use roomfly_common::ConfigError;
use std::path::Path;
use tracing::info;

/// Parse and validate a YAML document.
pub fn from_yaml(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::Parse(format!("failed to parse YAML: {e}")))?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from a YAML file.
///
/// Missing fields take their defaults. Invalid values are an error; the
/// caller decides whether to fall back.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let config = from_yaml(&content)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load from `path` when given, otherwise use the built-in defaults.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(p) => load_from_path(p),
        None => {
            info!("no config file given, using defaults");
            Ok(AppConfig::default())
        }
    }
}

pub fn to_yaml(config: &AppConfig) -> Result<String, ConfigError> {
    serde_yaml::to_string(config)
        .map_err(|e| ConfigError::Parse(format!("failed to serialize YAML: {e}")))
}

/// Write `config` to `path`, creating parent directories.
pub fn write_to_path(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_yaml(config)?)?;
    info!("wrote config to {}", path.display());
    Ok(())
}
