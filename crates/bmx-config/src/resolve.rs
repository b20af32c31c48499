//! Model configuration resolution and path discovery.
//!
//! Resolution order: explicit path → environment variables → XDG paths → defaults.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::ModelConfig;
use crate::validate::{validate_model, ValidationError};

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided by the caller.
    Explicit,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit path"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A resolved config location (None path means builtin default).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_MODEL_PATH: &str = "BMX_MODEL_CONFIG";
pub const ENV_CONFIG_DIR: &str = "BMX_CONFIG_DIR";

/// Config file names probed inside a directory, in order.
const MODEL_FILENAMES: [&str; 2] = ["model.json", "model.toml"];

/// Application name for XDG directories.
const APP_NAME: &str = "bayesmix";

/// Resolve the model config path.
///
/// 1. Explicit path (if it exists)
/// 2. `BMX_MODEL_CONFIG`
/// 3. `BMX_CONFIG_DIR` + `model.json` / `model.toml`
/// 4. XDG config directory (`~/.config/bayesmix/`)
/// 5. Built-in default (no path)
pub fn resolve_model_config(explicit: Option<&Path>) -> ResolvedPath {
    if let Some(path) = explicit {
        if path.exists() {
            return ResolvedPath {
                path: Some(path.to_path_buf()),
                source: ConfigSource::Explicit,
            };
        }
    }

    if let Ok(env_path) = std::env::var(ENV_MODEL_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&config_dir)) {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = find_in_dir(&dir) {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    ResolvedPath::default()
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    MODEL_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Get the XDG config directory for bayesmix.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Resolve, load and validate the model config.
///
/// An explicit path that does not exist is an error rather than a silent
/// fallback to the next source.
pub fn load_model_config(
    explicit: Option<&Path>,
) -> Result<(ModelConfig, ResolvedPath), ValidationError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    }

    let resolved = resolve_model_config(explicit);
    let config = match &resolved.path {
        Some(path) => ModelConfig::from_file(path)?,
        None => ModelConfig::default(),
    };
    validate_model(&config)?;

    debug!(
        source = %resolved.source,
        path = ?resolved.path,
        hierarchy = config.hierarchy.identifier(),
        mixing = config.mixing.identifier(),
        "model config loaded"
    );
    Ok((config, resolved))
}
