//! Configuration loading
//!
//! Settings come from a TOML file found at an explicit path, in the local
//! directory (`tokenshift.toml`), or in the platform config directory.
//! Every field has a default, so an empty or missing file is valid.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator joining typography path segments in W3C -> array conversion
///
/// The reverse conversion keeps names verbatim (with `/`), so the two
/// directions do not agree. Kept as-is pending a product decision.
pub const TYPOGRAPHY_NAME_SEPARATOR: &str = "-";

/// Storage budget of the browser local cache the persisted state mirrors
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Name of the local configuration file
const LOCAL_CONFIG_FILE: &str = "tokenshift.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// How the Figma projector reads opacity values of array-format documents
///
/// The projector always emits fractions in [0, 1]. Its input is read as
/// percentages unless configured otherwise, so `50` projects to `0.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpacityScale {
    /// Values are percentages in [0, 100]
    #[default]
    Percent,
    /// Values are fractions in [0, 1]
    Fraction,
    /// Values above 1 are percentages, values in [0, 1] are fractions
    Auto,
}

impl OpacityScale {
    /// Normalize an opacity value to a fraction clamped to [0, 1]
    pub fn normalize(self, value: f64) -> f64 {
        let fraction = match self {
            Self::Fraction => value,
            Self::Percent => value / 100.0,
            Self::Auto if value > 1.0 => value / 100.0,
            Self::Auto => value,
        };
        fraction.clamp(0.0, 1.0)
    }
}

/// Options for the format converters and projectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub typography_name_separator: String,
    pub opacity_scale: OpacityScale,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            typography_name_separator: TYPOGRAPHY_NAME_SEPARATOR.to_string(),
            opacity_scale: OpacityScale::default(),
        }
    }
}

/// Local cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Largest serialized document accepted by the store
    pub quota_bytes: usize,
    /// Directory of the file backend; platform cache directory when unset
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
            directory: None,
        }
    }
}

impl StorageConfig {
    /// Directory used by the file backend
    pub fn resolve_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.cache_dir().to_path_buf(),
            None => PathBuf::from(".tokenshift"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub convert: ConvertOptions,
    pub storage: StorageConfig,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tokenshift", "tokenshift")
}

/// Find and load configuration
///
/// Search order:
/// 1. Explicit path if provided
/// 2. `tokenshift.toml` in the current directory
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if an explicit path does not exist, or a config file
/// exists but cannot be read or parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG_FILE);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(dirs) = project_dirs() {
        let system_config = dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }
        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
pub fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}
