//! Configuration management for rawfetch
//!
//! An optional TOML file overrides the built-in defaults. Command-line flags
//! are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, ConsoleConfig};
use crate::constants::{config as config_files, http, logging, progress, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Application configuration as stored in TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fetch settings
    pub fetch: FetchConfigToml,
    /// Directory listing settings
    pub listing: ListingConfigToml,
    /// Progress display settings
    pub progress: ProgressConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly fetch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfigToml {
    /// Concurrent URLs (1 to 4)
    pub max_concurrent: usize,
    /// Directory files are written to (None = working directory)
    pub output_dir: Option<PathBuf>,
    /// Longest accepted status, header or chunk-size line in bytes
    pub max_line_length: usize,
}

impl Default for FetchConfigToml {
    fn default() -> Self {
        Self {
            max_concurrent: workers::MAX_CONCURRENT_FETCHES,
            output_dir: None,
            max_line_length: http::DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// TOML-friendly listing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfigToml {
    /// Extensions recognized in addition to the built-in ones
    pub extra_extensions: Vec<String>,
}

/// TOML-friendly progress configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfigToml {
    /// Draw progress bars on interactive terminals
    pub enabled: bool,
    /// Percentage points between textual progress reports
    pub step_percent: u8,
}

impl Default for ProgressConfigToml {
    fn default() -> Self {
        Self {
            enabled: true,
            step_percent: progress::DEFAULT_STEP_PERCENT,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the first file found:
    /// 1. `config_file_override`, which must exist
    /// 2. `./rawfetch.toml`
    /// 3. `<user config dir>/rawfetch/config.toml`
    ///
    /// Defaults are used when no file exists.
    pub async fn load(config_file_override: Option<&Path>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Self::find_config_file(),
        };

        let config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(config_files::LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        search_paths.into_iter().find(|path| {
            let found = path.exists();
            if found {
                debug!("Found config file: {}", path.display());
            }
            found
        })
    }

    /// Per-user config file path, when the platform has a config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(config_files::CONFIG_DIR_NAME)
                .join(config_files::CONFIG_FILE_NAME)
        })
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=workers::MAX_CONCURRENT_FETCHES).contains(&self.fetch.max_concurrent) {
            return Err(ConfigError::InvalidValue {
                field: "fetch.max_concurrent".to_string(),
                value: self.fetch.max_concurrent.to_string(),
                reason: format!(
                    "Must be between 1 and {}",
                    workers::MAX_CONCURRENT_FETCHES
                ),
            });
        }

        if self.fetch.max_line_length < 16 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.max_line_length".to_string(),
                value: self.fetch.max_line_length.to_string(),
                reason: "Must be at least 16 bytes".to_string(),
            });
        }

        if !(1..=100).contains(&self.progress.step_percent) {
            return Err(ConfigError::InvalidValue {
                field: "progress.step_percent".to_string(),
                value: self.progress.step_percent.to_string(),
                reason: "Must be between 1 and 100".to_string(),
            });
        }

        Ok(())
    }

    /// Runtime client settings; the port always stays at its default.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            max_line_length: self.fetch.max_line_length,
            ..ClientConfig::default()
        }
    }

    /// Runtime console settings
    pub fn console_config(&self, quiet: bool, no_progress: bool) -> ConsoleConfig {
        ConsoleConfig {
            progress_bars: self.progress.enabled && !no_progress,
            quiet,
            step_percent: self.progress.step_percent,
        }
    }
}
