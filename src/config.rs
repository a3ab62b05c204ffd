//! Configuration file support for stackline.
//!
//! This module provides serialization and deserialization of application settings:
//! defaults for new annotation lines, layer styles, logging and the atlas location.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::atlas::AtlasPrefs;
use crate::constants::{DEFAULT_LINE_NAME, DEFAULT_POLY_DEGREE};
use crate::model::FitKind;
use crate::surface::LayerStyle;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Returned when a log level name matches no level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct UnknownLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::all()
            .iter()
            .copied()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLogLevel(s.to_string()))
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Defaults for new annotation lines
    #[serde(default)]
    pub preferences: LinePreferences,

    /// Reference atlas location
    #[serde(default)]
    pub atlas: AtlasPrefs,
}

fn default_app_name() -> String {
    "stackline".to_string()
}

/// Defaults applied when a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePreferences {
    /// Name given to new lines
    #[serde(default = "default_line_name")]
    pub line_name: String,

    /// Fit applied to new lines
    #[serde(default)]
    pub fit_kind: FitKind,

    /// Polynomial degree
    #[serde(default = "default_degree")]
    pub degree: usize,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default = "LayerStyle::points")]
    pub point_style: LayerStyle,

    #[serde(default = "LayerStyle::fit_line")]
    pub line_style: LayerStyle,

    #[serde(default = "LayerStyle::highlight")]
    pub highlight_style: LayerStyle,
}

fn default_line_name() -> String {
    DEFAULT_LINE_NAME.to_string()
}

fn default_degree() -> usize {
    DEFAULT_POLY_DEGREE
}

impl Default for LinePreferences {
    fn default() -> Self {
        Self {
            line_name: default_line_name(),
            fit_kind: FitKind::default(),
            degree: default_degree(),
            log_level: LogLevel::default(),
            point_style: LayerStyle::points(),
            line_style: LayerStyle::fit_line(),
            highlight_style: LayerStyle::highlight(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: LinePreferences::default(),
            atlas: AtlasPrefs::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "stackline-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join(Self::default_filename()))
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save configuration to `path`, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<PathBuf, ConfigError> {
        let dir = config_dir().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_in_dir(&dir)
    }

    /// Save under `dir` with the default filename.
    pub fn save_in_dir(&self, dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = dir.join(Self::default_filename());
        self.save(&path)?;
        Ok(path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory holding stackline's configuration files.
///
/// Uses the XDG config directory, falling back to `~/.config`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|config_dir| config_dir.join("stackline"))
        .or_else(|| dirs::home_dir().map(|home_dir| home_dir.join(".config").join("stackline")))
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
