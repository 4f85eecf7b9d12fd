//! Configuration types for the media mover

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the subdirectory of the source directory that receives files
/// whose metadata could not be resolved
pub const FAILED_SUBDIR: &str = "failed";

/// Configuration for the media mover
///
/// Loaded once at startup and immutable for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory watched for arriving files
    pub source_dir: PathBuf,

    /// Root of the organized destination tree
    pub dest_dir: PathBuf,

    /// strftime-style pattern applied to the resolved capture timestamp
    /// to produce the destination name (may contain `/` separators)
    pub file_pattern: String,

    /// Log file path
    pub log_file: PathBuf,

    /// Log verbosity level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            dest_dir: PathBuf::new(),
            file_pattern: "%Y/%m-%d_%H%M%S".to_string(),
            log_file: PathBuf::from("media-mover.log"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Expand a leading `~` in the configured paths to the home directory
    pub fn expand_home(mut self) -> Self {
        if let Some(home) = std::env::var_os("HOME") {
            let home = PathBuf::from(home);
            self.source_dir = expand_home_with(&self.source_dir, &home);
            self.dest_dir = expand_home_with(&self.dest_dir, &home);
            self.log_file = expand_home_with(&self.log_file, &home);
        }
        self
    }

    /// Validate the configuration before any watching begins
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("source_dir is required".into()));
        }
        if self.dest_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("dest_dir is required".into()));
        }
        if self.file_pattern.is_empty() {
            return Err(ConfigError::Invalid("file_pattern is required".into()));
        }

        // chrono reports bad format specifiers only when formatting, so
        // probe the pattern with a fixed timestamp here
        let probe = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let mut rendered = String::new();
        if write!(rendered, "{}", probe.format(&self.file_pattern)).is_err() {
            return Err(ConfigError::Invalid(format!(
                "file_pattern '{}' is not a valid strftime pattern",
                self.file_pattern
            )));
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "log_level '{}' is not one of error, warn, info, debug, trace",
                self.log_level
            )));
        }

        Ok(())
    }

    /// The failed-items destination: `<source_dir>/failed`
    pub fn failed_dir(&self) -> PathBuf {
        self.source_dir.join(FAILED_SUBDIR)
    }
}

fn expand_home_with(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
