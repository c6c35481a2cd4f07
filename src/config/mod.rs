//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files (`$XDG_CONFIG_HOME/pencil-relay/config.toml` by default)
//! - Environment variables (through the CLI's `env` bindings)
//! - CLI arguments
//!
//! Every section and field has a default, so an empty file is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod types;

pub use types::{LoggingConfig, RelayConfig, ReplayConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shared buffer configuration
    #[serde(default)]
    pub relay: RelayConfig,
    /// Replay input configuration
    #[serde(default)]
    pub replay: ReplayConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `relay.capacity`
    pub capacity: Option<usize>,
    /// `relay.flush_every`
    pub flush_every: Option<usize>,
    /// `replay.trace`
    pub trace: Option<PathBuf>,
    /// `replay.points`
    pub points: Option<usize>,
    /// Switches `replay.barrel_tap` on
    pub barrel_tap: bool,
    /// Switches `replay.threaded` on
    pub threaded: bool,
    /// `logging.format`
    pub log_format: Option<String>,
    /// `logging.log_file`
    pub log_file: Option<PathBuf>,
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the default location if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Self::default_config(),
        }
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pencil-relay").join("config.toml"))
    }

    /// Create default configuration
    pub fn default_config() -> Result<Self> {
        Ok(Config {
            relay: RelayConfig::default(),
            replay: ReplayConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // The consumer receives offsets and counts as C ints
        if self.relay.capacity == 0 {
            anyhow::bail!("relay.capacity must be at least 1");
        }
        if self.relay.capacity > i32::MAX as usize {
            anyhow::bail!(
                "relay.capacity ({}) exceeds the consumer's index range ({})",
                self.relay.capacity,
                i32::MAX
            );
        }

        if self.relay.flush_every == 0 {
            anyhow::bail!("relay.flush_every must be at least 1");
        }

        if self.replay.tick_ms == 0 {
            anyhow::bail!("replay.tick_ms must be at least 1");
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(capacity) = overrides.capacity {
            self.relay.capacity = capacity;
        }
        if let Some(flush_every) = overrides.flush_every {
            self.relay.flush_every = flush_every;
        }
        if overrides.trace.is_some() {
            self.replay.trace = overrides.trace;
        }
        if let Some(points) = overrides.points {
            self.replay.points = points;
        }
        // Flags can only switch these on
        self.replay.barrel_tap |= overrides.barrel_tap;
        self.replay.threaded |= overrides.threaded;

        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if overrides.log_file.is_some() {
            self.logging.log_file = overrides.log_file;
        }

        self
    }
}
