//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shared buffer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Records the consumer allocates for the shared buffer
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Records written between automatic flushes during replay
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,
}

fn default_capacity() -> usize {
    1000
}

fn default_flush_every() -> usize {
    8
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            flush_every: default_flush_every(),
        }
    }
}

/// Replay input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSON Lines trace to replay (None = synthetic stroke)
    #[serde(default)]
    pub trace: Option<PathBuf>,

    /// Samples in the synthetic stroke
    #[serde(default = "default_points")]
    pub points: usize,

    /// Append a barrel tap after the synthetic stroke
    #[serde(default)]
    pub barrel_tap: bool,

    /// Producer on its own thread, consumer decoding on the main thread
    #[serde(default)]
    pub threaded: bool,

    /// Consumer tick interval in threaded mode (ms)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_points() -> usize {
    240
}

fn default_tick_ms() -> u64 {
    16
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            trace: None,
            points: default_points(),
            barrel_tap: false,
            threaded: false,
            tick_ms: default_tick_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format ("pretty", "compact", "json")
    #[serde(default = "default_format")]
    pub format: String,

    /// Also write logs to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Print collected metrics after a run
    #[serde(default = "default_metrics")]
    pub metrics: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

fn default_metrics() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            log_file: None,
            metrics: default_metrics(),
        }
    }
}
