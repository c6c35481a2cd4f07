//! Operational Utilities
//!
//! Metrics collection and user-friendly error formatting for the CLI.
//!
//! ## Metrics
//!
//! ```rust
//! use pencil_relay::relay::RelayStats;
//! use pencil_relay::utils::{metric_names, MetricsCollector};
//!
//! let mut metrics = MetricsCollector::new();
//! metrics.record_relay_stats(&RelayStats { flushes: 2, records_notified: 9, ..Default::default() });
//! assert_eq!(metrics.get_counter(metric_names::RECORDS_NOTIFIED), Some(9));
//! print!("{}", metrics.export_prometheus());
//! ```
//!
//! ## Error Formatting
//!
//! [`format_user_error`] wraps an `anyhow::Error` in a box with hints for the
//! common failure categories:
//! - Trace errors → offending line number and the accepted line shapes
//! - Layout errors → record size and packing
//! - Config errors → file location and value ranges

pub mod errors;
pub mod metrics;

pub use errors::format_user_error;
pub use metrics::{metric_names, HistogramStats, MetricsCollector, MetricsSnapshot};
