//! Relay counters
//!
//! Observability only. Nothing here changes whether an append lands or whether a
//! flush notifies.

use serde::{Deserialize, Serialize};

/// Running totals for one relay instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStats {
    /// Sample records written
    pub appended: u64,
    /// Barrel-tap records written
    pub barrel_taps: u64,
    /// Flushes that invoked the sink
    pub flushes: u64,
    /// Records reported to the sink across all flushes
    pub records_notified: u64,
    /// Append/flush calls that did nothing because no consumer or buffer was registered
    pub dropped_no_consumer: u64,
    /// Records overwritten or skipped before the consumer was ever told about them
    pub lapped_records: u64,
}

impl RelayStats {
    /// All counters at zero
    pub const ZERO: Self = Self {
        appended: 0,
        barrel_taps: 0,
        flushes: 0,
        records_notified: 0,
        dropped_no_consumer: 0,
        lapped_records: 0,
    };

    /// Total records written, samples and taps
    pub fn records_written(&self) -> u64 {
        self.appended + self.barrel_taps
    }

    /// Mean records per notifying flush
    pub fn mean_batch_size(&self) -> f64 {
        if self.flushes == 0 {
            return 0.0;
        }
        self.records_notified as f64 / self.flushes as f64
    }
}
