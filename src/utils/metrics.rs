//! Relay Metrics
//!
//! Counters, gauges and histograms gathered from relay stats and replay runs:
//! - Records written and notified
//! - Flush batch sizes
//! - Records lost to lapping
//! - Replay throughput
//!
//! The collector is filled once a run is over and exported as Prometheus text or
//! JSON. Names are kept sorted so both exports are stable between runs.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::relay::RelayStats;
use crate::replay::ReplaySummary;

/// Metrics gathered after a relay run
#[derive(Debug)]
pub struct MetricsCollector {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, f64>,
    histograms: BTreeMap<&'static str, Histogram>,
    started: Instant,
}

impl MetricsCollector {
    /// Empty collector; uptime counts from here
    pub fn new() -> Self {
        Self {
            counters: BTreeMap::new(),
            gauges: BTreeMap::new(),
            histograms: BTreeMap::new(),
            started: Instant::now(),
        }
    }

    /// Add `value` to a counter
    pub fn increment_counter(&mut self, name: &'static str, value: u64) {
        *self.counters.entry(name).or_default() += value;
    }

    /// Overwrite a gauge
    pub fn set_gauge(&mut self, name: &'static str, value: f64) {
        self.gauges.insert(name, value);
    }

    /// Add one observation to a histogram
    pub fn record_histogram(&mut self, name: &'static str, value: f64) {
        self.histograms.entry(name).or_default().observe(value);
    }

    /// Fold one relay's counters into the totals
    pub fn record_relay_stats(&mut self, stats: &RelayStats) {
        use metric_names::*;

        for (name, value) in [
            (SAMPLES_APPENDED, stats.appended),
            (BARREL_TAPS_APPENDED, stats.barrel_taps),
            (FLUSHES, stats.flushes),
            (RECORDS_NOTIFIED, stats.records_notified),
            (DROPPED_NO_CONSUMER, stats.dropped_no_consumer),
            (LAPPED_RECORDS, stats.lapped_records),
        ] {
            self.increment_counter(name, value);
        }
        self.set_gauge(MEAN_BATCH_SIZE, stats.mean_batch_size());
    }

    /// Record batch sizes and throughput of one replay run
    pub fn record_replay(&mut self, summary: &ReplaySummary) {
        use metric_names::*;

        for &size in &summary.batch_sizes {
            self.record_histogram(BATCH_SIZE, size as f64);
        }

        let secs = summary.elapsed.as_secs_f64();
        self.record_histogram(REPLAY_TIME_MS, secs * 1000.0);
        if secs > 0.0 {
            self.set_gauge(REPLAY_RECORDS_PER_SEC, summary.records_written() as f64 / secs);
        }
    }

    /// Counter value, if ever incremented
    pub fn get_counter(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }

    /// Gauge value, if ever set
    pub fn get_gauge(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).copied()
    }

    /// Summary of a histogram, if it has observations
    pub fn get_histogram(&self, name: &str) -> Option<HistogramStats> {
        self.histograms.get(name).map(Histogram::stats)
    }

    /// Everything collected so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.started.elapsed(),
            counters: self.counters.clone(),
            gauges: self.gauges.clone(),
            histograms: self
                .histograms
                .iter()
                .map(|(&name, h)| (name, h.stats()))
                .collect(),
        }
    }

    /// Prometheus text exposition; histograms become summaries
    pub fn export_prometheus(&self) -> String {
        let mut out = String::new();

        for (name, value) in &self.counters {
            writeln!(out, "# TYPE {name} counter\n{name} {value}").ok();
        }
        for (name, value) in &self.gauges {
            writeln!(out, "# TYPE {name} gauge\n{name} {value}").ok();
        }
        for (name, histogram) in &self.histograms {
            let stats = histogram.stats();
            writeln!(out, "# TYPE {name} summary").ok();
            for (quantile, value) in [("0.5", stats.p50), ("0.95", stats.p95), ("0.99", stats.p99)] {
                writeln!(out, "{name}{{quantile=\"{quantile}\"}} {value}").ok();
            }
            writeln!(out, "{name}_sum {}\n{name}_count {}", stats.sum, stats.count).ok();
        }

        out
    }

    /// Pretty-printed JSON of [`MetricsCollector::snapshot`]
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw observations; summarised on export
#[derive(Debug, Default)]
struct Histogram {
    values: Vec<f64>,
}

impl Histogram {
    fn observe(&mut self, value: f64) {
        self.values.push(value);
    }

    fn stats(&self) -> HistogramStats {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return HistogramStats::default();
        };

        let sum: f64 = sorted.iter().sum();
        HistogramStats {
            count: sorted.len() as u64,
            sum,
            min,
            max,
            mean: sum / sorted.len() as f64,
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
        }
    }
}

/// Nearest-rank-below percentile of non-empty sorted values
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let last = sorted.len() - 1;
    sorted[((last as f64 * p) as usize).min(last)]
}

/// Summary of one histogram
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HistogramStats {
    /// Number of observations
    pub count: u64,
    /// Sum of observations
    pub sum: f64,
    /// Smallest observation
    pub min: f64,
    /// Largest observation
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub p50: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

/// Point-in-time copy of every metric, as exported to JSON
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Time since the collector was created
    pub uptime: Duration,
    /// Counter totals
    pub counters: BTreeMap<&'static str, u64>,
    /// Latest gauge values
    pub gauges: BTreeMap<&'static str, f64>,
    /// Histogram summaries
    pub histograms: BTreeMap<&'static str, HistogramStats>,
}

pub mod metric_names {
    //! Metric names used by the relay and the replay harness.

    /// Sample records written
    pub const SAMPLES_APPENDED: &str = "pencil_samples_appended_total";
    /// Barrel-tap records written
    pub const BARREL_TAPS_APPENDED: &str = "pencil_barrel_taps_appended_total";
    /// Flushes that notified the consumer
    pub const FLUSHES: &str = "pencil_flushes_total";
    /// Records reported to the consumer
    pub const RECORDS_NOTIFIED: &str = "pencil_records_notified_total";
    /// Calls ignored because nothing was registered
    pub const DROPPED_NO_CONSUMER: &str = "pencil_dropped_no_consumer_total";
    /// Records overwritten before the consumer heard of them
    pub const LAPPED_RECORDS: &str = "pencil_lapped_records_total";
    /// Mean records per notifying flush
    pub const MEAN_BATCH_SIZE: &str = "pencil_mean_batch_size";

    /// Records per notifying flush
    pub const BATCH_SIZE: &str = "pencil_flush_batch_size";
    /// Wall time of a replay run (milliseconds)
    pub const REPLAY_TIME_MS: &str = "pencil_replay_time_ms";
    /// Replay throughput
    pub const REPLAY_RECORDS_PER_SEC: &str = "pencil_replay_records_per_second";
}
