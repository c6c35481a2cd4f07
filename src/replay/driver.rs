//! Replay driver and recording consumer

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::record::{PenEvent, SampleRecord};
use crate::relay::{NotificationSink, PencilRelay, PendingSpan};
use crate::replay::trace::TraceEvent;

/// Outcome of one replay run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    /// Trace events consumed
    pub events: usize,
    /// Sample events appended
    pub samples: usize,
    /// Barrel-tap events appended
    pub barrel_taps: usize,
    /// Flushes that notified the consumer
    pub notifying_flushes: usize,
    /// Count reported by each notifying flush, in order
    pub batch_sizes: Vec<usize>,
    /// Wall time spent replaying
    pub elapsed: Duration,
}

impl ReplaySummary {
    /// Sum of all reported counts
    pub fn records_notified(&self) -> usize {
        self.batch_sizes.iter().sum()
    }

    /// Records written, samples and taps
    pub fn records_written(&self) -> usize {
        self.samples + self.barrel_taps
    }
}

/// Feeds trace events to a relay the way a platform input service would
#[derive(Debug, Clone, Copy)]
pub struct ReplayDriver {
    flush_every: usize,
}

impl ReplayDriver {
    /// Flush after every `flush_every` written records (clamped to at least 1)
    pub fn new(flush_every: usize) -> Self {
        Self {
            flush_every: flush_every.max(1),
        }
    }

    /// Records written between automatic flushes
    pub fn flush_every(&self) -> usize {
        self.flush_every
    }

    /// Replay `events`, then flush once more so nothing is left unreported
    pub fn run<S, I>(&self, relay: &mut PencilRelay<'_, S>, events: I) -> ReplaySummary
    where
        S: NotificationSink,
        I: IntoIterator<Item = TraceEvent>,
    {
        let start = Instant::now();
        let mut summary = ReplaySummary::default();
        let mut since_flush = 0usize;

        for event in events {
            summary.events += 1;
            match event {
                TraceEvent::Sample(input) => {
                    relay.append_sample(&input);
                    summary.samples += 1;
                }
                TraceEvent::BarrelTap => {
                    relay.append_barrel_tap();
                    summary.barrel_taps += 1;
                }
                TraceEvent::Flush => {
                    flush_into(relay, &mut summary);
                    since_flush = 0;
                    continue;
                }
            }

            since_flush += 1;
            if since_flush >= self.flush_every {
                flush_into(relay, &mut summary);
                since_flush = 0;
            }
        }
        flush_into(relay, &mut summary);

        summary.elapsed = start.elapsed();
        info!(
            events = summary.events,
            flushes = summary.notifying_flushes,
            notified = summary.records_notified(),
            elapsed_us = summary.elapsed.as_micros() as u64,
            "replay finished"
        );
        summary
    }
}

pub(crate) fn flush_into<S: NotificationSink>(relay: &mut PencilRelay<'_, S>, summary: &mut ReplaySummary) {
    if let Some(span) = relay.flush() {
        summary.notifying_flushes += 1;
        summary.batch_sizes.push(span.count);
    }
}

impl Default for ReplayDriver {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Read a notified span the way the consumer does: by index, wrapping at capacity
pub fn read_span(span: PendingSpan, buffer: &[SampleRecord]) -> Vec<PenEvent> {
    span.indices(buffer.len()).map(|i| buffer[i].event()).collect()
}

/// Consumer that keeps every decoded event
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    /// Decoded events in notification order
    pub events: Vec<PenEvent>,
    /// Spans as reported
    pub spans: Vec<PendingSpan>,
}

impl RecordingSink {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, span: PendingSpan, buffer: &[SampleRecord]) {
        self.events.extend(read_span(span, buffer));
        self.spans.push(span);
    }
}
