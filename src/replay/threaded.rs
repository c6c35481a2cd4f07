//! Two-thread replay
//!
//! Mirrors how the relay runs inside an application: an input thread delivers
//! samples while the runtime thread owns the relay and flushes once per display
//! tick. Samples travel between the two over a bounded channel, so the relay itself
//! is only ever touched from one thread.
//!
//! ```text
//! pencil-producer thread            runtime thread
//! ──────────────────────            ─────────────────────────────────
//! for event in trace ──send──►  select! {
//!                                 recv(events) => append / flush
//!                                 recv(tick)   => flush
//!                               }
//! ```

use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick};
use tracing::{debug, error, info};

use crate::record::SampleRecord;
use crate::relay::{PencilRelay, RelayStats};
use crate::replay::driver::{flush_into, RecordingSink, ReplaySummary};
use crate::replay::trace::TraceEvent;

/// Channel slots between the producer and the runtime thread
const EVENT_QUEUE_DEPTH: usize = 256;

/// Everything a threaded run leaves behind
#[derive(Debug, Clone)]
pub struct ThreadedReplay {
    /// Flush outcomes as seen by the runtime thread
    pub summary: ReplaySummary,
    /// Decoded events the consumer received
    pub sink: RecordingSink,
    /// Relay counters at the end of the run
    pub stats: RelayStats,
}

/// Replay `events` from a producer thread into a relay flushed every `tick`
///
/// The relay buffer holds `capacity` records. A final flush runs after the
/// producer hangs up.
pub fn replay_threaded(events: Vec<TraceEvent>, capacity: usize, tick_every: Duration) -> ThreadedReplay {
    let (tx, rx) = bounded::<TraceEvent>(EVENT_QUEUE_DEPTH);
    let ticker = tick(tick_every);

    let mut storage = vec![SampleRecord::default(); capacity];
    let mut relay = PencilRelay::new();
    relay.register(RecordingSink::new(), &mut storage);

    let start = Instant::now();
    let mut summary = ReplaySummary::default();

    std::thread::scope(|scope| {
        // On spawn failure the sender is dropped with the closure and the loop ends at once
        let spawned = std::thread::Builder::new()
            .name("pencil-producer".to_string())
            .spawn_scoped(scope, move || {
                let total = events.len();
                for event in events {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                debug!(total, "producer finished");
            });
        if let Err(e) = spawned {
            error!("Failed to spawn producer thread: {}", e);
        }

        loop {
            select! {
                recv(rx) -> msg => match msg {
                    Ok(event) => {
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
                            TraceEvent::Flush => flush_into(&mut relay, &mut summary),
                        }
                    }
                    Err(_) => break,
                },
                recv(ticker) -> _ => flush_into(&mut relay, &mut summary),
            }
        }
    });

    flush_into(&mut relay, &mut summary);
    summary.elapsed = start.elapsed();

    let stats = relay.stats();
    let sink = relay.unregister().unwrap_or_default();
    info!(
        events = summary.events,
        flushes = summary.notifying_flushes,
        lapped = stats.lapped_records,
        "threaded replay finished"
    );

    ThreadedReplay {
        summary,
        sink,
        stats,
    }
}
