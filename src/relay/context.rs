//! Relay Context
//!
//! One instance per shared buffer. Holds the registration (sink, borrowed buffer,
//! cursors) and funnels both producer variants through the same append path.
//!
//! # Lifecycle
//!
//! ```text
//!            register()                       unregister()
//! Unregistered ─────────► Registered ───────────────────────► Unregistered
//!                          │    ▲
//!                          └────┘ register() again replaces everything
//! ```
//!
//! While unregistered, appends and flushes return immediately without touching any
//! memory or calling any sink.

use tracing::{debug, trace, warn};

use crate::record::SampleRecord;
use crate::relay::buffer::EventBuffer;
use crate::relay::flush::{FlushCoordinator, PendingSpan};
use crate::relay::input::SampleInput;
use crate::relay::sink::NotificationSink;
use crate::relay::stats::RelayStats;

struct Registration<'buf, S> {
    sink: S,
    buffer: EventBuffer<'buf>,
    flush: FlushCoordinator,
    /// Records written since the last flush, used only for lap accounting
    unnotified: u64,
}

/// Shared circular event buffer plus its flush protocol
///
/// Every operation takes `&mut self`, so a producer and a consumer on different
/// threads must serialise access themselves (the [`crate::ffi`] boundary does so
/// with a mutex).
pub struct PencilRelay<'buf, S> {
    registration: Option<Registration<'buf, S>>,
    stats: RelayStats,
}

impl<'buf, S: NotificationSink> PencilRelay<'buf, S> {
    /// Relay with nothing registered
    pub const fn new() -> Self {
        Self {
            registration: None,
            stats: RelayStats::ZERO,
        }
    }

    /// Install the sink and the consumer's buffer, both cursors reset to 0
    ///
    /// Any previous registration is dropped. An empty buffer is accepted; appends
    /// then do nothing until a real buffer is registered.
    pub fn register(&mut self, sink: S, buffer: &'buf mut [SampleRecord]) {
        self.register_buffer(sink, EventBuffer::new(buffer));
    }

    /// [`PencilRelay::register`] for a view built elsewhere, e.g. over a raw
    /// pointer handed across the C ABI
    pub fn register_buffer(&mut self, sink: S, buffer: EventBuffer<'buf>) {
        let capacity = buffer.capacity();
        if self.registration.is_some() {
            debug!(capacity, "replacing existing relay registration");
        } else {
            debug!(capacity, "relay registered");
        }

        self.registration = Some(Registration {
            sink,
            buffer,
            flush: FlushCoordinator::new(),
            unnotified: 0,
        });
    }

    /// Clear the registration, handing the sink back
    ///
    /// The buffer borrow ends here; the consumer may free its storage once the
    /// relay itself is gone.
    pub fn unregister(&mut self) -> Option<S> {
        let registration = self.registration.take()?;
        debug!(
            capacity = registration.buffer.capacity(),
            unnotified = registration.unnotified,
            "relay unregistered"
        );
        Some(registration.sink)
    }

    /// Whether a consumer is listening
    ///
    /// Producers check this to skip building events when nobody will read them.
    #[inline]
    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    /// Write one stylus sample
    pub fn append_sample(&mut self, input: &SampleInput) {
        if !self.is_registered() {
            self.stats.dropped_no_consumer += 1;
            return;
        }
        if self.append(input.to_record()) {
            self.stats.appended += 1;
        }
    }

    /// Write one zero-payload barrel-tap record
    pub fn append_barrel_tap(&mut self) {
        if !self.is_registered() {
            self.stats.dropped_no_consumer += 1;
            return;
        }
        if self.append(SampleRecord::barrel_tap()) {
            self.stats.barrel_taps += 1;
        }
    }

    fn append(&mut self, record: SampleRecord) -> bool {
        let Some(registration) = self.registration.as_mut() else {
            return false;
        };
        if !registration.buffer.append(record) {
            self.stats.dropped_no_consumer += 1;
            return false;
        }
        registration.unnotified += 1;
        true
    }

    /// Advance the notified cursor and return the span the consumer should read,
    /// without calling the sink
    ///
    /// [`PencilRelay::flush`] is this plus the notification. Boundaries that must
    /// call the consumer outside a lock use this directly.
    pub fn take_pending(&mut self) -> Option<PendingSpan> {
        let Some(registration) = self.registration.as_mut() else {
            self.stats.dropped_no_consumer += 1;
            return None;
        };

        let capacity = registration.buffer.capacity();
        if capacity == 0 {
            self.stats.dropped_no_consumer += 1;
            return None;
        }
        let span = registration
            .flush
            .take_pending(registration.buffer.write_offset(), capacity);

        let reported = span.map_or(0, |s| s.count as u64);
        if registration.unnotified > reported {
            let lost = registration.unnotified - reported;
            self.stats.lapped_records += lost;
            warn!(
                capacity,
                written = registration.unnotified,
                reported,
                lost,
                "producer lapped the consumer; unread records were overwritten"
            );
        }
        registration.unnotified = 0;

        if let Some(span) = span {
            self.stats.flushes += 1;
            self.stats.records_notified += span.count as u64;
            trace!(start = span.start, count = span.count, "pending span taken");
        }
        span
    }

    /// Tell the consumer about everything written since the last flush
    ///
    /// Calls the sink exactly once with the span, or not at all when nothing is
    /// pending or nothing is registered.
    pub fn flush(&mut self) -> Option<PendingSpan> {
        let span = self.take_pending()?;
        if let Some(registration) = self.registration.as_mut() {
            registration
                .sink
                .notify(span, registration.buffer.as_slice());
        }
        Some(span)
    }

    /// Registered buffer capacity, 0 when unregistered
    pub fn capacity(&self) -> usize {
        self.registration
            .as_ref()
            .map_or(0, |r| r.buffer.capacity())
    }

    /// Next slot the producer will write, 0 when unregistered
    pub fn write_offset(&self) -> usize {
        self.registration
            .as_ref()
            .map_or(0, |r| r.buffer.write_offset())
    }

    /// Slot up to which the consumer has been notified, 0 when unregistered
    pub fn last_notified_offset(&self) -> usize {
        self.registration
            .as_ref()
            .map_or(0, |r| r.flush.last_notified_offset())
    }

    /// Read-only view of the registered buffer
    pub fn buffer(&self) -> Option<&[SampleRecord]> {
        self.registration.as_ref().map(|r| r.buffer.as_slice())
    }

    /// Registered sink
    pub fn sink(&self) -> Option<&S> {
        self.registration.as_ref().map(|r| &r.sink)
    }

    /// Running counters
    pub fn stats(&self) -> RelayStats {
        self.stats
    }
}

impl<S: NotificationSink> Default for PencilRelay<'_, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for PencilRelay<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("PencilRelay");
        match &self.registration {
            Some(r) => d
                .field("buffer", &r.buffer)
                .field("last_notified_offset", &r.flush.last_notified_offset()),
            None => d.field("buffer", &Option::<()>::None),
        };
        d.field("stats", &self.stats).finish()
    }
}
