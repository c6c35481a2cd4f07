//! Flush Coordinator
//!
//! Tracks how far the consumer has been told about and computes the span of
//! records written since.
//!
//! ```text
//! write > notified:   count = write - notified
//! write <= notified:  count = (capacity - notified) + write     (wraps through 0)
//! ```
//!
//! A producer that laps the consumer by a whole buffer or more is under-reported:
//! the arithmetic only ever sees one lap, and an exact multiple of the capacity
//! looks like nothing happened. Older unread records are gone with no signal in
//! the span itself; [`crate::relay::RelayStats::lapped_records`] counts them.

use crate::record::SampleRecord;

/// Span of newly available records, starting index and length
///
/// The span may cross the end of the buffer; readers continue at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingSpan {
    /// First unread slot
    pub start: usize,
    /// Number of records, never zero
    pub count: usize,
}

impl PendingSpan {
    /// Slot indices covered by the span, wrapping at `capacity`
    pub fn indices(&self, capacity: usize) -> impl Iterator<Item = usize> {
        let start = self.start;
        let count = if capacity == 0 { 0 } else { self.count };
        (0..count).map(move |i| (start + i) % capacity)
    }

    /// Records covered by the span, read straight out of `buffer`
    pub fn records<'a>(&self, buffer: &'a [SampleRecord]) -> impl Iterator<Item = &'a SampleRecord> + 'a {
        self.indices(buffer.len()).map(move |i| &buffer[i])
    }

    /// Whether the span crosses the end of a buffer of `capacity` slots
    pub fn wraps(&self, capacity: usize) -> bool {
        self.start + self.count > capacity
    }
}

/// Last-notified cursor and the pending-span arithmetic
#[derive(Debug, Default, Clone)]
pub struct FlushCoordinator {
    last_notified_offset: usize,
}

impl FlushCoordinator {
    /// Coordinator with the notified cursor at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Index up to which the consumer has been notified
    #[inline]
    pub fn last_notified_offset(&self) -> usize {
        self.last_notified_offset
    }

    /// Compute the unflushed span and move the notified cursor up to `write_offset`
    ///
    /// Returns `None`, leaving the cursor alone, when nothing is pending.
    pub fn take_pending(&mut self, write_offset: usize, capacity: usize) -> Option<PendingSpan> {
        if capacity == 0 || write_offset == self.last_notified_offset {
            return None;
        }

        let start = self.last_notified_offset;
        let count = if write_offset > start {
            write_offset - start
        } else {
            (capacity - start) + write_offset
        };

        self.last_notified_offset = write_offset;
        Some(PendingSpan { start, count })
    }
}
