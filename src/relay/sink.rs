//! Notification Sink
//!
//! The consumer's side of a flush. The relay calls the sink once per flush with the
//! newly available span and a read-only view of the shared buffer; the consumer reads
//! the records by index, wrapping at the end, without any copy through the relay.

use crate::record::SampleRecord;
use crate::relay::flush::PendingSpan;

/// Receives batch notifications from [`crate::relay::PencilRelay::flush`]
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink {
    /// New records are available in `buffer` starting at `span.start`
    fn notify(&mut self, span: PendingSpan, buffer: &[SampleRecord]);
}

impl<F> NotificationSink for F
where
    F: FnMut(PendingSpan, &[SampleRecord]),
{
    fn notify(&mut self, span: PendingSpan, buffer: &[SampleRecord]) {
        self(span, buffer)
    }
}
