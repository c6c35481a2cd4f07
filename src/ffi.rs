//! C ABI Boundary
//!
//! Process-wide relay instance for consumers that live in another runtime and can
//! only hand over a raw buffer pointer and a C callback. Everything here forwards to
//! a single [`PencilRelay`] behind a mutex.
//!
//! # Consumer contract
//!
//! - The consumer allocates `length` records of [`SampleRecord`] (32 bytes each,
//!   packed) and passes the pointer to [`pencil_relay_register`].
//! - The memory must stay valid until [`pencil_relay_unregister`] returns. The relay
//!   never frees it.
//! - After the callback reports `(offset, count)`, the consumer reads `count` records
//!   starting at `offset`, wrapping to 0 at `length`.
//!
//! The callback runs after the lock is released, so it may call back into any entry
//! point here (including unregister).

#![allow(unsafe_code)]

use std::ptr::NonNull;

use libc::{c_int, c_uint};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::record::{SampleRecord, RECORD_SIZE};
use crate::relay::{EventBuffer, NotificationSink, PencilRelay, PendingSpan, SampleInput};

/// Consumer callback: `(offset, count)` of newly readable records
pub type PencilEventCallback = extern "C" fn(offset: c_int, count: c_int);

/// Sink that forwards spans to a C callback
#[derive(Clone, Copy)]
pub struct CallbackSink {
    callback: PencilEventCallback,
}

impl CallbackSink {
    /// Wrap a C callback
    pub fn new(callback: PencilEventCallback) -> Self {
        Self { callback }
    }

    fn invoke(&self, span: PendingSpan) {
        // Spans never exceed the registered length, which came in as a c_int.
        (self.callback)(span.start as c_int, span.count as c_int);
    }
}

impl NotificationSink for CallbackSink {
    fn notify(&mut self, span: PendingSpan, _buffer: &[SampleRecord]) {
        self.invoke(span);
    }
}

impl std::fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CallbackSink")
            .field(&(self.callback as *const ()))
            .finish()
    }
}

static RELAY: Mutex<PencilRelay<'static, CallbackSink>> = parking_lot::const_mutex(PencilRelay::new());

/// Install the consumer's callback and buffer, resetting both cursors
///
/// A null callback leaves the relay unregistered. A null buffer or non-positive
/// length registers the callback with no storage, so appends do nothing.
///
/// # Safety
///
/// If non-null, `buffer` must point to `length` writable, initialised
/// [`SampleRecord`]s that stay valid, and are not written by anyone else, until
/// [`pencil_relay_unregister`] or the next register call. The caller keeps its
/// own pointer and may read through it at any time outside an append.
#[no_mangle]
pub unsafe extern "C" fn pencil_relay_register(
    callback: Option<PencilEventCallback>,
    buffer: *mut SampleRecord,
    length: c_int,
) {
    let Some(callback) = callback else {
        warn!("register called with a null callback; relay stays unregistered");
        RELAY.lock().unregister();
        return;
    };

    let view = match (NonNull::new(buffer), usize::try_from(length)) {
        (Some(slots), Ok(len)) if len > 0 => {
            // SAFETY: caller guarantees `buffer` covers `len` records for the
            // lifetime of the registration.
            unsafe { EventBuffer::from_raw_parts(slots, len) }
        }
        _ => {
            debug!(length, null = buffer.is_null(), "registering without storage");
            EventBuffer::empty()
        }
    };

    RELAY.lock().register_buffer(CallbackSink::new(callback), view);
}

/// Drop the callback and the buffer reference, cursors back to 0
///
/// After this returns the consumer may free the buffer.
#[no_mangle]
pub extern "C" fn pencil_relay_unregister() {
    RELAY.lock().unregister();
}

/// Whether a consumer callback is installed
#[no_mangle]
pub extern "C" fn pencil_relay_is_registered() -> bool {
    RELAY.lock().is_registered()
}

/// Record one stylus sample
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn pencil_relay_append_sample(
    position_x: f32,
    position_y: f32,
    tip: bool,
    pressure: f32,
    tilt_x: f32,
    tilt_y: f32,
    estimated_properties_expecting_updates: c_uint,
    estimation_update_index: c_uint,
    is_estimation_update: bool,
    is_predicted: bool,
) {
    let input = SampleInput {
        position: (position_x, position_y),
        pressure,
        tilt: (tilt_x, tilt_y),
        tip,
        pending_estimates: estimated_properties_expecting_updates,
        estimation_update_index,
        is_estimation_update,
        is_predicted,
    };
    RELAY.lock().append_sample(&input);
}

/// Record a confirmed sample with no estimation data
///
/// Lets a consumer inject fake pen input while testing without hardware.
#[no_mangle]
pub extern "C" fn pencil_relay_append_test_sample(
    position_x: f32,
    position_y: f32,
    tip: bool,
    pressure: f32,
    tilt_x: f32,
    tilt_y: f32,
) {
    pencil_relay_append_sample(
        position_x, position_y, tip, pressure, tilt_x, tilt_y, 0, 0, false, false,
    );
}

/// Record one barrel tap
#[no_mangle]
pub extern "C" fn pencil_relay_append_barrel_tap() {
    RELAY.lock().append_barrel_tap();
}

/// Notify the consumer of every record written since the last flush
#[no_mangle]
pub extern "C" fn pencil_relay_flush() {
    let pending = {
        let mut relay = RELAY.lock();
        relay.take_pending().zip(relay.sink().copied())
    };

    if let Some((span, sink)) = pending {
        sink.invoke(span);
    }
}

/// Size of one record in bytes, for the consumer's layout check
#[no_mangle]
pub extern "C" fn pencil_relay_record_size() -> c_int {
    RECORD_SIZE as c_int
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SPANS: Mutex<Vec<(c_int, c_int)>> = parking_lot::const_mutex(Vec::new());
    static TEST_LOCK: Mutex<()> = parking_lot::const_mutex(());
    static REENTRANT_CALLS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn record_span(offset: c_int, count: c_int) {
        SPANS.lock().push((offset, count));
    }

    extern "C" fn unregister_from_callback(_offset: c_int, _count: c_int) {
        REENTRANT_CALLS.fetch_add(1, Ordering::SeqCst);
        pencil_relay_unregister();
    }

    #[test]
    fn test_record_size() {
        assert_eq!(pencil_relay_record_size(), 32);
    }

    #[test]
    fn test_register_append_flush() {
        let _guard = TEST_LOCK.lock();
        SPANS.lock().clear();

        let storage: &'static mut [SampleRecord] =
            Box::leak(vec![SampleRecord::default(); 4].into_boxed_slice());
        let ptr = storage.as_mut_ptr();

        unsafe { pencil_relay_register(Some(record_span), ptr, 4) };
        assert!(pencil_relay_is_registered());

        pencil_relay_append_test_sample(1.0, 2.0, true, 0.5, 0.0, 0.0);
        pencil_relay_append_sample(3.0, 4.0, true, 0.6, 0.1, 0.1, 2, 7, false, true);
        pencil_relay_append_barrel_tap();
        pencil_relay_flush();
        pencil_relay_flush();

        pencil_relay_unregister();
        assert!(!pencil_relay_is_registered());
        assert_eq!(SPANS.lock().as_slice(), &[(0, 3)]);

        let records = unsafe { std::slice::from_raw_parts(ptr, 4) };
        assert!(records[2].is_barrel_tap());
        assert_eq!({ records[1].estimation_update_index }, 7);
    }

    #[test]
    fn test_null_buffer_registers_without_storage() {
        let _guard = TEST_LOCK.lock();
        SPANS.lock().clear();

        unsafe { pencil_relay_register(Some(record_span), std::ptr::null_mut(), 16) };
        assert!(pencil_relay_is_registered());
        pencil_relay_append_barrel_tap();
        pencil_relay_flush();
        assert!(SPANS.lock().is_empty());
        pencil_relay_unregister();
    }

    #[test]
    fn test_non_positive_length_registers_without_storage() {
        let _guard = TEST_LOCK.lock();
        SPANS.lock().clear();

        let storage: &'static mut [SampleRecord] =
            Box::leak(vec![SampleRecord::default(); 2].into_boxed_slice());
        let ptr = storage.as_mut_ptr();

        for length in [0, -1] {
            unsafe { pencil_relay_register(Some(record_span), ptr, length) };
            assert!(pencil_relay_is_registered());
            pencil_relay_append_barrel_tap();
            pencil_relay_flush();
            assert_eq!(RELAY.lock().capacity(), 0);
        }

        pencil_relay_unregister();
        assert!(SPANS.lock().is_empty());
        let records = unsafe { std::slice::from_raw_parts(ptr, 2) };
        assert!(records.iter().all(|r| !r.is_barrel_tap()));
    }

    #[test]
    fn test_null_callback_unregisters() {
        let _guard = TEST_LOCK.lock();
        unsafe { pencil_relay_register(None, std::ptr::null_mut(), 0) };
        assert!(!pencil_relay_is_registered());
    }

    #[test]
    fn test_callback_may_reenter() {
        let _guard = TEST_LOCK.lock();
        REENTRANT_CALLS.store(0, Ordering::SeqCst);

        let storage: &'static mut [SampleRecord] =
            Box::leak(vec![SampleRecord::default(); 2].into_boxed_slice());
        unsafe { pencil_relay_register(Some(unregister_from_callback), storage.as_mut_ptr(), 2) };
        pencil_relay_append_barrel_tap();
        pencil_relay_flush();

        assert_eq!(REENTRANT_CALLS.load(Ordering::SeqCst), 1);
        assert!(!pencil_relay_is_registered());
    }
}
