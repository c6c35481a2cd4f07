//! Drives the C ABI the way a foreign runtime would: it owns the buffer, hands
//! over a raw pointer, and reads records back by offset inside its callback.

use std::os::raw::c_int;
use std::sync::Mutex;

use pencil_relay::ffi::{
    pencil_relay_append_barrel_tap, pencil_relay_append_sample, pencil_relay_append_test_sample,
    pencil_relay_flush, pencil_relay_is_registered, pencil_relay_record_size,
    pencil_relay_register, pencil_relay_unregister,
};
use pencil_relay::record::{PenEvent, SampleRecord};

const LENGTH: usize = 4;

/// Consumer-side state, as the foreign runtime would keep it
///
/// Owns its allocation through one raw pointer, used for every read and for
/// the final free.
struct Consumer {
    buffer: *mut SampleRecord,
    received: Vec<PenEvent>,
    calls: Vec<(c_int, c_int)>,
}

// The raw pointer is only dereferenced while the test holds TESTS
unsafe impl Send for Consumer {}

impl Consumer {
    fn allocate() -> Self {
        let slots = Box::into_raw(vec![SampleRecord::default(); LENGTH].into_boxed_slice());
        Self {
            buffer: slots.cast(),
            received: Vec::new(),
            calls: Vec::new(),
        }
    }

    fn slot(&self, index: usize) -> SampleRecord {
        assert!(index < LENGTH);
        unsafe { self.buffer.add(index).read() }
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        let slots = std::ptr::slice_from_raw_parts_mut(self.buffer, LENGTH);
        drop(unsafe { Box::from_raw(slots) });
    }
}

static CONSUMER: Mutex<Option<Consumer>> = Mutex::new(None);
static TESTS: Mutex<()> = Mutex::new(());

extern "C" fn on_events(mut offset: c_int, mut count: c_int) {
    let mut guard = CONSUMER.lock().unwrap();
    let consumer = guard.as_mut().expect("consumer installed");
    consumer.calls.push((offset, count));
    while count > 0 {
        let record = consumer.slot(offset as usize);
        consumer.received.push(record.event());
        offset += 1;
        if offset as usize == LENGTH {
            offset = 0;
        }
        count -= 1;
    }
}

fn install() {
    let consumer = Consumer::allocate();
    let buffer = consumer.buffer;
    *CONSUMER.lock().unwrap() = Some(consumer);
    unsafe { pencil_relay_register(Some(on_events), buffer, LENGTH as c_int) };
}

fn take_consumer() -> Consumer {
    CONSUMER.lock().unwrap().take().expect("consumer installed")
}

#[test]
fn test_foreign_consumer_reads_wrapped_span() {
    let _serial = TESTS.lock().unwrap_or_else(|e| e.into_inner());
    install();

    pencil_relay_append_test_sample(1.0, 1.0, true, 0.1, 0.0, 0.0);
    pencil_relay_append_test_sample(2.0, 2.0, true, 0.2, 0.0, 0.0);
    pencil_relay_append_test_sample(3.0, 3.0, true, 0.3, 0.0, 0.0);
    pencil_relay_flush();

    pencil_relay_append_sample(4.0, 4.0, true, 0.4, 0.5, -0.5, 1, 42, false, true);
    pencil_relay_append_barrel_tap();
    pencil_relay_flush();
    pencil_relay_flush();

    pencil_relay_unregister();
    let consumer = take_consumer();

    assert_eq!(consumer.calls, vec![(0, 3), (3, 2)]);
    assert_eq!(consumer.received.len(), 5);
    match consumer.received[3] {
        PenEvent::Sample(sample) => {
            assert_eq!(sample.position, (4.0, 4.0));
            assert_eq!(sample.tilt, (0.5, -0.5));
            assert_eq!(sample.estimation_update_index, 42);
            assert_eq!(sample.buttons.pending_estimates, 1);
            assert!(sample.buttons.predicted);
        }
        PenEvent::BarrelTap => panic!("Expected sample D"),
    }
    assert_eq!(consumer.received[4], PenEvent::BarrelTap);
}

#[test]
fn test_calls_before_register_are_ignored() {
    let _serial = TESTS.lock().unwrap_or_else(|e| e.into_inner());
    pencil_relay_unregister();

    pencil_relay_append_test_sample(1.0, 1.0, true, 0.5, 0.0, 0.0);
    pencil_relay_append_barrel_tap();
    pencil_relay_flush();
    assert!(!pencil_relay_is_registered());
}

#[test]
fn test_register_resets_cursors() {
    let _serial = TESTS.lock().unwrap_or_else(|e| e.into_inner());
    install();
    pencil_relay_append_barrel_tap();
    pencil_relay_append_barrel_tap();
    // Held until the relay has moved on to the second buffer
    let first = take_consumer();

    install();
    pencil_relay_append_test_sample(9.0, 9.0, false, 0.0, 0.0, 0.0);
    pencil_relay_flush();
    pencil_relay_unregister();

    let second = take_consumer();
    assert_eq!(second.calls, vec![(0, 1)]);
    assert!(first.slot(0).is_barrel_tap() && first.slot(1).is_barrel_tap());
    assert!(!second.slot(0).is_barrel_tap());
    assert!(first.calls.is_empty());
}

#[test]
fn test_consumer_reads_between_appends() {
    let _serial = TESTS.lock().unwrap_or_else(|e| e.into_inner());
    install();

    pencil_relay_append_barrel_tap();
    pencil_relay_flush();
    pencil_relay_append_test_sample(5.0, 6.0, true, 0.7, 0.0, 0.0);
    pencil_relay_flush();

    // Reads outside the callback, while still registered
    let tapped = {
        let guard = CONSUMER.lock().unwrap();
        guard.as_ref().expect("consumer installed").slot(0)
    };
    pencil_relay_append_barrel_tap();
    pencil_relay_flush();

    pencil_relay_unregister();
    let consumer = take_consumer();

    assert!(tapped.is_barrel_tap());
    assert_eq!(consumer.calls, vec![(0, 1), (1, 1), (2, 1)]);
    assert_eq!(consumer.received.len(), 3);
    assert_eq!(consumer.received[0], PenEvent::BarrelTap);
    assert!(matches!(consumer.received[1], PenEvent::Sample(s) if s.position == (5.0, 6.0)));
    assert_eq!(consumer.received[2], PenEvent::BarrelTap);
    assert!(consumer.slot(2).is_barrel_tap());
}

#[test]
fn test_record_size_matches_layout() {
    assert_eq!(pencil_relay_record_size() as usize, std::mem::size_of::<SampleRecord>());
}
