//! Event Buffer
//!
//! Non-owning circular view over consumer-allocated record storage. The consumer
//! allocates and frees the memory; this type only borrows it for the length of one
//! registration.
//!
//! The consumer keeps its own pointer into the same slots and reads them between
//! appends, so the view never holds a `&mut` across calls. Writes go through the
//! raw slot pointer one record at a time.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::trace;

use crate::record::SampleRecord;

/// Borrowed ring of [`SampleRecord`] slots plus the producer's write cursor
pub struct EventBuffer<'buf> {
    slots: NonNull<SampleRecord>,
    capacity: usize,
    write_offset: usize,
    _borrow: PhantomData<&'buf mut [SampleRecord]>,
}

// The view is a `&mut [SampleRecord]` in all but name.
unsafe impl Send for EventBuffer<'_> {}
unsafe impl Sync for EventBuffer<'_> {}

impl<'buf> EventBuffer<'buf> {
    /// Wrap consumer-owned storage, write cursor at slot 0
    pub fn new(slots: &'buf mut [SampleRecord]) -> Self {
        let capacity = slots.len();
        // SAFETY: the exclusive borrow is held for 'buf through the view.
        unsafe { Self::from_raw_parts(NonNull::from(slots).cast(), capacity) }
    }

    /// View with no slots; every append is a no-op
    pub fn empty() -> Self {
        // SAFETY: a dangling pointer is never dereferenced at capacity 0.
        unsafe { Self::from_raw_parts(NonNull::dangling(), 0) }
    }

    /// Wrap storage that another runtime reads through its own pointer
    ///
    /// # Safety
    ///
    /// `slots` must point to `capacity` initialised records that stay valid for
    /// `'buf`. Nothing else may write them while the view exists; other readers
    /// are allowed.
    pub unsafe fn from_raw_parts(slots: NonNull<SampleRecord>, capacity: usize) -> Self {
        Self {
            slots,
            capacity,
            write_offset: 0,
            _borrow: PhantomData,
        }
    }

    /// Number of slots, fixed for the life of the view
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the next slot to be written
    #[inline]
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Write `record` at the cursor and advance it, wrapping at capacity
    ///
    /// Whatever was in the slot is overwritten, read or not. Returns `false`
    /// without touching memory when the buffer has no slots.
    pub fn append(&mut self, record: SampleRecord) -> bool {
        let capacity = self.capacity;
        if capacity == 0 {
            return false;
        }

        let slot = self.write_offset;
        // SAFETY: slot < capacity, and the view is the only writer.
        unsafe { self.slots.as_ptr().add(slot).write(record) };
        self.write_offset = if slot + 1 >= capacity { 0 } else { slot + 1 };

        trace!(slot, next = self.write_offset, "record written");
        true
    }

    /// Read-only view of every slot
    #[inline]
    pub fn as_slice(&self) -> &[SampleRecord] {
        // SAFETY: valid for `capacity` records; no write happens while the
        // returned borrow of `self` is alive.
        unsafe { std::slice::from_raw_parts(self.slots.as_ptr(), self.capacity) }
    }

    /// Record at `index`, if in range
    pub fn get(&self, index: usize) -> Option<&SampleRecord> {
        self.as_slice().get(index)
    }
}

impl std::fmt::Debug for EventBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBuffer")
            .field("capacity", &self.capacity)
            .field("write_offset", &self.write_offset)
            .finish()
    }
}
