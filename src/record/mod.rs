//! Sample Record Wire Layout
//!
//! The fixed-width record that the producer writes into the shared buffer and the
//! consumer's decoder reads back out of it. Both sides must agree on every byte, so
//! the struct is `#[repr(C, packed)]` and its offsets are checked at compile time.
//!
//! # Layout (32 bytes, no implicit padding)
//!
//! ```text
//! offset  size  field
//!      0     4  position_x               f32
//!      4     4  position_y               f32
//!      8     4  pressure                 f32
//!     12     4  tilt_x                   f32
//!     16     4  tilt_y                   f32
//!     20     2  buttons                  u16  (see [`ButtonState`])
//!     22     4  estimation_update_index  u32
//!     26     4  padding1                 f32  (reserved, zero)
//!     30     2  padding2                 u16  (reserved, zero)
//! ```
//!
//! Internal code never touches the packed `buttons` word directly: it works with
//! [`ButtonState`] and [`PenEvent`], and converts at the buffer boundary.

pub mod buttons;
pub mod codec;

pub use buttons::{ButtonFlags, ButtonState, MAX_PENDING_ESTIMATES};

use std::mem::{offset_of, size_of};

/// Size of one record in bytes
pub const RECORD_SIZE: usize = 32;

/// Byte offsets of each field, shared with the consumer's decoder
pub mod offsets {
    /// `position_x`
    pub const POSITION_X: usize = 0;
    /// `position_y`
    pub const POSITION_Y: usize = 4;
    /// `pressure`
    pub const PRESSURE: usize = 8;
    /// `tilt_x`
    pub const TILT_X: usize = 12;
    /// `tilt_y`
    pub const TILT_Y: usize = 16;
    /// `buttons`
    pub const BUTTONS: usize = 20;
    /// `estimation_update_index`
    pub const ESTIMATION_UPDATE_INDEX: usize = 22;
    /// `padding1`
    pub const PADDING1: usize = 26;
    /// `padding2`
    pub const PADDING2: usize = 30;
}

/// One stylus sample as laid out in the shared buffer
#[repr(C, packed)]
#[derive(Clone, Copy, Default)]
pub struct SampleRecord {
    /// Surface-space X coordinate
    pub position_x: f32,
    /// Surface-space Y coordinate
    pub position_y: f32,
    /// Normalized pressure
    pub pressure: f32,
    /// Tilt angle along X
    pub tilt_x: f32,
    /// Tilt angle along Y
    pub tilt_y: f32,
    /// Packed button word
    pub buttons: u16,
    /// Correlates a correction record with the estimated record it amends
    pub estimation_update_index: u32,
    /// Reserved, always zero
    pub padding1: f32,
    /// Reserved, always zero
    pub padding2: u16,
}

const _: () = {
    assert!(size_of::<SampleRecord>() == RECORD_SIZE);
    assert!(RECORD_SIZE.is_power_of_two());
    assert!(offset_of!(SampleRecord, position_x) == offsets::POSITION_X);
    assert!(offset_of!(SampleRecord, position_y) == offsets::POSITION_Y);
    assert!(offset_of!(SampleRecord, pressure) == offsets::PRESSURE);
    assert!(offset_of!(SampleRecord, tilt_x) == offsets::TILT_X);
    assert!(offset_of!(SampleRecord, tilt_y) == offsets::TILT_Y);
    assert!(offset_of!(SampleRecord, buttons) == offsets::BUTTONS);
    assert!(offset_of!(SampleRecord, estimation_update_index) == offsets::ESTIMATION_UPDATE_INDEX);
    assert!(offset_of!(SampleRecord, padding1) == offsets::PADDING1);
    assert!(offset_of!(SampleRecord, padding2) == offsets::PADDING2);
};

/// Decoded stylus sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenSample {
    /// Surface-space position (x, y)
    pub position: (f32, f32),
    /// Normalized pressure
    pub pressure: f32,
    /// Tilt angles (x, y)
    pub tilt: (f32, f32),
    /// Button and estimation state
    pub buttons: ButtonState,
    /// Correction correlation index
    pub estimation_update_index: u32,
}

/// What a record means to the consumer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenEvent {
    /// Positional sample (confirmed, predicted or correction)
    Sample(PenSample),
    /// Synthetic barrel tap, no payload
    BarrelTap,
}

impl SampleRecord {
    /// Pack a decoded sample into a record
    ///
    /// The reserved fields are always zero-filled. The barrel-tap bit is never set
    /// here; use [`SampleRecord::barrel_tap`] for that variant.
    pub fn from_sample(sample: &PenSample) -> Self {
        let buttons = ButtonState {
            barrel_tap: false,
            ..sample.buttons
        };
        Self {
            position_x: sample.position.0,
            position_y: sample.position.1,
            pressure: sample.pressure,
            tilt_x: sample.tilt.0,
            tilt_y: sample.tilt.1,
            buttons: buttons.encode(),
            estimation_update_index: sample.estimation_update_index,
            padding1: 0.0,
            padding2: 0,
        }
    }

    /// Zero-payload barrel tap record
    pub fn barrel_tap() -> Self {
        Self {
            buttons: ButtonFlags::BARREL_TAP.bits(),
            ..Self::default()
        }
    }

    /// Decoded button word
    pub fn button_state(&self) -> ButtonState {
        ButtonState::decode(self.buttons)
    }

    /// Whether this record is a synthetic barrel tap
    pub fn is_barrel_tap(&self) -> bool {
        self.button_state().barrel_tap
    }

    /// Interpret the record the way the consumer does
    pub fn event(&self) -> PenEvent {
        let buttons = self.button_state();
        if buttons.barrel_tap {
            return PenEvent::BarrelTap;
        }
        PenEvent::Sample(PenSample {
            position: (self.position_x, self.position_y),
            pressure: self.pressure,
            tilt: (self.tilt_x, self.tilt_y),
            buttons,
            estimation_update_index: self.estimation_update_index,
        })
    }
}

impl PartialEq for SampleRecord {
    /// Bitwise equality over the wire image, so NaN payloads compare equal to
    /// themselves the way the consumer's byte decoder sees them.
    fn eq(&self, other: &Self) -> bool {
        codec::to_bytes(self) == codec::to_bytes(other)
    }
}

impl std::fmt::Debug for SampleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = *self;
        f.debug_struct("SampleRecord")
            .field("position_x", &{ r.position_x })
            .field("position_y", &{ r.position_y })
            .field("pressure", &{ r.pressure })
            .field("tilt_x", &{ r.tilt_x })
            .field("tilt_y", &{ r.tilt_y })
            .field("buttons", &format_args!("{:#06x}", { r.buttons }))
            .field("estimation_update_index", &{ r.estimation_update_index })
            .finish()
    }
}
