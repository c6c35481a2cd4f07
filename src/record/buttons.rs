//! Packed Button Word
//!
//! ```text
//! bit  0     tip contact
//! bits 1-4   estimated properties still awaiting a correction (0-15)
//! bit  5     record is an estimation-update correction
//! bit  6     record is a predicted sample
//! bit  7     record is a synthetic barrel tap
//! bits 8-15  unused, ignored on decode
//! ```

use bitflags::bitflags;

/// Largest pending-estimate count the 4-bit field can carry
pub const MAX_PENDING_ESTIMATES: u8 = 0x0F;

const PENDING_SHIFT: u16 = 1;
const PENDING_MASK: u16 = (MAX_PENDING_ESTIMATES as u16) << PENDING_SHIFT;

bitflags! {
    /// Single-bit flags of the button word
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ButtonFlags: u16 {
        const TIP = 1 << 0;
        const ESTIMATION_UPDATE = 1 << 5;
        const PREDICTED = 1 << 6;
        const BARREL_TAP = 1 << 7;
    }
}

/// Decoded view of the button word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonState {
    /// Stylus tip is touching the surface
    pub tip: bool,
    /// Number of estimated properties still expecting an update
    pub pending_estimates: u8,
    /// This record corrects an earlier estimated record
    pub estimation_update: bool,
    /// This record is a prediction, not a confirmed sample
    pub predicted: bool,
    /// This record is a synthetic barrel tap
    pub barrel_tap: bool,
}

impl ButtonState {
    /// Pack into the wire representation
    ///
    /// `pending_estimates` is masked to its 4-bit field; larger values wrap the way
    /// the native bridge always has.
    pub fn encode(&self) -> u16 {
        let mut flags = ButtonFlags::empty();
        flags.set(ButtonFlags::TIP, self.tip);
        flags.set(ButtonFlags::ESTIMATION_UPDATE, self.estimation_update);
        flags.set(ButtonFlags::PREDICTED, self.predicted);
        flags.set(ButtonFlags::BARREL_TAP, self.barrel_tap);

        let pending = ((self.pending_estimates & MAX_PENDING_ESTIMATES) as u16) << PENDING_SHIFT;
        flags.bits() | pending
    }

    /// Unpack from the wire representation
    pub fn decode(word: u16) -> Self {
        let flags = ButtonFlags::from_bits_truncate(word);
        Self {
            tip: flags.contains(ButtonFlags::TIP),
            pending_estimates: ((word & PENDING_MASK) >> PENDING_SHIFT) as u8,
            estimation_update: flags.contains(ButtonFlags::ESTIMATION_UPDATE),
            predicted: flags.contains(ButtonFlags::PREDICTED),
            barrel_tap: flags.contains(ButtonFlags::BARREL_TAP),
        }
    }
}

impl From<u16> for ButtonState {
    fn from(word: u16) -> Self {
        Self::decode(word)
    }
}

impl From<ButtonState> for u16 {
    fn from(state: ButtonState) -> Self {
        state.encode()
    }
}
