//! Producer-side sample arguments

use serde::{Deserialize, Serialize};

use crate::record::{ButtonState, SampleRecord, MAX_PENDING_ESTIMATES};

/// Everything the platform input service reports for one stylus sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleInput {
    /// Surface-space position (x, y)
    pub position: (f32, f32),
    /// Normalized pressure
    #[serde(default)]
    pub pressure: f32,
    /// Tilt angles (x, y)
    #[serde(default)]
    pub tilt: (f32, f32),
    /// Tip is in contact with the surface
    #[serde(default)]
    pub tip: bool,
    /// Estimated properties still expecting an update; only the low 4 bits are kept
    #[serde(default)]
    pub pending_estimates: u32,
    /// Correlation index for later corrections
    #[serde(default)]
    pub estimation_update_index: u32,
    /// This sample corrects an earlier estimated one
    #[serde(default)]
    pub is_estimation_update: bool,
    /// This sample is predicted, not yet confirmed
    #[serde(default)]
    pub is_predicted: bool,
}

impl SampleInput {
    /// Confirmed sample at `(x, y)` with the tip down
    pub fn contact(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            position: (x, y),
            pressure,
            tip: true,
            ..Self::default()
        }
    }

    /// Button state this sample packs to
    pub fn button_state(&self) -> ButtonState {
        ButtonState {
            tip: self.tip,
            pending_estimates: (self.pending_estimates & MAX_PENDING_ESTIMATES as u32) as u8,
            estimation_update: self.is_estimation_update,
            predicted: self.is_predicted,
            barrel_tap: false,
        }
    }

    /// Pack into the shared-buffer record
    pub fn to_record(&self) -> SampleRecord {
        SampleRecord {
            position_x: self.position.0,
            position_y: self.position.1,
            pressure: self.pressure,
            tilt_x: self.tilt.0,
            tilt_y: self.tilt.1,
            buttons: self.button_state().encode(),
            estimation_update_index: self.estimation_update_index,
            padding1: 0.0,
            padding2: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PenEvent;

    #[test]
    fn test_to_record_packs_flags() {
        let input = SampleInput {
            position: (10.0, 20.0),
            pressure: 0.4,
            tilt: (0.1, 0.2),
            tip: true,
            pending_estimates: 5,
            estimation_update_index: 99,
            is_estimation_update: true,
            is_predicted: false,
        };
        let record = input.to_record();
        assert_eq!({ record.buttons }, 0b0010_1011);

        match record.event() {
            PenEvent::Sample(sample) => {
                assert_eq!(sample.position, (10.0, 20.0));
                assert_eq!(sample.estimation_update_index, 99);
                assert_eq!(sample.buttons.pending_estimates, 5);
                assert!(sample.buttons.estimation_update);
            }
            PenEvent::BarrelTap => panic!("Expected a sample"),
        }
    }

    #[test]
    fn test_pending_estimates_masked_to_four_bits() {
        let input = SampleInput {
            pending_estimates: 0x1F,
            ..SampleInput::default()
        };
        assert_eq!(input.button_state().pending_estimates, 0x0F);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let input: SampleInput = serde_json::from_str(r#"{"position":[1.0,2.0],"tip":true}"#).unwrap();
        assert_eq!(input.position, (1.0, 2.0));
        assert!(input.tip);
        assert_eq!(input.pressure, 0.0);
    }
}
