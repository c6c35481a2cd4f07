//! Synthetic pen strokes
//!
//! Deterministic input for demos and benchmarks when no trace file or hardware is
//! around. The stroke exercises every flag the record carries: every third sample
//! arrives with an estimated pressure and is corrected by an estimation update right
//! after the next sample, every fifth sample is predicted, and the pen lifts on the
//! last sample.

use std::f32::consts::TAU;

use crate::relay::SampleInput;
use crate::replay::trace::TraceEvent;

/// Shape of a generated stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeShape {
    /// Circle center
    pub center: (f32, f32),
    /// Circle radius
    pub radius: f32,
}

impl Default for StrokeShape {
    fn default() -> Self {
        Self {
            center: (512.0, 384.0),
            radius: 200.0,
        }
    }
}

/// Circular stroke of `points` samples, estimation updates interleaved
///
/// Returns an empty trace for `points == 0`. No flush events are emitted.
pub fn synthetic_stroke(points: usize, shape: StrokeShape) -> Vec<TraceEvent> {
    let mut events = Vec::with_capacity(points + points / 3 + 1);
    let mut awaiting_update: Option<SampleInput> = None;

    for i in 0..points {
        let t = i as f32 / points as f32;
        let angle = t * TAU;
        let last = i + 1 == points;

        let mut sample = SampleInput {
            position: (
                shape.center.0 + shape.radius * angle.cos(),
                shape.center.1 + shape.radius * angle.sin(),
            ),
            pressure: if last { 0.0 } else { 0.3 + 0.4 * (angle * 2.0).sin().abs() },
            tilt: (0.25 * angle.cos(), 0.25 * angle.sin()),
            tip: !last,
            estimation_update_index: i as u32,
            is_predicted: i % 5 == 4,
            ..SampleInput::default()
        };
        if i % 3 == 0 && !last {
            sample.pending_estimates = 1;
        }
        events.push(TraceEvent::Sample(sample));

        if let Some(mut earlier) = awaiting_update.take() {
            earlier.pending_estimates = 0;
            earlier.is_estimation_update = true;
            earlier.is_predicted = false;
            earlier.pressure = (earlier.pressure + 0.05).min(1.0);
            events.push(TraceEvent::Sample(earlier));
        }
        if sample.pending_estimates > 0 {
            awaiting_update = Some(sample);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(events: &[TraceEvent]) -> Vec<SampleInput> {
        events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Sample(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_stroke() {
        assert!(synthetic_stroke(0, StrokeShape::default()).is_empty());
    }

    #[test]
    fn test_stroke_is_deterministic() {
        let a = synthetic_stroke(40, StrokeShape::default());
        let b = synthetic_stroke(40, StrokeShape::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_estimate_is_corrected() {
        let all = samples(&synthetic_stroke(30, StrokeShape::default()));
        let estimated: Vec<u32> = all
            .iter()
            .filter(|s| s.pending_estimates > 0)
            .map(|s| s.estimation_update_index)
            .collect();
        let updates: Vec<u32> = all
            .iter()
            .filter(|s| s.is_estimation_update)
            .map(|s| s.estimation_update_index)
            .collect();

        assert!(!estimated.is_empty());
        assert_eq!(estimated, updates);
    }

    #[test]
    fn test_stroke_ends_with_lift() {
        let all = samples(&synthetic_stroke(10, StrokeShape::default()));
        let last = all.iter().rev().find(|s| !s.is_estimation_update).unwrap();
        assert!(!last.tip);
        assert_eq!(last.pressure, 0.0);
        assert!(all.iter().any(|s| s.is_predicted));
    }
}
