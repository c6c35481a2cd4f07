//! Producer Simulation
//!
//! Drives a relay with recorded or generated pen input so the buffer and flush
//! protocol can be exercised without stylus hardware.
//!
//! ```text
//! trace.jsonl ──► read_trace ──┐
//!                              ├──► ReplayDriver ──► PencilRelay ──► RecordingSink
//! synthetic_stroke ────────────┘      (flush_every)
//! ```
//!
//! [`replay_threaded`] runs the same events from a separate producer thread with
//! tick-driven flushes.

pub mod driver;
pub mod stroke;
pub mod threaded;
pub mod trace;

pub use driver::{read_span, RecordingSink, ReplayDriver, ReplaySummary};
pub use stroke::{synthetic_stroke, StrokeShape};
pub use threaded::{replay_threaded, ThreadedReplay};
pub use trace::{parse_trace, read_trace, write_trace, TraceEvent};
