//! # pencil-relay
//!
//! Stylus input relay: the platform input service writes pen samples into a
//! circular buffer owned by an application runtime, and periodic flushes tell the
//! runtime which slots became readable.
//!
//! - [`record`] - 32-byte packed sample record, button bit packing, byte codec
//! - [`relay`] - event buffer, flush coordinator, registration lifecycle
//! - [`ffi`] - C ABI over one process-wide relay
//! - [`replay`] - trace files and synthetic strokes to drive a relay without hardware
//!
//! # Architecture
//!
//! ```text
//! pencil-relay
//!   ├─> Producer (platform touch delivery, or replay harness)
//!   │     append_sample / append_barrel_tap
//!   ├─> PencilRelay
//!   │     ├─> EventBuffer (write cursor, wraps at capacity)
//!   │     └─> FlushCoordinator (last-notified cursor)
//!   └─> Consumer (runtime callback, reads `count` records from `offset`)
//! ```
//!
//! # Data Flow
//!
//! **Write Path:** Producer → SampleInput → SampleRecord → consumer buffer slot
//!
//! **Notify Path:** Display tick → flush → (offset, count) → consumer callback

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Relay configuration
pub mod config;

/// Error types
pub mod error;

/// C ABI boundary
pub mod ffi;

/// Shared-buffer record layout
pub mod record;

/// Event buffer and flush protocol
pub mod relay;

/// Producer simulation
pub mod replay;

/// Metrics and error formatting
pub mod utils;

pub use error::{RelayError, Result};
pub use record::{ButtonState, PenEvent, PenSample, SampleRecord, RECORD_SIZE};
pub use relay::{NotificationSink, PencilRelay, PendingSpan, RelayStats, SampleInput};
