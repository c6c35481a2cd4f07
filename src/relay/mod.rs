//! Shared Circular Event Buffer and Flush Protocol
//!
//! The producer (platform input delivery) appends one record per stylus sample or
//! barrel tap. The consumer (application runtime) owns the buffer memory and is told,
//! one flush at a time, which span of slots became readable since last time.
//!
//! # Architecture
//!
//! ```text
//! producer                                   consumer
//!    │ append_sample / append_barrel_tap        ▲
//!    ▼                                          │ notify(span, &buffer)
//! ┌─────────────────────┐   flush()   ┌─────────────────────┐
//! │  EventBuffer        │────────────►│  FlushCoordinator   │
//! │  write_offset       │             │  last_notified      │
//! └─────────────────────┘             └─────────────────────┘
//!    │ writes in place                          │ span may wrap through 0
//!    ▼                                          ▼
//!        consumer-owned [SampleRecord; capacity]
//! ```
//!
//! # Overflow
//!
//! Appends never wait and never fail. When the producer outruns the consumer the
//! oldest unread records are overwritten, and a producer that laps the consumer by a
//! whole buffer is under-reported by the next flush. This is the intended policy:
//! bounded memory, newest data favoured.
//!
//! # Usage
//!
//! ```rust
//! use pencil_relay::record::SampleRecord;
//! use pencil_relay::relay::{PencilRelay, PendingSpan, SampleInput};
//!
//! let mut storage = vec![SampleRecord::default(); 4];
//! let mut seen = Vec::new();
//! {
//!     let mut relay = PencilRelay::new();
//!     relay.register(
//!         |span: PendingSpan, buffer: &[SampleRecord]| {
//!             seen.extend(span.records(buffer).map(SampleRecord::event));
//!         },
//!         &mut storage,
//!     );
//!
//!     relay.append_sample(&SampleInput::contact(10.0, 20.0, 0.5));
//!     relay.append_barrel_tap();
//!     assert_eq!(relay.flush(), Some(PendingSpan { start: 0, count: 2 }));
//! }
//! assert_eq!(seen.len(), 2);
//! ```

pub mod buffer;
pub mod context;
pub mod flush;
pub mod input;
pub mod sink;
pub mod stats;

pub use buffer::EventBuffer;
pub use context::PencilRelay;
pub use flush::{FlushCoordinator, PendingSpan};
pub use input::SampleInput;
pub use sink::NotificationSink;
pub use stats::RelayStats;
