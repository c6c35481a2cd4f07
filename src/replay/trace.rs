//! JSON Lines pen traces
//!
//! One event per line:
//!
//! ```text
//! {"kind":"sample","position":[10.0,20.0],"pressure":0.5,"tip":true}
//! {"kind":"barrel_tap"}
//! {"kind":"flush"}
//! ```
//!
//! Blank lines are skipped. Sample fields other than `position` default to zero/false.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};
use crate::relay::SampleInput;

/// One producer-side step of a trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Stylus sample
    Sample(SampleInput),
    /// Barrel tap
    BarrelTap,
    /// Explicit flush point
    Flush,
}

impl TraceEvent {
    /// Whether replaying this event writes a record
    pub fn writes_record(&self) -> bool {
        !matches!(self, TraceEvent::Flush)
    }
}

/// Parse a whole trace held in memory
pub fn parse_trace(text: &str) -> Result<Vec<TraceEvent>> {
    read_trace(text.as_bytes())
}

/// Parse a trace line by line
///
/// Errors carry the 1-based line number of the offending line.
pub fn read_trace(reader: impl BufRead) -> Result<Vec<TraceEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| RelayError::Trace {
            line: idx + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Write events as JSON Lines
pub fn write_trace<'a>(
    events: impl IntoIterator<Item = &'a TraceEvent>,
    mut writer: impl Write,
) -> Result<()> {
    for event in events {
        // Serializing these plain types cannot fail except through the writer.
        serde_json::to_writer(&mut writer, event).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
