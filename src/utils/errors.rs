//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

use crate::error::RelayError;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    // Header
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    // Library errors anywhere in the chain win over message sniffing
    let relay_error = error.chain().find_map(|e| e.downcast_ref::<RelayError>());
    let error_msg = error.to_string();

    match relay_error {
        Some(RelayError::Trace { line, .. }) => format_trace_error(&mut output, *line),
        Some(e) if e.is_decode_error() => format_layout_error(&mut output, &e.to_string()),
        _ if error_msg.contains("config") => format_config_error(&mut output, &error_msg),
        _ => format_generic_error(&mut output, &error_msg),
    }

    // Technical details
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    // Footer with help
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: pencil-relay -vvv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Keep a log file: pencil-relay --log-file relay.log"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_trace_error(output: &mut String, line: usize) {
    writeln!(output, "Trace File Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not parse line {} of the pen trace.", line).ok();
    writeln!(output).ok();
    writeln!(output, "Each line must be one JSON object tagged with \"kind\":").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "  {{\"kind\":\"sample\",\"position\":[10.0,20.0],\"pressure\":0.5,\"tip\":true}}"
    )
    .ok();
    writeln!(output, "  {{\"kind\":\"barrel_tap\"}}").ok();
    writeln!(output, "  {{\"kind\":\"flush\"}}").ok();
    writeln!(output).ok();
    writeln!(output, "  → Blank lines are skipped").ok();
    writeln!(output, "  → Every sample field except position is optional").ok();
}

fn format_layout_error(output: &mut String, error: &str) {
    writeln!(output, "Record Layout Error").ok();
    writeln!(output).ok();
    writeln!(output, "{}", error).ok();
    writeln!(output).ok();
    writeln!(output, "  → Buffer images are whole 32-byte records").ok();
    writeln!(
        output,
        "  → Check the consumer declares the same packed layout"
    )
    .ok();
}

fn format_config_error(output: &mut String, _error: &str) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Configuration file not found").ok();
    writeln!(
        output,
        "     → Default location: ~/.config/pencil-relay/config.toml"
    )
    .ok();
    writeln!(
        output,
        "     → Or specify: pencil-relay -c /path/to/config.toml"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, etc.").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Out-of-range values").ok();
    writeln!(output, "     → relay.capacity and relay.flush_every must be >= 1").ok();
    writeln!(output, "     → logging.format is pretty, compact or json").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Relay Error").ok();
    writeln!(output).ok();
    writeln!(output, "An error occurred while running the relay.").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_format_user_error() {
        let error = anyhow::anyhow!("something broke");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("Relay Error"));
        assert!(formatted.contains("something broke"));
    }

    #[test]
    fn test_trace_error_formatting() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let result: std::result::Result<(), RelayError> =
            Err(RelayError::Trace { line: 7, source });
        let error = result.context("Failed to load trace").unwrap_err();

        let formatted = format_user_error(&error);
        assert!(formatted.contains("Trace File Error"));
        assert!(formatted.contains("line 7"));
    }

    #[test]
    fn test_config_error_formatting() {
        let error = anyhow::anyhow!("Failed to read config file: /nope.toml");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Configuration Error"));
    }
}
