//! Structured JSON logger
//!
//! - Structured logs (JSON)
//! - Deterministic key ordering
//! - Explicit severity levels
//! - One log line = one event
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-mutation detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Rejected requests
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide threshold; events below it are dropped.
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Warn as u8);

/// A structured logger that outputs JSON logs
///
/// Library containers log through this; hosts pick the verbosity with
/// [`Logger::set_min_severity`].
pub struct Logger;

impl Logger {
    /// Set the minimum severity that will be written
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    /// Current minimum severity
    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Returns true if an event at `severity` would be written
    pub fn enabled(severity: Severity) -> bool {
        let min = sink::threshold().unwrap_or_else(Self::min_severity);
        severity >= min
    }

    /// Log an event with the given severity and fields
    ///
    /// Fields are output in deterministic order (alphabetical by key).
    /// ERROR and FATAL go to stderr, everything else to stdout.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        let line = Self::format_line(severity, event, fields);
        if sink::record(&line) {
            return;
        }
        if severity >= Severity::Error {
            Self::write_line(&line, &mut io::stderr());
        } else {
            Self::write_line(&line, &mut io::stdout());
        }
    }

    fn write_line<W: Write>(line: &str, writer: &mut W) {
        // Logging must never take a container operation down with it.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Render one JSON log line, newline-terminated
    fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(128);

        output.push_str("{\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");
        output
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }
}

/// Capture a log line for testing, bypassing the severity filter
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    Logger::format_line(severity, event, fields)
}


#[cfg(not(test))]
mod sink {
    use super::Severity;

    pub(super) fn threshold() -> Option<Severity> {
        None
    }

    pub(super) fn record(_line: &str) -> bool {
        false
    }
}

/// Run `f` with this thread's log lines captured at threshold `min`.
///
/// Returns the captured lines parsed as JSON, in emission order.
#[cfg(test)]
pub fn capture_logs<F: FnOnce()>(min: Severity, f: F) -> Vec<serde_json::Value> {
    sink::capture(min, f)
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
