//! Observability for index containers
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle and mutation events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on container behavior
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use aeroindex::observability::{Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Info);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

#[cfg(test)]
pub(crate) use logger::capture_logs;

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
