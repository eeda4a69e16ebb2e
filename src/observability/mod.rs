//! Observability subsystem for aeroquery
//!
//! - Structured logging (JSON, one line per event, stderr)
//! - Monotonic request counters
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here can change how a request is
//! compiled or which index it uses.
//!
//! # Usage
//!
//! ```ignore
//! use aeroquery::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::IndexSelected, &[("index", "nameGlobalIndex")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.record_selection(false);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
