//! Structured logging and counters
//!
//! Rules never log directly; they hand an [`Event`] and a few string fields
//! to the [`Observer`] they were given, which counts the event and, unless
//! silenced, writes one JSON line for it.
//!
//! ```ignore
//! use morse::observability::{Event, Observer};
//!
//! let observer = Observer::new(true);
//! observer.emit(Event::RivalDemoted, &[("record_type", "land"), ("field", "default_land")]);
//! assert_eq!(observer.metrics().snapshot().rivals_demoted, 1);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, RuleMetrics};

/// Counts every event; logs it when `emit_events` is set.
#[derive(Debug, Default)]
pub struct Observer {
    emit_events: bool,
    metrics: RuleMetrics,
}

impl Observer {
    pub fn new(emit_events: bool) -> Self {
        Self {
            emit_events,
            metrics: RuleMetrics::new(),
        }
    }

    pub fn emit(&self, event: Event, fields: &[(&str, &str)]) {
        self.metrics.observe(event);
        if self.emit_events {
            log_event_with_fields(event, fields);
        }
    }

    /// Like [`emit`](Self::emit), counting `n` occurrences under one log line
    pub fn emit_n(&self, event: Event, n: u64, fields: &[(&str, &str)]) {
        self.metrics.observe_n(event, n);
        if self.emit_events {
            log_event_with_fields(event, fields);
        }
    }

    pub fn metrics(&self) -> &RuleMetrics {
        &self.metrics
    }

    pub fn emits_events(&self) -> bool {
        self.emit_events
    }
}

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
