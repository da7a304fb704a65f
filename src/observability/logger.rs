//! One JSON object per line
//!
//! `event` and `severity` lead, the caller's fields follow in key order, so
//! two runs over the same records produce byte-identical logs.

use std::fmt;
use std::io::{self, Write};

use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-pass detail (a validation that found nothing)
    Trace,
    /// Routine bookkeeping (a record saved, a default filled)
    Info,
    /// Data was changed or refused on the caller's behalf
    Warn,
    /// A write the caller asked for did not happen
    Error,
    /// The pipeline can no longer be trusted to serialize writes
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Logger;

impl Logger {
    /// TRACE, INFO and WARN go to stdout, ERROR and FATAL to stderr.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = Self::render(severity, event, fields);
        // Logging never fails the operation being logged.
        let _ = if severity >= Severity::Error {
            io::stderr().lock().write_all(line.as_bytes())
        } else {
            io::stdout().lock().write_all(line.as_bytes())
        };
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }

    /// Render one log line, trailing newline included
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = fields
            .iter()
            .filter(|(key, _)| *key != "event" && *key != "severity")
            .collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = String::with_capacity(128);
        line.push('{');
        push_pair(&mut line, "event", event);
        line.push(',');
        push_pair(&mut line, "severity", severity.as_str());
        for (key, value) in sorted {
            line.push(',');
            push_pair(&mut line, key, value);
        }
        line.push_str("}\n");
        line
    }

    /// Parse a rendered line back into its fields
    pub fn parse(line: &str) -> Option<Map<String, Json>> {
        match serde_json::from_str(line.trim_end()) {
            Ok(Json::Object(map)) => Some(map),
            _ => None,
        }
    }
}

fn push_pair(line: &mut String, key: &str, value: &str) {
    line.push_str(&Json::from(key).to_string());
    line.push(':');
    line.push_str(&Json::from(value).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::Trace.as_str(), "TRACE");
        assert_eq!(Severity::Fatal.as_str(), "FATAL");
    }

    #[test]
    fn test_render_is_json_line() {
        let line = Logger::render(Severity::Warn, "RIVAL_DEMOTED", &[("field", "default_land")]);
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let parsed = Logger::parse(&line).unwrap();
        assert_eq!(parsed["event"], "RIVAL_DEMOTED");
        assert_eq!(parsed["severity"], "WARN");
        assert_eq!(parsed["field"], "default_land");
    }

    #[test]
    fn test_field_order_is_deterministic() {
        let a = Logger::render(Severity::Info, "E", &[("zeta", "1"), ("alpha", "2")]);
        let b = Logger::render(Severity::Info, "E", &[("alpha", "2"), ("zeta", "1")]);
        assert_eq!(a, b);
        assert!(a.find("\"event\"").unwrap() < a.find("\"alpha\"").unwrap());
        assert!(a.find("\"alpha\"").unwrap() < a.find("\"zeta\"").unwrap());
    }

    #[test]
    fn test_reserved_keys_cannot_be_overridden() {
        let line = Logger::render(Severity::Info, "E", &[("event", "forged")]);
        assert_eq!(Logger::parse(&line).unwrap()["event"], "E");
    }

    #[test]
    fn test_escaping() {
        let line = Logger::render(Severity::Info, "E", &[("name", "say \"hi\"\n")]);
        assert_eq!(Logger::parse(&line).unwrap()["name"], "say \"hi\"\n");
    }
}
