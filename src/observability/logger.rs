//! JSON-line logger for request compilation and retrieval
//!
//! Each call writes exactly one object to stderr: `event`, then `severity`,
//! then the caller's fields sorted by key. Lines below the process-wide
//! minimum severity are dropped before any formatting happens. stdout is
//! left to the CLI envelopes.

use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// How loud a log line is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-compilation detail such as placeholder counts
    Trace = 0,
    /// Requests built, indexes chosen, pages fetched
    Info = 1,
    /// Rejected conditions and plans, store failures
    Warn = 2,
    /// Reserved for failures of the tool itself
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Parses a `log_level` config value, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(format!("Unknown log level '{}'", other)),
        }
    }
}

/// Process-wide stderr logger
pub struct Logger;

impl Logger {
    /// Drops every later line below `severity`
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < Self::min_severity() {
            return;
        }
        let line = format_line(severity, event, fields);
        let mut stderr = io::stderr().lock();
        // A lost log line never fails the request
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }
}

/// Renders one newline-terminated JSON object
fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let mut line = String::with_capacity(64 + fields.len() * 32);
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

fn push_pair(line: &mut String, key: &str, value: &str) {
    push_quoted(line, key);
    line.push(':');
    push_quoted(line, value);
}

/// Appends `raw` as a JSON string literal
fn push_quoted(line: &mut String, raw: &str) {
    line.push('"');
    for c in raw.chars() {
        match c {
            '"' => line.push_str("\\\""),
            '\\' => line.push_str("\\\\"),
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            '\t' => line.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(line, "\\u{:04x}", c as u32);
            }
            c => line.push(c),
        }
    }
    line.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("TRACE".parse::<Severity>().unwrap(), Severity::Trace);
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warn);
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_line_is_one_json_object() {
        let line = format_line(Severity::Info, "INDEX_SELECTED", &[("index", "nameGlobalIndex")]);

        assert!(line.ends_with("}\n"));
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "INDEX_SELECTED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["index"], "nameGlobalIndex");
    }

    #[test]
    fn test_fields_sorted_after_header() {
        let first = format_line(Severity::Warn, "NO_USABLE_INDEX", &[("table", "users"), ("code", "x")]);
        let second = format_line(Severity::Warn, "NO_USABLE_INDEX", &[("code", "x"), ("table", "users")]);

        assert_eq!(first, second);
        assert!(first.starts_with("{\"event\":\"NO_USABLE_INDEX\",\"severity\":\"WARN\",\"code\""));
    }

    #[test]
    fn test_expression_text_escaped() {
        let line = format_line(
            Severity::Trace,
            "CONDITION_COMPILED",
            &[("expression", "#a0 = :v0 AND \"x\"\n\u{1}")],
        );

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["expression"], "#a0 = :v0 AND \"x\"\n\u{1}");
        assert_eq!(line.matches('\n').count(), 1);
    }
}
