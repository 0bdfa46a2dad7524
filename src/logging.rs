//! JSON line-delimited logging for training diagnostics.
//!
//! Warnings and progress reports are a side channel: they never replace or
//! fail the primary result of a call. Each record is one JSON object per
//! line on stderr.

use std::fmt::{self, Display};
use std::io::{self, Write};

use serde::Serialize;
use serde_json::json;

#[derive(Debug)]
pub enum LoggingError {
    Io(io::Error),
    Serialize(serde_json::Error),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(err) => write!(f, "IO error: {}", err),
            LoggingError::Serialize(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for LoggingError {}

impl From<io::Error> for LoggingError {
    fn from(value: io::Error) -> Self {
        LoggingError::Io(value)
    }
}

impl From<serde_json::Error> for LoggingError {
    fn from(value: serde_json::Error) -> Self {
        LoggingError::Serialize(value)
    }
}

/// Writes one structured record for a named operation.
pub fn log_operation(name: &str, payload: &impl Serialize) -> Result<(), LoggingError> {
    let record = json!({
        "event": name,
        "payload": payload,
    });
    write_line(&record)
}

/// Writes a non-fatal warning record for a component.
pub fn log_warning(component: &str, message: &str) -> Result<(), LoggingError> {
    let record = json!({
        "event": "warning",
        "component": component,
        "message": message,
    });
    write_line(&record)
}

/// Writes a training-progress record ("learnt K of N").
pub fn log_progress(component: &str, learnt: usize, total: usize) -> Result<(), LoggingError> {
    let record = json!({
        "event": "progress",
        "component": component,
        "learnt": learnt,
        "total": total,
    });
    write_line(&record)
}

fn write_line(record: &serde_json::Value) -> Result<(), LoggingError> {
    let line = serde_json::to_string(record)?;
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    writeln!(handle, "{}", line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_are_writable() {
        log_operation("counting", &json!({"events": 2})).unwrap();
        log_warning("learner", "unknown cues (ignored)").unwrap();
        log_progress("network", 1, 2).unwrap();
    }
}
