//! Shared console log lines
//!
//! Background work (builds, exports) appends lines here while the main
//! thread reads them for display. Only whole lines cross threads.

use parking_lot::Mutex;
use std::sync::Arc;

/// Console severity of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Warn,
    Error,
}

impl Severity {
    /// Classify a line by its `ERROR:`/`WARNING:` marker
    pub fn classify(line: &str) -> Self {
        if line.contains("ERROR:") {
            Severity::Error
        } else if line.contains("WARNING:") {
            Severity::Warn
        } else {
            Severity::Debug
        }
    }

    /// Marker written in front of lines of this severity
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Debug => "",
            Severity::Warn => "WARNING: ",
            Severity::Error => "ERROR: ",
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warn,
            _ => Severity::Debug,
        }
    }
}

/// One console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub severity: Severity,
}

/// Append-only, thread-safe list of console lines
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, classifying it by its marker
    pub fn push(&self, text: impl Into<String>) {
        let text = text.into();
        let severity = Severity::classify(&text);
        self.push_with(text, severity);
    }

    /// Append a line with an explicit severity
    pub fn push_with(&self, text: impl Into<String>, severity: Severity) {
        let text = text.into();
        match severity {
            Severity::Error => log::error!("{}", text),
            Severity::Warn => log::warn!("{}", text),
            Severity::Debug => log::debug!("{}", text),
        }
        self.lines.lock().push(LogLine { text, severity });
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Copy of every line
    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    /// Lines appended at or after `index`
    pub fn since(&self, index: usize) -> Vec<LogLine> {
        let lines = self.lines.lock();
        lines.get(index..).map(<[LogLine]>::to_vec).unwrap_or_default()
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.text.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Severity::classify("ERROR: missing file"), Severity::Error);
        assert_eq!(Severity::classify("build: WARNING: unused"), Severity::Warn);
        assert_eq!(Severity::classify("Compiling demo"), Severity::Debug);
    }

    #[test]
    fn test_buffer_shared_between_clones() {
        let buffer = LogBuffer::new();
        let writer = buffer.clone();

        std::thread::spawn(move || {
            writer.push("first");
            writer.push("ERROR: second");
        })
        .join()
        .unwrap();

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.since(1)[0].severity, Severity::Error);
        assert!(buffer.since(5).is_empty());
        assert!(buffer.contains("first"));
    }
}
