//! Test builders — ergonomic constructors for records, rows, and raw lines.
//!
//! These builders are designed for readability in test assertions, not for
//! production use.

#![allow(dead_code)]

use tailview_core::{EventRow, LogRecord, SourceKind};

// ---------------------------------------------------------------------------
// LogRecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogRecord`] test fixtures.
///
/// # Example
///
/// ```rust
/// let record = LogRecordBuilder::new("GET / HTTP/1.1 200")
///     .timestamp(1615384536)
///     .ip("192.168.1.1")
///     .source(SourceKind::Access)
///     .build();
/// ```
pub struct LogRecordBuilder {
    timestamp: i64,
    source_ip: String,
    user_id: u64,
    content: String,
    sequence_id: Option<u64>,
    source: SourceKind,
}

impl LogRecordBuilder {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            timestamp: 0,
            source_ip: String::new(),
            user_id: 0,
            content: content.into(),
            sequence_id: None,
            source: SourceKind::Access,
        }
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.source_ip = ip.into();
        self
    }

    pub fn user(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn sequence(mut self, id: u64) -> Self {
        self.sequence_id = Some(id);
        self
    }

    pub fn source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    pub fn build(self) -> LogRecord {
        LogRecord {
            timestamp: self.timestamp,
            source_ip: self.source_ip,
            user_id: self.user_id,
            content: self.content,
            sequence_id: self.sequence_id,
            source: self.source,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Build a record with just a timestamp, content, and source.
pub fn record(timestamp: i64, content: &str, source: SourceKind) -> LogRecord {
    LogRecordBuilder::new(content).timestamp(timestamp).source(source).build()
}

/// Build an internal-table row.
pub fn event_row(id: u64, timestamp: i64, user_id: u64, content: &str) -> EventRow {
    EventRow {
        id,
        timestamp,
        ip: String::new(),
        user_id,
        content: content.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Raw line helpers
// ---------------------------------------------------------------------------

/// A combined-format access log line with the given client ip and timestamp,
/// e.g. `access_line("192.168.1.1", "10/Mar/2021:13:55:36 +0000", ...)`.
pub fn access_line(ip: &str, timestamp: &str, rest: &str) -> String {
    format!("{ip} - frank [{timestamp}] {rest}")
}

/// An error log line, e.g.
/// `error_line("Wed Mar 10 13:55:36.123456 2021", "oops")`.
pub fn error_line(timestamp: &str, message: &str) -> String {
    format!("[{timestamp}] {message}")
}
