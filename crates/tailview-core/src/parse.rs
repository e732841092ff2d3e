//! Line parsers — raw access-log and error-log lines and internal-table
//! rows, normalised into [`LogRecord`] values.
//!
//! Parsing is total: every input line yields exactly one record, never zero
//! and never more than one. A line that does not match its source's format
//! (including a structurally matching line whose timestamp fails to parse)
//! degrades to [`LogRecord::fallback`] with timestamp `0` and the raw text
//! as content.

use crate::types::{EventRow, LogRecord, SourceKind};
use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Format constants
// ---------------------------------------------------------------------------

/// Common-log-format prefix: `host ident authuser [timestamp] rest`.
///
/// The `authuser` field is matched but never surfaced; only the host, the
/// timestamp, and the remainder of the line are kept.
static ACCESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-fA-F.:]+)\s+(\S+)\s+(\S+)\s+\[([^\]]+)\]\s+(.*)$")
        .expect("access-log pattern is valid")
});

/// Error-log prefix: `[Weekday Mon DD HH:MM:SS.ffffff YYYY] rest`.
///
/// The leading weekday token is skipped; the capture starts at the month.
static ERROR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[[A-Za-z]+\s+([^\]]+)\]\s+(.*)$").expect("error-log pattern is valid")
});

/// Access-log timestamp format, e.g. `10/Mar/2021:13:55:36 +0000`.
const ACCESS_TS_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Error-log timestamp format, e.g. `Mar 10 13:55:36.123456 2021`.
///
/// The file carries no zone; UTC is assumed. The fractional part is
/// optional (`%.f` also matches its absence).
const ERROR_TS_FORMAT: &str = "%b %d %H:%M:%S%.f %Y";

// ---------------------------------------------------------------------------
// Access log
// ---------------------------------------------------------------------------

/// Parse one access-log line.
pub fn access_line(raw: &str) -> LogRecord {
    if let Some(caps) = ACCESS_RE.captures(raw) {
        if let Ok(ts) = DateTime::parse_from_str(&caps[4], ACCESS_TS_FORMAT) {
            return LogRecord {
                timestamp: ts.timestamp(),
                source_ip: caps[1].to_string(),
                user_id: 0,
                content: caps[5].to_string(),
                sequence_id: None,
                source: SourceKind::Access,
            };
        }
    }
    LogRecord::fallback(SourceKind::Access, raw)
}

/// Parse a batch of access-log lines, in order.
pub fn access_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LogRecord> {
    lines.iter().map(|l| access_line(l.as_ref())).collect()
}

// ---------------------------------------------------------------------------
// Error log
// ---------------------------------------------------------------------------

/// Parse one error-log line.
pub fn error_line(raw: &str) -> LogRecord {
    if let Some(caps) = ERROR_RE.captures(raw) {
        // Single-digit days are space-padded in the file; collapse runs of
        // whitespace so the fixed format string matches either way.
        let stamp: String = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
        if let Ok(ts) = NaiveDateTime::parse_from_str(&stamp, ERROR_TS_FORMAT) {
            return LogRecord {
                timestamp: ts.and_utc().timestamp(),
                source_ip: String::new(),
                user_id: 0,
                content: caps[2].to_string(),
                sequence_id: None,
                source: SourceKind::Error,
            };
        }
    }
    LogRecord::fallback(SourceKind::Error, raw)
}

/// Parse a batch of error-log lines, in order.
pub fn error_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LogRecord> {
    lines.iter().map(|l| error_line(l.as_ref())).collect()
}

// ---------------------------------------------------------------------------
// Internal table rows
// ---------------------------------------------------------------------------

/// Convert a batch of internal-table rows into records and compute the next
/// read cursor.
///
/// Rows arrive already structured and time-ordered; this stage only maps
/// fields across and advances the cursor to one past the last row's id. An
/// empty batch leaves the cursor unchanged.
pub fn internal_rows(rows: &[EventRow], cursor: u64) -> (Vec<LogRecord>, u64) {
    let next_cursor = rows.last().map_or(cursor, |row| row.id + 1);
    let records = rows
        .iter()
        .map(|row| LogRecord {
            timestamp: row.timestamp,
            source_ip: row.ip.clone(),
            user_id: row.user_id,
            content: row.content.clone(),
            sequence_id: Some(row.id),
            source: SourceKind::Internal,
        })
        .collect();
    (records, next_cursor)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
