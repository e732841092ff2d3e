//! Core types for tailview.
//!
//! This module defines the data structures shared across all layers: the
//! normalised [`LogRecord`], the [`SourceKind`] discriminant, and the typed
//! internal-table row [`EventRow`].

use serde::{Deserialize, Serialize};

/// A normalised log record produced by one of the line parsers.
///
/// Fields a source cannot supply are explicit empty/zero values rather than
/// options: an access-log record always has `user_id == 0`, an error-log
/// record has an empty `source_ip`, and only internal-table records carry a
/// `sequence_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Seconds since the Unix epoch, UTC. `0` means the line's time could
    /// not be determined; such records sort before everything else.
    pub timestamp: i64,
    /// Client IP address, empty when the source carries none.
    pub source_ip: String,
    /// Numeric user id, `0` when the source carries none.
    pub user_id: u64,
    /// Human-readable payload: the raw line, or the message portion after
    /// the structured prefix was stripped.
    pub content: String,
    /// Strictly increasing row id, present only for internal-table records.
    /// It doubles as the read cursor for that source.
    pub sequence_id: Option<u64>,
    /// Which source produced this record.
    pub source: SourceKind,
}

impl LogRecord {
    /// The record emitted for a line that did not match its source's format.
    ///
    /// Timestamp `0` sorts the record first in any merge, so unparseable
    /// lines surface at the top of the view instead of disappearing.
    pub fn fallback(source: SourceKind, raw: &str) -> Self {
        LogRecord {
            timestamp: 0,
            source_ip: String::new(),
            user_id: 0,
            content: raw.to_string(),
            sequence_id: None,
            source,
        }
    }
}

/// Which log source produced a record.
///
/// Variant order is the merge tie-break priority: when heads share a
/// timestamp, access wins over error, error over internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Access,
    Error,
    Internal,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Access => write!(f, "access"),
            SourceKind::Error => write!(f, "error"),
            SourceKind::Internal => write!(f, "internal"),
        }
    }
}

/// One row of the internal event table, as stored and as sent on the wire.
///
/// Rows are delivered in ascending `(id, user_id)` order; `id` is the
/// strictly increasing sequence the internal read cursor tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: u64,
    /// Seconds since the Unix epoch, UTC.
    pub timestamp: i64,
    /// Originating IP address, empty when unknown.
    pub ip: String,
    /// Associated user id, `0` when the event has no user.
    pub user_id: u64,
    pub content: String,
}
