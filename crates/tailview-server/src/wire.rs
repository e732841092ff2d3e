//! Wire types for the read and purge endpoints.
//!
//! Cursor fields are signed on the wire so that negative values can be
//! rejected explicitly with a `failed` status instead of failing JSON
//! deserialization with an opaque 4xx.

use serde::{Deserialize, Serialize};
use tailview_core::EventRow;

pub const STATUS_OK: &str = "OK";
pub const STATUS_FAILED: &str = "failed";

/// Body of `POST /logs/read`: which sources to read and the cursor to resume
/// each one from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub access_log: bool,
    pub error_log: bool,
    pub internal_log: bool,
    /// Byte offset to resume the access log from; `0` reads from the start.
    pub access_log_offset: i64,
    /// Byte offset to resume the error log from; `0` reads from the start.
    pub error_log_offset: i64,
    /// First unread internal row id; `0` reads from the start.
    pub internal_log_index: i64,
    /// Internal rows are limited to this user id; `0` means all users.
    pub internal_log_user: i64,
}

impl ReadRequest {
    /// All cursor fields are non-negative. Checked before any reader runs.
    pub fn cursors_valid(&self) -> bool {
        self.access_log_offset >= 0
            && self.error_log_offset >= 0
            && self.internal_log_index >= 0
            && self.internal_log_user >= 0
    }
}

/// Delta from one file-backed source: the raw lines found after the request
/// offset and the offset the next read should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub ending_offset: u64,
    pub content: Vec<String>,
}

/// Response to `POST /logs/read`. Payloads are present only for sources the
/// request enabled; a `failed` status carries no payloads at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log: Option<FilePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<FilePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_log: Option<Vec<EventRow>>,
}

impl ReadResponse {
    pub fn ok() -> Self {
        ReadResponse {
            status: STATUS_OK.to_string(),
            access_log: None,
            error_log: None,
            internal_log: None,
        }
    }

    pub fn failed() -> Self {
        ReadResponse { status: STATUS_FAILED.to_string(), ..Self::ok() }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Response to `POST /logs/purge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub status: String,
}

impl PurgeResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
