//! Read/purge service logic, shared by the HTTP handlers and the in-process
//! transport.

use crate::wire::{FilePayload, PurgeResponse, ReadRequest, ReadResponse, STATUS_FAILED, STATUS_OK};
use std::sync::Arc;
use tailview_sources::{EventTable, LogFile};

/// Owns the source readers and serves the two transport operations.
///
/// Failure policy: a negative cursor rejects the request before any reader
/// runs, and any reader failure fails the whole round with no partial
/// payloads, so a client can never apply a half-successful cycle.
pub struct LogService {
    access: LogFile,
    error: LogFile,
    table: Arc<dyn EventTable>,
}

impl LogService {
    pub fn new(access: LogFile, error: LogFile, table: Arc<dyn EventTable>) -> Self {
        Self { access, error, table }
    }

    pub fn table(&self) -> &Arc<dyn EventTable> {
        &self.table
    }

    /// Serve one read request: fetch the delta from every enabled source.
    pub fn read(&self, req: &ReadRequest) -> ReadResponse {
        if !req.cursors_valid() {
            tracing::warn!(?req, "rejected read request with a negative cursor");
            return ReadResponse::failed();
        }

        let mut resp = ReadResponse::ok();

        if req.access_log {
            match self.access.read_from(req.access_log_offset as u64) {
                Ok(chunk) => {
                    resp.access_log = Some(FilePayload {
                        ending_offset: chunk.ending_offset,
                        content: chunk.lines,
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "access log read failed");
                    return ReadResponse::failed();
                }
            }
        }

        if req.error_log {
            match self.error.read_from(req.error_log_offset as u64) {
                Ok(chunk) => {
                    resp.error_log = Some(FilePayload {
                        ending_offset: chunk.ending_offset,
                        content: chunk.lines,
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "error log read failed");
                    return ReadResponse::failed();
                }
            }
        }

        if req.internal_log {
            match self
                .table
                .entries_from(req.internal_log_index as u64, req.internal_log_user as u64)
            {
                Ok(rows) => resp.internal_log = Some(rows),
                Err(err) => {
                    tracing::warn!(error = %err, "internal log read failed");
                    return ReadResponse::failed();
                }
            }
        }

        resp
    }

    /// Serve a purge request: delete every internal row.
    pub fn purge(&self) -> PurgeResponse {
        match self.table.purge_up_to(0) {
            Ok(()) => {
                tracing::info!("internal log purged");
                PurgeResponse { status: STATUS_OK.to_string() }
            }
            Err(err) => {
                tracing::warn!(error = %err, "internal log purge failed");
                PurgeResponse { status: STATUS_FAILED.to_string() }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
