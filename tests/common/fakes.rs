//! Fake transport for driving the poll loop without a service behind it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tailview_server::wire::FilePayload;
use tailview_server::{PurgeResponse, ReadRequest, ReadResponse, Transport, TransportError};

/// A [`Transport`] that answers from a scripted queue and records every
/// request it sees.
///
/// When the queue is empty it answers with [`echo_response`], so a harness
/// only scripts the cycles it cares about and lets the rest idle.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ReadResponse, TransportError>>>,
    requests: Mutex<Vec<ReadRequest>>,
    purges: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            purges: AtomicUsize::new(0),
        }
    }

    /// Queue the answer for the next read.
    pub fn push_read(&self, response: Result<ReadResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Every read request seen so far, in order.
    pub fn requests(&self) -> Vec<ReadRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn purge_count(&self) -> usize {
        self.purges.load(Ordering::SeqCst)
    }

    fn next_read(&self, req: &ReadRequest) -> Result<ReadResponse, TransportError> {
        self.requests.lock().unwrap().push(req.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(echo_response(req)))
    }
}

impl Transport for ScriptedTransport {
    fn read(
        &self,
        req: ReadRequest,
    ) -> impl Future<Output = Result<ReadResponse, TransportError>> + Send {
        let out = self.next_read(&req);
        async move { out }
    }

    fn purge(&self) -> impl Future<Output = Result<PurgeResponse, TransportError>> + Send {
        self.purges.fetch_add(1, Ordering::SeqCst);
        async move { Ok(PurgeResponse { status: "OK".to_string() }) }
    }
}

/// An empty OK response for the sources the request enabled, echoing the
/// request cursors back as the ending cursors.
pub fn echo_response(req: &ReadRequest) -> ReadResponse {
    let mut resp = ReadResponse::ok();
    if req.access_log {
        resp.access_log = Some(FilePayload {
            ending_offset: req.access_log_offset as u64,
            content: Vec::new(),
        });
    }
    if req.error_log {
        resp.error_log = Some(FilePayload {
            ending_offset: req.error_log_offset as u64,
            content: Vec::new(),
        });
    }
    if req.internal_log {
        resp.internal_log = Some(Vec::new());
    }
    resp
}

/// An OK response carrying only an access payload.
pub fn access_response(ending_offset: u64, lines: &[&str]) -> ReadResponse {
    ReadResponse {
        access_log: Some(FilePayload {
            ending_offset,
            content: lines.iter().map(|l| l.to_string()).collect(),
        }),
        ..ReadResponse::ok()
    }
}

/// An OK response carrying only internal rows.
pub fn internal_response(rows: Vec<tailview_core::EventRow>) -> ReadResponse {
    ReadResponse { internal_log: Some(rows), ..ReadResponse::ok() }
}
