//! The transport seam between the poll loop and the read/purge service.
//!
//! The poll loop is written against [`Transport`], never against a concrete
//! surface. [`LocalTransport`] serves the operations in process; a remote
//! client would implement the same trait over HTTP against
//! [`routes::router`](crate::routes::router).

use crate::service::LogService;
use crate::wire::{PurgeResponse, ReadRequest, ReadResponse};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// A transport-level failure: the request never produced a response.
///
/// Distinct from a response with `status: "failed"`, which did arrive; the
/// poll loop treats both as a failed round and retries at the next interval.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// How the poll loop reaches the read and purge operations.
pub trait Transport: Send + Sync + 'static {
    fn read(
        &self,
        req: ReadRequest,
    ) -> impl Future<Output = Result<ReadResponse, TransportError>> + Send;

    fn purge(&self) -> impl Future<Output = Result<PurgeResponse, TransportError>> + Send;
}

/// In-process [`Transport`] over a shared [`LogService`].
///
/// The local poll loop and remote HTTP clients run exactly the same service
/// code, so the two surfaces cannot drift apart.
#[derive(Clone)]
pub struct LocalTransport {
    service: Arc<LogService>,
}

impl LocalTransport {
    pub fn new(service: Arc<LogService>) -> Self {
        Self { service }
    }
}

impl Transport for LocalTransport {
    fn read(
        &self,
        req: ReadRequest,
    ) -> impl Future<Output = Result<ReadResponse, TransportError>> + Send {
        let service = Arc::clone(&self.service);
        async move { Ok(service.read(&req)) }
    }

    fn purge(&self) -> impl Future<Output = Result<PurgeResponse, TransportError>> + Send {
        let service = Arc::clone(&self.service);
        async move { Ok(service.purge()) }
    }
}
