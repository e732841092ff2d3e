//! tailview-server — the transport boundary the merge core is driven
//! through.
//!
//! [`service::LogService`] owns the source readers and implements the read
//! and purge operations; [`routes::router`] exposes them over HTTP, and
//! [`transport::LocalTransport`] exposes the same operations in process so
//! the local poll loop and remote HTTP clients cannot diverge.

pub mod activity;
pub mod routes;
pub mod service;
pub mod transport;
pub mod wire;

pub use service::LogService;
pub use transport::{LocalTransport, Transport, TransportError};
pub use wire::{PurgeResponse, ReadRequest, ReadResponse};
