//! HTTP routes for the read and purge operations.
//!
//! Both endpoints always answer `200 OK` with a JSON body carrying the
//! application-level `status` field; transport-level errors are reserved for
//! genuinely broken requests (unparseable JSON), which axum rejects itself.

use crate::activity;
use crate::service::LogService;
use crate::wire::{PurgeResponse, ReadRequest, ReadResponse};
use axum::{extract::State, middleware, routing::post, Json, Router};
use std::sync::Arc;

/// Build the API router. With `track_activity` set, every request outside
/// the excluded prefixes is recorded into the internal event table.
pub fn router(service: Arc<LogService>, track_activity: bool) -> Router {
    let router = Router::new()
        .route("/logs/read", post(read_logs))
        .route("/logs/purge", post(purge_logs));

    let router = if track_activity {
        router.layer(middleware::from_fn_with_state(
            Arc::clone(&service),
            activity::record_request,
        ))
    } else {
        router
    };

    router.with_state(service)
}

async fn read_logs(
    State(service): State<Arc<LogService>>,
    Json(req): Json<ReadRequest>,
) -> Json<ReadResponse> {
    Json(service.read(&req))
}

async fn purge_logs(State(service): State<Arc<LogService>>) -> Json<PurgeResponse> {
    Json(service.purge())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
