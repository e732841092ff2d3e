//! Request-activity recorder: one internal-table event per observed HTTP
//! request.
//!
//! Policy carried over from the tool this replaces: the viewer's own
//! endpoints and cron traffic are never recorded, so watching the logs does
//! not itself generate log entries. The exclusion list is fixed policy and
//! not part of the merge core's contract.

use crate::service::LogService;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Path prefixes never recorded as activity.
const EXCLUDED_PREFIXES: &[&str] = &["/logs/read", "/logs/purge", "/cron"];

/// Axum middleware that appends a row for each non-excluded request.
///
/// Recording failures are logged and swallowed; activity tracking must never
/// break the request it observes.
pub async fn record_request(
    State(service): State<Arc<LogService>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    if !is_excluded(&path) {
        let ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string())
            .unwrap_or_default();
        let now = chrono::Utc::now().timestamp();

        // No authentication layer, so every request is an anonymous user 0.
        if let Err(err) = service.table().append(now, &ip, 0, &path) {
            tracing::warn!(error = %err, path, "failed to record request activity");
        }
    }

    next.run(req).await
}

fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
