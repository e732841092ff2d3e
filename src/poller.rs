//! Poll loop and cursor orchestration.
//!
//! A single task owns all per-source cursors and accumulated records
//! ([`PollerState`]), receives commands on an mpsc channel, and publishes
//! freshly merged snapshots on a watch channel after every applied cycle.
//! One fetch covers all enabled sources, and at most one fetch is
//! outstanding at any time.
//!
//! # Staleness
//!
//! Enabling, disabling, purging, or changing the user filter resets cursor
//! state, so a fetch that was in flight when the reset happened must not be
//! applied. Each fetch captures the state generation at issue time; the
//! completion handler drops any response whose generation no longer matches.
//! An interval change does not bump the generation, it only re-arms the
//! schedule.

use std::sync::Arc;
use std::time::Duration;
use tailview_core::{merge::merge, parse, LogRecord, SourceKind};
use tailview_server::{ReadRequest, ReadResponse, Transport, TransportError};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Delay before the first fetch after an enable or purge, so a burst of
/// configuration changes coalesces into one fetch.
const INITIAL_DELAY: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Commands and handle
// ---------------------------------------------------------------------------

/// Commands accepted by the poller task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerCommand {
    /// Enable a source: cursor to 0, accumulated state cleared, immediate
    /// fetch.
    Enable(SourceKind),
    /// Disable a source: cursor and accumulated state cleared, nothing
    /// scheduled for it.
    Disable(SourceKind),
    /// Change the polling interval. Cursors are untouched; the pending
    /// scheduled fetch is replaced by one at the new cadence.
    SetInterval(Duration),
    /// Restrict internal rows to one user id (`0` = all). Resets the
    /// internal source if it is enabled, since accumulated rows for the old
    /// filter cannot be reused.
    SetUserFilter(u64),
    /// Purge the internal log, then treat the internal source as freshly
    /// enabled if it currently is enabled.
    Purge,
    Shutdown,
}

/// The poller task has exited and no longer accepts commands.
#[derive(Debug, Error)]
#[error("poller task has stopped")]
pub struct PollerStopped;

/// Client handle: send commands, watch merged snapshots.
#[derive(Clone)]
pub struct PollerHandle {
    commands: mpsc::Sender<PollerCommand>,
    snapshots: watch::Receiver<Vec<LogRecord>>,
}

impl PollerHandle {
    pub async fn enable(&self, source: SourceKind) -> Result<(), PollerStopped> {
        self.send(PollerCommand::Enable(source)).await
    }

    pub async fn disable(&self, source: SourceKind) -> Result<(), PollerStopped> {
        self.send(PollerCommand::Disable(source)).await
    }

    pub async fn set_interval(&self, interval: Duration) -> Result<(), PollerStopped> {
        self.send(PollerCommand::SetInterval(interval)).await
    }

    pub async fn set_user_filter(&self, user_id: u64) -> Result<(), PollerStopped> {
        self.send(PollerCommand::SetUserFilter(user_id)).await
    }

    pub async fn purge(&self) -> Result<(), PollerStopped> {
        self.send(PollerCommand::Purge).await
    }

    pub async fn shutdown(&self) -> Result<(), PollerStopped> {
        self.send(PollerCommand::Shutdown).await
    }

    /// A receiver of merged snapshots. The current value is always the view
    /// derived from the latest fully-settled per-source state.
    pub fn snapshots(&self) -> watch::Receiver<Vec<LogRecord>> {
        self.snapshots.clone()
    }

    async fn send(&self, cmd: PollerCommand) -> Result<(), PollerStopped> {
        self.commands.send(cmd).await.map_err(|_| PollerStopped)
    }
}

// ---------------------------------------------------------------------------
// PollerState
// ---------------------------------------------------------------------------

/// What one completed fetch did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Records appended, cursors advanced.
    Applied,
    /// The response was issued against a superseded generation; dropped
    /// without touching any state.
    Stale,
    /// The service answered `status: "failed"`; no state was touched.
    Failed,
}

#[derive(Debug, Default)]
struct SourceSlot {
    enabled: bool,
    cursor: u64,
    records: Vec<LogRecord>,
}

impl SourceSlot {
    fn reset(&mut self) {
        self.cursor = 0;
        self.records.clear();
    }
}

/// All mutable poll-loop state: per-source cursors and accumulated records,
/// the interval, the user filter, and the staleness generation.
///
/// Kept free of IO and timers so the cursor rules are unit-testable; the
/// async loop around it only schedules and shuttles responses.
#[derive(Debug)]
pub struct PollerState {
    access: SourceSlot,
    error: SourceSlot,
    internal: SourceSlot,
    user_filter: u64,
    interval: Duration,
    generation: u64,
}

impl PollerState {
    pub fn new(interval: Duration) -> Self {
        Self {
            access: SourceSlot::default(),
            error: SourceSlot::default(),
            internal: SourceSlot::default(),
            user_filter: 0,
            interval,
            generation: 0,
        }
    }

    fn slot(&self, source: SourceKind) -> &SourceSlot {
        match source {
            SourceKind::Access => &self.access,
            SourceKind::Error => &self.error,
            SourceKind::Internal => &self.internal,
        }
    }

    fn slot_mut(&mut self, source: SourceKind) -> &mut SourceSlot {
        match source {
            SourceKind::Access => &mut self.access,
            SourceKind::Error => &mut self.error,
            SourceKind::Internal => &mut self.internal,
        }
    }

    pub fn enable(&mut self, source: SourceKind) {
        let slot = self.slot_mut(source);
        slot.enabled = true;
        slot.reset();
        self.generation += 1;
    }

    pub fn disable(&mut self, source: SourceKind) {
        let slot = self.slot_mut(source);
        slot.enabled = false;
        slot.reset();
        self.generation += 1;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Returns true when the internal source was reset and needs an
    /// immediate re-fetch.
    pub fn set_user_filter(&mut self, user_id: u64) -> bool {
        self.user_filter = user_id;
        if self.internal.enabled {
            self.internal.reset();
            self.generation += 1;
            true
        } else {
            false
        }
    }

    /// Apply a successful purge: reset the internal source as if freshly
    /// enabled. Returns true when a re-fetch should be scheduled; while the
    /// source is disabled there is nothing to reset or schedule.
    pub fn purge_applied(&mut self) -> bool {
        if self.internal.enabled {
            self.internal.reset();
            self.generation += 1;
            true
        } else {
            false
        }
    }

    pub fn is_enabled(&self, source: SourceKind) -> bool {
        self.slot(source).enabled
    }

    pub fn any_enabled(&self) -> bool {
        self.access.enabled || self.error.enabled || self.internal.enabled
    }

    pub fn cursor(&self, source: SourceKind) -> u64 {
        self.slot(source).cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The read request for the next fetch, reflecting current enables and
    /// cursors.
    pub fn read_request(&self) -> ReadRequest {
        ReadRequest {
            access_log: self.access.enabled,
            error_log: self.error.enabled,
            internal_log: self.internal.enabled,
            access_log_offset: self.access.cursor as i64,
            error_log_offset: self.error.cursor as i64,
            internal_log_index: self.internal.cursor as i64,
            internal_log_user: self.user_filter as i64,
        }
    }

    /// Apply a completed fetch issued at `generation`: parse each enabled
    /// source's delta, append it, and advance that source's cursor.
    ///
    /// Stale and failed responses leave every cursor and record untouched.
    pub fn apply(&mut self, generation: u64, resp: &ReadResponse) -> ApplyOutcome {
        if generation != self.generation {
            return ApplyOutcome::Stale;
        }
        if !resp.is_ok() {
            return ApplyOutcome::Failed;
        }

        if self.access.enabled {
            if let Some(payload) = &resp.access_log {
                self.access.records.extend(parse::access_lines(&payload.content));
                self.access.cursor = payload.ending_offset;
            }
        }
        if self.error.enabled {
            if let Some(payload) = &resp.error_log {
                self.error.records.extend(parse::error_lines(&payload.content));
                self.error.cursor = payload.ending_offset;
            }
        }
        if self.internal.enabled {
            if let Some(rows) = &resp.internal_log {
                let (records, next_cursor) = parse::internal_rows(rows, self.internal.cursor);
                self.internal.records.extend(records);
                self.internal.cursor = next_cursor;
            }
        }

        ApplyOutcome::Applied
    }

    /// The merged view, derived fresh from the full accumulated per-source
    /// sequences.
    pub fn merged(&self) -> Vec<LogRecord> {
        merge(&self.access.records, &self.error.records, &self.internal.records)
    }
}

// ---------------------------------------------------------------------------
// Poller task
// ---------------------------------------------------------------------------

struct InFlight {
    generation: u64,
    handle: JoinHandle<Result<ReadResponse, TransportError>>,
}

struct Poller<T: Transport> {
    transport: Arc<T>,
    state: PollerState,
    commands: mpsc::Receiver<PollerCommand>,
    snapshots: watch::Sender<Vec<LogRecord>>,
    deadline: Instant,
    in_flight: Option<InFlight>,
}

/// Spawn the poller task and return its handle.
///
/// All sources start disabled; nothing is fetched until the first
/// [`PollerHandle::enable`].
pub fn spawn<T: Transport>(transport: Arc<T>, interval: Duration) -> PollerHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (snap_tx, snap_rx) = watch::channel(Vec::new());

    let poller = Poller {
        transport,
        state: PollerState::new(interval),
        commands: cmd_rx,
        snapshots: snap_tx,
        deadline: Instant::now(),
        in_flight: None,
    };
    tokio::spawn(poller.run());

    PollerHandle { commands: cmd_tx, snapshots: snap_rx }
}

impl<T: Transport> Poller<T> {
    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(PollerCommand::Purge) => self.purge().await,
                    Some(PollerCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                (generation, result) = next_completion(&mut self.in_flight),
                    if self.in_flight.is_some() =>
                {
                    self.complete_fetch(generation, result);
                }
                _ = time::sleep_until(self.deadline),
                    if self.in_flight.is_none() && self.state.any_enabled() =>
                {
                    self.issue_fetch();
                }
            }
        }
        tracing::debug!("poller stopped");
    }

    fn handle_command(&mut self, cmd: PollerCommand) {
        tracing::debug!(?cmd, "poller command");
        match cmd {
            PollerCommand::Enable(source) => {
                self.state.enable(source);
                self.publish();
                self.arm(INITIAL_DELAY);
            }
            PollerCommand::Disable(source) => {
                self.state.disable(source);
                self.publish();
            }
            PollerCommand::SetInterval(interval) => {
                self.state.set_interval(interval);
                self.arm(interval);
            }
            PollerCommand::SetUserFilter(user_id) => {
                if self.state.set_user_filter(user_id) {
                    self.publish();
                    self.arm(INITIAL_DELAY);
                }
            }
            // Handled in run() because they need the transport or break.
            PollerCommand::Purge | PollerCommand::Shutdown => unreachable!(),
        }
    }

    async fn purge(&mut self) {
        match self.transport.purge().await {
            Ok(resp) if resp.is_ok() => {
                if self.state.purge_applied() {
                    self.publish();
                    self.arm(INITIAL_DELAY);
                }
            }
            Ok(resp) => tracing::warn!(status = %resp.status, "purge rejected"),
            Err(err) => tracing::warn!(error = %err, "purge request failed"),
        }
    }

    fn issue_fetch(&mut self) {
        let generation = self.state.generation();
        let request = self.state.read_request();
        tracing::debug!(generation, ?request, "issuing poll fetch");

        let transport = Arc::clone(&self.transport);
        let handle = tokio::spawn(async move { transport.read(request).await });
        self.in_flight = Some(InFlight { generation, handle });
    }

    fn complete_fetch(
        &mut self,
        generation: u64,
        result: Result<ReadResponse, TransportError>,
    ) {
        match result {
            Ok(resp) => match self.state.apply(generation, &resp) {
                ApplyOutcome::Applied => {
                    self.publish();
                    self.arm(self.state.interval());
                }
                ApplyOutcome::Stale => {
                    // The deadline set by whichever command superseded this
                    // fetch stands; re-arming here would delay it.
                    tracing::debug!(generation, "dropped poll response from superseded generation");
                }
                ApplyOutcome::Failed => {
                    tracing::warn!("poll round failed; cursors unchanged, retrying at next interval");
                    self.arm(self.state.interval());
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "poll transport failed; retrying at next interval");
                self.arm(self.state.interval());
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.merged());
    }

    fn arm(&mut self, delay: Duration) {
        self.deadline = Instant::now() + delay;
    }
}

/// Await the in-flight fetch and clear the slot.
///
/// Only polled under a `select!` guard that checked `slot.is_some()`.
async fn next_completion(
    slot: &mut Option<InFlight>,
) -> (u64, Result<ReadResponse, TransportError>) {
    let in_flight = slot.as_mut().expect("select guard ensures a fetch is in flight");
    let result = (&mut in_flight.handle).await;
    let generation = in_flight.generation;
    *slot = None;

    let result =
        result.unwrap_or_else(|err| Err(TransportError::Unavailable(err.to_string())));
    (generation, result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tailview_core::EventRow;
    use tailview_server::wire::FilePayload;

    fn state() -> PollerState {
        PollerState::new(Duration::from_secs(30))
    }

    fn ok_response(
        access: Option<(u64, Vec<&str>)>,
        internal: Option<Vec<EventRow>>,
    ) -> ReadResponse {
        ReadResponse {
            access_log: access.map(|(ending_offset, lines)| FilePayload {
                ending_offset,
                content: lines.into_iter().map(String::from).collect(),
            }),
            internal_log: internal,
            ..ReadResponse::ok()
        }
    }

    fn row(id: u64, ts: i64, content: &str) -> EventRow {
        EventRow { id, timestamp: ts, ip: String::new(), user_id: 0, content: content.into() }
    }

    #[test]
    fn enable_resets_cursor_and_bumps_generation() {
        let mut s = state();
        s.enable(SourceKind::Access);
        let gen_before = s.generation();
        s.apply(gen_before, &ok_response(Some((90, vec!["x"])), None));
        assert_eq!(s.cursor(SourceKind::Access), 90);

        s.disable(SourceKind::Access);
        s.enable(SourceKind::Access);
        assert_eq!(s.cursor(SourceKind::Access), 0);
        assert!(s.generation() > gen_before);
        assert!(s.merged().is_empty());
    }

    #[test]
    fn read_request_reflects_enables_and_cursors() {
        let mut s = state();
        s.enable(SourceKind::Access);
        s.enable(SourceKind::Internal);
        s.apply(
            s.generation(),
            &ok_response(Some((120, vec![])), Some(vec![row(41, 100, "login")])),
        );

        let req = s.read_request();
        assert!(req.access_log && !req.error_log && req.internal_log);
        assert_eq!(req.access_log_offset, 120);
        assert_eq!(req.error_log_offset, 0);
        assert_eq!(req.internal_log_index, 42);
        assert_eq!(req.internal_log_user, 0);
    }

    #[test]
    fn apply_advances_internal_cursor_past_last_row() {
        let mut s = state();
        s.enable(SourceKind::Internal);
        let resp = ok_response(None, Some(vec![row(41, 100, "login"), row(42, 105, "logout")]));
        assert_eq!(s.apply(s.generation(), &resp), ApplyOutcome::Applied);
        assert_eq!(s.cursor(SourceKind::Internal), 43);

        let merged = s.merged();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "login");
        assert_eq!(merged[1].content, "logout");
    }

    #[test]
    fn stale_generation_is_dropped_without_mutation() {
        let mut s = state();
        s.enable(SourceKind::Access);
        let issued_at = s.generation();

        // Reset arrives while the fetch is in flight.
        s.disable(SourceKind::Access);
        s.enable(SourceKind::Access);

        let resp = ok_response(Some((500, vec!["resurrected line"])), None);
        assert_eq!(s.apply(issued_at, &resp), ApplyOutcome::Stale);
        assert_eq!(s.cursor(SourceKind::Access), 0);
        assert!(s.merged().is_empty());
    }

    #[test]
    fn failed_status_advances_nothing() {
        let mut s = state();
        s.enable(SourceKind::Access);
        s.apply(s.generation(), &ok_response(Some((80, vec!["kept"])), None));

        assert_eq!(s.apply(s.generation(), &ReadResponse::failed()), ApplyOutcome::Failed);
        assert_eq!(s.cursor(SourceKind::Access), 80);
        assert_eq!(s.merged().len(), 1);
    }

    #[test]
    fn cursor_is_monotonic_between_resets() {
        let mut s = state();
        s.enable(SourceKind::Access);
        let mut last = s.cursor(SourceKind::Access);
        for ending in [10u64, 10, 35, 80] {
            s.apply(s.generation(), &ok_response(Some((ending, vec![])), None));
            assert!(s.cursor(SourceKind::Access) >= last);
            last = s.cursor(SourceKind::Access);
        }
    }

    #[test]
    fn disable_clears_accumulated_records() {
        let mut s = state();
        s.enable(SourceKind::Error);
        s.apply(
            s.generation(),
            &ReadResponse {
                error_log: Some(FilePayload {
                    ending_offset: 40,
                    content: vec!["[Wed Mar 10 13:55:36.000000 2021] oops".into()],
                }),
                ..ReadResponse::ok()
            },
        );
        assert_eq!(s.merged().len(), 1);

        s.disable(SourceKind::Error);
        assert!(s.merged().is_empty());
        assert_eq!(s.cursor(SourceKind::Error), 0);
        assert!(!s.any_enabled());
    }

    #[test]
    fn purge_resets_only_when_internal_is_enabled() {
        let mut s = state();
        assert!(!s.purge_applied());

        s.enable(SourceKind::Internal);
        s.apply(s.generation(), &ok_response(None, Some(vec![row(7, 1, "x")])));
        assert_eq!(s.cursor(SourceKind::Internal), 8);

        assert!(s.purge_applied());
        assert_eq!(s.cursor(SourceKind::Internal), 0);
        assert!(s.merged().is_empty());
    }

    #[test]
    fn user_filter_change_resets_internal_only_when_enabled() {
        let mut s = state();
        assert!(!s.set_user_filter(5));
        assert_eq!(s.read_request().internal_log_user, 5);

        s.enable(SourceKind::Internal);
        s.apply(s.generation(), &ok_response(None, Some(vec![row(1, 1, "a")])));
        assert!(s.set_user_filter(9));
        assert_eq!(s.cursor(SourceKind::Internal), 0);
        assert!(s.merged().is_empty());
    }

    #[test]
    fn interval_change_keeps_cursors_and_generation() {
        let mut s = state();
        s.enable(SourceKind::Access);
        s.apply(s.generation(), &ok_response(Some((60, vec![])), None));
        let generation = s.generation();

        s.set_interval(Duration::from_secs(5));
        assert_eq!(s.interval(), Duration::from_secs(5));
        assert_eq!(s.cursor(SourceKind::Access), 60);
        assert_eq!(s.generation(), generation);
    }
}
