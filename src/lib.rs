//! tailview — tail, merge, and watch web-server logs
//!
//! Follows an access log, an error log, and an internal event table; parses
//! every line into a normalized record; and keeps a single merged,
//! timestamp-ordered view up to date through a fixed-interval poll loop.
//!
//! # Architecture
//!
//! ```text
//! LogFile / EventTable ──► LogService ──► Transport ──► Poller ──► Render
//!        (sources)            (read/purge)   (seam)      (cursors,
//!                                 │                       merge)
//!                                 └──► HTTP routes
//! ```
//!
//! The poller owns all cursor state and runs as a single task; everything it
//! learns is published as merged snapshots on a watch channel.

pub mod poller;
pub mod render;
