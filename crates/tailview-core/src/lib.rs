//! tailview-core — record types, line parsers, and the merge engine.
//!
//! This crate holds everything that is pure computation: turning raw log
//! lines and event-table rows into normalised [`LogRecord`] values, and
//! interleaving the per-source record sequences into one time-ordered view.
//!
//! # Architecture
//!
//! ```text
//! Source readers ──► Parsers ──► Merge ──► Render
//!       │
//!       └── cursors (byte offset / row index) tracked by the poll loop
//! ```
//!
//! IO lives in `tailview-sources`, the HTTP surface in `tailview-server`,
//! and the poll loop in the root crate.

pub mod config;
pub mod merge;
pub mod parse;
pub mod types;

pub use types::{EventRow, LogRecord, SourceKind};
