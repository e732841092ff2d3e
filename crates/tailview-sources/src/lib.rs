//! tailview-sources — readers for the three log origins.
//!
//! A [`file::LogFile`] reads an external text log incrementally by byte
//! offset; an [`table::EventTable`] implementation serves the internal event
//! rows by sequence id. Both hand their deltas to the parsers in
//! `tailview-core`; neither holds cursor state itself (cursors belong to the
//! polling client).

pub mod error;
pub mod file;
pub mod table;

pub use error::SourceError;
pub use file::{FileChunk, LogFile};
pub use table::{EventTable, MemoryTable};
