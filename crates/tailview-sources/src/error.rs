//! Source reader errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reading a log source.
///
/// Distinct from an empty result: an unconfigured or fully-consumed source
/// yields `Ok` with no lines, while these variants mean the round must be
/// abandoned without advancing any cursor.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not seek to offset {offset} in {}: {source}", path.display())]
    Seek {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("read failed in {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("event table unavailable: {0}")]
    Table(String),
}
