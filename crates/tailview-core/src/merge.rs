//! Merge engine — interleaves the three per-source record sequences into a
//! single non-decreasing-timestamp view.
//!
//! Each input sequence must already be in non-decreasing timestamp order, as
//! delivered by its reader; the merge never re-sorts within a source. The
//! merge is a pure function of the accumulated per-source state and is re-run
//! in full on every render.

use crate::types::LogRecord;

/// Head-timestamp sentinel for an exhausted source.
const EXHAUSTED: i64 = i64::MAX;

/// Merge the accumulated access, error, and internal sequences.
///
/// Classic three-way merge by head pointer: each step emits the record whose
/// head timestamp is the global minimum and advances that source's index, so
/// the whole merge is O(n) in total records. Ties resolve by fixed source
/// priority (access, then error, then internal), which makes repeated merges
/// of the same inputs byte-for-byte identical.
pub fn merge(access: &[LogRecord], error: &[LogRecord], internal: &[LogRecord]) -> Vec<LogRecord> {
    let mut out = Vec::with_capacity(access.len() + error.len() + internal.len());
    let (mut ai, mut ei, mut ii) = (0, 0, 0);

    let head = |seq: &[LogRecord], i: usize| seq.get(i).map_or(EXHAUSTED, |r| r.timestamp);

    let mut a_ts = head(access, ai);
    let mut e_ts = head(error, ei);
    let mut i_ts = head(internal, ii);

    while ai < access.len() || ei < error.len() || ii < internal.len() {
        if ai < access.len() && a_ts <= e_ts && a_ts <= i_ts {
            out.push(access[ai].clone());
            ai += 1;
            a_ts = head(access, ai);
        } else if ei < error.len() && e_ts <= i_ts {
            out.push(error[ei].clone());
            ei += 1;
            e_ts = head(error, ei);
        } else {
            out.push(internal[ii].clone());
            ii += 1;
            i_ts = head(internal, ii);
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
