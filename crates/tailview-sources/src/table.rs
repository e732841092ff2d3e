//! The internal event table: append-only rows read back by sequence id.
//!
//! The table is a collaborator, not part of the merge core; storage engine
//! design is out of scope, so the trait is kept to exactly the three
//! operations the poll cycle and the activity recorder need, and the
//! in-process [`MemoryTable`] is the default implementation.

use crate::error::SourceError;
use std::sync::Mutex;
use tailview_core::EventRow;

/// Read/write access to the internal event table.
pub trait EventTable: Send + Sync {
    /// Insert a row and return its assigned sequence id. Ids are strictly
    /// increasing and never reused, even across purges.
    fn append(
        &self,
        timestamp: i64,
        ip: &str,
        user_id: u64,
        content: &str,
    ) -> Result<u64, SourceError>;

    /// Return rows with `id >= from_id`, ordered by `(id, user_id)`
    /// ascending. `from_id == 0` means from the start; `user_filter == 0`
    /// means all users. The caller's cursor is the next unread id, so the
    /// bound is inclusive.
    fn entries_from(&self, from_id: u64, user_filter: u64) -> Result<Vec<EventRow>, SourceError>;

    /// Delete rows with `id <= up_to_id`; `0` deletes everything.
    fn purge_up_to(&self, up_to_id: u64) -> Result<(), SourceError>;
}

/// In-memory [`EventTable`].
///
/// Rows are kept in insertion order, which is id order, so reads are a
/// single filter pass with no sorting.
pub struct MemoryTable {
    inner: Mutex<Inner>,
}

struct Inner {
    next_id: u64,
    rows: Vec<EventRow>,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self { inner: Mutex::new(Inner { next_id: 1, rows: Vec::new() }) }
    }
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, Inner>, SourceError> {
        self.inner
            .lock()
            .map_err(|_| SourceError::Table("event table lock poisoned".to_string()))
    }
}

impl EventTable for MemoryTable {
    fn append(
        &self,
        timestamp: i64,
        ip: &str,
        user_id: u64,
        content: &str,
    ) -> Result<u64, SourceError> {
        let mut inner = self.locked()?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.rows.push(EventRow {
            id,
            timestamp,
            ip: ip.to_string(),
            user_id,
            content: content.to_string(),
        });
        Ok(id)
    }

    fn entries_from(&self, from_id: u64, user_filter: u64) -> Result<Vec<EventRow>, SourceError> {
        let inner = self.locked()?;
        Ok(inner
            .rows
            .iter()
            .filter(|row| row.id >= from_id)
            .filter(|row| user_filter == 0 || row.user_id == user_filter)
            .cloned()
            .collect())
    }

    fn purge_up_to(&self, up_to_id: u64) -> Result<(), SourceError> {
        let mut inner = self.locked()?;
        if up_to_id == 0 {
            inner.rows.clear();
        } else {
            inner.rows.retain(|row| row.id > up_to_id);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
