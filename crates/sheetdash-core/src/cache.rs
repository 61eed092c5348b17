//! Single-slot cache of the last fetched rows

use chrono::{DateTime, Utc};
use sheetdash_parser::RawRow;

/// Holds at most one raw-row snapshot, verbatim as fetched
///
/// There is no internal locking. The owning [`Dashboard`](crate::Dashboard)
/// is the only caller.
#[derive(Debug, Default)]
pub struct RowCache {
    rows: Option<Vec<RawRow>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot
    pub fn store(&mut self, rows: Vec<RawRow>) {
        self.rows = Some(rows);
        self.fetched_at = Some(Utc::now());
    }

    /// Clear the snapshot, returning what was evicted
    pub fn invalidate(&mut self) -> Option<Vec<RawRow>> {
        self.fetched_at = None;
        self.rows.take()
    }

    pub fn get(&self) -> Option<&[RawRow]> {
        self.rows.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_none()
    }

    /// When the current snapshot was stored
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }
}
