//! Snapshot publication for a profiling session.
//!
//! A [`Snapshot`] pairs a metrics table with the allocation records it was
//! captured with. Captures are published as one `Arc<Snapshot>`, so a
//! reader can never combine a table with records from another capture.
//! Diffing and tree building run on the `Arc` outside any lock.

use crate::cct::CancellationToken;
use crate::diff::{generate_diff, DiffError, DiffTable};
use crate::parser::CaptureFeed;
use crate::records::AllocationRecordStore;
use crate::selection::SelectionSet;
use crate::snapshot::{ClassMetricsTable, SnapshotKind};
use crate::utils::error::{ParseError, SnapshotError};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// One atomically captured table plus its allocation records
#[derive(Debug, Clone)]
pub struct Snapshot {
    table: ClassMetricsTable,
    records: AllocationRecordStore,
    captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Pair a table with its records
    ///
    /// # Errors
    /// * `SnapshotError::StoreMismatch` - the table is a diff, the modes
    ///   differ, or the store's classes do not line up with the table rows
    pub fn new(
        table: ClassMetricsTable,
        records: AllocationRecordStore,
        captured_at: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        if table.kind().is_diff() {
            return Err(SnapshotError::StoreMismatch(format!("{} table cannot back a snapshot", table.kind())));
        }
        if table.kind().base() != records.kind() {
            return Err(SnapshotError::StoreMismatch(format!(
                "{} table with {} records",
                table.kind(),
                records.kind()
            )));
        }
        if records.class_count() < table.row_count() {
            return Err(SnapshotError::StoreMismatch(format!(
                "{} table rows but records for {} classes",
                table.row_count(),
                records.class_count()
            )));
        }
        if let Some(row) = (0..table.row_count()).find(|&row| table.class_name(row) != records.class_name(row)) {
            return Err(SnapshotError::StoreMismatch(format!(
                "row {} is {} in the table but {} in the records",
                row,
                table.class_name(row),
                records.class_name(row)
            )));
        }

        Ok(Self {
            table,
            records,
            captured_at,
        })
    }

    /// A snapshot whose table is summarized from its records
    pub fn from_records(records: AllocationRecordStore, captured_at: DateTime<Utc>) -> Result<Self, SnapshotError> {
        let table = records.summarize()?;
        Self::new(table, records, captured_at)
    }

    pub fn table(&self) -> &ClassMetricsTable {
        &self.table
    }

    pub fn records(&self) -> &AllocationRecordStore {
        &self.records
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn kind(&self) -> SnapshotKind {
        self.records.kind()
    }
}

#[derive(Debug, Default)]
struct Published {
    current: Option<Arc<Snapshot>>,
    reference: Option<Arc<Snapshot>>,
    count: u64,
}

/// Shared state of one profiling session
///
/// **Public** - the single writer publishes captures, any number of readers
/// take `Arc` clones
#[derive(Debug, Default)]
pub struct ProfilingSession {
    published: RwLock<Published>,
    selection: Mutex<SelectionSet>,
    token: CancellationToken,
}

impl ProfilingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `snapshot` the current capture, replacing the previous one
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut published = self.published.write();
        published.current = Some(Arc::clone(&snapshot));
        published.count += 1;
        debug!(
            "Published capture #{} ({} classes, {} records)",
            published.count,
            snapshot.table().row_count(),
            snapshot.records().total_records()
        );
        snapshot
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.published.read().current.clone()
    }

    /// Number of captures published so far
    pub fn published_count(&self) -> u64 {
        self.published.read().count
    }

    /// Pin the current capture as the baseline of live comparisons
    ///
    /// # Returns
    /// `false` when nothing has been published yet
    pub fn set_reference(&self) -> bool {
        let mut published = self.published.write();
        match published.current.clone() {
            Some(current) => {
                published.reference = Some(current);
                true
            }
            None => false,
        }
    }

    pub fn clear_reference(&self) {
        self.published.write().reference = None;
    }

    pub fn reference(&self) -> Option<Arc<Snapshot>> {
        self.published.read().reference.clone()
    }

    /// Diff of the current capture against the reference, if both exist
    pub fn compare_with_reference(&self) -> Option<Result<DiffTable, DiffError>> {
        let (reference, current) = {
            let published = self.published.read();
            (published.reference.clone()?, published.current.clone()?)
        };
        Some(generate_diff(reference.table(), current.table()))
    }

    /// Run `f` with exclusive access to the selection
    pub fn with_selection<R>(&self, f: impl FnOnce(&mut SelectionSet) -> R) -> R {
        f(&mut self.selection.lock())
    }

    /// A copy of the current selection
    pub fn selection(&self) -> SelectionSet {
        self.selection.lock().clone()
    }

    /// Token that trips when the session ends; pass it to tree expansion
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_ended(&self) -> bool {
        self.token.is_cancelled()
    }

    /// End the session, cancelling expansions still running
    pub fn end(&self) {
        info!("Ending profiling session after {} captures", self.published_count());
        self.token.cancel();
    }

    /// Publish every capture `feed` delivers until it runs dry or the
    /// session ends
    ///
    /// # Returns
    /// Number of captures published
    ///
    /// # Errors
    /// The first capture the feed fails to deliver. Captures published
    /// before it stay published.
    pub fn drain(&self, feed: &mut impl CaptureFeed) -> Result<usize, ParseError> {
        let mut published = 0;
        while !self.is_ended() {
            match feed.next_capture() {
                Some(Ok(snapshot)) => {
                    self.publish(snapshot);
                    published += 1;
                }
                Some(Err(e)) => {
                    warn!("Capture feed failed after {} captures: {}", published, e);
                    return Err(e);
                }
                None => break,
            }
        }
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{MethodTable, AllocationRecord};

    fn snapshot(names: &[&str]) -> Snapshot {
        let mut store = AllocationRecordStore::new(
            SnapshotKind::Allocation,
            names.iter().map(|n| n.to_string()).collect(),
            MethodTable::default(),
            0,
        );
        for class in 0..names.len() {
            store.push(class, AllocationRecord::new(Vec::new(), 8));
        }
        Snapshot::from_records(store, Utc::now()).unwrap()
    }

    #[test]
    fn test_mismatched_store_rejected() {
        let table = snapshot(&["A", "B"]).table().clone();
        let store = snapshot(&["B", "A"]).records().clone();

        let err = Snapshot::new(table, store, Utc::now()).unwrap_err();
        assert!(matches!(err, SnapshotError::StoreMismatch(_)));
    }

    #[test]
    fn test_reference_requires_capture() {
        let session = ProfilingSession::new();
        assert!(!session.set_reference());
        assert!(session.compare_with_reference().is_none());

        session.publish(snapshot(&["A"]));
        assert!(session.set_reference());
        session.publish(snapshot(&["A", "B"]));

        let diff = session.compare_with_reference().unwrap().unwrap();
        assert_eq!(diff.row_count(), 2);
        assert_eq!(session.published_count(), 2);
    }

    #[test]
    fn test_end_trips_token() {
        let session = ProfilingSession::new();
        let token = session.cancel_token();
        session.end();
        assert!(token.is_cancelled());
        assert!(session.is_ended());
    }
}
