use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;

use super::traits::{StorageError, TableStore};
use crate::row::Row;

/// Embedded table backend holding rows in memory.
///
/// Used by unit tests and for ephemeral stores; it mirrors the SQL
/// backend's predicate semantics exactly, including the two-stage range
/// select.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Row>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current row count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Drop all rows.
    pub fn clear(&self) {
        self.rows.write().clear();
    }
}

fn within(value: Option<i64>, start: Option<i64>, end: Option<i64>) -> bool {
    let value = match value {
        Some(v) => v,
        None => return false,
    };
    start.map_or(true, |s| value >= s) && end.map_or(true, |e| value <= e)
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select_prefix(&self, prefix: &[String]) -> Result<Vec<Row>, StorageError> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|row| row.matches_prefix(prefix))
            .cloned()
            .collect())
    }

    async fn select_range(
        &self,
        prefix: &[String],
        fingerprint: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<Row>, StorageError> {
        let ids_slot = prefix.len();
        let rows = self.rows.read();

        // Stage 1: child ids whose indexed property falls in range
        let matching_ids: HashSet<&str> = rows
            .iter()
            .filter(|row| {
                row.index_hash.as_deref() == Some(fingerprint)
                    && within(row.int_value, start, end)
            })
            .filter_map(|row| row.path.get(ids_slot).and_then(Option::as_deref))
            .collect();

        // Stage 2: every row of those children under the prefix
        Ok(rows
            .iter()
            .filter(|row| {
                row.matches_prefix(prefix)
                    && row
                        .path
                        .get(ids_slot)
                        .and_then(Option::as_deref)
                        .is_some_and(|id| matching_ids.contains(id))
            })
            .cloned()
            .collect())
    }

    async fn insert_rows(&self, rows: &[Row]) -> Result<(), StorageError> {
        self.rows.write().extend_from_slice(rows);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &[String]) -> Result<(), StorageError> {
        self.rows.write().retain(|row| !row.matches_prefix(prefix));
        Ok(())
    }

    async fn replace_prefix(&self, prefix: &[String], rows: &[Row]) -> Result<(), StorageError> {
        // Single write lock makes the delete/insert pair atomic here
        let mut guard = self.rows.write();
        guard.retain(|row| !row.matches_prefix(prefix));
        guard.extend_from_slice(rows);
        Ok(())
    }
}
