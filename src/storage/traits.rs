use async_trait::async_trait;
use thiserror::Error;

use crate::row::Row;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("corrupt row under '{path}': type '{tag}' has no matching value column")]
    Corruption { path: String, tag: String },
}

/// Contract for the relational collaborator.
///
/// One fixed-schema table, three predicate shapes: path-prefix equality
/// for reads/deletes, the two-stage fingerprint+range select, and batch
/// insert. The collaborator owns blocking, timeouts, and retries; the
/// core never retries and never translates collaborator failures.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// All rows whose leading path slots equal `prefix`, in any order.
    async fn select_prefix(&self, prefix: &[String]) -> Result<Vec<Row>, StorageError>;

    /// Two-stage range select: rows under `prefix` whose child id (slot
    /// `prefix.len()`) also owns a row carrying `fingerprint` with
    /// `int_value` inside the inclusive bounds.
    async fn select_range(
        &self,
        prefix: &[String],
        fingerprint: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<Row>, StorageError>;

    /// Insert a batch of rows.
    async fn insert_rows(&self, rows: &[Row]) -> Result<(), StorageError>;

    /// Delete all rows whose leading path slots equal `prefix`.
    async fn delete_prefix(&self, prefix: &[String]) -> Result<(), StorageError>;

    /// Delete everything under `prefix`, then insert `rows`.
    ///
    /// The pair is one logical unit; implementations should make it
    /// atomic. The default falls back to sequential delete-then-insert,
    /// which can leave the path empty if the insert fails.
    async fn replace_prefix(&self, prefix: &[String], rows: &[Row]) -> Result<(), StorageError> {
        self.delete_prefix(prefix).await?;
        if rows.is_empty() {
            return Ok(());
        }
        self.insert_rows(rows).await
    }
}
