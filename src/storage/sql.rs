// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL table backend over SQLite and MySQL.
//!
//! One fixed-schema table (see [`crate::row`]) accessed through sqlx's
//! `Any` driver. Every user-controlled value is a bound parameter; the
//! identifiers embedded in generated statements come only from the
//! schema constants in [`crate::row`].
//!
//! ## sqlx Any Driver Quirks
//!
//! The `Any` driver treats MySQL TEXT/VARCHAR columns as BLOB on some
//! paths, so text columns are read as `String` first and decoded from
//! `Vec<u8>` as a fallback, mirroring both dialects.

use async_trait::async_trait;
use sqlx::{any::AnyPoolOptions, AnyPool, Row as SqlxRow};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{StorageError, TableStore};
use crate::config::FireDbConfig;
use crate::resilience::retry::{retry, RetryConfig};
use crate::row::{Row, ValueKind, MAX_VARCHAR_LEN, PATH_COLUMNS, TABLE};
use crate::path::MAX_DEPTH;

// SQLx `Any` driver requires runtime installation
static INSTALL_DRIVERS: Once = Once::new();

fn install_drivers() {
    INSTALL_DRIVERS.call_once(|| {
        sqlx::any::install_default_drivers();
    });
}

/// Every column, in the order the decoders expect.
const ALL_COLUMNS: &str = "path0, path1, path2, path3, path4, path5, path6, path7, path8, path9, \
     type, int_value, varchar_value, text_value, index_hash";

/// SQLite's default bind-variable limit is 999; 15 binds per row.
const INSERT_CHUNK: usize = 60;

pub struct SqlStore {
    pool: AnyPool,
    is_sqlite: bool,
}

impl SqlStore {
    /// Connect with startup-mode retry (fails fast if config is wrong)
    /// and create the table if it does not exist.
    pub async fn connect(config: &FireDbConfig) -> Result<Self, StorageError> {
        install_drivers();

        let url = config
            .sql_url
            .as_deref()
            .ok_or_else(|| StorageError::Backend("sql_url is not configured".into()))?;
        let is_sqlite = url.starts_with("sqlite:");

        let pool = retry("sql_connect", &RetryConfig::startup(), || async {
            AnyPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                .connect(url)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))
        })
        .await?;

        let store = Self { pool, is_sqlite };

        if is_sqlite {
            store.enable_wal_mode().await?;
        }

        store.init_schema().await?;
        Ok(store)
    }

    /// Get a clone of the connection pool.
    pub fn pool(&self) -> AnyPool {
        self.pool.clone()
    }

    /// Enable WAL (Write-Ahead Logging) mode for SQLite: concurrent reads
    /// during writes, single fsync per commit.
    async fn enable_wal_mode(&self) -> Result<(), StorageError> {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to enable WAL mode: {}", e)))?;

        // WAL mode is safe with synchronous = NORMAL
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to set synchronous mode: {}", e)))?;

        Ok(())
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        let create = if self.is_sqlite {
            format!(
                "CREATE TABLE IF NOT EXISTS {TABLE} (
                    path0 TEXT NOT NULL,
                    path1 TEXT,
                    path2 TEXT,
                    path3 TEXT,
                    path4 TEXT,
                    path5 TEXT,
                    path6 TEXT,
                    path7 TEXT,
                    path8 TEXT,
                    path9 TEXT,
                    type TEXT NOT NULL,
                    int_value INTEGER,
                    varchar_value TEXT,
                    text_value TEXT,
                    index_hash TEXT
                )"
            )
        } else {
            format!(
                "CREATE TABLE IF NOT EXISTS {TABLE} (
                    path0 VARCHAR({len}) NOT NULL,
                    path1 VARCHAR({len}),
                    path2 VARCHAR({len}),
                    path3 VARCHAR({len}),
                    path4 VARCHAR({len}),
                    path5 VARCHAR({len}),
                    path6 VARCHAR({len}),
                    path7 VARCHAR({len}),
                    path8 VARCHAR({len}),
                    path9 VARCHAR({len}),
                    type VARCHAR(8) NOT NULL,
                    int_value BIGINT,
                    varchar_value VARCHAR({len}),
                    text_value LONGTEXT,
                    index_hash VARCHAR(64),
                    INDEX idx_fire_tree_path (path0, path1, path2),
                    INDEX idx_fire_tree_hash (index_hash)
                )",
                len = MAX_VARCHAR_LEN
            )
        };

        retry("sql_init_schema", &RetryConfig::startup(), || async {
            sqlx::query(&create)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))
        })
        .await?;

        // MySQL takes its indexes inline above; SQLite wants them separate
        if self.is_sqlite {
            for index in [
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_fire_tree_path ON {TABLE} (path0, path1, path2)"
                ),
                format!("CREATE INDEX IF NOT EXISTS idx_fire_tree_hash ON {TABLE} (index_hash)"),
            ] {
                sqlx::query(&index)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// `path0 = ? AND path1 = ? ...` for the leading `depth` slots.
    fn prefix_clause(depth: usize) -> String {
        PATH_COLUMNS[..depth]
            .iter()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Read a text column as `String`, falling back to UTF-8 bytes
/// (the `Any` driver's MySQL TEXT representation).
fn text_column(row: &sqlx::any::AnyRow, column: &str) -> Option<String> {
    row.try_get::<String, _>(column).ok().or_else(|| {
        row.try_get::<Vec<u8>, _>(column)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    })
}

fn decode_row(sql_row: &sqlx::any::AnyRow) -> Result<Row, StorageError> {
    let mut path: [Option<String>; MAX_DEPTH] = Default::default();
    for (slot, column) in path.iter_mut().zip(PATH_COLUMNS) {
        *slot = text_column(sql_row, column);
    }
    let path_string = path
        .iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join("/");

    let tag = text_column(sql_row, "type")
        .ok_or_else(|| StorageError::Backend(format!("row '{}' has no type tag", path_string)))?;
    let kind = ValueKind::from_tag(&tag).ok_or_else(|| StorageError::Corruption {
        path: path_string.clone(),
        tag: tag.clone(),
    })?;

    let row = Row {
        path,
        kind,
        int_value: sql_row.try_get::<i64, _>("int_value").ok(),
        varchar_value: text_column(sql_row, "varchar_value"),
        text_value: text_column(sql_row, "text_value"),
        index_hash: text_column(sql_row, "index_hash"),
    };

    let value_present = match kind {
        ValueKind::Bool | ValueKind::Int => row.int_value.is_some(),
        ValueKind::Varchar => row.varchar_value.is_some(),
        ValueKind::Text => row.text_value.is_some(),
    };
    if !value_present {
        return Err(StorageError::Corruption {
            path: path_string,
            tag,
        });
    }

    Ok(row)
}

fn bind_row<'q>(
    query: sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>,
    row: &'q Row,
) -> sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>> {
    let mut query = query;
    for slot in &row.path {
        query = query.bind(slot.as_deref());
    }
    query
        .bind(row.kind.as_str())
        .bind(row.int_value)
        .bind(row.varchar_value.as_deref())
        .bind(row.text_value.as_deref())
        .bind(row.index_hash.as_deref())
}

#[async_trait]
impl TableStore for SqlStore {
    async fn select_prefix(&self, prefix: &[String]) -> Result<Vec<Row>, StorageError> {
        let sql = format!(
            "SELECT {ALL_COLUMNS} FROM {TABLE} WHERE {}",
            Self::prefix_clause(prefix.len())
        );

        let rows = retry("sql_select_prefix", &RetryConfig::query(), || async {
            let mut query = sqlx::query(&sql);
            for segment in prefix {
                query = query.bind(segment);
            }
            query
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))
        })
        .await?;

        debug!(prefix = %prefix.join("/"), rows = rows.len(), "prefix select");
        rows.iter().map(decode_row).collect()
    }

    async fn select_range(
        &self,
        prefix: &[String],
        fingerprint: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<Row>, StorageError> {
        let ids_slot = prefix.len();
        if ids_slot >= MAX_DEPTH {
            // A full-depth path has no child-id slot left
            return Ok(Vec::new());
        }
        let ids_column = PATH_COLUMNS[ids_slot];

        let mut inner = format!("SELECT {ids_column} FROM {TABLE} WHERE index_hash = ?");
        if start.is_some() {
            inner.push_str(" AND int_value >= ?");
        }
        if end.is_some() {
            inner.push_str(" AND int_value <= ?");
        }

        let sql = format!(
            "SELECT {ALL_COLUMNS} FROM {TABLE} WHERE {} AND {ids_column} IN ({inner})",
            Self::prefix_clause(prefix.len())
        );

        let rows = retry("sql_select_range", &RetryConfig::query(), || async {
            let mut query = sqlx::query(&sql);
            for segment in prefix {
                query = query.bind(segment);
            }
            query = query.bind(fingerprint);
            if let Some(start) = start {
                query = query.bind(start);
            }
            if let Some(end) = end {
                query = query.bind(end);
            }
            query
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))
        })
        .await?;

        debug!(
            prefix = %prefix.join("/"),
            rows = rows.len(),
            "range select"
        );
        rows.iter().map(decode_row).collect()
    }

    async fn insert_rows(&self, rows: &[Row]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }

        for chunk in rows.chunks(INSERT_CHUNK) {
            let sql = insert_statement(chunk.len());
            retry("sql_insert", &RetryConfig::query(), || async {
                let mut query = sqlx::query(&sql);
                for row in chunk {
                    query = bind_row(query, row);
                }
                query
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                Ok(())
            })
            .await?;
        }

        Ok(())
    }

    async fn delete_prefix(&self, prefix: &[String]) -> Result<(), StorageError> {
        let sql = format!(
            "DELETE FROM {TABLE} WHERE {}",
            Self::prefix_clause(prefix.len())
        );

        retry("sql_delete_prefix", &RetryConfig::query(), || async {
            let mut query = sqlx::query(&sql);
            for segment in prefix {
                query = query.bind(segment);
            }
            query
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            Ok(())
        })
        .await
    }

    /// Delete-then-insert as one transaction, so a failure between the
    /// two cannot leave the path empty.
    async fn replace_prefix(&self, prefix: &[String], rows: &[Row]) -> Result<(), StorageError> {
        let delete_sql = format!(
            "DELETE FROM {TABLE} WHERE {}",
            Self::prefix_clause(prefix.len())
        );

        retry("sql_replace_prefix", &RetryConfig::batch_write(), || async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;

            let mut delete = sqlx::query(&delete_sql);
            for segment in prefix {
                delete = delete.bind(segment);
            }
            delete
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;

            for chunk in rows.chunks(INSERT_CHUNK) {
                let sql = insert_statement(chunk.len());
                let mut query = sqlx::query(&sql);
                for row in chunk {
                    query = bind_row(query, row);
                }
                query
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
            }

            tx.commit()
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))
        })
        .await
        .map_err(|e| {
            warn!(prefix = %prefix.join("/"), error = %e, "replace failed");
            e
        })
    }
}

fn insert_statement(row_count: usize) -> String {
    let placeholders: Vec<&str> = (0..row_count)
        .map(|_| "(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
        .collect();
    format!(
        "INSERT INTO {TABLE} ({ALL_COLUMNS}) VALUES {}",
        placeholders.join(", ")
    )
}
