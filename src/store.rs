// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The [`FireDb`] facade.
//!
//! Orchestrates path validation, the row mapper, the range query stages,
//! and the key generator over a [`TableStore`] collaborator. Every
//! operation is a single logical unit: `set` replaces the whole subtree
//! under its path, `get` reads it back whole.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::FireDbConfig;
use crate::error::FireDbError;
use crate::keygen::KeyGenerator;
use crate::mapper::{flatten, reconstruct};
use crate::path::Path;
use crate::range::RangeSpec;
use crate::row::Row;
use crate::storage::sql::SqlStore;
use crate::storage::traits::TableStore;

pub struct FireDb<S: TableStore> {
    store: S,
    keys: KeyGenerator,
}

impl FireDb<SqlStore> {
    /// Connect the SQL collaborator and wrap it in a store facade.
    pub async fn connect(config: &FireDbConfig) -> Result<Self, FireDbError> {
        let store = SqlStore::connect(config).await?;
        Ok(Self::with_store(store))
    }
}

impl<S: TableStore> FireDb<S> {
    /// Wrap an already-constructed collaborator.
    #[must_use]
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            keys: KeyGenerator::new(),
        }
    }

    /// Swap in a custom key generator (deterministic clock, seeded RNG).
    #[must_use]
    pub fn with_key_generator(mut self, keys: KeyGenerator) -> Self {
        self.keys = keys;
        self
    }

    /// The underlying collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the document at `path`.
    ///
    /// Returns `Null` when nothing is stored there.
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Value, FireDbError> {
        let path = Path::parse(path)?;
        let rows = self.store.select_prefix(path.segments()).await?;
        Ok(reconstruct(&rows, path.depth()))
    }

    /// Read the children of `path` whose property satisfies `spec`.
    ///
    /// Returns one whole sub-document per matching child id, keyed by
    /// child id; `Null` when no child matches.
    #[instrument(skip(self))]
    pub async fn get_range(&self, path: &str, spec: &RangeSpec) -> Result<Value, FireDbError> {
        let path = Path::parse(path)?;
        spec.validate()?;

        let fingerprint = spec.fingerprint(&path).ok_or_else(|| {
            // Unreachable for any parsed path, which has depth >= 1
            FireDbError::InvalidRangeQuery(format!("no grouping parent for '{}'", path))
        })?;

        let rows = self
            .store
            .select_range(path.segments(), &fingerprint, spec.start, spec.end)
            .await?;
        Ok(reconstruct(&rows, path.depth()))
    }

    /// Write `value` at `path`, replacing whatever subtree was there.
    ///
    /// `Null` deletes the subtree. The delete/insert pair is handed to
    /// the collaborator as one replace so it can run transactionally.
    #[instrument(skip(self, value))]
    pub async fn set(&self, path: &str, value: &Value) -> Result<(), FireDbError> {
        let path = Path::parse(path)?;
        let rows = flatten(&path, value)?;
        debug!(path = %path, rows = rows.len(), "set");
        self.store.replace_prefix(path.segments(), &rows).await?;
        Ok(())
    }

    /// Raw rows under `path`, for callers that need the storage view.
    pub async fn get_raw(&self, path: &str) -> Result<Vec<Row>, FireDbError> {
        let path = Path::parse(path)?;
        Ok(self.store.select_prefix(path.segments()).await?)
    }

    /// Generate a sortable unique key for ordered child insertion.
    pub fn generate_key(&self) -> Result<String, FireDbError> {
        self.keys.generate()
    }
}
