//! Name-keyed collection of series
//!
//! Producers register their series once at start-up; the render loop looks
//! them up by name. The registry holds one shared handle per series, so
//! removing an entry never invalidates handles readers already hold.

use super::stats::{DatabaseStats, SeriesStats};
use crate::error::{Result, StorageError};
use crate::series::{SeriesHandle, TimeSeries};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Registry of named series
#[derive(Debug, Default)]
pub struct Database {
    series: RwLock<HashMap<String, SeriesHandle>>,
}

impl Database {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            series: RwLock::new(HashMap::new()),
        }
    }

    /// Register a series under `name`
    ///
    /// # Errors
    /// [`StorageError::DuplicateName`] if the name is taken
    ///
    /// # Example
    /// ```
    /// use sigscope_core::{Database, DenseSeries};
    /// use std::sync::Arc;
    ///
    /// let db = Database::new();
    /// let series = Arc::new(DenseSeries::new(0.0, 1.0).unwrap());
    /// db.register("sine", Arc::clone(&series)).unwrap();
    /// assert!(db.register("sine", series).is_err());
    /// ```
    pub fn register(&self, name: impl Into<String>, series: impl Into<SeriesHandle>) -> Result<()> {
        let name = name.into();
        let mut map = self.series.write();
        if map.contains_key(&name) {
            tracing::warn!(name = %name, "Duplicate series registration rejected");
            return Err(StorageError::DuplicateName(name));
        }

        let handle = series.into();
        tracing::info!(name = %name, kind = ?handle.kind(), "Registered series");
        map.insert(name, handle);
        Ok(())
    }

    /// Look up a series by name
    ///
    /// # Errors
    /// [`StorageError::NotFound`] if no series has that name
    pub fn get(&self, name: &str) -> Result<SeriesHandle> {
        self.series
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    /// Remove a series, returning its handle
    ///
    /// Readers holding a handle keep a valid series.
    pub fn remove(&self, name: &str) -> Result<SeriesHandle> {
        let handle = self
            .series
            .write()
            .remove(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        tracing::info!(name, "Removed series");
        Ok(handle)
    }

    /// Snapshot of every registered series
    pub fn all(&self) -> HashMap<String, SeriesHandle> {
        self.series.read().clone()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a series is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.series.read().contains_key(name)
    }

    /// Number of registered series
    pub fn len(&self) -> usize {
        self.series.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.series.read().is_empty()
    }

    /// Total bytes held by all series
    pub fn memory_usage(&self) -> usize {
        self.series.read().values().map(|s| s.memory_usage()).sum()
    }

    /// Total samples across all series
    pub fn num_samples(&self) -> usize {
        self.series.read().values().map(|s| s.size()).sum()
    }

    /// Totals over all series, computed under one lock
    pub fn stats(&self) -> DatabaseStats {
        let map = self.series.read();
        map.values().fold(
            DatabaseStats {
                series_count: map.len(),
                ..Default::default()
            },
            |mut acc, series| {
                acc.memory_usage += series.memory_usage();
                acc.num_samples += series.size();
                acc
            },
        )
    }

    /// Per-series snapshot sorted by name
    pub fn series_stats(&self) -> Vec<SeriesStats> {
        let map = self.series.read();
        let mut stats: Vec<SeriesStats> = map
            .iter()
            .map(|(name, series)| SeriesStats {
                name: name.clone(),
                kind: series.kind(),
                size: series.size(),
                memory_usage: series.memory_usage(),
                span: series.query_span().ok(),
            })
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }
}
