//! Engine configuration
//!
//! Chunk size, dense sample rate and sparse-series behaviour, stored as
//! JSON. Missing fields fall back to their defaults.

use crate::series::dense::DenseSeries;
use crate::series::sparse::{BinAnchor, InsertMode, SparseSeries};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_chunk_size() -> usize {
    crate::DEFAULT_CHUNK_SIZE
}

fn default_sample_rate() -> u32 {
    crate::DEFAULT_SAMPLE_RATE
}

/// Storage engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Elements per arena chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Dense series sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Insert mode for new sparse series
    #[serde(default)]
    pub sparse_insert: InsertMode,
    /// Anchoring of multi-bin sparse means
    #[serde(default)]
    pub bin_anchor: BinAnchor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            sample_rate: default_sample_rate(),
            sparse_insert: InsertMode::default(),
            bin_anchor: BinAnchor::default(),
        }
    }
}

impl EngineConfig {
    /// Load config from disk, falling back to defaults on any error
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded engine config");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Engine config saved");
        Ok(())
    }

    /// Interval between dense samples in seconds
    pub fn interval(&self) -> f64 {
        1.0 / self.sample_rate.max(1) as f64
    }

    /// New dense series starting at `start`, sampled at the configured rate
    pub fn dense_series(&self, start: f64) -> DenseSeries {
        DenseSeries::from_sample_rate(start, self.sample_rate, self.chunk_size)
    }

    /// New sparse series using the configured insert mode
    pub fn sparse_series(&self) -> SparseSeries {
        SparseSeries::with_chunk_size(self.chunk_size, self.sparse_insert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_size, 16384);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.sparse_insert, InsertMode::Append);
        assert_eq!(config.bin_anchor, BinAnchor::Zero);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{"sample_rate": 44100, "bin_anchor": "start"}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.bin_anchor, BinAnchor::Start);
        assert_eq!(config.chunk_size, 16384);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engine.json");

        let config = EngineConfig {
            chunk_size: 256,
            sample_rate: 8000,
            sparse_insert: InsertMode::Unordered,
            bin_anchor: BinAnchor::Start,
        };
        config.save(&path).unwrap();

        assert_eq!(EngineConfig::load(&path), config);
    }

    #[test]
    fn test_load_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(EngineConfig::load(&path), EngineConfig::default());
        assert_eq!(
            EngineConfig::load(&dir.path().join("missing.json")),
            EngineConfig::default()
        );
    }

    #[test]
    fn test_series_factories() {
        let config = EngineConfig {
            sample_rate: 1000,
            sparse_insert: InsertMode::Unordered,
            ..Default::default()
        };
        let dense = config.dense_series(2.0);
        assert_eq!(dense.start(), 2.0);
        assert_eq!(dense.interval(), 0.001);
        assert_eq!(config.sparse_series().mode(), InsertMode::Unordered);
    }
}
