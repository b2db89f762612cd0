//! Sigscope - streaming signal storage and binned queries
//!
//! This library re-exports the storage engine, series registry and signal
//! producers from `sigscope-core`.

pub use sigscope_core::{config, db, error, series, signal};

pub use sigscope_core::{
    ChunkedArena, Database, DenseSeries, EngineConfig, Result, Sample, SeriesHandle,
    SparseSeries, StorageError, TimeSeries, TsSample,
};
pub use sigscope_core::{DEFAULT_CHUNK_SIZE, DEFAULT_SAMPLE_RATE, VERSION};
