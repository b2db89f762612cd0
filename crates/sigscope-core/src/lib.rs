//! Sigscope Core - Streaming time-series storage and binned queries
//!
//! This library stores continuous streams of samples pushed by producer
//! threads (signal generators, audio playback) and answers range-aggregation
//! queries from a render loop running at frame rate. Storage grows in
//! fixed-size chunks so previously written samples never move.

pub mod config;
pub mod db;
pub mod error;
pub mod series;
pub mod signal;

pub use config::EngineConfig;
pub use db::registry::Database;
pub use error::{Result, StorageError};
pub use series::arena::ChunkedArena;
pub use series::dense::DenseSeries;
pub use series::sparse::SparseSeries;
pub use series::{Sample, SeriesHandle, TimeSeries, TsSample};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of elements per arena chunk
pub const DEFAULT_CHUNK_SIZE: usize = 16384;

/// Default sample rate for dense series (48kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;
