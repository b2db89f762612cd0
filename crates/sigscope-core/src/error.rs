//! Error taxonomy for storage and registry operations
//!
//! Every variant is a local, recoverable condition. Callers such as a
//! render loop should treat `OutOfRange`, `EmptySeries` and `EmptyRange`
//! as "no data yet" and skip drawing.

use thiserror::Error;

/// Errors reported by arenas, series and the registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Series not found: {0}")]
    NotFound(String),

    #[error("Series already registered: {0}")]
    DuplicateName(String),

    #[error("Time {time} outside series span [{start}, {end}]")]
    OutOfRange { time: f64, start: f64, end: f64 },

    #[error("Sample time {time} does not follow last time {last}")]
    InvariantViolation { last: f64, time: f64 },

    #[error("Series has no samples")]
    EmptySeries,

    #[error("No samples in range [{start}, {end}]")]
    EmptyRange { start: f64, end: f64 },

    #[error("Index {index} out of bounds for arena of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Sample interval must be positive and finite, got {0}")]
    InvalidInterval(f64),
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Whether the error only means the requested data does not exist yet
    ///
    /// Renderers use this to skip a frame instead of reporting a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            StorageError::OutOfRange { .. }
                | StorageError::EmptySeries
                | StorageError::EmptyRange { .. }
        )
    }
}
