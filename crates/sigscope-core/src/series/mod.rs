//! Time-series storage
//!
//! This module contains the storage side of the engine:
//! - Append-only chunked storage ([`arena`])
//! - Fixed-interval series with implicit timestamps ([`dense`])
//! - Explicitly timestamped event series ([`sparse`])
//!
//! Both series variants expose the shared query capability set through the
//! [`TimeSeries`] trait, and the registry stores them as [`SeriesHandle`]s.

pub mod arena;
pub mod dense;
pub mod sparse;

use crate::error::Result;
use dense::DenseSeries;
use serde::{Deserialize, Serialize};
use sparse::SparseSeries;
use std::sync::Arc;

/// A timestamped value in a sparse series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time of the sample
    pub time: f64,
    /// Value of the sample
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// One aggregated bin returned by binned queries
///
/// `average`, `min` and `max` are all NaN when no sample fell in the bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TsSample {
    /// Start time of the bin
    pub timestamp: f64,
    /// Mean of the values in the bin
    pub average: f64,
    /// Smallest value in the bin
    pub min: f64,
    /// Largest value in the bin
    pub max: f64,
}

impl TsSample {
    /// A bin with no samples
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            average: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }

    /// Whether no sample fell in this bin
    pub fn is_empty(&self) -> bool {
        self.average.is_nan()
    }
}

impl Default for TsSample {
    fn default() -> Self {
        Self::empty(0.0)
    }
}

/// Running sum/min/max over the values of one bin
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reduction {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Reduction {
    pub(crate) fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }

    pub(crate) fn finish(self, timestamp: f64) -> TsSample {
        if self.count == 0 {
            return TsSample::empty(timestamp);
        }
        TsSample {
            timestamp,
            average: self.sum / self.count as f64,
            min: self.min,
            max: self.max,
        }
    }
}

impl FromIterator<f64> for Reduction {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut reduction = Reduction::new();
        for value in iter {
            reduction.push(value);
        }
        reduction
    }
}

/// Query capabilities shared by every series variant
///
/// Implementations are safe to query from any number of reader threads
/// while a single producer thread pushes.
pub trait TimeSeries: Send + Sync {
    /// Time interval currently covered by the series
    fn query_span(&self) -> Result<(f64, f64)>;

    /// Reduce `num_bins` consecutive bins of `bin_width` starting at
    /// `timestamp_start` into `out`, returning the number of bins written
    fn get_samples(
        &self,
        out: &mut [TsSample],
        timestamp_start: f64,
        bin_width: f64,
        num_bins: usize,
    ) -> usize;

    /// Reduce a single bin
    fn get_sample(&self, timestamp: f64, bin_width: f64) -> TsSample {
        let mut out = [TsSample::empty(timestamp)];
        self.get_samples(&mut out, timestamp, bin_width, 1);
        out[0]
    }

    /// Approximate bytes held by the series storage
    fn memory_usage(&self) -> usize;

    /// Number of stored samples
    fn size(&self) -> usize;
}

/// Which variant a [`SeriesHandle`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Dense,
    Sparse,
}

/// Shared handle to a registered series
///
/// Cloning the handle shares the series; it is dropped when its last
/// holder releases it.
#[derive(Debug, Clone)]
pub enum SeriesHandle {
    Dense(Arc<DenseSeries>),
    Sparse(Arc<SparseSeries>),
}

impl SeriesHandle {
    /// Variant held by this handle
    pub fn kind(&self) -> SeriesKind {
        match self {
            SeriesHandle::Dense(_) => SeriesKind::Dense,
            SeriesHandle::Sparse(_) => SeriesKind::Sparse,
        }
    }

    /// The dense series, if this handle holds one
    pub fn as_dense(&self) -> Option<&Arc<DenseSeries>> {
        match self {
            SeriesHandle::Dense(series) => Some(series),
            SeriesHandle::Sparse(_) => None,
        }
    }

    /// The sparse series, if this handle holds one
    pub fn as_sparse(&self) -> Option<&Arc<SparseSeries>> {
        match self {
            SeriesHandle::Sparse(series) => Some(series),
            SeriesHandle::Dense(_) => None,
        }
    }

    /// Whether both handles point at the same series
    pub fn ptr_eq(&self, other: &SeriesHandle) -> bool {
        match (self, other) {
            (SeriesHandle::Dense(a), SeriesHandle::Dense(b)) => Arc::ptr_eq(a, b),
            (SeriesHandle::Sparse(a), SeriesHandle::Sparse(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn inner(&self) -> &dyn TimeSeries {
        match self {
            SeriesHandle::Dense(series) => &**series as &dyn TimeSeries,
            SeriesHandle::Sparse(series) => &**series as &dyn TimeSeries,
        }
    }
}

impl TimeSeries for SeriesHandle {
    fn query_span(&self) -> Result<(f64, f64)> {
        self.inner().query_span()
    }

    fn get_samples(
        &self,
        out: &mut [TsSample],
        timestamp_start: f64,
        bin_width: f64,
        num_bins: usize,
    ) -> usize {
        self.inner()
            .get_samples(out, timestamp_start, bin_width, num_bins)
    }

    fn memory_usage(&self) -> usize {
        self.inner().memory_usage()
    }

    fn size(&self) -> usize {
        self.inner().size()
    }
}

impl From<Arc<DenseSeries>> for SeriesHandle {
    fn from(series: Arc<DenseSeries>) -> Self {
        SeriesHandle::Dense(series)
    }
}

impl From<Arc<SparseSeries>> for SeriesHandle {
    fn from(series: Arc<SparseSeries>) -> Self {
        SeriesHandle::Sparse(series)
    }
}

impl From<DenseSeries> for SeriesHandle {
    fn from(series: DenseSeries) -> Self {
        SeriesHandle::Dense(Arc::new(series))
    }
}

impl From<SparseSeries> for SeriesHandle {
    fn from(series: SparseSeries) -> Self {
        SeriesHandle::Sparse(Arc::new(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ts_sample() {
        let s = TsSample::empty(3.0);
        assert_eq!(s.timestamp, 3.0);
        assert!(s.is_empty());
        assert!(s.min.is_nan() && s.max.is_nan());
    }

    #[test]
    fn test_reduction() {
        let r: Reduction = [1.0, 2.0, 3.0].into_iter().collect();
        let s = r.finish(0.0);
        assert_eq!(s.average, 2.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);

        assert!(Reduction::new().finish(1.0).is_empty());
    }

    #[test]
    fn test_handle_kind_and_downcast() {
        let dense: SeriesHandle = DenseSeries::new(0.0, 1.0).unwrap().into();
        let sparse: SeriesHandle = SparseSeries::new().into();

        assert_eq!(dense.kind(), SeriesKind::Dense);
        assert_eq!(sparse.kind(), SeriesKind::Sparse);
        assert!(dense.as_dense().is_some());
        assert!(dense.as_sparse().is_none());
        assert!(sparse.as_sparse().is_some());
    }

    #[test]
    fn test_handle_delegates_queries() {
        let series = Arc::new(DenseSeries::new(0.0, 1.0).unwrap());
        series.push_sample(1.0);
        series.push_sample(2.0);
        series.push_sample(3.0);

        let handle = SeriesHandle::from(Arc::clone(&series));
        assert_eq!(handle.size(), 3);
        assert_eq!(handle.query_span(), Ok((0.0, 3.0)));
        let bin = handle.get_sample(0.0, 3.0);
        assert_eq!(bin.average, 2.0);
        assert!(handle.ptr_eq(&SeriesHandle::Dense(series)));
    }
}
