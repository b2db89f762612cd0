//! Explicitly timestamped event series
//!
//! Samples are kept in strictly increasing time order. In the default
//! [`InsertMode::Append`] mode each push must be later than the previous
//! one, which keeps indices stable; range lookups are binary searches over
//! the arena index space.

use super::arena::ChunkedArena;
use super::{Reduction, Sample, TimeSeries, TsSample};
use crate::error::{Result, StorageError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Default chunk size for sparse series (events arrive far slower than audio)
const SPARSE_CHUNK_SIZE: usize = 1024;

/// How pushes are placed into a sparse series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertMode {
    /// Each push must be strictly later than the last one
    #[default]
    Append,
    /// Pushes may arrive in any order and are inserted at their sorted
    /// position. O(n) per push and indices shift, so only suitable for
    /// small series.
    Unordered,
}

/// Where the bins of [`SparseSeries::mean_bins_anchored`] start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinAnchor {
    /// Bin `i` covers `[i * step, (i + 1) * step)`, ignoring `start`
    #[default]
    Zero,
    /// Bin `i` covers `[start + i * step, start + (i + 1) * step)`
    Start,
}

impl BinAnchor {
    /// Time at which bin zero begins for a query starting at `start`
    pub fn origin(self, start: f64) -> f64 {
        match self {
            BinAnchor::Zero => 0.0,
            BinAnchor::Start => start,
        }
    }
}

/// Series of `(time, value)` samples with strictly increasing times
#[derive(Debug)]
pub struct SparseSeries {
    mode: InsertMode,
    data: RwLock<ChunkedArena<Sample>>,
}

/// Samples selected by [`SparseSeries::range`]
///
/// A copy taken under one read lock. Holding it never blocks pushes or
/// further queries on the series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleRange {
    samples: Vec<Sample>,
    bounds: Range<usize>,
}

impl SampleRange {
    /// Iterate over the selected samples in time order
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Arena indices the samples were copied from
    pub fn bounds(&self) -> Range<usize> {
        self.bounds.clone()
    }

    /// Number of selected samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample was selected
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest selected sample
    pub fn first(&self) -> Option<Sample> {
        self.samples.first().copied()
    }

    /// Latest selected sample
    pub fn last(&self) -> Option<Sample> {
        self.samples.last().copied()
    }

    /// Selected samples as a slice
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Take the selected samples
    pub fn into_vec(self) -> Vec<Sample> {
        self.samples
    }
}

impl<'a> IntoIterator for &'a SampleRange {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl SparseSeries {
    /// Create an empty append-only series
    ///
    /// # Example
    /// ```
    /// use sigscope_core::series::{sparse::SparseSeries, Sample};
    ///
    /// let series = SparseSeries::new();
    /// series.push(Sample::new(0.0, 1.0)).unwrap();
    /// series.push(Sample::new(100.0, 2.0)).unwrap();
    /// assert_eq!(series.get(50.0), Ok(1.5));
    /// ```
    pub fn new() -> Self {
        Self::with_mode(InsertMode::Append)
    }

    /// Create an empty series with the given insert mode
    pub fn with_mode(mode: InsertMode) -> Self {
        Self::with_chunk_size(SPARSE_CHUNK_SIZE, mode)
    }

    /// Create an empty series with an explicit arena chunk size
    pub fn with_chunk_size(chunk_size: usize, mode: InsertMode) -> Self {
        if mode == InsertMode::Unordered {
            tracing::debug!("Sparse series created in unordered insert mode");
        }
        Self {
            mode,
            data: RwLock::new(ChunkedArena::new(chunk_size)),
        }
    }

    /// Insert mode chosen at construction
    pub fn mode(&self) -> InsertMode {
        self.mode
    }

    /// Add a sample
    ///
    /// Returns the index the sample was stored at.
    ///
    /// # Errors
    /// [`StorageError::InvariantViolation`] if the time is NaN, duplicates
    /// an existing time, or (in append mode) is not later than the last one
    pub fn push(&self, sample: Sample) -> Result<usize> {
        let mut data = self.data.write();
        let last = data.back().map(|s| s.time).unwrap_or(f64::NEG_INFINITY);

        if sample.time.is_nan() {
            return Err(Self::reject(last, sample.time));
        }

        match self.mode {
            InsertMode::Append => {
                if sample.time <= last {
                    return Err(Self::reject(last, sample.time));
                }
                Ok(data.push(sample))
            }
            InsertMode::Unordered => {
                let index = data.partition_point(|s| s.time < sample.time);
                if data.get(index).is_some_and(|s| s.time == sample.time) {
                    return Err(Self::reject(sample.time, sample.time));
                }
                data.insert(index, sample);
                Ok(index)
            }
        }
    }

    /// Add a sample from its parts
    pub fn push_value(&self, time: f64, value: f64) -> Result<usize> {
        self.push(Sample::new(time, value))
    }

    /// Covered interval `(first time, last time)`
    pub fn span(&self) -> Result<(f64, f64)> {
        let data = self.data.read();
        Self::span_of(&data)
    }

    /// Value at `time`, linearly interpolated between neighbouring samples
    ///
    /// # Errors
    /// - [`StorageError::EmptySeries`] if nothing has been pushed
    /// - [`StorageError::OutOfRange`] if `time` lies outside the span
    pub fn get(&self, time: f64) -> Result<f64> {
        let data = self.data.read();
        let (start, end) = Self::span_of(&data)?;
        if !(start..=end).contains(&time) {
            return Err(StorageError::OutOfRange { time, start, end });
        }

        let index = data.partition_point(|s| s.time < time);
        let next = data.at(index)?;
        if next.time == time {
            return Ok(next.value);
        }
        // time > start, so a previous sample exists
        let prev = data.at(index - 1)?;
        let alpha = (time - prev.time) / (next.time - prev.time);
        Ok((1.0 - alpha) * prev.value + alpha * next.value)
    }

    /// Samples with `start <= time <= end`
    pub fn range(&self, start: f64, end: f64) -> SampleRange {
        let data = self.data.read();
        let bounds = Self::bounds_inclusive(&data, start, end);
        SampleRange {
            samples: data.iter_range(bounds.clone()).copied().collect(),
            bounds,
        }
    }

    /// Arena indices of the samples with `start <= time <= end`
    pub fn range_bounds(&self, start: f64, end: f64) -> Range<usize> {
        let data = self.data.read();
        Self::bounds_inclusive(&data, start, end)
    }

    /// Sample at arena index `index`
    pub fn sample(&self, index: usize) -> Result<Sample> {
        self.data.read().at(index).copied()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<Sample> {
        self.data.read().back().copied()
    }

    /// Mean of the values with `start <= time <= end`
    ///
    /// NaN when the range holds no samples.
    pub fn mean(&self, start: f64, end: f64) -> f64 {
        let data = self.data.read();
        let bounds = Self::bounds_inclusive(&data, start, end);
        Self::mean_of(&data, bounds)
    }

    /// `count` consecutive bin means of width `step`, anchored at time zero
    ///
    /// Bin `i` covers `[i * step, (i + 1) * step)`; `start` does not shift
    /// the bins. Use [`mean_bins_anchored`](Self::mean_bins_anchored) with
    /// [`BinAnchor::Start`] for bins offset by `start`.
    pub fn mean_bins(&self, start: f64, step: f64, count: usize) -> Vec<f64> {
        self.mean_bins_anchored(start, step, count, BinAnchor::Zero)
    }

    /// `count` consecutive half-open bin means of width `step`
    pub fn mean_bins_anchored(
        &self,
        start: f64,
        step: f64,
        count: usize,
        anchor: BinAnchor,
    ) -> Vec<f64> {
        let origin = anchor.origin(start);
        let data = self.data.read();

        (0..count)
            .map(|i| {
                let lo = origin + i as f64 * step;
                let hi = origin + (i + 1) as f64 * step;
                let bounds = Self::bounds_half_open(&data, lo, hi);
                Self::mean_of(&data, bounds)
            })
            .collect()
    }

    /// Largest value with `start <= time <= end`
    ///
    /// # Errors
    /// [`StorageError::EmptySeries`] on an empty series,
    /// [`StorageError::EmptyRange`] if the range selects nothing
    pub fn max(&self, start: f64, end: f64) -> Result<f64> {
        self.extremum(start, end, f64::max)
    }

    /// Smallest value with `start <= time <= end`
    ///
    /// # Errors
    /// Same conditions as [`max`](Self::max)
    pub fn min(&self, start: f64, end: f64) -> Result<f64> {
        self.extremum(start, end, f64::min)
    }

    /// Reduce half-open bins `[first, first + bin_width)` into `out`
    ///
    /// Bins without samples are NaN. Returns the number of bins written.
    pub fn get_samples(
        &self,
        out: &mut [TsSample],
        timestamp_start: f64,
        bin_width: f64,
        num_bins: usize,
    ) -> usize {
        let data = self.data.read();
        let count = num_bins.min(out.len());

        for (i, slot) in out.iter_mut().take(count).enumerate() {
            let first = timestamp_start + bin_width * i as f64;
            let bounds = Self::bounds_half_open(&data, first, first + bin_width);
            *slot = data
                .iter_range(bounds)
                .map(|s| s.value)
                .collect::<Reduction>()
                .finish(first);
        }

        count
    }

    /// Reduce a single half-open bin
    pub fn get_sample(&self, timestamp: f64, bin_width: f64) -> TsSample {
        let mut out = [TsSample::empty(timestamp)];
        self.get_samples(&mut out, timestamp, bin_width, 1);
        out[0]
    }

    /// Approximate bytes held by the series
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.data.read().heap_usage()
    }

    /// Number of stored samples
    pub fn size(&self) -> usize {
        self.data.read().len()
    }

    /// Whether no sample has been pushed
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn reject(last: f64, time: f64) -> StorageError {
        tracing::warn!(last, time, "Rejected out-of-order sparse sample");
        StorageError::InvariantViolation { last, time }
    }

    fn extremum(&self, start: f64, end: f64, pick: fn(f64, f64) -> f64) -> Result<f64> {
        let data = self.data.read();
        if data.is_empty() {
            return Err(StorageError::EmptySeries);
        }
        let bounds = Self::bounds_inclusive(&data, start, end);
        data.iter_range(bounds)
            .map(|s| s.value)
            .reduce(pick)
            .ok_or(StorageError::EmptyRange { start, end })
    }

    fn span_of(data: &ChunkedArena<Sample>) -> Result<(f64, f64)> {
        match (data.front(), data.back()) {
            (Some(front), Some(back)) => Ok((front.time, back.time)),
            _ => Err(StorageError::EmptySeries),
        }
    }

    fn bounds_inclusive(data: &ChunkedArena<Sample>, start: f64, end: f64) -> Range<usize> {
        let lo = data.partition_point(|s| s.time < start);
        let hi = data.partition_point(|s| s.time <= end);
        lo..hi.max(lo)
    }

    fn bounds_half_open(data: &ChunkedArena<Sample>, start: f64, end: f64) -> Range<usize> {
        let lo = data.partition_point(|s| s.time < start);
        let hi = data.partition_point(|s| s.time < end);
        lo..hi.max(lo)
    }

    fn mean_of(data: &ChunkedArena<Sample>, bounds: Range<usize>) -> f64 {
        let count = bounds.len();
        let sum: f64 = data.iter_range(bounds).map(|s| s.value).sum();
        sum / count as f64
    }
}

impl Default for SparseSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeries for SparseSeries {
    fn query_span(&self) -> Result<(f64, f64)> {
        self.span()
    }

    fn get_samples(
        &self,
        out: &mut [TsSample],
        timestamp_start: f64,
        bin_width: f64,
        num_bins: usize,
    ) -> usize {
        SparseSeries::get_samples(self, out, timestamp_start, bin_width, num_bins)
    }

    fn get_sample(&self, timestamp: f64, bin_width: f64) -> TsSample {
        SparseSeries::get_sample(self, timestamp, bin_width)
    }

    fn memory_usage(&self) -> usize {
        SparseSeries::memory_usage(self)
    }

    fn size(&self) -> usize {
        SparseSeries::size(self)
    }
}
