//! Fixed-interval series with implicit timestamps
//!
//! Sample `i` sits at `start + i * interval`; only values are stored.
//! Binned queries reduce each bin with a linear scan over the arena, which
//! costs O(samples per bin). Very wide zoom-outs over long spans would need
//! a multi-resolution summary to stay cheap; that is not built here.

use super::arena::ChunkedArena;
use super::{Reduction, TimeSeries, TsSample};
use crate::error::{Result, StorageError};
use parking_lot::RwLock;

/// Series storing one value per fixed time interval
///
/// Pushed by a single producer thread, queried concurrently by any number
/// of readers. Every operation takes the lock exactly once.
#[derive(Debug)]
pub struct DenseSeries {
    /// Timestamp of the first sample
    start: f64,
    /// Time between consecutive samples
    interval: f64,
    /// Sample values
    data: RwLock<ChunkedArena<f64>>,
}

impl DenseSeries {
    /// Create an empty series with the default chunk size
    ///
    /// # Arguments
    /// * `start` - Timestamp of the first sample
    /// * `interval` - Time between samples
    ///
    /// # Errors
    /// [`StorageError::InvalidInterval`] if `interval` is not a positive
    /// finite number
    ///
    /// # Example
    /// ```
    /// use sigscope_core::series::dense::DenseSeries;
    ///
    /// let series = DenseSeries::new(0.0, 1.0).unwrap();
    /// series.push_sample(1.0);
    /// series.push_sample(2.0);
    /// series.push_sample(3.0);
    /// let bin = series.get_sample(0.0, 3.0);
    /// assert_eq!(bin.average, 2.0);
    /// ```
    pub fn new(start: f64, interval: f64) -> Result<Self> {
        Self::with_chunk_size(start, interval, crate::DEFAULT_CHUNK_SIZE)
    }

    /// Create an empty series with an explicit arena chunk size
    pub fn with_chunk_size(start: f64, interval: f64, chunk_size: usize) -> Result<Self> {
        if !(interval.is_finite() && interval > 0.0) {
            tracing::warn!(interval, "Rejected dense series interval");
            return Err(StorageError::InvalidInterval(interval));
        }
        Ok(Self::build(start, interval, chunk_size))
    }

    /// Create a series sampled at `sample_rate` Hz
    ///
    /// A rate of zero is treated as 1 Hz.
    pub fn from_sample_rate(start: f64, sample_rate: u32, chunk_size: usize) -> Self {
        Self::build(start, 1.0 / sample_rate.max(1) as f64, chunk_size)
    }

    fn build(start: f64, interval: f64, chunk_size: usize) -> Self {
        Self {
            start,
            interval,
            data: RwLock::new(ChunkedArena::new(chunk_size)),
        }
    }

    /// Timestamp of the first sample
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Time between consecutive samples
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Append one value at the next implicit timestamp
    ///
    /// Returns the index of the new sample.
    pub fn push_sample(&self, value: f64) -> usize {
        self.data.write().push(value)
    }

    /// Append a block of values under a single lock acquisition
    pub fn push_samples(&self, values: &[f64]) {
        if values.is_empty() {
            return;
        }
        self.data.write().extend(values.iter().copied());
    }

    /// Covered interval `(start, start + len * interval)`
    ///
    /// An empty series returns `(start, start)`.
    pub fn get_span(&self) -> (f64, f64) {
        let len = self.data.read().len();
        self.span_for(len)
    }

    /// Value at sample index `index`
    pub fn value(&self, index: usize) -> Result<f64> {
        self.data.read().at(index).copied()
    }

    /// Most recently pushed value
    pub fn last_value(&self) -> Option<f64> {
        self.data.read().back().copied()
    }

    /// Reduce `num_bins` bins of `bin_width` starting at `timestamp_start`
    ///
    /// Bin `i` covers `[timestamp_start + i * bin_width, ... + bin_width)`.
    /// Bins outside the span are written as NaN. When a bin is narrower than
    /// one sample, it takes the value of the sample it falls in.
    ///
    /// # Returns
    /// Number of bins written, `num_bins` limited to `out.len()`
    pub fn get_samples(
        &self,
        out: &mut [TsSample],
        timestamp_start: f64,
        bin_width: f64,
        num_bins: usize,
    ) -> usize {
        let data = self.data.read();
        let (span_start, span_end) = self.span_for(data.len());
        let count = num_bins.min(out.len());

        for (i, slot) in out.iter_mut().take(count).enumerate() {
            let first = timestamp_start + bin_width * i as f64;
            let last = first + bin_width;
            *slot = self.reduce_bin(&data, span_start, span_end, first, last);
        }

        count
    }

    /// Like [`get_samples`](Self::get_samples), allocating the output
    pub fn samples(&self, timestamp_start: f64, bin_width: f64, num_bins: usize) -> Vec<TsSample> {
        let mut out = vec![TsSample::default(); num_bins];
        let written = self.get_samples(&mut out, timestamp_start, bin_width, num_bins);
        out.truncate(written);
        out
    }

    /// Reduce a single bin starting at `timestamp`
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

    fn span_for(&self, len: usize) -> (f64, f64) {
        (self.start, self.start + len as f64 * self.interval)
    }

    fn reduce_bin(
        &self,
        data: &ChunkedArena<f64>,
        span_start: f64,
        span_end: f64,
        first: f64,
        last: f64,
    ) -> TsSample {
        let len = data.len();
        if len == 0 || last <= span_start || first >= span_end {
            return TsSample::empty(first);
        }

        let lo = first.max(span_start);
        let hi = last.min(span_end);
        let i0 = (((lo - span_start) / self.interval).floor() as usize).min(len - 1);
        let i1 = if hi >= span_end {
            len
        } else {
            (((hi - span_start) / self.interval).floor() as usize).min(len)
        };

        if i1 <= i0 {
            let value = data[i0];
            return TsSample {
                timestamp: first,
                average: value,
                min: value,
                max: value,
            };
        }

        data.iter_range(i0..i1)
            .copied()
            .collect::<Reduction>()
            .finish(first)
    }
}

impl TimeSeries for DenseSeries {
    fn query_span(&self) -> Result<(f64, f64)> {
        Ok(self.get_span())
    }

    fn get_samples(
        &self,
        out: &mut [TsSample],
        timestamp_start: f64,
        bin_width: f64,
        num_bins: usize,
    ) -> usize {
        DenseSeries::get_samples(self, out, timestamp_start, bin_width, num_bins)
    }

    fn get_sample(&self, timestamp: f64, bin_width: f64) -> TsSample {
        DenseSeries::get_sample(self, timestamp, bin_width)
    }

    fn memory_usage(&self) -> usize {
        DenseSeries::memory_usage(self)
    }

    fn size(&self) -> usize {
        DenseSeries::size(self)
    }
}
