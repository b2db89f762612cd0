//! Producer threads feeding dense series
//!
//! Each producer owns one generator and is the only writer of its series.
//! It pushes fixed-size blocks, paced to the generator's sample rate so a
//! series grows in step with wall-clock time. Stopping sets a flag and joins
//! the thread, so no push is in flight once [`ProducerHandle::stop`] returns;
//! the series stays queryable afterwards.

use super::generator::SignalGenerator;
use crate::series::dense::DenseSeries;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Samples pushed per block by default (~5ms at 48kHz)
const DEFAULT_BLOCK_SIZE: usize = 256;

/// Handle returned by [`SignalProducer::start`] to stop the producer
pub struct ProducerHandle {
    name: String,
    stop_flag: Arc<AtomicBool>,
    /// Total samples pushed, updated by the producer thread
    samples_pushed: Arc<AtomicU64>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ProducerHandle {
    /// Stop the producer thread and wait for it to finish
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
        if let Some(h) = self.thread.take() {
            if h.join().is_err() {
                tracing::error!(name = %self.name, "Producer thread panicked");
            }
        }
    }

    /// Check if the producer thread is still running
    pub fn is_alive(&self) -> bool {
        self.thread
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Total samples pushed so far
    pub fn samples_pushed(&self) -> u64 {
        self.samples_pushed.load(Ordering::Relaxed)
    }

    /// Name the producer was started with
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Generator bound to the dense series it feeds
pub struct SignalProducer {
    generator: SignalGenerator,
    series: Arc<DenseSeries>,
    block_size: usize,
    paced: bool,
    limit: Option<u64>,
}

impl SignalProducer {
    /// Create a real-time producer pushing into `series`
    pub fn new(generator: SignalGenerator, series: Arc<DenseSeries>) -> Self {
        Self {
            generator,
            series,
            block_size: DEFAULT_BLOCK_SIZE,
            paced: true,
            limit: None,
        }
    }

    /// Samples pushed per lock acquisition
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Push as fast as possible instead of at the sample rate
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    /// Stop on its own after pushing `limit` samples
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Spawn the producer thread. Returns a handle to stop it.
    pub fn start(self, name: impl Into<String>) -> anyhow::Result<ProducerHandle> {
        let name = name.into();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let samples_pushed = Arc::new(AtomicU64::new(0));

        let thread_stop = Arc::clone(&stop_flag);
        let thread_pushed = Arc::clone(&samples_pushed);
        let thread_name = name.clone();

        let thread = std::thread::Builder::new()
            .name(format!("producer-{}", name))
            .spawn(move || self.run(&thread_name, &thread_stop, &thread_pushed))?;

        tracing::info!(name = %name, "Producer started");

        Ok(ProducerHandle {
            name,
            stop_flag,
            samples_pushed,
            thread: Some(thread),
        })
    }

    fn run(mut self, name: &str, stop: &AtomicBool, pushed_counter: &AtomicU64) {
        let rate = self.generator.sample_rate() as f64;
        let block_period = Duration::from_secs_f64(self.block_size as f64 / rate);
        let started = Instant::now();
        let mut block = vec![0.0f64; self.block_size];
        let mut pushed: u64 = 0;

        while !stop.load(Ordering::Acquire) {
            let remaining = match self.limit {
                Some(limit) if pushed >= limit => break,
                Some(limit) => limit - pushed,
                None => u64::MAX,
            };

            if self.paced {
                let due = (started.elapsed().as_secs_f64() * rate) as u64;
                if pushed + self.block_size as u64 > due {
                    std::thread::sleep(block_period);
                    continue;
                }
            }

            let n = (self.block_size as u64).min(remaining) as usize;
            self.generator.fill_buffer(&mut block[..n]);
            self.series.push_samples(&block[..n]);
            pushed += n as u64;
            pushed_counter.store(pushed, Ordering::Relaxed);
        }

        tracing::info!(name, samples = pushed, "Producer stopped");
    }
}
