//! Synthetic waveform generation
//!
//! Produces sine, sawtooth, square and white-noise signals one sample at a
//! time, for feeding dense series in demos and tests.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Default amplitude (-6dB for headroom)
const DEFAULT_AMPLITUDE: f64 = 0.5;

/// Shape of a generated signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    /// Rising ramp from -1.0 to 1.0 each period
    Saw,
    Square,
    /// White noise; frequency is ignored
    Noise,
}

/// Waveform generator
///
/// # Example
/// ```
/// use sigscope_core::signal::generator::{SignalGenerator, Waveform};
///
/// let mut gen = SignalGenerator::new(Waveform::Sine, 440.0, 48000);
/// let sample = gen.next_sample();
/// assert!(sample.abs() <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    waveform: Waveform,
    /// Frequency in Hz
    frequency: f64,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Position within the current period (0.0..1.0)
    phase: f64,
    /// Amplitude scaling factor
    amplitude: f64,
    /// PRNG state for noise generation
    noise_seed: u32,
}

impl SignalGenerator {
    /// Create a new generator
    ///
    /// # Arguments
    /// * `waveform` - Signal shape
    /// * `frequency` - Frequency in Hz
    /// * `sample_rate` - Sample rate in Hz (e.g., 48000)
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: u32) -> Self {
        Self {
            waveform,
            frequency,
            sample_rate: sample_rate.max(1),
            phase: 0.0,
            amplitude: DEFAULT_AMPLITUDE,
            noise_seed: 0xDEADBEEF,
        }
    }

    /// Get the next sample
    pub fn next_sample(&mut self) -> f64 {
        let raw = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Noise => self.generate_noise(),
        };

        self.phase = (self.phase + self.frequency / self.sample_rate as f64).fract();
        raw * self.amplitude
    }

    /// Fill a buffer with sequential samples
    pub fn fill_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Linear congruential noise in -1.0..1.0 (glibc parameters)
    fn generate_noise(&mut self) -> f64 {
        self.noise_seed = self
            .noise_seed
            .wrapping_mul(1103515245)
            .wrapping_add(12345);
        let bits = (self.noise_seed >> 16) & 0x7FFF;
        (bits as f64 / 16384.0) - 1.0
    }

    /// Restart from phase zero
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Set the amplitude, clamped to 0.0..=1.0
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude.clamp(0.0, 1.0);
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current position within the period (0.0..1.0)
    pub fn phase(&self) -> f64 {
        self.phase
    }
}
