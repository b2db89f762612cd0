//! Signal producers
//!
//! Synthetic sources that feed dense series from their own threads:
//! - Periodic and noise waveform generation ([`generator`])
//! - Producer threads with join-based shutdown ([`producer`])

pub mod generator;
pub mod producer;
