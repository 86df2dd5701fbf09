//! SimpleEQ DSP - Digital Signal Processing Module
//!
//! This crate provides the per-channel filter path for SimpleEQ:
//! - Low cut and high cut with selectable 12/24/36/48 dB/oct slopes
//! - A peak (bell) filter with gain and Q
//! - RBJ cookbook coefficient design with a never-failing real-time variant
//! - Zero-allocation processing path
//!
//! # Architecture
//!
//! ```text
//! FilterParameters ──▶ ChainCoefficients::compute() ──▶ ChannelChain::apply()
//!
//! ChannelChain:  CutFilterChain (4 slots) ─▶ BiquadStage ─▶ CutFilterChain (4 slots)
//!                      low cut                  peak             high cut
//! ```
//!
//! Cut slopes are realized by bypassing unused slots, so changing the slope
//! never reallocates. Coefficients are swapped between blocks, never while
//! a block is being filtered.

mod chain;
mod coefficients;
mod cut_filter;
mod error;
mod params;
mod processor;
mod stage;

pub use chain::ChannelChain;
pub use coefficients::{
    coefficients, high_cut_coefficients, low_cut_coefficients, peak_coefficients,
    try_coefficients, ChainCoefficients, CoefficientSet, FilterKind, MAX_NORMALIZED_FREQUENCY,
};
pub use cut_filter::{CutFilterChain, MAX_CUT_STAGES};
pub use error::DspError;
pub use params::{
    FilterParameters, Slope, FREQUENCY_RANGE, GAIN_DB_RANGE, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ,
    QUALITY_RANGE,
};
pub use processor::{AudioProcessor, ProcessSpec};
pub use stage::{BiquadStage, DENORMAL_THRESHOLD};
