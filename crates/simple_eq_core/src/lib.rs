//! SimpleEQ Core - Equalizer Engine
//!
//! This crate wraps the DSP chains into something a host can drive:
//! - A stereo engine with prepare/process/reset/release lifecycle
//! - Tear-free parameter publishing from control threads to the audio thread
//! - The automatable parameter layout and bus layout negotiation
//! - JSON state save/restore
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Control Thread(s)                      │
//! │   ParameterHandle::set_*() ──clamp──▶ publish snapshot      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ triple_buffer
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Audio Thread                         │
//! │  latest() ──changed?──▶ ChainCoefficients ──▶ L/R chains    │
//! │              (Zero allocation, no locks in this path)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod layout;
mod params;
mod state;

pub use config::{is_layout_supported, BusLayout, ChannelLayout, StreamConfig, MAX_CHANNELS};
pub use engine::StereoEngine;
pub use error::{EngineError, EngineResult};
pub use layout::{
    create_parameter_layout, NormalisableRange, ParameterId, ParameterKind, ParameterLayout,
    ParameterSpec, HIGH_CUT_FREQ, HIGH_CUT_SLOPE, LOW_CUT_FREQ, LOW_CUT_SLOPE, PEAK_FREQ,
    PEAK_GAIN, PEAK_QUALITY, SLOPE_CHOICES,
};
pub use params::{parameter_channel, ParameterHandle, ParameterSnapshot};
pub use state::SavedState;

// Re-export DSP types for convenience
pub use simple_eq_dsp::{
    AudioProcessor, ChainCoefficients, ChannelChain, CoefficientSet, FilterParameters,
    ProcessSpec, Slope,
};

/// Name reported to hosts
pub const PLUGIN_NAME: &str = "SimpleEQ";

/// Tail length reported to hosts
///
/// Zero, so hosts may stop calling `process_block()` as soon as input ends.
/// Whatever the filters are still ringing at that point is cut off.
pub const TAIL_LENGTH_SECONDS: f64 = 0.0;
