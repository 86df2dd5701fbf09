//! Stream Configuration and Bus Layouts

use serde::{Deserialize, Serialize};
use simple_eq_dsp::ProcessSpec;

use crate::error::{EngineError, EngineResult};

/// Highest channel count the engine serves (stereo)
pub const MAX_CHANNELS: usize = 2;

/// Audio stream configuration supplied by the host at prepare time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: f32,

    /// Largest block the host will pass to `process_block()`
    pub max_block_size: usize,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_size: 512,
            channels: 2,
        }
    }
}

impl StreamConfig {
    pub fn new(sample_rate: f32, max_block_size: usize, channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channels,
        }
    }

    /// Latency of one full block in milliseconds
    pub fn latency_ms(&self) -> f32 {
        (self.max_block_size as f32 / self.sample_rate) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> EngineResult<()> {
        if !(8000.0..=192000.0).contains(&self.sample_rate) {
            return Err(EngineError::ConfigError(format!(
                "Invalid sample rate: {}",
                self.sample_rate
            )));
        }
        if self.max_block_size == 0 || self.max_block_size > 8192 {
            return Err(EngineError::ConfigError(format!(
                "Invalid block size: {}",
                self.max_block_size
            )));
        }
        ChannelLayout::from_channels(self.channels)?;
        Ok(())
    }

    pub fn to_process_spec(&self) -> ProcessSpec {
        ProcessSpec::new(self.sample_rate, self.max_block_size, self.channels)
    }
}

impl From<&ProcessSpec> for StreamConfig {
    fn from(spec: &ProcessSpec) -> Self {
        Self::new(spec.sample_rate, spec.max_block_size, spec.num_channels)
    }
}

/// Channel sets the equalizer can run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    fn from_channels(channels: usize) -> EngineResult<Self> {
        match channels {
            1 => Ok(ChannelLayout::Mono),
            2 => Ok(ChannelLayout::Stereo),
            _ => Err(EngineError::UnsupportedLayout {
                inputs: channels,
                outputs: channels,
            }),
        }
    }

    /// Negotiate a main bus layout with the host
    ///
    /// Mono or stereo only, and the input must match the output.
    pub fn negotiate(inputs: usize, outputs: usize) -> EngineResult<Self> {
        if inputs != outputs {
            return Err(EngineError::UnsupportedLayout { inputs, outputs });
        }
        Self::from_channels(outputs)
    }
}

/// Host-proposed main bus channel counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusLayout {
    pub inputs: usize,
    pub outputs: usize,
}

impl BusLayout {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self { inputs, outputs }
    }
}

/// Whether the engine can service `layout`
pub fn is_layout_supported(layout: BusLayout) -> bool {
    ChannelLayout::negotiate(layout.inputs, layout.outputs).is_ok()
}
