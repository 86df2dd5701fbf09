//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
///
/// These only surface from the checked control-side APIs. The real-time
/// path clamps instead of failing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),
}
