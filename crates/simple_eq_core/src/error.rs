//! Engine Error Types

use thiserror::Error;

/// Errors that can occur in the equalizer engine
///
/// None of these are ever produced inside `process_block()`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported bus layout: {inputs} in / {outputs} out (mono or stereo, inputs == outputs)")]
    UnsupportedLayout { inputs: usize, outputs: usize },

    #[error("Engine not prepared - call prepare() before processing")]
    NotPrepared,

    #[error("Stream configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown parameter id: {0}")]
    UnknownParameter(String),

    #[error("DSP error: {0}")]
    DspError(#[from] simple_eq_dsp::DspError),

    #[error("State serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
