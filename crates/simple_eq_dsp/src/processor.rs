//! Audio Processor Trait
//!
//! The narrow interface a host shell drives: prepare, process blocks,
//! reset, release.

/// Stream metadata handed to `prepare()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f32,
    pub max_block_size: usize,
    pub num_channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f32, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }
}

/// Trait for block-based audio processors
///
/// # Real-time Safety Contract
///
/// Implementors MUST follow these rules in `process()`:
/// - NO heap allocations (no Vec::push, no Box::new, no String)
/// - NO syscalls (no file I/O, no logging, no mutex locks)
/// - NO panics and no error returns; faults degrade to pass-through
/// - O(n) time complexity where n = samples in the block
///
/// `prepare()`, `reset()` and `release()` run while the audio thread is
/// quiescent and may allocate.
pub trait AudioProcessor: Send {
    /// Reported when a stream configuration cannot be served
    type Error: std::error::Error;

    /// Allocate and clear per-channel state for a new stream
    ///
    /// On error the processor stays unprepared and `process()` passes audio
    /// through.
    fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), Self::Error>;

    /// Process planar audio in-place: `buffer[channel][sample]`
    fn process(&mut self, buffer: &mut [&mut [f32]]);

    /// Clear internal state (delay lines) without deallocating
    fn reset(&mut self);

    /// Drop per-channel state. Idempotent.
    fn release(&mut self);

    /// Human-readable name for debugging/UI
    fn name(&self) -> &'static str;
}
