//! Channel Chain
//!
//! The complete mono signal path: low cut -> peak -> high cut.
//! One chain per audio channel; chains never share filter state.

use crate::coefficients::ChainCoefficients;
use crate::cut_filter::CutFilterChain;
use crate::processor::ProcessSpec;
use crate::stage::BiquadStage;

#[derive(Debug, Clone, Default)]
pub struct ChannelChain {
    low_cut: CutFilterChain,
    peak: BiquadStage,
    high_cut: CutFilterChain,
}

impl ChannelChain {
    /// Pass-through chain; call `apply()` to load real coefficients
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a new stream
    ///
    /// Clears every delay register so state from a previous stream or
    /// sample rate cannot leak into this one.
    pub fn prepare(&mut self, _spec: &ProcessSpec) {
        self.reset();
    }

    /// Zero all delay registers without touching coefficients
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }

    /// Load a coefficient snapshot into all three sections
    ///
    /// Every active cut slot receives the same 2nd-order section.
    #[inline]
    pub fn apply(&mut self, coefficients: &ChainCoefficients) {
        self.low_cut
            .configure(coefficients.low_cut_slope, |_| coefficients.low_cut);
        self.peak.set_coefficients(coefficients.peak);
        self.high_cut
            .configure(coefficients.high_cut_slope, |_| coefficients.high_cut);
    }

    /// Filter one sample through low cut, peak and high cut in that order
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls, O(1) time.
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let y = self.low_cut.process_sample(x);
        let y = self.peak.process_sample(y);
        self.high_cut.process_sample(y)
    }

    /// Filter a mono buffer in-place
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = buffer length.
    #[inline]
    pub fn process_block(&mut self, samples: &mut [f32]) {
        self.low_cut.process_block(samples);
        self.peak.process_block(samples);
        self.high_cut.process_block(samples);
    }

    /// Magnitude response of the whole chain
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f64 {
        self.low_cut.magnitude_at(frequency, sample_rate)
            * self.peak.magnitude_at(frequency, sample_rate)
            * self.high_cut.magnitude_at(frequency, sample_rate)
    }

    pub fn low_cut(&self) -> &CutFilterChain {
        &self.low_cut
    }

    pub fn peak(&self) -> &BiquadStage {
        &self.peak
    }

    pub fn high_cut(&self) -> &CutFilterChain {
        &self.high_cut
    }
}
