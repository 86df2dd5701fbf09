//! Cut Filter Chain
//!
//! Low-cut and high-cut filters with selectable steepness. All four
//! sections always exist; the selected slope decides how many of them run.
//! Changing the slope flips bypass flags and never allocates.

use crate::coefficients::CoefficientSet;
use crate::params::Slope;
use crate::stage::BiquadStage;

/// Number of section slots (48 dB/oct maximum)
pub const MAX_CUT_STAGES: usize = 4;

/// Fixed cascade of up to four biquad sections
#[derive(Debug, Clone)]
pub struct CutFilterChain {
    stages: [BiquadStage; MAX_CUT_STAGES],
    slope: Slope,
}

impl CutFilterChain {
    /// Chain at 12 dB/oct with pass-through coefficients
    pub fn new() -> Self {
        let mut chain = Self {
            stages: core::array::from_fn(|_| BiquadStage::identity()),
            slope: Slope::Db12,
        };
        chain.configure(Slope::Db12, |_| CoefficientSet::IDENTITY);
        chain
    }

    /// Activate slots `[0, order)` with the section returned for each slot
    /// and bypass the rest
    ///
    /// Bypassed slots keep their delay registers and their previous
    /// coefficients.
    #[inline]
    pub fn configure<F>(&mut self, slope: Slope, stage_coefficients: F)
    where
        F: Fn(usize) -> CoefficientSet,
    {
        let order = slope.order();
        for (i, stage) in self.stages.iter_mut().enumerate() {
            if i < order {
                stage.set_coefficients(stage_coefficients(i));
                stage.set_bypassed(false);
            } else {
                stage.set_bypassed(true);
            }
        }
        self.slope = slope;
    }

    pub fn slope(&self) -> Slope {
        self.slope
    }

    /// Number of sections currently filtering
    pub fn active_stages(&self) -> usize {
        self.stages.iter().filter(|stage| !stage.is_bypassed()).count()
    }

    pub fn stage(&self, index: usize) -> Option<&BiquadStage> {
        self.stages.get(index)
    }

    /// Run one sample through every active section in slot order
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        self.stages
            .iter_mut()
            .fold(x, |acc, stage| stage.process_sample(acc))
    }

    /// Process a mono buffer in-place
    ///
    /// Section by section; identical to calling `process_sample` per sample.
    #[inline]
    pub fn process_block(&mut self, samples: &mut [f32]) {
        for stage in self.stages.iter_mut() {
            stage.process_block(samples);
        }
    }

    /// Zero every slot's registers, bypassed ones included
    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }

    /// Combined magnitude of the active sections
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f64 {
        self.stages
            .iter()
            .map(|stage| stage.magnitude_at(frequency, sample_rate))
            .product()
    }
}

impl Default for CutFilterChain {
    fn default() -> Self {
        Self::new()
    }
}
