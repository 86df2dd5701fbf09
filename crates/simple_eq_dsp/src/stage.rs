//! Biquad Stage
//!
//! One second-order section with its own delay registers and a bypass flag.

use biquad::{Biquad, DirectForm2Transposed};

use crate::coefficients::CoefficientSet;

/// Register and output magnitudes below this are flushed to zero
///
/// About -400 dBFS, far above the f32 subnormal range, so a decaying tail
/// reaches exact zero instead of crawling through subnormals.
pub const DENORMAL_THRESHOLD: f32 = 1e-20;

#[inline]
fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        x
    }
}

/// A single bypassable biquad section
///
/// Filtering uses transposed direct form II:
///
/// ```text
/// y   = b0*x + z1
/// z1' = b1*x + z2 - a1*y
/// z2' = b2*x - a2*y
/// ```
#[derive(Debug, Clone)]
pub struct BiquadStage {
    // DirectForm2Transposed: two registers, better numerical behaviour than DF1
    filter: DirectForm2Transposed<f32>,
    coefficients: CoefficientSet,
    bypassed: bool,
}

impl BiquadStage {
    pub fn new(coefficients: CoefficientSet) -> Self {
        Self {
            filter: DirectForm2Transposed::<f32>::new(coefficients.into()),
            coefficients,
            bypassed: false,
        }
    }

    /// Active stage with pass-through coefficients
    pub fn identity() -> Self {
        Self::new(CoefficientSet::IDENTITY)
    }

    /// Replace the coefficients, keeping the delay registers
    ///
    /// A few samples of transient are accepted when the state is non-zero.
    #[inline]
    pub fn set_coefficients(&mut self, coefficients: CoefficientSet) {
        self.filter.update_coefficients(coefficients.into());
        self.coefficients = coefficients;
    }

    pub fn coefficients(&self) -> CoefficientSet {
        self.coefficients
    }

    /// Bypassed stages return their input and leave the registers alone,
    /// so re-enabling one resumes where it stopped.
    #[inline]
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Filter one sample
    ///
    /// # Real-time Safety
    /// O(1), no allocations, only branches on the bypass flag.
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        if self.bypassed {
            return x;
        }
        self.run(x)
    }

    #[inline]
    fn run(&mut self, x: f32) -> f32 {
        let y = self.filter.run(x);
        self.filter.s1 = flush_denormal(self.filter.s1);
        self.filter.s2 = flush_denormal(self.filter.s2);
        flush_denormal(y)
    }

    /// Filter a mono buffer in-place
    #[inline]
    pub fn process_block(&mut self, samples: &mut [f32]) {
        if self.bypassed {
            return;
        }
        for sample in samples.iter_mut() {
            *sample = self.run(*sample);
        }
    }

    /// Zero the delay registers
    pub fn reset(&mut self) {
        self.filter.reset_state();
    }

    /// Frequency response magnitude, `1.0` when bypassed
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f64 {
        if self.bypassed {
            1.0
        } else {
            self.coefficients.magnitude_at(frequency, sample_rate)
        }
    }
}

impl Default for BiquadStage {
    fn default() -> Self {
        Self::identity()
    }
}
