//! Coefficient Calculator
//!
//! Maps filter parameters and a sample rate to normalized biquad
//! coefficients. Designs follow the RBJ (Robert Bristow-Johnson) Audio EQ
//! Cookbook as implemented by the `biquad` crate.
//!
//! Two flavours are provided:
//! - `try_coefficients()` validates and reports [`DspError`]; use it on the
//!   control side.
//! - `low_cut_coefficients()`, `peak_coefficients()`, `high_cut_coefficients()`
//!   and `ChainCoefficients::compute()` never fail. Out-of-range input is
//!   clamped and anything the design still rejects becomes a pass-through.

use biquad::{Coefficients, Hertz, Type, Q_BUTTERWORTH_F32};

use crate::error::DspError;
use crate::params::{
    clamp_or, FilterParameters, Slope, FREQUENCY_RANGE, GAIN_DB_RANGE, MIN_FREQUENCY_HZ,
    QUALITY_RANGE,
};

/// Highest usable corner frequency as a fraction of the sample rate
///
/// Designs at exactly Nyquist put a pole on the unit circle.
pub const MAX_NORMALIZED_FREQUENCY: f32 = 0.49;

/// The three filter kinds in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    LowCut,
    Peak,
    HighCut,
}

impl FilterKind {
    /// The parameter field that sets this filter's frequency
    pub fn frequency(self, params: &FilterParameters) -> f32 {
        match self {
            FilterKind::LowCut => params.low_cut_freq,
            FilterKind::Peak => params.peak_freq,
            FilterKind::HighCut => params.high_cut_freq,
        }
    }

    fn parameter_name(self) -> &'static str {
        match self {
            FilterKind::LowCut => "low_cut_freq",
            FilterKind::Peak => "peak_freq",
            FilterKind::HighCut => "high_cut_freq",
        }
    }
}

/// Normalized biquad coefficients (`a0 == 1`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl CoefficientSet {
    /// Pass-through section: `y = x`
    pub const IDENTITY: CoefficientSet = CoefficientSet {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Magnitude of the frequency response at `frequency` Hz
    ///
    /// Evaluated in f64 so very deep attenuation stays measurable.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f64 {
        let w = std::f64::consts::TAU * frequency as f64 / sample_rate as f64;
        let (sin1, cos1) = w.sin_cos();
        let (sin2, cos2) = (2.0 * w).sin_cos();

        let (b0, b1, b2) = (self.b0 as f64, self.b1 as f64, self.b2 as f64);
        let (a1, a2) = (self.a1 as f64, self.a2 as f64);

        let num_re = b0 + b1 * cos1 + b2 * cos2;
        let num_im = -(b1 * sin1 + b2 * sin2);
        let den_re = 1.0 + a1 * cos1 + a2 * cos2;
        let den_im = -(a1 * sin1 + a2 * sin2);

        (num_re.hypot(num_im)) / (den_re.hypot(den_im))
    }

    /// Largest pole magnitude of `1 + a1 z^-1 + a2 z^-2`
    pub fn pole_radius(&self) -> f64 {
        let (a1, a2) = (self.a1 as f64, self.a2 as f64);
        let disc = a1 * a1 - 4.0 * a2;
        if disc < 0.0 {
            // Complex pair: |p|^2 == a2
            a2.sqrt()
        } else {
            let root = disc.sqrt();
            ((-a1 + root) * 0.5).abs().max(((-a1 - root) * 0.5).abs())
        }
    }

    /// Both poles strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.pole_radius() < 1.0
    }
}

impl From<Coefficients<f32>> for CoefficientSet {
    fn from(c: Coefficients<f32>) -> Self {
        Self {
            b0: c.b0,
            b1: c.b1,
            b2: c.b2,
            a1: c.a1,
            a2: c.a2,
        }
    }
}

impl From<CoefficientSet> for Coefficients<f32> {
    fn from(c: CoefficientSet) -> Self {
        Coefficients {
            a1: c.a1,
            a2: c.a2,
            b0: c.b0,
            b1: c.b1,
            b2: c.b2,
        }
    }
}

/// Run the `biquad` design, mapping its errors to ours
fn design(
    filter: Type<f32>,
    sample_rate: f32,
    frequency: f32,
    q: f32,
    name: &'static str,
) -> Result<CoefficientSet, DspError> {
    let fs = Hertz::<f32>::from_hz(sample_rate)
        .map_err(|_| DspError::InvalidSampleRate(sample_rate))?;
    let f0 = Hertz::<f32>::from_hz(frequency).map_err(|_| DspError::InvalidParameter {
        name,
        value: frequency,
    })?;

    Coefficients::<f32>::from_params(filter, fs, f0, q)
        .map(CoefficientSet::from)
        .map_err(|_| DspError::InvalidParameter {
            name,
            value: frequency,
        })
}

/// Compute coefficients without clamping
///
/// Fails if the sample rate is not positive, if the filter's frequency is
/// not inside `(0, sample_rate / 2)`, or if the peak Q is not positive.
pub fn try_coefficients(
    kind: FilterKind,
    sample_rate: f32,
    params: &FilterParameters,
) -> Result<CoefficientSet, DspError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(DspError::InvalidSampleRate(sample_rate));
    }

    let frequency = kind.frequency(params);
    if !(frequency > 0.0 && frequency < sample_rate / 2.0) {
        return Err(DspError::InvalidParameter {
            name: kind.parameter_name(),
            value: frequency,
        });
    }

    match kind {
        FilterKind::LowCut => design(
            Type::HighPass,
            sample_rate,
            frequency,
            Q_BUTTERWORTH_F32,
            kind.parameter_name(),
        ),
        FilterKind::HighCut => design(
            Type::LowPass,
            sample_rate,
            frequency,
            Q_BUTTERWORTH_F32,
            kind.parameter_name(),
        ),
        FilterKind::Peak => {
            if !(params.peak_quality > 0.0) {
                return Err(DspError::InvalidParameter {
                    name: "peak_quality",
                    value: params.peak_quality,
                });
            }
            design(
                Type::PeakingEQ(params.peak_gain_db),
                sample_rate,
                frequency,
                params.peak_quality,
                kind.parameter_name(),
            )
        }
    }
}

/// Clamp a frequency into the range the design can serve at `sample_rate`
#[inline]
fn usable_frequency(frequency: f32, fallback: f32, sample_rate: f32) -> f32 {
    let upper = (sample_rate * MAX_NORMALIZED_FREQUENCY)
        .min(*FREQUENCY_RANGE.end())
        .max(MIN_FREQUENCY_HZ);
    clamp_or(frequency, &FREQUENCY_RANGE, fallback).min(upper)
}

/// Coefficients for one filter kind, never failing
pub fn coefficients(
    kind: FilterKind,
    sample_rate: f32,
    params: &FilterParameters,
) -> CoefficientSet {
    let defaults = FilterParameters::default();
    let frequency = usable_frequency(
        kind.frequency(params),
        kind.frequency(&defaults),
        sample_rate,
    );

    let name = kind.parameter_name();

    let designed = match kind {
        FilterKind::LowCut => {
            design(Type::HighPass, sample_rate, frequency, Q_BUTTERWORTH_F32, name)
        }
        FilterKind::HighCut => {
            design(Type::LowPass, sample_rate, frequency, Q_BUTTERWORTH_F32, name)
        }
        FilterKind::Peak => {
            let gain_db = clamp_or(params.peak_gain_db, &GAIN_DB_RANGE, defaults.peak_gain_db);
            let quality = clamp_or(params.peak_quality, &QUALITY_RANGE, defaults.peak_quality);
            design(Type::PeakingEQ(gain_db), sample_rate, frequency, quality, name)
        }
    };

    designed.unwrap_or(CoefficientSet::IDENTITY)
}

/// 2nd-order Butterworth highpass section for the low-cut cascade
pub fn low_cut_coefficients(sample_rate: f32, params: &FilterParameters) -> CoefficientSet {
    coefficients(FilterKind::LowCut, sample_rate, params)
}

/// Bell filter around `peak_freq`
pub fn peak_coefficients(sample_rate: f32, params: &FilterParameters) -> CoefficientSet {
    coefficients(FilterKind::Peak, sample_rate, params)
}

/// 2nd-order Butterworth lowpass section for the high-cut cascade
pub fn high_cut_coefficients(sample_rate: f32, params: &FilterParameters) -> CoefficientSet {
    coefficients(FilterKind::HighCut, sample_rate, params)
}

/// Everything a channel chain needs for one parameter snapshot
///
/// Computed once per change and applied to every channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainCoefficients {
    pub low_cut: CoefficientSet,
    pub low_cut_slope: Slope,
    pub peak: CoefficientSet,
    pub high_cut: CoefficientSet,
    pub high_cut_slope: Slope,
}

impl ChainCoefficients {
    pub fn compute(sample_rate: f32, params: &FilterParameters) -> Self {
        Self {
            low_cut: low_cut_coefficients(sample_rate, params),
            low_cut_slope: params.low_cut_slope,
            peak: peak_coefficients(sample_rate, params),
            high_cut: high_cut_coefficients(sample_rate, params),
            high_cut_slope: params.high_cut_slope,
        }
    }
}

impl Default for ChainCoefficients {
    fn default() -> Self {
        Self {
            low_cut: CoefficientSet::IDENTITY,
            low_cut_slope: Slope::Db12,
            peak: CoefficientSet::IDENTITY,
            high_cut: CoefficientSet::IDENTITY,
            high_cut_slope: Slope::Db12,
        }
    }
}
