//! Parameter Layout
//!
//! The seven host-automatable parameters, their ranges and defaults.
//! Raw values are plain `f32`: Hz, dB and Q for the float parameters, the
//! option index for the slope choices.

use std::fmt;
use std::str::FromStr;

use simple_eq_dsp::{FilterParameters, Slope};

use crate::error::{EngineError, EngineResult};

pub const LOW_CUT_FREQ: &str = "LowCut Freq";
pub const HIGH_CUT_FREQ: &str = "HighCut Freq";
pub const PEAK_FREQ: &str = "Peak Freq";
pub const PEAK_GAIN: &str = "Peak gain";
pub const PEAK_QUALITY: &str = "Peak Quality";
pub const LOW_CUT_SLOPE: &str = "LowCut Slope";
pub const HIGH_CUT_SLOPE: &str = "HighCut Slope";

/// Option labels shared by both slope choices
pub const SLOPE_CHOICES: [&str; 4] = [
    Slope::Db12.label(),
    Slope::Db24.label(),
    Slope::Db36.label(),
    Slope::Db48.label(),
];

/// Continuous range with step snapping and skewed normalisation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalisableRange {
    pub start: f32,
    pub end: f32,
    /// Step size; 0 means continuous
    pub interval: f32,
    /// Skew factor; 1 is linear
    pub skew: f32,
}

impl NormalisableRange {
    pub const fn new(start: f32, end: f32, interval: f32, skew: f32) -> Self {
        Self {
            start,
            end,
            interval,
            skew,
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.start, self.end)
    }

    /// Clamp, then round to the nearest step from `start`
    pub fn snap(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        if self.interval <= 0.0 {
            return value;
        }
        // f64 keeps repeated snapping stable on the f32 grid
        let start = self.start as f64;
        let interval = self.interval as f64;
        let steps = ((value as f64 - start) / interval).round();
        self.clamp((start + steps * interval) as f32)
    }

    /// Map a raw value to 0..=1
    pub fn to_normalised(&self, value: f32) -> f32 {
        let proportion = (self.clamp(value) - self.start) / (self.end - self.start);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    /// Map 0..=1 back to a snapped raw value
    pub fn from_normalised(&self, normalised: f32) -> f32 {
        let mut proportion = normalised.clamp(0.0, 1.0);
        if self.skew != 1.0 && proportion > 0.0 {
            proportion = (proportion.ln() / self.skew).exp();
        }
        self.snap(self.start + (self.end - self.start) * proportion)
    }
}

/// Value domain of one parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Float {
        range: NormalisableRange,
        default: f32,
    },
    Choice {
        options: &'static [&'static str],
        default_index: usize,
    },
}

/// Typed identifier for the fixed parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterId {
    LowCutFreq,
    HighCutFreq,
    PeakFreq,
    PeakGain,
    PeakQuality,
    LowCutSlope,
    HighCutSlope,
}

impl ParameterId {
    pub const ALL: [ParameterId; 7] = [
        ParameterId::LowCutFreq,
        ParameterId::HighCutFreq,
        ParameterId::PeakFreq,
        ParameterId::PeakGain,
        ParameterId::PeakQuality,
        ParameterId::LowCutSlope,
        ParameterId::HighCutSlope,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ParameterId::LowCutFreq => LOW_CUT_FREQ,
            ParameterId::HighCutFreq => HIGH_CUT_FREQ,
            ParameterId::PeakFreq => PEAK_FREQ,
            ParameterId::PeakGain => PEAK_GAIN,
            ParameterId::PeakQuality => PEAK_QUALITY,
            ParameterId::LowCutSlope => LOW_CUT_SLOPE,
            ParameterId::HighCutSlope => HIGH_CUT_SLOPE,
        }
    }

    /// Raw value of this parameter within `params`
    pub fn read(self, params: &FilterParameters) -> f32 {
        match self {
            ParameterId::LowCutFreq => params.low_cut_freq,
            ParameterId::HighCutFreq => params.high_cut_freq,
            ParameterId::PeakFreq => params.peak_freq,
            ParameterId::PeakGain => params.peak_gain_db,
            ParameterId::PeakQuality => params.peak_quality,
            ParameterId::LowCutSlope => params.low_cut_slope.index() as f32,
            ParameterId::HighCutSlope => params.high_cut_slope.index() as f32,
        }
    }

    /// Store a raw value; callers sanitise through the layout first
    pub fn write(self, params: &mut FilterParameters, raw: f32) {
        match self {
            ParameterId::LowCutFreq => params.low_cut_freq = raw,
            ParameterId::HighCutFreq => params.high_cut_freq = raw,
            ParameterId::PeakFreq => params.peak_freq = raw,
            ParameterId::PeakGain => params.peak_gain_db = raw,
            ParameterId::PeakQuality => params.peak_quality = raw,
            ParameterId::LowCutSlope => params.low_cut_slope = slope_from_raw(raw),
            ParameterId::HighCutSlope => params.high_cut_slope = slope_from_raw(raw),
        }
    }
}

fn slope_from_raw(raw: f32) -> Slope {
    // Saturating cast: NaN and negatives land on index 0
    Slope::from_index(raw.round() as usize)
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterId {
    type Err = EngineError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        ParameterId::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == id)
            .ok_or_else(|| EngineError::UnknownParameter(id.to_string()))
    }
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub id: ParameterId,
    /// Display name; identical to the id string
    pub name: &'static str,
    pub kind: ParameterKind,
}

impl ParameterSpec {
    fn float(id: ParameterId, range: NormalisableRange, default: f32) -> Self {
        Self {
            id,
            name: id.as_str(),
            kind: ParameterKind::Float { range, default },
        }
    }

    fn choice(id: ParameterId, options: &'static [&'static str], default_index: usize) -> Self {
        Self {
            id,
            name: id.as_str(),
            kind: ParameterKind::Choice {
                options,
                default_index,
            },
        }
    }

    pub fn default_value(&self) -> f32 {
        match &self.kind {
            ParameterKind::Float { default, .. } => *default,
            ParameterKind::Choice { default_index, .. } => *default_index as f32,
        }
    }

    /// Force a raw value into this parameter's domain
    ///
    /// Floats are clamped and snapped to the step; choices are rounded to a
    /// valid index. NaN falls back to the default.
    pub fn sanitise(&self, raw: f32) -> f32 {
        if raw.is_nan() {
            return self.default_value();
        }
        match &self.kind {
            ParameterKind::Float { range, .. } => range.snap(raw),
            ParameterKind::Choice { options, .. } => {
                let last = options.len().saturating_sub(1) as f32;
                raw.round().clamp(0.0, last)
            }
        }
    }

    pub fn to_normalised(&self, raw: f32) -> f32 {
        match &self.kind {
            ParameterKind::Float { range, .. } => range.to_normalised(raw),
            ParameterKind::Choice { options, .. } => {
                let last = options.len().saturating_sub(1).max(1) as f32;
                self.sanitise(raw) / last
            }
        }
    }

    pub fn from_normalised(&self, normalised: f32) -> f32 {
        match &self.kind {
            ParameterKind::Float { range, .. } => range.from_normalised(normalised),
            ParameterKind::Choice { options, .. } => {
                let last = options.len().saturating_sub(1) as f32;
                self.sanitise(normalised.clamp(0.0, 1.0) * last)
            }
        }
    }
}

/// The complete, ordered parameter set
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterLayout {
    parameters: Vec<ParameterSpec>,
}

impl ParameterLayout {
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == id)
    }

    pub fn get(&self, id: ParameterId) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Look up `id` and sanitise `raw` against it
    pub fn sanitise(&self, id: &str, raw: f32) -> EngineResult<(ParameterId, f32)> {
        let spec = self
            .find(id)
            .ok_or_else(|| EngineError::UnknownParameter(id.to_string()))?;
        Ok((spec.id, spec.sanitise(raw)))
    }

    /// Parameters built from every declared default
    pub fn defaults(&self) -> FilterParameters {
        let mut params = FilterParameters::default();
        for spec in &self.parameters {
            spec.id.write(&mut params, spec.default_value());
        }
        params
    }
}

/// Build the layout the host exposes for automation
pub fn create_parameter_layout() -> ParameterLayout {
    let frequency = NormalisableRange::new(20.0, 20000.0, 1.0, 1.0);

    ParameterLayout {
        parameters: vec![
            ParameterSpec::float(ParameterId::LowCutFreq, frequency, 20.0),
            ParameterSpec::float(ParameterId::HighCutFreq, frequency, 20000.0),
            ParameterSpec::float(ParameterId::PeakFreq, frequency, 750.0),
            ParameterSpec::float(
                ParameterId::PeakGain,
                NormalisableRange::new(-24.0, 24.0, 0.5, 1.0),
                0.0,
            ),
            ParameterSpec::float(
                ParameterId::PeakQuality,
                NormalisableRange::new(0.1, 10.0, 0.05, 1.0),
                1.0,
            ),
            ParameterSpec::choice(ParameterId::LowCutSlope, &SLOPE_CHOICES, 0),
            ParameterSpec::choice(ParameterId::HighCutSlope, &SLOPE_CHOICES, 0),
        ],
    }
}
