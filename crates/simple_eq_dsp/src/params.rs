//! Filter Parameters
//!
//! The plain value type that drives the whole filter chain. One instance is
//! an immutable snapshot: the audio thread never sees a half-written set.

use std::ops::RangeInclusive;

use crate::error::DspError;

/// Lowest corner/center frequency (Hz)
pub const MIN_FREQUENCY_HZ: f32 = 20.0;

/// Highest corner/center frequency (Hz)
pub const MAX_FREQUENCY_HZ: f32 = 20000.0;

/// Frequency range shared by all three filters
pub const FREQUENCY_RANGE: RangeInclusive<f32> = MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ;

/// Peak gain range in dB
pub const GAIN_DB_RANGE: RangeInclusive<f32> = -24.0..=24.0;

/// Peak quality (Q) range
pub const QUALITY_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Roll-off steepness of a cut filter
///
/// Each step adds one cascaded 2nd-order section (12 dB/octave).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    /// All slopes in host choice order
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Number of cascaded biquad sections (1-4)
    pub const fn order(self) -> usize {
        self.index() + 1
    }

    /// Index used by the host choice parameter (0-3)
    pub const fn index(self) -> usize {
        match self {
            Slope::Db12 => 0,
            Slope::Db24 => 1,
            Slope::Db36 => 2,
            Slope::Db48 => 3,
        }
    }

    /// Slope for a host choice index
    ///
    /// Out-of-range indices clamp to the steepest slope.
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Slope::Db12,
            1 => Slope::Db24,
            2 => Slope::Db36,
            _ => Slope::Db48,
        }
    }

    /// Attenuation per octave far from the corner
    pub const fn db_per_octave(self) -> u32 {
        12 * self.order() as u32
    }

    /// Display label, e.g. "24 dB/oct"
    pub const fn label(self) -> &'static str {
        match self {
            Slope::Db12 => "12 dB/oct",
            Slope::Db24 => "24 dB/oct",
            Slope::Db36 => "36 dB/oct",
            Slope::Db48 => "48 dB/oct",
        }
    }
}

/// Complete parameter set for one equalizer instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParameters {
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            low_cut_freq: 20.0,
            high_cut_freq: 20000.0,
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_quality: 1.0,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
        }
    }
}

impl FilterParameters {
    /// Return a copy with every field forced into its declared range
    ///
    /// Non-finite values fall back to the field's default.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            low_cut_freq: clamp_or(self.low_cut_freq, &FREQUENCY_RANGE, defaults.low_cut_freq),
            high_cut_freq: clamp_or(self.high_cut_freq, &FREQUENCY_RANGE, defaults.high_cut_freq),
            peak_freq: clamp_or(self.peak_freq, &FREQUENCY_RANGE, defaults.peak_freq),
            peak_gain_db: clamp_or(self.peak_gain_db, &GAIN_DB_RANGE, defaults.peak_gain_db),
            peak_quality: clamp_or(self.peak_quality, &QUALITY_RANGE, defaults.peak_quality),
            low_cut_slope: self.low_cut_slope,
            high_cut_slope: self.high_cut_slope,
        }
    }

    /// Check every field against its declared range
    pub fn validate(&self) -> Result<(), DspError> {
        let checks = [
            ("low_cut_freq", self.low_cut_freq, &FREQUENCY_RANGE),
            ("high_cut_freq", self.high_cut_freq, &FREQUENCY_RANGE),
            ("peak_freq", self.peak_freq, &FREQUENCY_RANGE),
            ("peak_gain_db", self.peak_gain_db, &GAIN_DB_RANGE),
            ("peak_quality", self.peak_quality, &QUALITY_RANGE),
        ];

        for (name, value, range) in checks {
            if !range.contains(&value) {
                return Err(DspError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Clamp into `range`, or use `fallback` for NaN/infinite input
#[inline]
pub(crate) fn clamp_or(value: f32, range: &RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}
