//! Intensity range bounds

use serde::{Deserialize, Serialize};

/// Default upper bound, also the sanity cap applied to auto-ranged values
pub const INTENSITY_CAP: f32 = 4096.0;

/// (min, max) pair used to normalize intensity-like channels.
///
/// `min <= max` holds after every mutation: whichever bound is set second
/// is clamped against the other. Deserialized bounds go through
/// [`RangeBounds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBounds")]
pub struct RangeBounds {
    min: f32,
    max: f32,
}

#[derive(Deserialize)]
struct RawBounds {
    min: f32,
    max: f32,
}

impl From<RawBounds> for RangeBounds {
    fn from(raw: RawBounds) -> Self {
        Self::new(raw.min, raw.max)
    }
}

impl RangeBounds {
    /// Create bounds, clamping `max` up to `min` if they are inverted
    pub fn new(min: f32, max: f32) -> Self {
        let mut bounds = Self { min, max: min };
        bounds.set_max(max);
        bounds
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Set the lower bound; a value above the current max is pulled down to it
    pub fn set_min(&mut self, value: f32) {
        self.min = value.min(self.max);
    }

    /// Set the upper bound; a value below the current min is pulled up to it
    pub fn set_max(&mut self, value: f32) {
        self.max = value.max(self.min);
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Map `value` into [0, 1]; a degenerate range counts as fully hot and
    /// an undefined ratio (NaN input, infinite bounds) maps to 0
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.span();
        let normalized = if span > 0.0 {
            (value - self.min) / span
        } else {
            1.0
        };
        if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        }
    }
}

impl Default for RangeBounds {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: INTENSITY_CAP,
        }
    }
}
