//! Display configuration and its shared, lock-protected state

use decaycloud_core::{Color, ColorSource, Error, RangeBounds, RenderStyle, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Smallest billboard edge the renderer accepts
pub const MIN_BILLBOARD_SIZE: f32 = 0.0001;

/// Settings that control how frames are colored, kept and drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Active color source (None until chosen by the user or the catalog)
    pub color_source: Option<ColorSource>,
    pub bounds: RangeBounds,
    /// Recompute bounds from every incoming frame
    pub auto_range: bool,
    pub min_color: Color,
    /// Base color of every point before channel blending
    pub max_color: Color,
    /// Seconds a frame stays visible; 0 keeps only the latest frame
    pub decay_time: f32,
    pub alpha: f32,
    pub style: RenderStyle,
    pub billboard_size: f32,
    /// Target frame for the pose transformer
    pub fixed_frame: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_source: None,
            bounds: RangeBounds::default(),
            auto_range: true,
            min_color: Color::BLACK,
            max_color: Color::WHITE,
            decay_time: 0.0,
            alpha: 1.0,
            style: RenderStyle::Billboards,
            billboard_size: 0.01,
            fixed_frame: String::new(),
        }
    }
}

impl DisplayConfig {
    pub fn with_color_source(mut self, source: ColorSource) -> Self {
        self.color_source = Some(source);
        self
    }

    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.bounds = RangeBounds::new(min, max);
        self
    }

    pub fn with_auto_range(mut self, auto_range: bool) -> Self {
        self.auto_range = auto_range;
        self
    }

    pub fn with_colors(mut self, min_color: Color, max_color: Color) -> Self {
        self.min_color = min_color;
        self.max_color = max_color;
        self
    }

    pub fn with_decay_time(mut self, decay_time: f32) -> Self {
        self.decay_time = sanitize_decay_time(decay_time);
        self
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_billboard_size(mut self, size: f32) -> Self {
        self.billboard_size = size.max(MIN_BILLBOARD_SIZE);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_fixed_frame(mut self, frame: impl Into<String>) -> Self {
        self.fixed_frame = frame.into();
        self
    }

    /// Re-establish value invariants, e.g. after deserialization
    pub fn normalized(mut self) -> Self {
        self.bounds = RangeBounds::new(self.bounds.min(), self.bounds.max());
        self.decay_time = sanitize_decay_time(self.decay_time);
        self.billboard_size = self.billboard_size.max(MIN_BILLBOARD_SIZE);
        self.alpha = if self.alpha.is_nan() { 1.0 } else { self.alpha.clamp(0.0, 1.0) };
        self
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str::<Self>(json)
            .map(Self::normalized)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Negative and NaN decay times mean "keep only the latest frame"
pub(crate) fn sanitize_decay_time(decay_time: f32) -> f32 {
    if decay_time >= 0.0 {
        decay_time
    } else {
        warn!("Ignoring invalid decay time {}, using 0", decay_time);
        0.0
    }
}

/// Process-wide display configuration guarded by its own lock.
///
/// Readers take a snapshot; a frame is transformed with whatever values
/// were visible at the moment it read them.
#[derive(Debug, Default)]
pub struct SharedConfig {
    inner: Mutex<DisplayConfig>,
}

impl SharedConfig {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            inner: Mutex::new(config.normalized()),
        }
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> DisplayConfig {
        self.lock().clone()
    }

    /// Mutate the configuration under its lock
    pub fn update<R>(&self, f: impl FnOnce(&mut DisplayConfig) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, DisplayConfig> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
