//! Traits for the render and UI collaborators

use crate::channel::ColorSource;
use crate::point::RenderPoint;
use serde::{Deserialize, Serialize};

/// Shared render buffer the display writes into.
///
/// Points are appended at the tail and popped from the head, so ranges come
/// out in the same order frames went in.
pub trait RenderSink: Send {
    /// Append a frame's points at the tail
    fn append(&mut self, points: &[RenderPoint]);

    /// Remove `count` points from the head
    fn pop_front(&mut self, count: usize);

    /// Remove every point
    fn clear(&mut self);

    /// Number of points currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_alpha(&mut self, _alpha: f32) {}

    fn set_use_points(&mut self, _use_points: bool) {}

    fn set_billboard_dimensions(&mut self, _width: f32, _height: f32) {}
}

/// How points are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderStyle {
    #[default]
    Billboards,
    Points,
}

/// Display settings observers can be told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    ColorSource,
    MinIntensity,
    MaxIntensity,
    AutoRange,
    DecayTime,
    MinColor,
    MaxColor,
    Alpha,
    Style,
    BillboardSize,
    FixedFrame,
}

/// One-way notifications towards a configuration surface
pub trait DisplayObserver: Send + Sync {
    /// A setting changed value
    fn property_changed(&self, _property: Property) {}

    /// The selectable color sources were recomputed
    fn channels_changed(&self, _sources: &[ColorSource]) {}

    /// Visible output changed and a redraw should be scheduled
    fn render_requested(&self) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DisplayObserver for NoopObserver {}
