//! In-memory render buffer

use decaycloud_core::{RenderPoint, RenderSink};
use std::collections::VecDeque;

/// Render sink holding points in arrival order, for drawers that pull
/// points themselves (and for tests)
#[derive(Debug, Clone)]
pub struct PointBuffer {
    points: VecDeque<RenderPoint>,
    pub alpha: f32,
    pub use_points: bool,
    pub billboard_dimensions: (f32, f32),
}

impl PointBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::new(),
            alpha: 1.0,
            use_points: false,
            billboard_dimensions: (0.01, 0.01),
        }
    }

    /// Iterate points oldest first
    pub fn points(&self) -> impl Iterator<Item = &RenderPoint> {
        self.points.iter()
    }

    /// Contiguous copy, e.g. for a vertex buffer upload
    pub fn to_vec(&self) -> Vec<RenderPoint> {
        self.points.iter().copied().collect()
    }
}

impl Default for PointBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for PointBuffer {
    fn append(&mut self, points: &[RenderPoint]) {
        self.points.extend(points.iter().copied());
    }

    fn pop_front(&mut self, count: usize) {
        let count = count.min(self.points.len());
        self.points.drain(..count);
    }

    fn clear(&mut self) {
        self.points.clear();
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn set_use_points(&mut self, use_points: bool) {
        self.use_points = use_points;
    }

    fn set_billboard_dimensions(&mut self, width: f32, height: f32) {
        self.billboard_dimensions = (width, height);
    }
}
