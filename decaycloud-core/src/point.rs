//! Point and color types

use bytemuck::{Pod, Zeroable};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// An RGB color with components in the 0-1 range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

unsafe impl Pod for Color {}
unsafe impl Zeroable for Color {}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear blend, `t = 0` gives `self` and `t = 1` gives `other`
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        Color {
            r: other.r * t + self.r * (1.0 - t),
            g: other.g * t + self.g * (1.0 - t),
            b: other.b * t + self.b * (1.0 - t),
        }
    }

    /// Clamp every component into [0, 1]
    pub fn clamped(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 3]> for Color {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// Render primitive element, laid out for direct upload into a vertex buffer
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RenderPoint {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl RenderPoint {
    /// Create a render point from a position and color
    pub fn new(position: &Point3f, color: Color) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            color: color.to_array(),
        }
    }

    pub fn position(&self) -> Point3f {
        Point3f::new(self.position[0], self.position[1], self.position[2])
    }

    pub fn color(&self) -> Color {
        Color::from(self.color)
    }
}

impl Default for RenderPoint {
    fn default() -> Self {
        Self::new(&Point3f::origin(), Color::WHITE)
    }
}
