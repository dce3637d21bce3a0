//! Coordinate remapping and pose transform seams

use crate::error::TransformError;
use crate::point::Point3f;
use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Pure per-point mapping from the source axis convention to the render convention
pub trait CoordinateRemap: Send + Sync {
    fn remap(&self, position: Point3f) -> Point3f;
}

impl<F> CoordinateRemap for F
where
    F: Fn(Point3f) -> Point3f + Send + Sync,
{
    fn remap(&self, position: Point3f) -> Point3f {
        self(position)
    }
}

/// Service that moves points between named coordinate frames
pub trait PoseTransformer: Send + Sync {
    /// Express `points` given in `source_frame` in `target_frame`
    fn transform_points(
        &self,
        points: &[Point3f],
        source_frame: &str,
        target_frame: &str,
    ) -> Result<Vec<Point3f>, TransformError>;
}

/// Pose transformer that leaves points untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPose;

impl PoseTransformer for IdentityPose {
    fn transform_points(
        &self,
        points: &[Point3f],
        _source_frame: &str,
        _target_frame: &str,
    ) -> Result<Vec<Point3f>, TransformError> {
        Ok(points.to_vec())
    }
}

/// A homogeneous matrix remap, usually a pure axis permutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRemap {
    pub matrix: Matrix4<f32>,
}

impl AxisRemap {
    /// Create an identity remap
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Robot convention (x forward, y left, z up) to render convention
    /// (x right, y up, z towards the viewer): `(x, y, z) -> (-y, z, -x)`
    pub fn robot_to_render() -> Self {
        #[rustfmt::skip]
        let rotation = Matrix3::new(
            0.0, -1.0, 0.0,
            0.0,  0.0, 1.0,
           -1.0,  0.0, 0.0,
        );
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Remap followed by a translation, in render coordinates
    pub fn with_offset(self, offset: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset) * self.matrix,
        }
    }

    /// Apply the remap to a point
    pub fn transform_point(&self, point: &Point3f) -> Point3f {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3f::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose this remap with another, `other` applied first
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse remap
    pub fn inverse(self) -> Option<Self> {
        self.matrix
            .try_inverse()
            .map(|inv_matrix| Self { matrix: inv_matrix })
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::robot_to_render()
    }
}

impl CoordinateRemap for AxisRemap {
    fn remap(&self, position: Point3f) -> Point3f {
        self.transform_point(&position)
    }
}

impl From<Matrix4<f32>> for AxisRemap {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_robot_to_render_axes() {
        let remap = AxisRemap::robot_to_render();
        let p = remap.remap(Point3f::new(1.0, 2.0, 3.0));
        assert_relative_eq!(p, Point3f::new(-2.0, 3.0, -1.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let remap = AxisRemap::robot_to_render().with_offset(Vector3::new(0.5, 0.0, -1.0));
        let inverse = remap.inverse().unwrap();
        let p = Point3f::new(4.0, -2.0, 7.5);
        assert_relative_eq!(inverse.remap(remap.remap(p)), p, epsilon = 1e-5);
    }

    #[test]
    fn test_closure_remap() {
        let flip = |p: Point3f| Point3f::new(p.x, p.y, -p.z);
        assert_relative_eq!(flip.remap(Point3f::new(1.0, 1.0, 1.0)), Point3f::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_identity_pose() {
        let pts = vec![Point3f::new(1.0, 2.0, 3.0)];
        let out = IdentityPose.transform_points(&pts, "a", "b").unwrap();
        assert_eq!(out, pts);
    }
}
