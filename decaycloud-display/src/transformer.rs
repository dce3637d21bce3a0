//! Conversion of one raw message into colored, remapped render points

use crate::catalog::{classify_channels, ClassifiedChannel};
use crate::color::{mapper_for, ColorParams};
use crate::config::DisplayConfig;
use crate::range::IntensityRangeTracker;
use decaycloud_core::{
    AxisRemap, ChannelKind, Color, ColorSource, CoordinateRemap, Point3f, PointCloudMessage,
    RangeBounds, RenderPoint,
};
use log::warn;
use rayon::prelude::*;
use std::sync::Arc;

/// Frames with at least this many points are processed on the rayon pool
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Recoverable problems found while transforming a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A channel's length differs from the point count; it was skipped
    ChannelLengthMismatch {
        channel: String,
        values: usize,
        points: usize,
    },
    /// Normal Sphere was selected but `ny`/`nz` are missing or invalid
    MissingNormals,
    /// The pose transformer failed; points were left in their source frame
    PoseTransformFailed {
        source_frame: String,
        target_frame: String,
        message: String,
    },
}

/// Result of transforming one frame
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedFrame {
    /// One render point per input point, in input order
    pub points: Vec<RenderPoint>,
    /// Bounds recomputed by auto-ranging, if they were
    pub bounds: Option<RangeBounds>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Stateless converter from messages to render points
#[derive(Clone)]
pub struct FrameTransformer {
    remap: Arc<dyn CoordinateRemap>,
    tracker: IntensityRangeTracker,
    parallel_threshold: usize,
}

impl FrameTransformer {
    /// Create a transformer using `remap` for the axis convention change
    pub fn new(remap: Arc<dyn CoordinateRemap>) -> Self {
        Self {
            remap,
            tracker: IntensityRangeTracker::new(),
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }

    pub fn with_tracker(mut self, tracker: IntensityRangeTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Point count at which per-point work moves to the rayon pool
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Transform `message` using the settings in `config`.
    ///
    /// Never fails: invalid channels are skipped and reported as diagnostics,
    /// so a frame always yields at least its geometry.
    pub fn transform(&self, message: &PointCloudMessage, config: &DisplayConfig) -> TransformedFrame {
        let point_count = message.point_count();
        let channels = classify_channels(message);
        let mut diagnostics = Vec::new();

        for c in channels.iter().filter(|c| !c.valid) {
            let channel = &message.channels[c.index];
            warn!(
                "Point cloud channel '{}' has {} values for {} points, skipping it",
                channel.name,
                channel.values.len(),
                point_count
            );
            diagnostics.push(Diagnostic::ChannelLengthMismatch {
                channel: channel.name.clone(),
                values: channel.values.len(),
                points: point_count,
            });
        }

        let bounds = if config.auto_range {
            self.tracker.recompute(message, &channels, config.color_source)
        } else {
            None
        };
        let params = ColorParams::new(config.min_color, bounds.unwrap_or(config.bounds));

        let normals = self.normal_channels(message, &channels, config.color_source, &mut diagnostics);
        let mut points = self.resolve_points(message, normals, config.max_color);

        if let Some(source) = config.color_source {
            for c in channels.iter().filter(|c| c.valid && source.colors_with(c.kind)) {
                if let Some(map) = mapper_for(c.kind) {
                    let values = &message.channels[c.index].values;
                    let apply = |(point, value): (&mut RenderPoint, &f32)| {
                        point.color = map(*value, point.color(), &params).to_array();
                    };
                    if point_count >= self.parallel_threshold {
                        points.par_iter_mut().zip(values.par_iter()).for_each(apply);
                    } else {
                        points.iter_mut().zip(values.iter()).for_each(apply);
                    }
                }
            }
        }

        TransformedFrame {
            points,
            bounds,
            diagnostics,
        }
    }

    /// Value slices for nx/ny/nz when they should replace the positions
    fn normal_channels<'a>(
        &self,
        message: &'a PointCloudMessage,
        channels: &[ClassifiedChannel],
        source: Option<ColorSource>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<[&'a [f32]; 3]> {
        if source != Some(ColorSource::NormalSphere) {
            return None;
        }

        let find = |kind: ChannelKind| {
            channels
                .iter()
                .find(|c| c.valid && c.kind == kind)
                .map(|c| message.channels[c.index].values.as_slice())
        };

        let nx = find(ChannelKind::NormalX)?;
        match (find(ChannelKind::NormalY), find(ChannelKind::NormalZ)) {
            (Some(ny), Some(nz)) => Some([nx, ny, nz]),
            _ => {
                warn!("Normal information requested via 'nx', but 'ny' and 'nz' channels are not present");
                diagnostics.push(Diagnostic::MissingNormals);
                None
            }
        }
    }

    /// Positions (native or normals), remapped, colored with the base color
    fn resolve_points(
        &self,
        message: &PointCloudMessage,
        normals: Option<[&[f32]; 3]>,
        base: Color,
    ) -> Vec<RenderPoint> {
        let remap = self.remap.as_ref();
        let resolve = |i: usize| {
            let position = match normals {
                Some([nx, ny, nz]) => Point3f::new(nx[i], ny[i], nz[i]),
                None => message.points[i],
            };
            RenderPoint::new(&remap.remap(position), base)
        };

        let count = message.point_count();
        if count >= self.parallel_threshold {
            (0..count).into_par_iter().map(resolve).collect()
        } else {
            (0..count).map(resolve).collect()
        }
    }
}

impl Default for FrameTransformer {
    fn default() -> Self {
        Self::new(Arc::new(AxisRemap::robot_to_render()))
    }
}

impl std::fmt::Debug for FrameTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTransformer")
            .field("tracker", &self.tracker)
            .field("parallel_threshold", &self.parallel_threshold)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn identity() -> FrameTransformer {
        FrameTransformer::new(Arc::new(AxisRemap::identity()))
    }

    fn line(n: usize) -> Vec<Point3f> {
        (0..n).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_geometry_only_frame() {
        let msg = PointCloudMessage::new("base", line(3));
        let out = FrameTransformer::default().transform(&msg, &DisplayConfig::default());

        assert_eq!(out.points.len(), 3);
        assert!(out.diagnostics.is_empty());
        assert!(out.bounds.is_none());
        // x forward becomes -z in render space
        assert_relative_eq!(out.points[2].position(), Point3f::new(0.0, 0.0, -2.0));
        assert!(out.points.iter().all(|p| p.color() == Color::WHITE));
    }

    #[test]
    fn test_intensity_coloring_with_fixed_bounds() {
        let msg = PointCloudMessage::new("base", line(3)).with_channel("intensity", vec![0.0, 5.0, 10.0]);
        let config = DisplayConfig::default()
            .with_color_source(ColorSource::Intensity)
            .with_auto_range(false)
            .with_bounds(0.0, 10.0)
            .with_colors(Color::BLACK, Color::new(1.0, 0.0, 0.0));

        let out = identity().transform(&msg, &config);
        assert_eq!(out.points[0].color(), Color::BLACK);
        assert_relative_eq!(out.points[1].color[0], 0.5);
        assert_eq!(out.points[2].color(), Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_auto_range_applies_to_same_frame() {
        let msg = PointCloudMessage::new("base", line(3)).with_channel("intensity", vec![-5.0, 4200.0, 10.0]);
        let config = DisplayConfig::default().with_color_source(ColorSource::Intensity);

        let out = identity().transform(&msg, &config);
        let bounds = out.bounds.unwrap();
        assert_eq!((bounds.min(), bounds.max()), (-5.0, 4096.0));
        assert_eq!(out.points[0].color(), Color::BLACK);
        assert_eq!(out.points[1].color(), Color::WHITE);
    }

    #[test]
    fn test_infinite_samples_keep_colors_in_range() {
        let msg = PointCloudMessage::new("base", line(3))
            .with_channel("intensity", vec![f32::NEG_INFINITY, 5.0, 10.0]);
        let config = DisplayConfig::default().with_color_source(ColorSource::Intensity);

        let out = identity().transform(&msg, &config);
        let bounds = out.bounds.unwrap();
        assert_eq!((bounds.min(), bounds.max()), (5.0, 10.0));
        assert_eq!(out.points[0].color(), Color::BLACK);
        assert_eq!(out.points[2].color(), Color::WHITE);
        assert!(out
            .points
            .iter()
            .flat_map(|p| p.color)
            .all(|c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn test_only_selected_source_colors() {
        let msg = PointCloudMessage::new("base", line(2))
            .with_channel("intensity", vec![0.0, 0.0])
            .with_channel("rgb", vec![f32::from_bits(0x0000_FF00); 2]);
        let config = DisplayConfig::default()
            .with_color_source(ColorSource::ColorRgb)
            .with_auto_range(false);

        let out = identity().transform(&msg, &config);
        assert!(out.points.iter().all(|p| p.color() == Color::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_separate_rgb_channels() {
        let msg = PointCloudMessage::new("base", line(1))
            .with_channel("r", vec![0.25])
            .with_channel("g", vec![0.5])
            .with_channel("b", vec![0.75]);
        let config = DisplayConfig::default().with_color_source(ColorSource::ColorRgb);

        let out = identity().transform(&msg, &config);
        assert_eq!(out.points[0].color(), Color::new(0.25, 0.5, 0.75));
    }

    #[test]
    fn test_invalid_channel_is_skipped_and_reported() {
        let msg = PointCloudMessage::new("base", line(3)).with_channel("intensity", vec![0.0, 1.0]);
        let config = DisplayConfig::default().with_color_source(ColorSource::Intensity);

        let out = identity().transform(&msg, &config);
        assert_eq!(out.points.len(), 3);
        assert!(out.bounds.is_none());
        assert!(out.points.iter().all(|p| p.color() == Color::WHITE));
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::ChannelLengthMismatch {
                channel: "intensity".to_string(),
                values: 2,
                points: 3,
            }]
        );
    }

    #[test]
    fn test_normal_sphere_uses_normals_as_positions() {
        let msg = PointCloudMessage::new("base", line(2))
            .with_channel("nx", vec![0.0, 1.0])
            .with_channel("ny", vec![1.0, 0.0])
            .with_channel("nz", vec![0.0, 0.0]);
        let config = DisplayConfig::default().with_color_source(ColorSource::NormalSphere);

        let out = identity().transform(&msg, &config);
        assert_eq!(out.points[0].position, [0.0, 1.0, 0.0]);
        assert_eq!(out.points[1].position, [1.0, 0.0, 0.0]);
        assert!(out.points.iter().all(|p| p.color() == Color::WHITE));
    }

    #[test]
    fn test_normal_sphere_falls_back_without_companions() {
        let msg = PointCloudMessage::new("base", line(2)).with_channel("nx", vec![0.5, 0.5]);
        let config = DisplayConfig::default().with_color_source(ColorSource::NormalSphere);

        let out = identity().transform(&msg, &config);
        assert_eq!(out.points[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(out.diagnostics, vec![Diagnostic::MissingNormals]);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let msg = PointCloudMessage::new("base", line(64))
            .with_channel("intensity", (0..64).map(|i| i as f32 * 3.0).collect());
        let config = DisplayConfig::default().with_color_source(ColorSource::Intensity);
        let transformer = FrameTransformer::default();

        let a = transformer.transform(&msg, &config);
        let b = transformer.transform(&msg, &config);
        assert_eq!(point_bytes(&a.points), point_bytes(&b.points));
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let msg = PointCloudMessage::new("base", line(300))
            .with_channel("curvature", (0..300).map(|i| (i % 17) as f32).collect());
        let config = DisplayConfig::default().with_color_source(ColorSource::Curvature);

        let sequential = FrameTransformer::default().transform(&msg, &config);
        let parallel = FrameTransformer::default()
            .with_parallel_threshold(1)
            .transform(&msg, &config);
        assert_eq!(sequential, parallel);
    }

    fn point_bytes(points: &[RenderPoint]) -> Vec<u8> {
        points
            .iter()
            .flat_map(|p| p.position.iter().chain(p.color.iter()))
            .flat_map(|v| v.to_bits().to_le_bytes())
            .collect()
    }
}
