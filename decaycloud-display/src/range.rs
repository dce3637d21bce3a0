//! Auto-ranging of intensity-like channels

use crate::catalog::ClassifiedChannel;
use decaycloud_core::{ColorSource, PointCloudMessage, RangeBounds, INTENSITY_CAP};

/// Computes range bounds from the channel feeding the active color source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityRangeTracker {
    /// Values above the cap are folded in as the cap
    pub cap: f32,
}

impl IntensityRangeTracker {
    pub fn new() -> Self {
        Self { cap: INTENSITY_CAP }
    }

    pub fn with_cap(mut self, cap: f32) -> Self {
        self.cap = cap;
        self
    }

    /// Min/max over the finite `values` after capping; `None` when nothing
    /// finite was seen
    pub fn scan(&self, values: &[f32]) -> Option<RangeBounds> {
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| v.min(self.cap))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), v| {
                (min.min(v), max.max(v))
            });

        (min <= max).then(|| RangeBounds::new(min, max))
    }

    /// Recompute bounds for `source` from a frame.
    ///
    /// Only Intensity and Curvature are ranged. When several valid channels
    /// match, the last one in the message wins.
    pub fn recompute(
        &self,
        message: &PointCloudMessage,
        channels: &[ClassifiedChannel],
        source: Option<ColorSource>,
    ) -> Option<RangeBounds> {
        let kind = source?.ranged_kind()?;
        let channel = channels
            .iter()
            .rev()
            .find(|c| c.valid && c.kind == kind)?;
        self.scan(&message.channels[channel.index].values)
    }
}

impl Default for IntensityRangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classify_channels;
    use decaycloud_core::Point3f;

    #[test]
    fn test_scan_caps_garbage_values() {
        let bounds = IntensityRangeTracker::new()
            .scan(&[-5.0, 4200.0, 10.0])
            .unwrap();
        assert_eq!(bounds.min(), -5.0);
        assert_eq!(bounds.max(), 4096.0);
    }

    #[test]
    fn test_scan_empty_and_nan() {
        let tracker = IntensityRangeTracker::new();
        assert!(tracker.scan(&[]).is_none());
        assert!(tracker.scan(&[f32::NAN]).is_none());

        let bounds = tracker.scan(&[f32::NAN, 3.0, 1.0]).unwrap();
        assert_eq!((bounds.min(), bounds.max()), (1.0, 3.0));
    }

    #[test]
    fn test_scan_skips_infinities() {
        let tracker = IntensityRangeTracker::new();
        assert!(tracker.scan(&[f32::INFINITY, f32::NEG_INFINITY]).is_none());

        let bounds = tracker.scan(&[f32::NEG_INFINITY, 5.0, 10.0, f32::INFINITY]).unwrap();
        assert_eq!((bounds.min(), bounds.max()), (5.0, 10.0));
    }

    #[test]
    fn test_recompute_follows_source() {
        let msg = PointCloudMessage::new("base", vec![Point3f::origin(); 3])
            .with_channel("intensity", vec![1.0, 2.0, 3.0])
            .with_channel("curvature", vec![0.1, 0.5, 0.2]);
        let channels = classify_channels(&msg);
        let tracker = IntensityRangeTracker::new().with_cap(100.0);

        let intensity = tracker
            .recompute(&msg, &channels, Some(ColorSource::Intensity))
            .unwrap();
        assert_eq!((intensity.min(), intensity.max()), (1.0, 3.0));

        let curvature = tracker
            .recompute(&msg, &channels, Some(ColorSource::Curvature))
            .unwrap();
        assert_eq!((curvature.min(), curvature.max()), (0.1, 0.5));

        assert!(tracker.recompute(&msg, &channels, Some(ColorSource::ColorRgb)).is_none());
        assert!(tracker.recompute(&msg, &channels, None).is_none());
    }

    #[test]
    fn test_recompute_skips_invalid_channel() {
        let msg = PointCloudMessage::new("base", vec![Point3f::origin(); 3])
            .with_channel("intensity", vec![1.0, 2.0]);
        let channels = classify_channels(&msg);
        assert!(IntensityRangeTracker::new()
            .recompute(&msg, &channels, Some(ColorSource::Intensity))
            .is_none());
    }
}
