//! Discovery of the channels a frame carries and the color sources they enable

use decaycloud_core::{ChannelKind, ColorSource, PointCloudMessage};

/// One channel of a frame after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedChannel {
    /// Position in the message's channel list
    pub index: usize,
    pub kind: ChannelKind,
    /// Length matches the frame's point count
    pub valid: bool,
}

/// Classify every channel of a message in one pass
pub fn classify_channels(message: &PointCloudMessage) -> Vec<ClassifiedChannel> {
    let point_count = message.point_count();
    message
        .channels
        .iter()
        .enumerate()
        .map(|(index, channel)| ClassifiedChannel {
            index,
            kind: ChannelKind::from_name(&channel.name),
            valid: channel.is_valid_for(point_count),
        })
        .collect()
}

/// Whether valid `nx`, `ny` and `nz` channels are all present
pub fn has_normals(channels: &[ClassifiedChannel]) -> bool {
    [ChannelKind::NormalX, ChannelKind::NormalY, ChannelKind::NormalZ]
        .iter()
        .all(|kind| channels.iter().any(|c| c.valid && c.kind == *kind))
}

/// The color sources a single frame can drive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelCatalog {
    available: Vec<ColorSource>,
}

impl ChannelCatalog {
    /// Build the catalog for one message
    pub fn scan(message: &PointCloudMessage) -> Self {
        Self::from_channels(&classify_channels(message))
    }

    /// Build the catalog from already classified channels.
    ///
    /// Sources are listed once each, in the order their first channel appears.
    pub fn from_channels(channels: &[ClassifiedChannel]) -> Self {
        let normals = has_normals(channels);
        let mut available = Vec::new();

        for channel in channels.iter().filter(|c| c.valid) {
            let source = match channel.kind {
                ChannelKind::Intensity => Some(ColorSource::Intensity),
                ChannelKind::RgbPacked | ChannelKind::Red => Some(ColorSource::ColorRgb),
                ChannelKind::NormalX if normals => Some(ColorSource::NormalSphere),
                ChannelKind::Curvature => Some(ColorSource::Curvature),
                _ => None,
            };

            if let Some(source) = source {
                if !available.contains(&source) {
                    available.push(source);
                }
            }
        }

        Self { available }
    }

    pub fn available(&self) -> &[ColorSource] {
        &self.available
    }

    pub fn contains(&self, source: ColorSource) -> bool {
        self.available.contains(&source)
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// First source seen in the frame
    pub fn default_source(&self) -> Option<ColorSource> {
        self.available.first().copied()
    }

    /// Keep an explicit selection, otherwise fall back to the default
    pub fn resolve_selection(&self, current: Option<ColorSource>) -> Option<ColorSource> {
        current.or_else(|| self.default_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaycloud_core::Point3f;

    fn message(names: &[&str], len: usize) -> PointCloudMessage {
        names.iter().fold(
            PointCloudMessage::new("base", vec![Point3f::origin(); len]),
            |msg, name| msg.with_channel(*name, vec![0.0; len]),
        )
    }

    #[test]
    fn test_normal_sphere_needs_all_three_axes() {
        let catalog = ChannelCatalog::scan(&message(&["intensity", "nx", "ny"], 4));
        assert_eq!(catalog.available(), &[ColorSource::Intensity]);
        assert_eq!(catalog.resolve_selection(None), Some(ColorSource::Intensity));

        let catalog = ChannelCatalog::scan(&message(&["nx", "ny", "nz", "intensity"], 4));
        assert_eq!(
            catalog.available(),
            &[ColorSource::NormalSphere, ColorSource::Intensity]
        );
    }

    #[test]
    fn test_first_seen_order_and_dedup() {
        let catalog = ChannelCatalog::scan(&message(
            &["curvature", "r", "g", "b", "rgb", "intensities", "curvatures"],
            2,
        ));
        assert_eq!(
            catalog.available(),
            &[ColorSource::Curvature, ColorSource::ColorRgb, ColorSource::Intensity]
        );
        assert_eq!(catalog.default_source(), Some(ColorSource::Curvature));
    }

    #[test]
    fn test_explicit_selection_is_kept() {
        let catalog = ChannelCatalog::scan(&message(&["intensity"], 1));
        assert_eq!(
            catalog.resolve_selection(Some(ColorSource::ColorRgb)),
            Some(ColorSource::ColorRgb)
        );
    }

    #[test]
    fn test_invalid_and_unknown_channels_are_ignored() {
        let msg = PointCloudMessage::new("base", vec![Point3f::origin(); 3])
            .with_channel("intensity", vec![1.0])
            .with_channel("range", vec![1.0, 2.0, 3.0]);
        let classified = classify_channels(&msg);
        assert!(!classified[0].valid);
        assert_eq!(classified[1].kind, ChannelKind::Unknown);

        let catalog = ChannelCatalog::from_channels(&classified);
        assert!(catalog.is_empty());
        assert_eq!(catalog.resolve_selection(None), None);
    }
}
