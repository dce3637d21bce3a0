//! Channel roles and color source selection

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Semantic role of a channel, resolved once from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Intensity,
    Curvature,
    /// Packed 0x00RRGGBB stored in the bit pattern of an f32
    RgbPacked,
    Red,
    Green,
    Blue,
    NormalX,
    NormalY,
    NormalZ,
    Unknown,
}

impl ChannelKind {
    /// Classify a channel by its exact, case-sensitive name
    pub fn from_name(name: &str) -> Self {
        match name {
            "intensity" | "intensities" => ChannelKind::Intensity,
            "curvature" | "curvatures" => ChannelKind::Curvature,
            "rgb" => ChannelKind::RgbPacked,
            "r" => ChannelKind::Red,
            "g" => ChannelKind::Green,
            "b" => ChannelKind::Blue,
            "nx" => ChannelKind::NormalX,
            "ny" => ChannelKind::NormalY,
            "nz" => ChannelKind::NormalZ,
            _ => ChannelKind::Unknown,
        }
    }

    /// Whether values of this kind are normalized against the range bounds
    pub fn is_ranged(&self) -> bool {
        matches!(self, ChannelKind::Intensity | ChannelKind::Curvature)
    }
}

/// The selectable source driving point coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSource {
    Intensity,
    ColorRgb,
    NormalSphere,
    Curvature,
}

impl ColorSource {
    pub const ALL: [ColorSource; 4] = [
        ColorSource::Intensity,
        ColorSource::ColorRgb,
        ColorSource::NormalSphere,
        ColorSource::Curvature,
    ];

    /// Human readable label for option lists
    pub fn label(&self) -> &'static str {
        match self {
            ColorSource::Intensity => "Intensity",
            ColorSource::ColorRgb => "Color (RGB)",
            ColorSource::NormalSphere => "Normal Sphere",
            ColorSource::Curvature => "Curvature",
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            ColorSource::Intensity => 0,
            ColorSource::ColorRgb => 1,
            ColorSource::NormalSphere => 2,
            ColorSource::Curvature => 3,
        }
    }

    /// Whether a channel of `kind` contributes color under this source
    pub fn colors_with(&self, kind: ChannelKind) -> bool {
        match self {
            ColorSource::Intensity => kind == ChannelKind::Intensity,
            ColorSource::Curvature => kind == ChannelKind::Curvature,
            ColorSource::ColorRgb => matches!(
                kind,
                ChannelKind::RgbPacked | ChannelKind::Red | ChannelKind::Green | ChannelKind::Blue
            ),
            ColorSource::NormalSphere => false,
        }
    }

    /// The channel kind whose values feed auto-ranging, if any
    pub fn ranged_kind(&self) -> Option<ChannelKind> {
        match self {
            ColorSource::Intensity => Some(ChannelKind::Intensity),
            ColorSource::Curvature => Some(ChannelKind::Curvature),
            _ => None,
        }
    }
}

impl TryFrom<i32> for ColorSource {
    type Error = Error;

    fn try_from(index: i32) -> Result<Self> {
        ColorSource::ALL
            .iter()
            .copied()
            .find(|s| s.index() == index)
            .ok_or_else(|| Error::InvalidConfig(format!("color source index {} out of range", index)))
    }
}

impl std::fmt::Display for ColorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name_is_case_sensitive() {
        assert_eq!(ChannelKind::from_name("intensities"), ChannelKind::Intensity);
        assert_eq!(ChannelKind::from_name("Intensity"), ChannelKind::Unknown);
        assert_eq!(ChannelKind::from_name("rgb"), ChannelKind::RgbPacked);
        assert_eq!(ChannelKind::from_name("r"), ChannelKind::Red);
        assert_eq!(ChannelKind::from_name("curvatures"), ChannelKind::Curvature);
        assert_eq!(ChannelKind::from_name("nz"), ChannelKind::NormalZ);
        assert_eq!(ChannelKind::from_name("range"), ChannelKind::Unknown);
    }

    #[test]
    fn test_rgb_source_accepts_packed_and_separate() {
        let src = ColorSource::ColorRgb;
        assert!(src.colors_with(ChannelKind::RgbPacked));
        assert!(src.colors_with(ChannelKind::Green));
        assert!(!src.colors_with(ChannelKind::Intensity));
        assert!(!ColorSource::NormalSphere.colors_with(ChannelKind::NormalX));
    }

    #[test]
    fn test_index_round_trip_and_out_of_range() {
        for src in ColorSource::ALL {
            assert_eq!(ColorSource::try_from(src.index()).unwrap(), src);
        }
        assert!(matches!(ColorSource::try_from(4), Err(Error::InvalidConfig(_))));
        assert!(ColorSource::try_from(-1).is_err());
    }
}
