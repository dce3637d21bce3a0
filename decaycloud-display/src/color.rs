//! Per-point color mapping for each channel kind
//!
//! Every function here is pure: the result depends only on the arguments, so
//! the same mapping can run over many points and frames without coordination.

use decaycloud_core::{ChannelKind, Color, RangeBounds};

/// Inputs shared by all points of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorParams {
    /// Color used for values at (or below) the lower bound
    pub min_color: Color,
    pub bounds: RangeBounds,
}

impl ColorParams {
    pub fn new(min_color: Color, bounds: RangeBounds) -> Self {
        Self { min_color, bounds }
    }
}

/// Blend from the min color towards the point's current color by the
/// normalized value
pub fn map_intensity(value: f32, color: Color, params: &ColorParams) -> Color {
    let t = params.bounds.normalize(value);
    params.min_color.lerp(&color, t)
}

/// Decode a 0x00RRGGBB integer stored in the bit pattern of the value
pub fn map_rgb_packed(value: f32, _color: Color, _params: &ColorParams) -> Color {
    let rgb = value.to_bits();
    Color::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

pub fn map_red(value: f32, color: Color, _params: &ColorParams) -> Color {
    Color { r: value, ..color }
}

pub fn map_green(value: f32, color: Color, _params: &ColorParams) -> Color {
    Color { g: value, ..color }
}

pub fn map_blue(value: f32, color: Color, _params: &ColorParams) -> Color {
    Color { b: value, ..color }
}

/// Signature shared by all channel mappings
pub type ColorMapFn = fn(f32, Color, &ColorParams) -> Color;

/// Mapping function for a channel kind, `None` when the kind carries no color
pub fn mapper_for(kind: ChannelKind) -> Option<ColorMapFn> {
    match kind {
        ChannelKind::Intensity | ChannelKind::Curvature => Some(map_intensity),
        ChannelKind::RgbPacked => Some(map_rgb_packed),
        ChannelKind::Red => Some(map_red),
        ChannelKind::Green => Some(map_green),
        ChannelKind::Blue => Some(map_blue),
        _ => None,
    }
}

/// Apply the mapping for `kind` to one point color
pub fn apply(kind: ChannelKind, value: f32, color: Color, params: &ColorParams) -> Color {
    match mapper_for(kind) {
        Some(map) => map(value, color, params),
        None => color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> ColorParams {
        ColorParams::new(Color::new(0.0, 0.0, 1.0), RangeBounds::new(0.0, 100.0))
    }

    #[test]
    fn test_intensity_endpoints() {
        let max_color = Color::new(1.0, 0.0, 0.0);
        let p = params();

        assert_eq!(map_intensity(0.0, max_color, &p), p.min_color);
        assert_eq!(map_intensity(100.0, max_color, &p), max_color);

        let mid = map_intensity(50.0, max_color, &p);
        assert_relative_eq!(mid.r, 0.5);
        assert_relative_eq!(mid.b, 0.5);
    }

    #[test]
    fn test_intensity_clamps_outside_range() {
        let max_color = Color::WHITE;
        let p = params();
        assert_eq!(map_intensity(-20.0, max_color, &p), p.min_color);
        assert_eq!(map_intensity(250.0, max_color, &p), max_color);
    }

    #[test]
    fn test_intensity_degenerate_range_is_hot() {
        let p = ColorParams::new(Color::BLACK, RangeBounds::new(7.0, 7.0));
        assert_eq!(map_intensity(-3.0, Color::WHITE, &p), Color::WHITE);
    }

    #[test]
    fn test_rgb_packed_decode() {
        let value = f32::from_bits(0x00FF_8000);
        let c = map_rgb_packed(value, Color::WHITE, &params());
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.g, 128.0 / 255.0);
        assert_relative_eq!(c.b, 0.0);
    }

    #[test]
    fn test_separate_channels_only_touch_their_component() {
        let base = Color::new(0.2, 0.4, 0.6);
        let p = params();
        assert_eq!(map_red(0.9, base, &p), Color::new(0.9, 0.4, 0.6));
        assert_eq!(map_green(0.9, base, &p), Color::new(0.2, 0.9, 0.6));
        assert_eq!(map_blue(0.9, base, &p), Color::new(0.2, 0.4, 0.9));
    }

    #[test]
    fn test_apply_ignores_geometry_kinds() {
        let base = Color::new(0.3, 0.3, 0.3);
        assert_eq!(apply(ChannelKind::NormalX, 5.0, base, &params()), base);
        assert_eq!(apply(ChannelKind::Unknown, 5.0, base, &params()), base);
    }
}
