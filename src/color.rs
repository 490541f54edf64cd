//! Kit color parsing - host color strings to material color values
//!
//! The host hands the viewer plain strings (`#RRGGBB` or `#RRGGBBAA`); this
//! module turns them into [`ColorSpec`] values that the material binder can
//! apply. Parsing is total: malformed input degrades to opaque white instead
//! of failing, so a bad value coming out of a form field can never take the
//! viewer down.

use bevy::color::Color;

use crate::core::error::ViewerError;

/// Packed RGB of the fallback color (opaque white).
pub const FALLBACK_RGB: u32 = 0xFF_FF_FF;

/// A parsed kit region color: packed 24-bit RGB plus normalized opacity.
///
/// Immutable value type. An *absent* color (`None` at the binding site) means
/// "leave the region's authored appearance alone" - that decision is made by
/// the caller, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSpec {
    /// Packed `0xRRGGBB`.
    pub rgb: u32,
    /// Opacity in `[0, 1]`. `1.0` is fully opaque.
    pub alpha: f32,
}

impl ColorSpec {
    /// The fallback returned for any malformed input.
    pub const WHITE: ColorSpec = ColorSpec {
        rgb: FALLBACK_RGB,
        alpha: 1.0,
    };

    pub fn red(&self) -> u8 {
        ((self.rgb >> 16) & 0xFF) as u8
    }

    pub fn green(&self) -> u8 {
        ((self.rgb >> 8) & 0xFF) as u8
    }

    pub fn blue(&self) -> u8 {
        (self.rgb & 0xFF) as u8
    }

    /// Whether applying this color requires alpha blending.
    pub fn is_translucent(&self) -> bool {
        self.alpha < 1.0
    }

    /// Bevy color carrying the alpha channel (sRGB byte interpretation).
    pub fn to_color(&self) -> Color {
        Color::srgba_u8(
            self.red(),
            self.green(),
            self.blue(),
            (self.alpha * 255.0).round() as u8,
        )
    }
}

/// Parse a host-supplied color string into a [`ColorSpec`].
///
/// Accepts an optional leading `#` and surrounding whitespace. Exactly two
/// forms are valid: six hex digits (`RRGGBB`, alpha forced to `1.0`) and
/// eight hex digits (`RRGGBBAA`, alpha = last byte / 255). Anything else -
/// wrong length, non-hex characters, empty input - yields [`ColorSpec::WHITE`].
/// Never panics, never returns an error.
pub fn parse(text: &str) -> ColorSpec {
    let trimmed = text.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

    match hex.len() {
        6 => match u32::from_str_radix(hex, 16) {
            Ok(rgb) => ColorSpec { rgb, alpha: 1.0 },
            Err(_) => fallback(trimmed),
        },
        8 => match u32::from_str_radix(hex, 16) {
            Ok(rgba) => ColorSpec {
                rgb: rgba >> 8,
                alpha: (rgba & 0xFF) as f32 / 255.0,
            },
            Err(_) => fallback(trimmed),
        },
        _ => fallback(trimmed),
    }
}

fn fallback(input: &str) -> ColorSpec {
    tracing::warn!(
        "[COLOR] {}",
        ViewerError::InvalidColorFormat {
            input: input.to_string(),
        }
    );
    ColorSpec::WHITE
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-6;

    #[test]
    fn test_six_digit_round_trip() {
        //! Well-formed 6-digit strings keep their 24-bit RGB value with alpha 1.0
        for rgb in [0x000000u32, 0xFF0000, 0x00FF00, 0x0000FF, 0x123ABC, 0xFFFFFF] {
            let spec = parse(&format!("#{:06X}", rgb));
            assert_eq!(spec.rgb, rgb);
            assert!((spec.alpha - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_eight_digit_alpha() {
        //! The trailing byte of an 8-digit string becomes alpha = byte / 255
        let spec = parse("#00FF0080");
        assert_eq!(spec.rgb, 0x00FF00);
        assert!((spec.alpha - 128.0 / 255.0).abs() < TOLERANCE);

        let opaque = parse("11223344");
        assert_eq!(opaque.rgb, 0x112233);
        assert!((opaque.alpha - 0x44 as f32 / 255.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_leading_hash_optional() {
        assert_eq!(parse("FF0000"), parse("#FF0000"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        let spec = parse("  #AABBCC  ");
        assert_eq!(spec.rgb, 0xAABBCC);
    }

    #[test]
    fn test_malformed_input_falls_back_to_white() {
        //! Any input that is not RRGGBB or RRGGBBAA yields opaque white
        for input in ["", "#", "#FFF", "#FFFFF", "#FFFFFFF", "#GGGGGG", "red", "#12345G78"] {
            let spec = parse(input);
            assert_eq!(spec, ColorSpec::WHITE, "input {:?}", input);
        }
    }

    #[test]
    fn test_alpha_extremes() {
        assert!((parse("#FFFFFF00").alpha - 0.0).abs() < TOLERANCE);
        assert!((parse("#FFFFFFFF").alpha - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_channel_accessors() {
        let spec = parse("#12AB34");
        assert_eq!(spec.red(), 0x12);
        assert_eq!(spec.green(), 0xAB);
        assert_eq!(spec.blue(), 0x34);
    }

    #[test]
    fn test_translucency_flag() {
        assert!(!parse("#FF0000").is_translucent());
        assert!(parse("#FF000080").is_translucent());
        assert!(!parse("#FF0000FF").is_translucent());
    }

    #[test]
    fn test_to_color_preserves_bytes() {
        let color = parse("#FF0000").to_color();
        let srgba = color.to_srgba();
        assert!((srgba.red - 1.0).abs() < TOLERANCE);
        assert!((srgba.green - 0.0).abs() < TOLERANCE);
        assert!((srgba.blue - 0.0).abs() < TOLERANCE);
        assert!((srgba.alpha - 1.0).abs() < TOLERANCE);
    }
}
