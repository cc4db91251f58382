//! Hex colour parsing.

use super::WatermarkError;

/// Parsed straight-alpha RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Convert to a drawing colour, scaling alpha by `opacity`.
    pub fn to_skia(self, opacity: f32) -> tiny_skia::Color {
        let alpha = (self.a as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, (alpha * 255.0).round() as u8)
    }
}

/// Parse a hex color string.
///
/// Supports `#RGB`, `#RRGGBB` and `#RRGGBBAA`.
///
/// # Examples
///
/// ```
/// use firemark::watermark::color::{parse_hex_color, Color};
///
/// assert_eq!(parse_hex_color("#FFF").unwrap(), Color::new(255, 255, 255));
/// assert_eq!(parse_hex_color("#4a90e2").unwrap(), Color::new(0x4a, 0x90, 0xe2));
/// ```
pub fn parse_hex_color(value: &str) -> Result<Color, WatermarkError> {
    let hex = value
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::invalid_color(value, "must start with '#'"))?;

    if !hex.is_ascii() {
        return Err(WatermarkError::invalid_color(value, "invalid hex digit"));
    }

    let digit = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| WatermarkError::invalid_color(value, "invalid hex digit"))
    };

    match hex.len() {
        3 => {
            // Double each component: 0xF -> 0xFF, 0xA -> 0xAA
            let r = digit(&hex[0..1])?;
            let g = digit(&hex[1..2])?;
            let b = digit(&hex[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            digit(&hex[0..2])?,
            digit(&hex[2..4])?,
            digit(&hex[4..6])?,
        )),
        8 => Ok(Color::new(
            digit(&hex[0..2])?,
            digit(&hex[2..4])?,
            digit(&hex[4..6])?,
        )
        .with_alpha(digit(&hex[6..8])?)),
        n => Err(WatermarkError::invalid_color(
            value,
            format!("expected #RGB, #RRGGBB or #RRGGBBAA, got {} digits", n),
        )),
    }
}
