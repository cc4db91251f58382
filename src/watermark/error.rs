//! Watermark error types.
//!
//! Defines errors that can occur while composing watermark layers.

use thiserror::Error;

/// Errors that can occur during watermark composition.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Failed to decode a source or logo bitmap
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Failed to draw onto the working surface
    #[error("Failed to render watermark: {0}")]
    RenderError(String),

    /// A font could not be located or parsed
    #[error("Font error: {0}")]
    FontError(String),

    /// A colour string is not a valid hex colour
    #[error("Invalid colour '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    /// The drawing surface could not be allocated (zero or oversized dimensions)
    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    /// Resizing or encoding the composed surface failed
    #[error(transparent)]
    Image(#[from] crate::imaging::ImageError),
}

impl WatermarkError {
    pub fn invalid_color(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatermarkError::DecodeError("invalid PNG".to_string());
        assert_eq!(err.to_string(), "Failed to decode image: invalid PNG");

        let err = WatermarkError::FontError("family 'Nope' not found".to_string());
        assert_eq!(err.to_string(), "Font error: family 'Nope' not found");

        let err = WatermarkError::invalid_color("#GG0000", "invalid hex digit");
        assert_eq!(
            err.to_string(),
            "Invalid colour '#GG0000': invalid hex digit"
        );

        let err = WatermarkError::SurfaceAllocation {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "Cannot allocate a 0x10 surface");
    }

    #[test]
    fn test_error_debug() {
        let err = WatermarkError::RenderError("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("RenderError"));
        assert!(debug_str.contains("test"));
    }
}
