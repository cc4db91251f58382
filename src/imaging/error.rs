//! Imaging error types

use thiserror::Error;

/// Errors raised while decoding, resampling or encoding bitmaps
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// The input could not be read from disk
    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    /// The bytes are not a decodable image
    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: String },

    /// The requested output format is not known
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Resize failed: {message}")]
    ResizeFailed { message: String },

    #[error("Failed to encode to {format}: {message}")]
    EncodeFailed { format: String, message: String },
}

impl ImageError {
    pub fn read_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::ReadFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ImageError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }
}
