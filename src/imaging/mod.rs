//! Bitmap decode, resize and encode.
//!
//! The compositor works on straight-alpha `RgbaImage` buffers. This module
//! converts between those buffers and file bytes:
//! - [`decode_image`] / [`decode_file`] accept any format the `image` crate reads
//! - [`resize_rgba`] resamples with a Lanczos3 convolution
//! - [`encode_rgba`] writes png, jpeg (quality-controlled) or lossless webp

pub mod encoder;
pub mod error;
pub mod format;
pub mod processor;

pub use encoder::{encode_rgba, EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use error::ImageError;
pub use format::OutputFormat;
pub use processor::{decode_file, decode_image, probe_dimensions, resize_rgba};
