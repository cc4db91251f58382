//! Working surfaces.
//!
//! Pixel effects operate on straight-alpha `RgbaImage` buffers while vector
//! drawing happens on premultiplied `tiny_skia::Pixmap`s. These helpers move
//! pixels between the two representations.

use super::WatermarkError;
use image::{Rgba, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

/// Allocate a transparent pixmap, failing on zero or oversized dimensions.
pub fn blank_pixmap(width: u32, height: u32) -> Result<Pixmap, WatermarkError> {
    Pixmap::new(width, height).ok_or(WatermarkError::SurfaceAllocation { width, height })
}

/// Copy a straight-alpha bitmap into a new premultiplied pixmap.
pub fn to_pixmap(img: &RgbaImage) -> Result<Pixmap, WatermarkError> {
    let (width, height) = img.dimensions();
    let mut pixmap = blank_pixmap(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

/// Copy a premultiplied pixmap back into a straight-alpha bitmap.
pub fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}
