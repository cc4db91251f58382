// Shared fixtures for integration tests

use firemark::watermark::{FontStyle, GlyphSource, InkExtent};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tiny_skia::{PathBuilder, Rect};

/// Fixed-metric glyphs: each char is `0.6 * size` wide and drawn as a solid
/// block from `0.7 * size` above to `0.2 * size` below the baseline.
pub struct BoxGlyphs;

impl GlyphSource for BoxGlyphs {
    fn line_width(&self, style: &FontStyle, text: &str) -> f32 {
        text.chars().count() as f32 * style.size * 0.6
    }

    fn ink_extent(&self, style: &FontStyle, text: &str) -> InkExtent {
        InkExtent {
            advance: self.line_width(style, text),
            ascent: style.size * 0.7,
            descent: style.size * 0.2,
        }
    }

    fn ascent(&self, style: &FontStyle) -> f32 {
        style.size * 0.8
    }

    fn line_path(&self, style: &FontStyle, text: &str, x: f32, baseline: f32) -> Option<tiny_skia::Path> {
        let mut pb = PathBuilder::new();
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let left = x + i as f32 * style.size * 0.6;
            if let Some(rect) = Rect::from_xywh(left, baseline - style.size * 0.7, style.size * 0.5, style.size * 0.9) {
                pb.push_rect(rect);
            }
        }
        pb.finish()
    }
}

pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

/// Write a PNG fixture and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient_image(width, height).save(&path).unwrap();
    path
}
