//! Runtime logo bitmaps.
//!
//! Logo layers only persist a path. Decoded bitmaps are kept here, keyed by
//! that path, premultiplied and ready to draw. A layer whose path has no
//! entry is treated as "not loaded" and is skipped by rendering and
//! hit-testing.

use super::geometry::Rect;
use super::model::LogoLayer;
use super::surface::to_pixmap;
use super::WatermarkError;
use crate::imaging::{decode_file, ImageError};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tiny_skia::{BlendMode, FilterQuality, Pixmap, PixmapPaint, Transform};

#[derive(Debug, Default)]
pub struct LogoCache {
    bitmaps: HashMap<PathBuf, Pixmap>,
}

impl LogoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the file at `path` and cache it, replacing any previous entry.
    pub fn load(&mut self, path: &Path) -> Result<(u32, u32), WatermarkError> {
        let bitmap = decode_file(path)?;
        let dims = bitmap.dimensions();
        self.insert(path, &bitmap)?;
        tracing::debug!(path = %path.display(), width = dims.0, height = dims.1, "Logo loaded");
        Ok(dims)
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, bitmap: &RgbaImage) -> Result<(), WatermarkError> {
        let pixmap = to_pixmap(bitmap)?;
        self.bitmaps.insert(path.into(), pixmap);
        Ok(())
    }

    pub fn get(&self, path: &Path) -> Option<&Pixmap> {
        self.bitmaps.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.bitmaps.contains_key(path)
    }

    pub fn dimensions(&self, path: &Path) -> Option<(u32, u32)> {
        self.get(path).map(|p| (p.width(), p.height()))
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.bitmaps.remove(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }

    /// Re-decode every logo that is not cached yet.
    ///
    /// Failures leave the layer unloaded and are returned for reporting.
    pub fn restore<'a>(
        &mut self,
        logos: impl IntoIterator<Item = &'a LogoLayer>,
    ) -> Vec<(PathBuf, ImageError)> {
        let mut failures = Vec::new();
        for logo in logos {
            if self.contains(&logo.path) {
                continue;
            }
            match decode_file(&logo.path) {
                Ok(bitmap) => {
                    if let Err(e) = self.insert(logo.path.clone(), &bitmap) {
                        tracing::warn!(path = %logo.path.display(), error = %e, "Logo could not be cached");
                    }
                }
                Err(e) => {
                    tracing::warn!(layer_id = logo.base.id, path = %logo.path.display(), error = %e, "Logo could not be restored");
                    failures.push((logo.path.clone(), e));
                }
            }
        }
        failures
    }
}

/// Draw a logo bitmap scaled into `rect`, rotated about the rect center.
pub fn draw_logo(pixmap: &mut Pixmap, bitmap: &Pixmap, rect: Rect, rotation: f32, opacity: f32) {
    if rect.is_empty() {
        return;
    }
    let (cx, cy) = rect.center();
    let transform = Transform::from_translate(cx, cy)
        .pre_rotate(rotation)
        .pre_translate(-rect.w / 2.0, -rect.h / 2.0)
        .pre_scale(rect.w / bitmap.width() as f32, rect.h / bitmap.height() as f32);

    let paint = PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        blend_mode: BlendMode::SourceOver,
        quality: FilterQuality::Bicubic,
    };
    pixmap.draw_pixmap(0, 0, bitmap.as_ref(), &paint, transform, None);
}
