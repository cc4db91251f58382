//! Application state.
//!
//! One owned struct holds everything an editing session mutates: the image
//! list, the output directory, the settings snapshot, the active layer and the
//! decoded logo bitmaps. It is passed by reference to the editor and the batch
//! exporter; there is no global settings object.

use crate::imaging::probe_dimensions;
use crate::watermark::{
    bounding_box, next_layer_id, ActiveLayer, IconLayer, IconRef, ImageEntry, Layer, LogoCache,
    LogoLayer, Position, RenderResources, Settings, TextLayer, WatermarkError,
};
use crate::watermark::fonts::GlyphSource;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct AppState {
    pub images: Vec<ImageEntry>,
    pub output_dir: Option<PathBuf>,
    pub settings: Settings,
    pub active_layer: Option<ActiveLayer>,
    pub logos: LogoCache,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded snapshot, re-decoding its logos.
    pub fn with_settings(settings: Settings) -> Self {
        let mut state = Self::new();
        state.replace_settings(settings);
        state
    }

    /// Swap in a new settings snapshot (last-used or preset).
    ///
    /// Clears the selection and decodes any logo not cached yet; logos that
    /// fail to decode stay in the snapshot but are not drawn.
    pub fn replace_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.active_layer = None;
        let failures = self.logos.restore(self.settings.logos());
        if !failures.is_empty() {
            tracing::warn!(count = failures.len(), "Some logos could not be restored");
        }
    }

    pub fn resources<'a>(&'a self, glyphs: &'a dyn GlyphSource) -> RenderResources<'a> {
        RenderResources::new(glyphs, &self.logos)
    }

    /// Append images, skipping paths already in the list.
    ///
    /// Dimensions are read from the file header; a file that cannot be
    /// probed is still added, with 0x0 dimensions. Returns how many were added.
    pub fn add_images<P: AsRef<Path>>(&mut self, paths: impl IntoIterator<Item = P>) -> usize {
        let mut known: HashSet<PathBuf> = self.images.iter().map(|i| i.path.clone()).collect();
        let mut added = 0;

        for path in paths {
            let path = path.as_ref();
            if !known.insert(path.to_path_buf()) {
                continue;
            }
            let (original_width, original_height) = match probe_dimensions(path) {
                Ok(dims) => dims,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not read image dimensions");
                    (0, 0)
                }
            };
            self.images.push(ImageEntry {
                name: file_name(path),
                path: path.to_path_buf(),
                original_width,
                original_height,
            });
            added += 1;
        }

        tracing::info!(added, total = self.images.len(), "Images added");
        added
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
    }

    pub fn add_text_layer(&mut self) -> ActiveLayer {
        self.push_layer(Layer::Text(TextLayer::new(next_layer_id())))
    }

    pub fn add_icon_layer(&mut self) -> ActiveLayer {
        self.push_layer(Layer::Icon(IconLayer::new(next_layer_id())))
    }

    /// Decode the logo file, then add a layer for it.
    ///
    /// A decode failure adds nothing.
    pub fn add_logo_layer(&mut self, path: &Path) -> Result<ActiveLayer, WatermarkError> {
        self.logos.load(path)?;
        let layer = LogoLayer::new(next_layer_id(), file_name(path), path);
        Ok(self.push_layer(Layer::Logo(layer)))
    }

    fn push_layer(&mut self, layer: Layer) -> ActiveLayer {
        let active = layer.active_ref();
        tracing::debug!(kind = active.kind.as_str(), layer_id = active.id, "Layer added");
        self.settings.layers.push(layer);
        self.active_layer = Some(active);
        active
    }

    /// Delete a layer, clearing the selection if it pointed at it.
    pub fn delete_layer(&mut self, target: ActiveLayer) -> Option<Layer> {
        let removed = self.settings.remove(target)?;
        if self.active_layer == Some(target) {
            self.active_layer = None;
        }
        if let Layer::Logo(logo) = &removed {
            if !self.settings.logos().any(|l| l.path == logo.path) {
                self.logos.remove(&logo.path);
            }
        }
        Some(removed)
    }

    /// Select a layer; `None` or an unknown layer clears the selection.
    pub fn select_layer(&mut self, target: Option<ActiveLayer>) -> bool {
        self.active_layer = target.filter(|t| self.settings.find(*t).is_some());
        self.active_layer.is_some()
    }

    pub fn active(&self) -> Option<&Layer> {
        self.active_layer.and_then(|a| self.settings.find(a))
    }

    pub fn active_mut(&mut self) -> Option<&mut Layer> {
        let target = self.active_layer?;
        self.settings.find_mut(target)
    }

    /// Point the active icon layer at a different glyph.
    pub fn set_active_icon(&mut self, icon: IconRef) -> bool {
        match self.active_mut() {
            Some(Layer::Icon(layer)) => {
                layer.icon = icon;
                true
            }
            _ => false,
        }
    }

    /// Center the active free-placement layer on a `surface_w` x `surface_h`
    /// surface. Anchor-mode layers are left alone.
    pub fn recenter_active_layer(
        &mut self,
        surface_w: f32,
        surface_h: f32,
        glyphs: &dyn GlyphSource,
    ) -> bool {
        if surface_w <= 0.0 || surface_h <= 0.0 {
            return false;
        }
        let Some(layer) = self.active() else {
            return false;
        };
        if !layer.base().free_placement {
            return false;
        }
        let Some(rect) = bounding_box(layer, surface_w, surface_h, &self.resources(glyphs)) else {
            return false;
        };

        let position = Position::new(
            (surface_w - rect.w) / 2.0 / surface_w,
            (surface_h - rect.h) / 2.0 / surface_h,
        );
        match self.active_mut() {
            Some(layer) => {
                layer.base_mut().position = position;
                true
            }
            None => false,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::fonts::test_support::BlockGlyphs;
    use crate::watermark::LayerKind;
    use image::RgbaImage;

    #[test]
    fn test_new_layers_become_active() {
        let mut state = AppState::new();
        let text = state.add_text_layer();
        assert_eq!(state.active_layer, Some(text));
        let icon = state.add_icon_layer();
        assert_eq!(state.active_layer, Some(icon));
        assert_eq!(icon.kind, LayerKind::Icon);
        assert!(icon.id > text.id);
        assert_eq!(state.settings.layers.len(), 2);
    }

    #[test]
    fn test_add_logo_decode_failure_adds_nothing() {
        let mut state = AppState::new();
        assert!(state.add_logo_layer(Path::new("/no/logo.png")).is_err());
        assert!(state.settings.layers.is_empty());
        assert!(state.active_layer.is_none());
    }

    #[test]
    fn test_add_logo_layer_named_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brand.png");
        RgbaImage::new(4, 4).save(&path).unwrap();

        let mut state = AppState::new();
        let active = state.add_logo_layer(&path).unwrap();
        match state.settings.find(active) {
            Some(Layer::Logo(logo)) => {
                assert_eq!(logo.name, "brand.png");
                assert_eq!(logo.size, 15.0);
            }
            other => panic!("unexpected layer {:?}", other),
        }
        assert!(state.logos.contains(&path));
    }

    #[test]
    fn test_delete_clears_matching_active() {
        let mut state = AppState::new();
        let first = state.add_text_layer();
        let second = state.add_text_layer();

        state.delete_layer(first);
        assert_eq!(state.active_layer, Some(second));

        state.delete_layer(second);
        assert!(state.active_layer.is_none());
        assert!(state.delete_layer(second).is_none());
    }

    #[test]
    fn test_select_unknown_layer_clears() {
        let mut state = AppState::new();
        let text = state.add_text_layer();
        assert!(!state.select_layer(Some(ActiveLayer::new(LayerKind::Logo, text.id))));
        assert!(state.active_layer.is_none());
        assert!(state.select_layer(Some(text)));
    }

    #[test]
    fn test_set_active_icon_only_for_icons() {
        let mut state = AppState::new();
        state.add_text_layer();
        let star = IconRef {
            class: "fa-solid fa-star".to_string(),
            unicode: "\u{f005}".to_string(),
            name: "star".to_string(),
        };
        assert!(!state.set_active_icon(star.clone()));
        state.add_icon_layer();
        assert!(state.set_active_icon(star));
    }

    #[test]
    fn test_recenter_free_layer() {
        let mut state = AppState::new();
        state.add_text_layer();
        if let Some(layer) = state.active_mut() {
            layer.base_mut().free_placement = true;
            layer.base_mut().position = Position::new(0.0, 0.0);
        }
        assert!(state.recenter_active_layer(1000.0, 500.0, &BlockGlyphs));

        // "New Text" at 48px: 8 * 28.8 = 230.4 wide, 48 high
        let pos = state.active().unwrap().base().position;
        assert!((pos.x - (1000.0 - 230.4) / 2.0 / 1000.0).abs() < 1e-5);
        assert!((pos.y - (500.0 - 48.0) / 2.0 / 500.0).abs() < 1e-5);
    }

    #[test]
    fn test_recenter_ignores_anchor_layers() {
        let mut state = AppState::new();
        state.add_text_layer();
        assert!(!state.recenter_active_layer(1000.0, 500.0, &BlockGlyphs));
        assert_eq!(state.active().unwrap().base().position, Position::center());
    }

    #[test]
    fn test_add_images_dedupes_and_probes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        RgbaImage::new(30, 20).save(&a).unwrap();
        let broken = dir.path().join("b.jpg");
        std::fs::write(&broken, b"junk").unwrap();

        let mut state = AppState::new();
        assert_eq!(state.add_images([&a, &broken, &a]), 2);
        assert_eq!(state.add_images([&a]), 0);
        assert_eq!(state.images[0].original_width, 30);
        assert_eq!(state.images[1].name, "b.jpg");
        assert_eq!((state.images[1].original_width, state.images[1].original_height), (0, 0));

        state.clear_images();
        assert!(state.images.is_empty());
    }
}
