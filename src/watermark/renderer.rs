//! Composite renderer.
//!
//! [`compose`] bakes a settings snapshot into a copy of the source bitmap at
//! its native resolution. Stages run in a fixed order, each gated by its own
//! switch:
//!
//! 1. pixel effects
//! 2. frame
//! 3. pattern
//! 4. tile
//! 5. text layers, then logo layers, then icon layers, each in collection order
//!
//! [`render_composite`] then applies the single resize and encodes.

use super::bbox::bounding_box;
use super::effects::apply_effects;
use super::fonts::GlyphSource;
use super::frame::draw_frame;
use super::geometry::resolved_output_size;
use super::logo_cache::{draw_logo, LogoCache};
use super::model::{ActiveLayer, Layer, LayerKind, Settings};
use super::pattern::draw_pattern;
use super::surface::{from_pixmap, to_pixmap};
use super::text_renderer::{draw_icon_layer, draw_text_layer};
use super::tile::{draw_tile, tile_logo};
use super::WatermarkError;
use crate::imaging::{encode_rgba, resize_rgba, EncodedImage};
use image::RgbaImage;
use tiny_skia::Pixmap;

/// Shared lookups needed to measure and draw layers.
#[derive(Clone, Copy)]
pub struct RenderResources<'a> {
    pub glyphs: &'a dyn GlyphSource,
    pub logos: &'a LogoCache,
}

impl<'a> RenderResources<'a> {
    pub fn new(glyphs: &'a dyn GlyphSource, logos: &'a LogoCache) -> Self {
        Self { glyphs, logos }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    /// Fixed noise seed; a time-derived seed is used when unset
    pub noise_seed: Option<u32>,
    /// Editor selection, consulted when the tile picks a logo
    pub active_layer: Option<ActiveLayer>,
}

impl RenderOptions {
    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    pub fn with_active_layer(mut self, active: Option<ActiveLayer>) -> Self {
        self.active_layer = active;
        self
    }

    fn resolved_seed(&self) -> u32 {
        self.noise_seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp_subsec_nanos())
    }
}

/// Render every enabled stage onto a copy of `source`.
pub fn compose(
    source: &RgbaImage,
    settings: &Settings,
    resources: &RenderResources<'_>,
    options: &RenderOptions,
) -> Result<RgbaImage, WatermarkError> {
    let mut working = source.clone();

    if settings.effects_enabled {
        apply_effects(&mut working, &settings.effects, options.resolved_seed());
    }

    let mut pixmap = to_pixmap(&working)?;
    draw_overlays(&mut pixmap, settings, resources, options)?;
    Ok(from_pixmap(&pixmap))
}

fn draw_overlays(
    pixmap: &mut Pixmap,
    settings: &Settings,
    resources: &RenderResources<'_>,
    options: &RenderOptions,
) -> Result<(), WatermarkError> {
    if settings.frame.enabled {
        draw_frame(pixmap, &settings.frame)?;
    }
    if settings.pattern.enabled {
        draw_pattern(pixmap, &settings.pattern)?;
    }
    if settings.tile.enabled {
        let logo = if settings.tile.use_logo {
            tile_logo(settings, options.active_layer, resources.logos)
        } else {
            None
        };
        draw_tile(pixmap, &settings.tile, logo, resources.glyphs)?;
    }

    let surface_w = pixmap.width() as f32;
    let surface_h = pixmap.height() as f32;

    for kind in LayerKind::ORDER {
        if !settings.group_enabled(kind) {
            continue;
        }
        for layer in settings.layers_of(kind).filter(|l| l.base().enabled) {
            let Some(rect) = bounding_box(layer, surface_w, surface_h, resources) else {
                continue;
            };
            match layer {
                Layer::Text(text) => draw_text_layer(pixmap, text, rect, resources.glyphs)?,
                Layer::Logo(logo) => {
                    if let Some(bitmap) = resources.logos.get(&logo.path) {
                        draw_logo(pixmap, bitmap, rect, logo.base.rotation, logo.base.opacity);
                    }
                }
                Layer::Icon(icon) => draw_icon_layer(pixmap, icon, rect, resources.glyphs)?,
            }
        }
    }

    Ok(())
}

/// Compose, resize per the output policy, and encode.
pub fn render_composite(
    source: &RgbaImage,
    settings: &Settings,
    resources: &RenderResources<'_>,
    options: &RenderOptions,
) -> Result<EncodedImage, WatermarkError> {
    let composed = compose(source, settings, resources, options)?;

    let (w, h) = composed.dimensions();
    let (target_w, target_h) = resolved_output_size(w, h, &settings.output.resize);
    let output = if (target_w, target_h) == (w, h) {
        composed
    } else {
        tracing::debug!(from_w = w, from_h = h, to_w = target_w, to_h = target_h, "Resizing output");
        resize_rgba(&composed, target_w, target_h)?
    };

    Ok(encode_rgba(
        &output,
        settings.output.format,
        settings.output.quality,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{decode_image, OutputFormat};
    use crate::watermark::fonts::test_support::BlockGlyphs;
    use crate::watermark::geometry::{Position, ResizeMode, ResizePolicy};
    use crate::watermark::model::{IconLayer, LogoLayer, TextLayer};
    use image::Rgba;

    fn source() -> RgbaImage {
        RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]))
    }

    fn text_at(x: f32, y: f32) -> Layer {
        let mut t = TextLayer::new(1);
        t.content = "hi".to_string();
        t.font_size = 20.0;
        t.base.opacity = 1.0;
        t.base.free_placement = true;
        t.base.position = Position::new(x, y);
        Layer::Text(t)
    }

    #[test]
    fn test_compose_without_layers_is_identity() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let out = compose(&source(), &Settings::default(), &resources, &RenderOptions::default()).unwrap();
        assert_eq!(out, source());
    }

    #[test]
    fn test_disabled_group_skips_layers() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();
        settings.layers.push(text_at(0.1, 0.1));

        let drawn = compose(&source(), &settings, &resources, &RenderOptions::default()).unwrap();
        assert_ne!(drawn, source());

        settings.texts_enabled = false;
        let skipped = compose(&source(), &settings, &resources, &RenderOptions::default()).unwrap();
        assert_eq!(skipped, source());
    }

    #[test]
    fn test_disabled_layer_skipped() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();
        let mut layer = text_at(0.1, 0.1);
        layer.base_mut().enabled = false;
        settings.layers.push(layer);
        let out = compose(&source(), &settings, &resources, &RenderOptions::default()).unwrap();
        assert_eq!(out, source());
    }

    #[test]
    fn test_icons_draw_over_text() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();

        let mut icon = IconLayer::new(2);
        icon.size = 40.0;
        icon.color = "#00FF00".to_string();
        icon.base.opacity = 1.0;
        icon.base.position = Position::center();
        // Icon pushed first; type order still draws it last
        settings.layers.push(Layer::Icon(icon));

        let mut text = TextLayer::new(1);
        text.content = "mmmmmmmm".to_string();
        text.font_size = 40.0;
        text.color = "#FF0000".to_string();
        text.base.opacity = 1.0;
        settings.layers.push(Layer::Text(text));

        let out = compose(&source(), &settings, &resources, &RenderOptions::default()).unwrap();
        let center = out.get_pixel(100, 50);
        assert_eq!(center[1], 255);
        assert_eq!(center[0], 0);
    }

    #[test]
    fn test_unloaded_logo_is_skipped() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();
        settings.layers.push(Layer::Logo(LogoLayer::new(5, "x", "/nope.png")));
        let out = compose(&source(), &settings, &resources, &RenderOptions::default()).unwrap();
        assert_eq!(out, source());
    }

    #[test]
    fn test_effects_gated_by_group_switch() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();
        settings.effects.brightness = 2.0;
        let src = RgbaImage::from_pixel(4, 4, Rgba([50, 50, 50, 255]));

        let out = compose(&src, &settings, &resources, &RenderOptions::default()).unwrap();
        assert_eq!(out.get_pixel(0, 0)[0], 50);

        settings.effects_enabled = true;
        let out = compose(&src, &settings, &resources, &RenderOptions::default()).unwrap();
        assert_eq!(out.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_render_composite_resizes_last() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();
        settings.output.format = OutputFormat::Png;
        settings.output.resize = ResizePolicy {
            mode: ResizeMode::Fit,
            width: 100,
            height: 100,
        };

        let encoded = render_composite(&source(), &settings, &resources, &RenderOptions::default()).unwrap();
        assert_eq!((encoded.width, encoded.height), (100, 50));
        let decoded = decode_image(&encoded.data).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[test]
    fn test_render_is_deterministic_with_seed() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();
        settings.output.format = OutputFormat::Png;
        settings.effects_enabled = true;
        settings.effects.noise.enabled = true;
        settings.layers.push(text_at(0.2, 0.3));
        let options = RenderOptions::default().with_noise_seed(9);

        let a = render_composite(&source(), &settings, &resources, &options).unwrap();
        let b = render_composite(&source(), &settings, &resources, &options).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_invalid_layer_color_fails_render() {
        let logos = LogoCache::new();
        let resources = RenderResources::new(&BlockGlyphs, &logos);
        let mut settings = Settings::default();
        let mut layer = text_at(0.1, 0.1);
        if let Layer::Text(t) = &mut layer {
            t.color = "nope".to_string();
        }
        settings.layers.push(layer);
        assert!(matches!(
            compose(&source(), &settings, &resources, &RenderOptions::default()),
            Err(WatermarkError::InvalidColor { .. })
        ));
    }
}
