//! Bounding-box calculator.
//!
//! [`bounding_box`] is the one place layer boxes are computed. Rendering
//! uses it to place a layer and the editor uses it to hit-test and drag, so
//! the two can never disagree.

use super::fonts::{FontStyle, GlyphSource};
use super::geometry::{anchor_to_top_left, Rect};
use super::model::{IconLayer, Layer, LogoLayer, TextLayer};
use super::renderer::RenderResources;

/// Measured layout of a text layer, before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub style: FontStyle,
    pub line_widths: Vec<f32>,
    /// Widest line
    pub width: f32,
    /// `(lines - 1) * line_height * font_size + font_size`
    pub height: f32,
    /// Distance between consecutive line tops
    pub line_advance: f32,
}

pub fn measure_text_block(layer: &TextLayer, glyphs: &dyn GlyphSource) -> TextBlock {
    let style = FontStyle::text(&layer.font_family, layer.font_size, layer.bold, layer.italic);
    let line_widths: Vec<f32> = layer
        .lines()
        .map(|line| glyphs.line_width(&style, line))
        .collect();
    let width = line_widths.iter().copied().fold(0.0, f32::max);
    let line_advance = layer.font_size * layer.line_height;
    let height = (line_widths.len().saturating_sub(1)) as f32 * line_advance + layer.font_size;

    TextBlock {
        style,
        line_widths,
        width,
        height,
        line_advance,
    }
}

/// Pixel box of a layer on a `surface_w` x `surface_h` surface.
///
/// Returns `None` only for a logo whose bitmap is not loaded. Empty text
/// yields a zero-width box, which draws nothing and is never hit.
pub fn bounding_box(
    layer: &Layer,
    surface_w: f32,
    surface_h: f32,
    resources: &RenderResources<'_>,
) -> Option<Rect> {
    let (w, h) = match layer {
        Layer::Text(text) => text_size(text, resources.glyphs),
        Layer::Logo(logo) => logo_size(logo, surface_w, resources)?,
        Layer::Icon(icon) => icon_size(icon, resources.glyphs),
    };

    let base = layer.base();
    let (x, y) = anchor_to_top_left(
        base.position,
        surface_w,
        surface_h,
        w,
        h,
        base.padding,
        base.free_placement,
    );
    Some(Rect::new(x, y, w, h))
}

fn text_size(layer: &TextLayer, glyphs: &dyn GlyphSource) -> (f32, f32) {
    let block = measure_text_block(layer, glyphs);
    (block.width, block.height)
}

fn logo_size(layer: &LogoLayer, surface_w: f32, resources: &RenderResources<'_>) -> Option<(f32, f32)> {
    let (lw, lh) = resources.logos.dimensions(&layer.path)?;
    let w = surface_w * layer.size / 100.0;
    let h = lh as f32 * (w / lw as f32);
    Some((w, h))
}

fn icon_size(layer: &IconLayer, glyphs: &dyn GlyphSource) -> (f32, f32) {
    let extent = glyphs.ink_extent(&layer.icon.font_style(layer.size), &layer.icon.unicode);
    (extent.advance, extent.height())
}
