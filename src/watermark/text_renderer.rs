//! Text and icon layer drawing.
//!
//! Layers are drawn in the coordinate frame of their bounding box: the origin
//! is moved to the box center and rotated, then each line is laid out
//! relative to that center. Glyph outlines come from the [`GlyphSource`], so
//! what is drawn always matches what [`bounding_box`](super::bbox::bounding_box)
//! measured.

use super::bbox::{measure_text_block, TextBlock};
use super::color::{parse_hex_color, Color};
use super::fonts::GlyphSource;
use super::geometry::Rect;
use super::model::{GradientDirection, IconLayer, TextAlign, TextLayer};
use super::surface::{blank_pixmap, to_pixmap};
use super::WatermarkError;
use image::{Rgba, RgbaImage};
use tiny_skia::{
    FillRule, GradientStop, LinearGradient, Paint, Pixmap, PixmapPaint, Point, SpreadMode, Stroke,
    Transform,
};

/// Shadow offset in surface pixels, unaffected by layer rotation.
const SHADOW_OFFSET: i32 = 2;

/// Draw a text layer whose box has already been computed.
pub fn draw_text_layer(
    pixmap: &mut Pixmap,
    layer: &TextLayer,
    rect: Rect,
    glyphs: &dyn GlyphSource,
) -> Result<(), WatermarkError> {
    if rect.is_empty() || layer.font_size <= 0.0 {
        return Ok(());
    }

    let block = measure_text_block(layer, glyphs);
    let (cx, cy) = rect.center();
    let placement = Transform::from_translate(cx, cy).pre_rotate(layer.base.rotation);

    if !layer.shadow.enabled {
        return draw_lines(pixmap, placement, layer, &block, glyphs);
    }

    let shadow_color = parse_hex_color(&layer.shadow.color)?;
    let sigma = (layer.shadow.blur / 2.0).max(0.0);
    let margin = layer.stroke.width.max(0.0) + sigma * 3.0 + layer.font_size * 0.25 + 2.0;
    let Some((ox, oy, w, h)) = rotated_region(
        rect,
        layer.base.rotation,
        margin,
        pixmap.width(),
        pixmap.height(),
    ) else {
        return Ok(());
    };

    let mut layer_pixmap = blank_pixmap(w, h)?;
    let local = Transform::from_translate(-(ox as f32), -(oy as f32)).pre_concat(placement);
    draw_lines(&mut layer_pixmap, local, layer, &block, glyphs)?;

    let shadow = shadow_of(&layer_pixmap, shadow_color, sigma)?;
    let paint = PixmapPaint::default();
    pixmap.draw_pixmap(
        ox + SHADOW_OFFSET,
        oy + SHADOW_OFFSET,
        shadow.as_ref(),
        &paint,
        Transform::identity(),
        None,
    );
    pixmap.draw_pixmap(ox, oy, layer_pixmap.as_ref(), &paint, Transform::identity(), None);
    Ok(())
}

fn draw_lines(
    pixmap: &mut Pixmap,
    placement: Transform,
    layer: &TextLayer,
    block: &TextBlock,
    glyphs: &dyn GlyphSource,
) -> Result<(), WatermarkError> {
    let opacity = layer.base.opacity;
    let fill = parse_hex_color(&layer.color)?;
    let gradient_end = if layer.gradient.enabled {
        Some(parse_hex_color(&layer.gradient.color)?)
    } else {
        None
    };
    let stroke_color = if layer.stroke.enabled && layer.stroke.width > 0.0 {
        Some(parse_hex_color(&layer.stroke.color)?)
    } else {
        None
    };

    let ascent = glyphs.ascent(&block.style);
    let top = -block.height / 2.0;

    for (i, (line, line_w)) in layer.lines().zip(&block.line_widths).enumerate() {
        let offset = match layer.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (block.width - line_w) / 2.0,
            TextAlign::Right => block.width - line_w,
        };
        let line_x = -block.width / 2.0 + offset;
        let line_y = top + i as f32 * block.line_advance;

        let Some(path) = glyphs.line_path(&block.style, line, line_x, line_y + ascent) else {
            continue;
        };

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(fill.to_skia(opacity));
        if let Some(end) = gradient_end {
            let (start_pt, end_pt) = match layer.gradient.direction {
                GradientDirection::Vertical => (
                    Point::from_xy(0.0, line_y),
                    Point::from_xy(0.0, line_y + layer.font_size),
                ),
                GradientDirection::Horizontal => (
                    Point::from_xy(line_x, 0.0),
                    Point::from_xy(line_x + line_w, 0.0),
                ),
            };
            if let Some(shader) = two_stop_gradient(start_pt, end_pt, fill, end, opacity) {
                paint.shader = shader;
            }
        }
        pixmap.fill_path(&path, &paint, FillRule::Winding, placement, None);

        if let Some(color) = stroke_color {
            let mut stroke_paint = Paint::default();
            stroke_paint.anti_alias = true;
            stroke_paint.set_color(color.to_skia(opacity));
            let stroke = Stroke {
                width: layer.stroke.width,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &stroke_paint, &stroke, placement, None);
        }
    }

    Ok(())
}

fn two_stop_gradient(
    start: Point,
    end: Point,
    from: Color,
    to: Color,
    opacity: f32,
) -> Option<tiny_skia::Shader<'static>> {
    LinearGradient::new(
        start,
        end,
        vec![
            GradientStop::new(0.0, from.to_skia(opacity)),
            GradientStop::new(1.0, to.to_skia(opacity)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    )
}

/// Integer region covering `rect` rotated about its center, grown by
/// `margin` and clipped to the surface.
fn rotated_region(
    rect: Rect,
    rotation: f32,
    margin: f32,
    surface_w: u32,
    surface_h: u32,
) -> Option<(i32, i32, u32, u32)> {
    let (cx, cy) = rect.center();
    let (sin, cos) = rotation.to_radians().sin_cos();
    let half_w = (rect.w / 2.0 * cos).abs() + (rect.h / 2.0 * sin).abs() + margin;
    let half_h = (rect.w / 2.0 * sin).abs() + (rect.h / 2.0 * cos).abs() + margin;

    let x0 = (cx - half_w).floor().max(0.0);
    let y0 = (cy - half_h).floor().max(0.0);
    let x1 = (cx + half_w).ceil().min(surface_w as f32);
    let y1 = (cy + half_h).ceil().min(surface_h as f32);
    if !(x1 > x0 && y1 > y0) {
        return None;
    }
    Some((x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Tint the coverage of `layer` with `color` and blur it.
fn shadow_of(layer: &Pixmap, color: Color, sigma: f32) -> Result<Pixmap, WatermarkError> {
    let mut tinted = RgbaImage::new(layer.width(), layer.height());
    for (dst, src) in tinted.pixels_mut().zip(layer.pixels()) {
        let alpha = (src.alpha() as u32 * color.a as u32 + 127) / 255;
        *dst = Rgba([color.r, color.g, color.b, alpha as u8]);
    }
    if sigma > 0.0 {
        tinted = image::imageops::blur(&tinted, sigma);
    }
    to_pixmap(&tinted)
}

/// Draw an icon glyph centered in its box.
pub fn draw_icon_layer(
    pixmap: &mut Pixmap,
    layer: &IconLayer,
    rect: Rect,
    glyphs: &dyn GlyphSource,
) -> Result<(), WatermarkError> {
    if rect.is_empty() {
        return Ok(());
    }
    let color = parse_hex_color(&layer.color)?;
    let style = layer.icon.font_style(layer.size);
    let extent = glyphs.ink_extent(&style, &layer.icon.unicode);

    // Ink spans [baseline - ascent, baseline + descent]; center it on 0
    let baseline = (extent.ascent - extent.descent) / 2.0;
    let Some(path) = glyphs.line_path(&style, &layer.icon.unicode, -extent.advance / 2.0, baseline) else {
        return Ok(());
    };

    let (cx, cy) = rect.center();
    let placement = Transform::from_translate(cx, cy).pre_rotate(layer.base.rotation);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(color.to_skia(layer.base.opacity));
    pixmap.fill_path(&path, &paint, FillRule::Winding, placement, None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::fonts::test_support::BlockGlyphs;

    fn text(content: &str) -> TextLayer {
        let mut t = TextLayer::new(1);
        t.content = content.to_string();
        t.font_size = 20.0;
        t.line_height = 1.0;
        t.base.opacity = 1.0;
        t
    }

    fn placed(layer: &TextLayer, x: f32, y: f32) -> Rect {
        let block = measure_text_block(layer, &BlockGlyphs);
        Rect::new(x, y, block.width, block.height)
    }

    #[test]
    fn test_text_draws_inside_box() {
        let mut pixmap = Pixmap::new(100, 60).unwrap();
        let layer = text("ab");
        let rect = placed(&layer, 10.0, 10.0);
        draw_text_layer(&mut pixmap, &layer, rect, &BlockGlyphs).unwrap();

        // First block glyph covers x 10..20, y from baseline - 14
        assert_eq!(pixmap.pixel(12, 20).unwrap().alpha(), 255);
        assert_eq!(pixmap.pixel(80, 20).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(12, 55).unwrap().alpha(), 0);
    }

    #[test]
    fn test_right_align_shifts_short_lines() {
        let mut pixmap = Pixmap::new(100, 80).unwrap();
        let mut layer = text("abcd\nab");
        layer.align = TextAlign::Right;
        let rect = placed(&layer, 0.0, 0.0);
        draw_text_layer(&mut pixmap, &layer, rect, &BlockGlyphs).unwrap();

        // Line 2 has two glyphs at x 24..34 and 36..46; nothing at 0..12
        assert_eq!(pixmap.pixel(2, 30).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(40, 30).unwrap().alpha(), 255);
    }

    #[test]
    fn test_gradient_changes_color_down_the_line() {
        let mut pixmap = Pixmap::new(60, 40).unwrap();
        let mut layer = text("a");
        layer.font_size = 30.0;
        layer.color = "#FF0000".to_string();
        layer.gradient.enabled = true;
        layer.gradient.color = "#0000FF".to_string();
        let rect = placed(&layer, 0.0, 0.0);
        draw_text_layer(&mut pixmap, &layer, rect, &BlockGlyphs).unwrap();

        let upper = pixmap.pixel(5, 4).unwrap();
        let lower = pixmap.pixel(5, 25).unwrap();
        assert!(upper.red() > lower.red());
        assert!(upper.blue() < lower.blue());
    }

    #[test]
    fn test_shadow_darkens_offset_area() {
        let mut pixmap = Pixmap::new(80, 60).unwrap();
        pixmap.fill(tiny_skia::Color::WHITE);
        let mut layer = text("a");
        layer.color = "#FFFFFF".to_string();
        layer.shadow.enabled = true;
        layer.shadow.blur = 0.0;
        let rect = placed(&layer, 20.0, 20.0);
        draw_text_layer(&mut pixmap, &layer, rect, &BlockGlyphs).unwrap();

        // Glyph covers x 20..30; its shadow spills to x 30..32
        assert!(pixmap.pixel(31, 30).unwrap().red() < 50);
        assert_eq!(pixmap.pixel(25, 30).unwrap().red(), 255);
    }

    #[test]
    fn test_empty_box_draws_nothing() {
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let layer = text("");
        draw_text_layer(&mut pixmap, &layer, placed(&layer, 0.0, 0.0), &BlockGlyphs).unwrap();
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_invalid_text_color_is_error() {
        let mut pixmap = Pixmap::new(40, 40).unwrap();
        let mut layer = text("a");
        layer.color = "red".to_string();
        let rect = placed(&layer, 0.0, 0.0);
        assert!(draw_text_layer(&mut pixmap, &layer, rect, &BlockGlyphs).is_err());
    }

    #[test]
    fn test_icon_centered_in_box() {
        let mut pixmap = Pixmap::new(100, 100).unwrap();
        let mut icon = IconLayer::new(1);
        icon.size = 20.0;
        icon.base.opacity = 1.0;
        // BlockGlyphs: advance 12, ink 14 above and 4 below the baseline
        let rect = Rect::new(44.0, 41.0, 12.0, 18.0);
        draw_icon_layer(&mut pixmap, &icon, rect, &BlockGlyphs).unwrap();

        assert_eq!(pixmap.pixel(48, 50).unwrap().alpha(), 255);
        assert_eq!(pixmap.pixel(48, 38).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(60, 50).unwrap().alpha(), 0);
    }

    #[test]
    fn test_rotated_region_clips_to_surface() {
        let r = rotated_region(Rect::new(-50.0, -50.0, 60.0, 60.0), 0.0, 0.0, 100, 100).unwrap();
        assert_eq!(r, (0, 0, 10, 10));
        assert!(rotated_region(Rect::new(200.0, 200.0, 10.0, 10.0), 45.0, 1.0, 100, 100).is_none());
    }
}
