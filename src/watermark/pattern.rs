//! Pattern stage.
//!
//! Draws a small swatch for the selected [`PatternKind`] and repeats it over
//! the whole surface at the pattern opacity.

use super::color::parse_hex_color;
use super::model::{PatternKind, PatternSettings};
use super::surface::blank_pixmap;
use super::WatermarkError;
use tiny_skia::{
    FillRule, FilterQuality, Paint, PathBuilder, Pattern, Pixmap, Rect, SpreadMode, Stroke,
    Transform,
};

/// Fill the surface with the repeated pattern swatch.
pub fn draw_pattern(pixmap: &mut Pixmap, settings: &PatternSettings) -> Result<(), WatermarkError> {
    let Some(swatch) = pattern_swatch(settings)? else {
        return Ok(());
    };

    let mut paint = Paint::default();
    paint.shader = Pattern::new(
        swatch.as_ref(),
        SpreadMode::Repeat,
        FilterQuality::Nearest,
        settings.opacity.clamp(0.0, 1.0),
        Transform::identity(),
    );

    if let Some(rect) = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32) {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
    Ok(())
}

/// Swatch pixel dimensions for a pattern kind at cell size `s`.
pub fn swatch_size(kind: PatternKind, s: f32) -> (u32, u32) {
    let (w, h) = match kind {
        PatternKind::Checker | PatternKind::Dots => (s * 2.0, s * 2.0),
        PatternKind::Honeycomb => (s * 3.0, s * 1.732),
        PatternKind::Zigzag | PatternKind::Bricks | PatternKind::Waves => (s * 2.0, s),
        PatternKind::Lines
        | PatternKind::Cross
        | PatternKind::Vlines
        | PatternKind::Hlines
        | PatternKind::Triangles => (s, s),
    };
    (truncate_dim(w), truncate_dim(h))
}

fn truncate_dim(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 {
        v as u32
    } else {
        0
    }
}

/// Render one swatch, `None` when the cell size yields an empty swatch.
pub fn pattern_swatch(settings: &PatternSettings) -> Result<Option<Pixmap>, WatermarkError> {
    let (sw, sh) = swatch_size(settings.kind, settings.size);
    if sw == 0 || sh == 0 {
        return Ok(None);
    }

    let c1 = parse_hex_color(&settings.color1)?;
    let mut swatch = blank_pixmap(sw, sh)?;
    let s = settings.size;

    let mut paint = Paint::default();
    paint.set_color(c1.to_skia(1.0));
    paint.anti_alias = true;

    let line = |width: f32| Stroke {
        width: width.max(1.0),
        ..Default::default()
    };
    let id = Transform::identity();

    match settings.kind {
        PatternKind::Checker => {
            let c2 = parse_hex_color(&settings.color2)?;
            let mut second = Paint::default();
            second.set_color(c2.to_skia(1.0));
            for (x, y, p) in [(0.0, 0.0, &paint), (s, s, &paint), (s, 0.0, &second), (0.0, s, &second)] {
                if let Some(rect) = Rect::from_xywh(x, y, s, s) {
                    swatch.fill_rect(rect, p, id, None);
                }
            }
        }
        PatternKind::Lines => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, s);
            pb.line_to(s, 0.0);
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 5.0), id, None);
            }
        }
        PatternKind::Dots => {
            let mut pb = PathBuilder::new();
            pb.push_circle(s / 2.0, s / 2.0, s / 3.0);
            pb.push_circle(s * 1.5, s * 1.5, s / 3.0);
            if let Some(path) = pb.finish() {
                swatch.fill_path(&path, &paint, FillRule::Winding, id, None);
            }
        }
        PatternKind::Cross => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, s);
            pb.line_to(s, 0.0);
            pb.move_to(0.0, 0.0);
            pb.line_to(s, s);
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 5.0), id, None);
            }
        }
        PatternKind::Honeycomb => {
            let mut pb = PathBuilder::new();
            for i in 0..2 {
                for j in 0..2 {
                    let cx = (i as f32 * 1.5 + j as f32 * 1.5) * s;
                    let cy = j as f32 * s * 1.732 / 2.0;
                    for k in 0..=6 {
                        let angle = k as f32 * std::f32::consts::PI / 3.0;
                        let (x, y) = (cx + s * angle.cos(), cy + s * angle.sin());
                        if k == 0 {
                            pb.move_to(x, y);
                        } else {
                            pb.line_to(x, y);
                        }
                    }
                }
            }
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 10.0), id, None);
            }
        }
        PatternKind::Zigzag => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, s / 2.0);
            pb.line_to(s / 2.0, 0.0);
            pb.line_to(s, s / 2.0);
            pb.line_to(s * 1.5, 0.0);
            pb.line_to(s * 2.0, s / 2.0);
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 8.0), id, None);
            }
        }
        PatternKind::Vlines => {
            let mut pb = PathBuilder::new();
            pb.move_to(s / 2.0, 0.0);
            pb.line_to(s / 2.0, s);
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 5.0), id, None);
            }
        }
        PatternKind::Hlines => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, s / 2.0);
            pb.line_to(s, s / 2.0);
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 5.0), id, None);
            }
        }
        PatternKind::Bricks => {
            let mut pb = PathBuilder::new();
            for (x, y) in [(0.5, 0.5), (s + 0.5, s / 2.0 + 0.5)] {
                if let Some(rect) = Rect::from_xywh(x, y, s - 1.0, s / 2.0 - 1.0) {
                    pb.push_rect(rect);
                }
            }
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 10.0), id, None);
            }
        }
        PatternKind::Triangles => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, 0.0);
            pb.line_to(s, 0.0);
            pb.line_to(s / 2.0, s);
            pb.close();
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 10.0), id, None);
            }
        }
        PatternKind::Waves => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, s / 2.0);
            pb.cubic_to(s / 2.0, 0.0, s / 2.0, s, s, s / 2.0);
            pb.cubic_to(s * 1.5, 0.0, s * 1.5, s, s * 2.0, s / 2.0);
            if let Some(path) = pb.finish() {
                swatch.stroke_path(&path, &paint, &line(s / 8.0), id, None);
            }
        }
    }

    Ok(Some(swatch))
}
