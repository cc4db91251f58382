//! Tile stage.
//!
//! Repeats either a logo bitmap or a line of text over the whole surface on
//! a staggered grid rotated about the surface center. The grid covers the
//! rotated bounding rectangle of the surface so corners stay filled at any
//! angle.

use super::color::parse_hex_color;
use super::fonts::{FontStyle, GlyphSource};
use super::model::{ActiveLayer, LayerKind, Settings, TileSettings};
use super::logo_cache::LogoCache;
use super::WatermarkError;
use tiny_skia::{BlendMode, FillRule, FilterQuality, Paint, Pixmap, PixmapPaint, Transform};

/// Upper bound on drawn items, guarding against near-zero steps.
const MAX_TILE_ITEMS: usize = 200_000;

/// Logo bitmap the tile uses when `use_logo` is set: the active logo layer
/// if it is enabled and loaded, otherwise the first enabled loaded logo.
pub fn tile_logo<'a>(
    settings: &Settings,
    active: Option<ActiveLayer>,
    logos: &'a LogoCache,
) -> Option<&'a Pixmap> {
    let usable = |logo: &&crate::watermark::model::LogoLayer| {
        logo.base.enabled && logos.contains(&logo.path)
    };

    let active_logo = active
        .filter(|a| a.kind == LayerKind::Logo)
        .and_then(|a| settings.logos().filter(usable).find(|l| l.base.id == a.id));

    active_logo
        .or_else(|| settings.logos().find(usable))
        .and_then(|logo| logos.get(&logo.path))
}

/// Grid origins, in the rotated frame centered on the surface.
pub fn tile_positions(
    surface_w: f32,
    surface_h: f32,
    item_w: f32,
    item_h: f32,
    spacing: f32,
    rotation: f32,
) -> Vec<(f32, f32)> {
    let step_x = item_w + spacing;
    let step_y = item_h + spacing;
    if !(step_x > 0.0 && step_y > 0.0) {
        return Vec::new();
    }

    let (sin, cos) = rotation.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let rotated_w = surface_w * cos + surface_h * sin;
    let rotated_h = surface_w * sin + surface_h * cos;

    let estimate = ((rotated_w / step_x + 2.0) * (rotated_h / step_y + 1.0)) as usize;
    if estimate > MAX_TILE_ITEMS {
        tracing::warn!(step_x, step_y, estimate, "Tile grid too dense; skipping tile");
        return Vec::new();
    }

    let mut positions = Vec::with_capacity(estimate);
    let mut row = 0usize;
    let mut y = -rotated_h / 2.0;
    while y < rotated_h / 2.0 {
        let offset = if row % 2 == 1 { step_x / 2.0 } else { 0.0 };
        let mut x = -rotated_w / 2.0 + offset;
        while x < rotated_w / 2.0 {
            positions.push((x, y));
            x += step_x;
        }
        y += step_y;
        row += 1;
    }
    positions
}

/// Draw the tile grid. `logo` is the bitmap chosen by [`tile_logo`].
pub fn draw_tile(
    pixmap: &mut Pixmap,
    tile: &TileSettings,
    logo: Option<&Pixmap>,
    glyphs: &dyn GlyphSource,
) -> Result<(), WatermarkError> {
    if tile.use_logo && logo.is_none() {
        return Ok(());
    }

    let style = FontStyle::new(&tile.font_family, tile.font_size);
    let item_h = tile.font_size;
    let item_w = match logo {
        Some(bitmap) if tile.use_logo => bitmap.width() as f32 * (item_h / bitmap.height() as f32),
        _ => glyphs.line_width(&style, &tile.content),
    };

    let w = pixmap.width() as f32;
    let h = pixmap.height() as f32;
    let positions = tile_positions(w, h, item_w, item_h, tile.spacing, tile.rotation);
    if positions.is_empty() {
        return Ok(());
    }
    let grid = Transform::from_translate(w / 2.0, h / 2.0).pre_rotate(tile.rotation);
    let opacity = tile.opacity.clamp(0.0, 1.0);

    match logo {
        Some(bitmap) if tile.use_logo => {
            let paint = PixmapPaint {
                opacity,
                blend_mode: BlendMode::SourceOver,
                quality: FilterQuality::Bilinear,
            };
            let scale = item_h / bitmap.height() as f32;
            for (x, y) in positions {
                let transform = grid
                    .pre_translate(x - item_w / 2.0, y - item_h / 2.0)
                    .pre_scale(scale, scale);
                pixmap.draw_pixmap(0, 0, bitmap.as_ref(), &paint, transform, None);
            }
        }
        _ => {
            let color = parse_hex_color(&tile.color)?;
            // Text is centered on each grid point, vertically by the em box
            let baseline = -item_h / 2.0 + glyphs.ascent(&style);
            let Some(path) = glyphs.line_path(&style, &tile.content, -item_w / 2.0, baseline) else {
                return Ok(());
            };
            let mut paint = Paint::default();
            paint.anti_alias = true;
            paint.set_color(color.to_skia(opacity));
            for (x, y) in positions {
                pixmap.fill_path(&path, &paint, FillRule::Winding, grid.pre_translate(x, y), None);
            }
        }
    }

    Ok(())
}
