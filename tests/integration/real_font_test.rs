// Icon and text layers measured and drawn through FontBook with an installed font

use firemark::editor::hit_test;
use firemark::watermark::icons::ICON_FAMILY_SOLID;
use firemark::watermark::{
    bounding_box, compose, ActiveLayer, FontBook, FontStyle, GlyphSource, IconLayer, Layer, LayerKind,
    LogoCache, Position, RenderOptions, RenderResources, Settings,
};
use image::{Rgba, RgbaImage};
use std::path::PathBuf;

fn installed_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

/// A font book that serves the icon family from an ordinary TTF, which
/// carries the default copyright glyph.
fn icon_font_book() -> Option<FontBook> {
    let path = installed_font()?;
    let mut book = FontBook::new();
    book.register_file(ICON_FAMILY_SOLID, path);
    Some(book)
}

fn icon_layer() -> IconLayer {
    let mut icon = IconLayer::new(1);
    icon.base.opacity = 1.0;
    icon.base.free_placement = true;
    icon.base.position = Position::new(0.25, 0.25);
    icon
}

#[test]
fn test_icon_ink_extent_is_positive() {
    let Some(book) = icon_font_book() else {
        eprintln!("no installed TTF; skipping");
        return;
    };
    let icon = icon_layer();
    let ink = book.ink_extent(&icon.icon.font_style(icon.size), &icon.icon.unicode);

    assert!(ink.advance > 0.0);
    assert!(ink.ascent > 0.0, "{ink:?}");
    assert!(ink.height() > 0.0, "{ink:?}");
    assert!(ink.height() <= icon.size * 1.5);
}

#[test]
fn test_icon_layer_is_drawn_inside_its_box() {
    let Some(book) = icon_font_book() else {
        eprintln!("no installed TTF; skipping");
        return;
    };
    let logos = LogoCache::new();
    let resources = RenderResources::new(&book, &logos);
    let layer = Layer::Icon(icon_layer());

    let rect = bounding_box(&layer, 400.0, 300.0, &resources).unwrap();
    assert!(!rect.is_empty(), "{rect:?}");
    assert_eq!((rect.x, rect.y), (100.0, 75.0));

    let mut settings = Settings::default();
    settings.layers.push(layer);
    let source = RgbaImage::from_pixel(400, 300, Rgba([0, 0, 0, 255]));
    let out = compose(&source, &settings, &resources, &RenderOptions::default()).unwrap();

    let mut inside = 0;
    let mut outside = 0;
    for (x, y, px) in out.enumerate_pixels() {
        if px == &Rgba([0, 0, 0, 255]) {
            continue;
        }
        if rect.contains(x as f32 + 0.5, y as f32 + 0.5) {
            inside += 1;
        } else {
            outside += 1;
        }
    }
    assert!(inside > 0);
    // Antialiasing may touch the pixel ring just outside the box
    assert!(outside < inside / 4, "inside {inside}, outside {outside}");
}

#[test]
fn test_icon_layer_is_hit_with_installed_font() {
    let Some(book) = icon_font_book() else {
        eprintln!("no installed TTF; skipping");
        return;
    };
    let logos = LogoCache::new();
    let resources = RenderResources::new(&book, &logos);
    let mut settings = Settings::default();
    settings.layers.push(Layer::Icon(icon_layer()));

    let rect = bounding_box(&settings.layers[0], 400.0, 300.0, &resources).unwrap();
    let (cx, cy) = rect.center();
    let (hit, hit_rect) = hit_test(&settings, &resources, 400.0, 300.0, cx, cy).unwrap();
    assert_eq!(hit, ActiveLayer::new(LayerKind::Icon, 1));
    assert_eq!(hit_rect, rect);
}

#[test]
fn test_text_line_width_matches_path_extent() {
    let Some(path) = installed_font() else {
        eprintln!("no installed TTF; skipping");
        return;
    };
    let mut book = FontBook::new();
    book.register_file("Body", path);
    let style = FontStyle::new("Body", 40.0);

    let width = book.line_width(&style, "WWWW");
    let outline = book.line_path(&style, "WWWW", 0.0, 50.0).unwrap();
    let bounds = outline.bounds();
    assert!(width > 0.0);
    assert!(bounds.right() <= width + 2.0);
    assert!(bounds.right() > width * 0.8);
}
