//! Font lookup, text measurement and glyph outlines.
//!
//! Everything that needs font metrics goes through the [`GlyphSource`] trait:
//! the bounding-box calculator measures with it and the renderers fill and
//! stroke the outlines it returns, so hit-testing and drawing always agree.
//!
//! [`FontBook`] is the system implementation. Families are resolved through
//! explicit font-file overrides first, then the platform font database
//! (font-kit), then a configured fallback family, then the platform's
//! generic sans-serif. Parsed faces are cached per family/weight/style.

use super::WatermarkError;
use ab_glyph::{Font, FontArc, FontVec, OutlineCurve, PxScale, ScaleFont};
use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::{Properties, Style, Weight};
use font_kit::source::SystemSource;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tiny_skia::PathBuilder;

/// Families offered when the platform font list is unavailable.
pub const BUILTIN_FONT_MENU: &[&str] = &[
    "Arial",
    "Courier New",
    "Georgia",
    "Helvetica",
    "Impact",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
];

/// A concrete face request at a pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    pub family: String,
    /// Pixels per em
    pub size: f32,
    /// CSS-style weight (400 regular, 700 bold, 900 black)
    pub weight: u16,
    pub italic: bool,
}

impl FontStyle {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: 400,
            italic: false,
        }
    }

    pub fn text(family: impl Into<String>, size: f32, bold: bool, italic: bool) -> Self {
        Self {
            weight: if bold { 700 } else { 400 },
            italic,
            ..Self::new(family, size)
        }
    }
}

/// Advance width plus the ink extent above and below the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InkExtent {
    pub advance: f32,
    /// Distance from the baseline up to the highest ink
    pub ascent: f32,
    /// Distance from the baseline down to the lowest ink
    pub descent: f32,
}

impl InkExtent {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Measurement and outline provider for text and icon glyphs.
#[cfg_attr(test, mockall::automock)]
pub trait GlyphSource {
    /// Advance width of one line of text.
    fn line_width(&self, style: &FontStyle, text: &str) -> f32;

    /// Advance width and ink extent of `text`.
    fn ink_extent(&self, style: &FontStyle, text: &str) -> InkExtent;

    /// Distance from the top of the em box to the baseline.
    fn ascent(&self, style: &FontStyle) -> f32;

    /// Outline of one line with its left edge at `x` and baseline at `baseline`.
    ///
    /// Returns `None` when the line has no ink or the font is unavailable.
    fn line_path(
        &self,
        style: &FontStyle,
        text: &str,
        x: f32,
        baseline: f32,
    ) -> Option<tiny_skia::Path>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    weight: u16,
    italic: bool,
}

/// Font database backed by font-kit with parsed faces cached.
pub struct FontBook {
    fallback_family: Option<String>,
    files: HashMap<String, PathBuf>,
    faces: Mutex<HashMap<FaceKey, Option<FontArc>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("fallback_family", &self.fallback_family)
            .field("files", &self.files)
            .field("cached_faces", &self.faces.lock().len())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self {
            fallback_family: None,
            files: HashMap::new(),
            faces: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_fallback_family(mut self, family: impl Into<String>) -> Self {
        self.fallback_family = Some(family.into());
        self
    }

    /// Serve `family` from a font file instead of the system database.
    pub fn register_file(&mut self, family: impl Into<String>, path: impl Into<PathBuf>) {
        self.files.insert(family.into(), path.into());
        self.faces.lock().clear();
    }

    /// Resolve a face, caching both hits and misses.
    pub fn face(&self, style: &FontStyle) -> Option<FontArc> {
        let key = FaceKey {
            family: style.family.clone(),
            weight: style.weight,
            italic: style.italic,
        };

        let mut faces = self.faces.lock();
        if let Some(cached) = faces.get(&key) {
            return cached.clone();
        }

        let resolved = self.resolve(&key);
        if resolved.is_none() {
            tracing::warn!(
                family = %key.family,
                weight = key.weight,
                italic = key.italic,
                "No usable font found; text in this family will not be drawn"
            );
        }
        faces.insert(key, resolved.clone());
        resolved
    }

    fn resolve(&self, key: &FaceKey) -> Option<FontArc> {
        if let Some(path) = self.files.get(&key.family) {
            match load_font_file(path) {
                Ok(font) => return Some(font),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Font file override failed"),
            }
        }

        let family = FamilyName::Title(key.family.clone());
        if let Some(font) = load_system_font(&[family], key.weight, key.italic) {
            return Some(font);
        }

        if let Some(fallback) = &self.fallback_family {
            tracing::debug!(requested = %key.family, fallback = %fallback, "Using fallback font family");
            let family = FamilyName::Title(fallback.clone());
            if let Some(font) = load_system_font(&[family], key.weight, key.italic) {
                return Some(font);
            }
        }

        load_system_font(&[FamilyName::SansSerif], key.weight, key.italic)
    }
}

/// Parse a font file (first face of a collection).
pub fn load_font_file(path: &Path) -> Result<FontArc, WatermarkError> {
    let data = std::fs::read(path)
        .map_err(|e| WatermarkError::FontError(format!("{}: {}", path.display(), e)))?;
    FontArc::try_from_vec(data)
        .map_err(|e| WatermarkError::FontError(format!("{}: {}", path.display(), e)))
}

/// Load the best system match for `families` at a CSS weight and style.
fn load_system_font(families: &[FamilyName], weight: u16, italic: bool) -> Option<FontArc> {
    let mut props = Properties::new();
    props.weight = Weight(weight as f32);
    if italic {
        props.style = Style::Italic;
    }

    let handle = SystemSource::new()
        .select_best_match(families, &props)
        .ok()?;

    let (bytes, index) = match handle {
        Handle::Path { path, font_index } => (std::fs::read(path).ok()?, font_index),
        Handle::Memory { bytes, font_index } => ((*bytes).clone(), font_index),
    };
    FontVec::try_from_vec_and_index(bytes, index)
        .ok()
        .map(FontArc::new)
}

/// Installed font families, deduplicated and sorted. Empty when the
/// platform database cannot be queried.
pub fn enumerate_font_families() -> Vec<String> {
    match SystemSource::new().all_families() {
        Ok(families) => normalize_families(families),
        Err(e) => {
            tracing::warn!(error = ?e, "Could not enumerate system fonts");
            Vec::new()
        }
    }
}

/// Families to offer in a font picker: the system list, or the built-in menu
/// when the system list is empty.
pub fn font_menu(system: Vec<String>) -> Vec<String> {
    let families = normalize_families(system);
    if families.is_empty() {
        BUILTIN_FONT_MENU.iter().map(|s| s.to_string()).collect()
    } else {
        families
    }
}

fn normalize_families(families: Vec<String>) -> Vec<String> {
    let mut families: Vec<String> = families
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty() && !f.starts_with('.'))
        .collect();
    families.sort();
    families.dedup();
    families
}

impl GlyphSource for FontBook {
    fn line_width(&self, style: &FontStyle, text: &str) -> f32 {
        let Some(font) = self.face(style) else {
            return 0.0;
        };
        let scaled = font.as_scaled(PxScale::from(style.size));

        let mut width = 0.0f32;
        let mut prev: Option<ab_glyph::GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn ink_extent(&self, style: &FontStyle, text: &str) -> InkExtent {
        let Some(font) = self.face(style) else {
            return InkExtent::default();
        };
        let scaled = font.as_scaled(PxScale::from(style.size));
        let vs = scaled.v_scale_factor();

        let mut top = f32::NEG_INFINITY;
        let mut bottom = f32::INFINITY;
        for c in text.chars() {
            if let Some(outline) = font.outline(font.glyph_id(c)) {
                let (y_max, y_min) = vertical_bounds(&outline.bounds);
                top = top.max(y_max * vs);
                bottom = bottom.min(y_min * vs);
            }
        }

        let advance = self.line_width(style, text);
        if top.is_finite() && bottom.is_finite() {
            InkExtent {
                advance,
                ascent: top,
                descent: -bottom,
            }
        } else {
            InkExtent {
                advance,
                ..Default::default()
            }
        }
    }

    fn ascent(&self, style: &FontStyle) -> f32 {
        self.face(style)
            .map(|font| font.as_scaled(PxScale::from(style.size)).ascent())
            .unwrap_or(style.size * 0.8)
    }

    fn line_path(
        &self,
        style: &FontStyle,
        text: &str,
        x: f32,
        baseline: f32,
    ) -> Option<tiny_skia::Path> {
        let font = self.face(style)?;
        let scaled = font.as_scaled(PxScale::from(style.size));
        let hs = scaled.h_scale_factor();
        let vs = scaled.v_scale_factor();

        let mut pb = PathBuilder::new();
        let mut caret = x;
        let mut prev: Option<ab_glyph::GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            if let Some(outline) = font.outline(id) {
                push_outline(&mut pb, &outline.curves, caret, baseline, hs, vs);
            }
            caret += scaled.h_advance(id);
            prev = Some(id);
        }
        pb.finish()
    }
}

/// Highest and lowest font-unit y of an outline.
///
/// ab_glyph stores `y_max` in `min.y` and `y_min` in `max.y`.
fn vertical_bounds(bounds: &ab_glyph::Rect) -> (f32, f32) {
    (
        bounds.min.y.max(bounds.max.y),
        bounds.min.y.min(bounds.max.y),
    )
}

/// Append glyph curves (font units, y up) to a path in surface pixels (y down).
fn push_outline(
    pb: &mut PathBuilder,
    curves: &[OutlineCurve],
    origin_x: f32,
    baseline: f32,
    hs: f32,
    vs: f32,
) {
    let map = |p: ab_glyph::Point| (origin_x + p.x * hs, baseline - p.y * vs);
    let mut last: Option<ab_glyph::Point> = None;

    for curve in curves {
        let start = match curve {
            OutlineCurve::Line(a, _) | OutlineCurve::Quad(a, _, _) | OutlineCurve::Cubic(a, _, _, _) => *a,
        };
        if last != Some(start) {
            if last.is_some() {
                pb.close();
            }
            let (sx, sy) = map(start);
            pb.move_to(sx, sy);
        }

        let end = match curve {
            OutlineCurve::Line(_, b) => {
                let (bx, by) = map(*b);
                pb.line_to(bx, by);
                *b
            }
            OutlineCurve::Quad(_, c, b) => {
                let (cx, cy) = map(*c);
                let (bx, by) = map(*b);
                pb.quad_to(cx, cy, bx, by);
                *b
            }
            OutlineCurve::Cubic(_, c1, c2, b) => {
                let (c1x, c1y) = map(*c1);
                let (c2x, c2y) = map(*c2);
                let (bx, by) = map(*b);
                pb.cubic_to(c1x, c1y, c2x, c2y, bx, by);
                *b
            }
        };
        last = Some(end);
    }

    if last.is_some() {
        pb.close();
    }
}
