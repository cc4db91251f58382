//! Watermark settings model.
//!
//! This module defines the full settings snapshot the renderer consumes:
//! - Text, logo and icon layers, held in one ordered list as a tagged enum
//! - Singleton tile, pattern, frame, effects and output settings
//! - Group-level enable switches
//!
//! Logo layers only carry a descriptor (path, size, placement). Decoded
//! bitmaps live in [`LogoCache`](super::logo_cache::LogoCache) and are joined
//! by path at render time, so a snapshot always serializes cleanly.

use super::geometry::{Position, ResizePolicy};
use super::icons::IconRef;
use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique layer identity (creation timestamp in milliseconds).
pub type LayerId = u64;

static LAST_LAYER_ID: AtomicU64 = AtomicU64::new(0);

/// Allocate a layer id from the current time, strictly increasing per process.
pub fn next_layer_id() -> LayerId {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_LAYER_ID.load(Ordering::SeqCst);
    loop {
        let candidate = now.max(last + 1);
        match LAST_LAYER_ID.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_layer_opacity() -> f32 {
    0.7
}

fn default_layer_padding() -> f32 {
    20.0
}

/// Which of the three layer families a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Text,
    Logo,
    Icon,
}

impl LayerKind {
    /// Fixed type order used for rendering and hit-testing.
    pub const ORDER: [LayerKind; 3] = [LayerKind::Text, LayerKind::Logo, LayerKind::Icon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Logo => "logo",
            Self::Icon => "icon",
        }
    }
}

/// Placement and blending fields shared by every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerBase {
    pub id: LayerId,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub position: Position,
    /// Inset from the anchored edge, anchor mode only
    #[serde(default = "default_layer_padding")]
    pub padding: f32,
    #[serde(default = "default_layer_opacity")]
    pub opacity: f32,
    /// Degrees, applied about the bounding box center
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub free_placement: bool,
}

impl LayerBase {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            enabled: true,
            position: Position::center(),
            padding: default_layer_padding(),
            opacity: default_layer_opacity(),
            rotation: 0.0,
            free_placement: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    #[default]
    Vertical,
    Horizontal,
}

/// Two-stop linear gradient; the first stop is the layer colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gradient {
    pub enabled: bool,
    pub color: String,
    pub direction: GradientDirection,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#4a90e2".to_string(),
            direction: GradientDirection::Vertical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stroke {
    pub enabled: bool,
    pub color: String,
    pub width: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#000000".to_string(),
            width: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shadow {
    pub enabled: bool,
    pub color: String,
    pub blur: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#000000".to_string(),
            blur: 5.0,
        }
    }
}

/// Multi-line text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    #[serde(flatten)]
    pub base: LayerBase,
    /// Newline-separated lines
    pub content: String,
    pub font_family: String,
    /// Pixels
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub align: TextAlign,
    /// Multiplier of `font_size`
    pub line_height: f32,
    pub color: String,
    #[serde(default)]
    pub gradient: Gradient,
    #[serde(default)]
    pub stroke: Stroke,
    #[serde(default)]
    pub shadow: Shadow,
}

impl TextLayer {
    pub fn new(id: LayerId) -> Self {
        Self {
            base: LayerBase::new(id),
            content: "New Text".to_string(),
            font_family: "Arial".to_string(),
            font_size: 48.0,
            bold: false,
            italic: false,
            align: TextAlign::Left,
            line_height: 1.2,
            color: "#FFFFFF".to_string(),
            gradient: Gradient::default(),
            stroke: Stroke::default(),
            shadow: Shadow::default(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

/// Logo layer descriptor. The decoded bitmap is looked up by `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoLayer {
    #[serde(flatten)]
    pub base: LayerBase,
    pub name: String,
    pub path: PathBuf,
    /// Percentage of the surface width
    pub size: f32,
}

impl LogoLayer {
    pub fn new(id: LayerId, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            base: LayerBase::new(id),
            name: name.into(),
            path: path.into(),
            size: 15.0,
        }
    }
}

/// Single glyph from an icon font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconLayer {
    #[serde(flatten)]
    pub base: LayerBase,
    #[serde(default)]
    pub icon: IconRef,
    /// Pixels
    pub size: f32,
    pub color: String,
}

impl IconLayer {
    pub fn new(id: LayerId) -> Self {
        Self {
            base: LayerBase::new(id),
            icon: IconRef::default(),
            size: 64.0,
            color: "#FFFFFF".to_string(),
        }
    }
}

/// A watermark layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    Text(TextLayer),
    Logo(LogoLayer),
    Icon(IconLayer),
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Text(_) => LayerKind::Text,
            Layer::Logo(_) => LayerKind::Logo,
            Layer::Icon(_) => LayerKind::Icon,
        }
    }

    pub fn base(&self) -> &LayerBase {
        match self {
            Layer::Text(t) => &t.base,
            Layer::Logo(l) => &l.base,
            Layer::Icon(i) => &i.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut LayerBase {
        match self {
            Layer::Text(t) => &mut t.base,
            Layer::Logo(l) => &mut l.base,
            Layer::Icon(i) => &mut i.base,
        }
    }

    pub fn id(&self) -> LayerId {
        self.base().id
    }

    pub fn active_ref(&self) -> ActiveLayer {
        ActiveLayer {
            kind: self.kind(),
            id: self.id(),
        }
    }
}

/// Repeating text or logo tiled over the whole surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSettings {
    pub enabled: bool,
    pub use_logo: bool,
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    pub color: String,
    pub opacity: f32,
    /// Degrees, about the surface center
    pub rotation: f32,
    /// Gap between repetitions in pixels
    pub spacing: f32,
}

impl Default for TileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            use_logo: false,
            content: "© Firemark".to_string(),
            font_family: "Arial".to_string(),
            font_size: 32.0,
            color: "#FFFFFF".to_string(),
            opacity: 0.3,
            rotation: -30.0,
            spacing: 100.0,
        }
    }
}

/// Procedural background texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Checker,
    Lines,
    Dots,
    Cross,
    Honeycomb,
    Zigzag,
    Vlines,
    Hlines,
    Bricks,
    Triangles,
    Waves,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub color1: String,
    pub color2: String,
    pub opacity: f32,
    /// Swatch cell size in pixels
    pub size: f32,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: PatternKind::Checker,
            color1: "#FFFFFF".to_string(),
            color2: "#000000".to_string(),
            opacity: 0.1,
            size: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameStyle {
    #[default]
    Solid,
    Double,
    Dashed,
    Dotted,
    Inset,
    CornerPhoto,
    CornerClassic,
    CornerTech,
    CornerSlash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub enabled: bool,
    pub style: FrameStyle,
    pub color: String,
    pub width: f32,
    pub padding: f32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            style: FrameStyle::Solid,
            color: "#FFFFFF".to_string(),
            width: 10.0,
            padding: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurEffect {
    pub enabled: bool,
    /// Gaussian standard deviation in pixels
    pub radius: f32,
}

impl Default for BlurEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseEffect {
    pub enabled: bool,
    /// Full width of the uniform noise range, in byte units
    pub amount: f32,
}

impl Default for NoiseEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpenEffect {
    pub enabled: bool,
    pub amount: f32,
}

impl Default for SharpenEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Multiplier, 1.0 is neutral
    pub brightness: f32,
    /// Multiplier, 1.0 is neutral
    pub contrast: f32,
    /// Fraction in `[0, 1]`
    pub grayscale: f32,
    pub blur: BlurEffect,
    pub noise: NoiseEffect,
    pub sharpen: SharpenEffect,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            grayscale: 0.0,
            blur: BlurEffect::default(),
            noise: NoiseEffect::default(),
            sharpen: SharpenEffect::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// `0..=1`, ignored for png
    pub quality: f32,
    pub resize: ResizePolicy,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 0.92,
            resize: ResizePolicy::default(),
        }
    }
}

/// Full settings snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layers: Vec<Layer>,
    pub texts_enabled: bool,
    pub logos_enabled: bool,
    pub icons_enabled: bool,
    pub effects_enabled: bool,
    pub tile: TileSettings,
    pub pattern: PatternSettings,
    pub frame: FrameSettings,
    pub effects: EffectSettings,
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            texts_enabled: true,
            logos_enabled: true,
            icons_enabled: true,
            effects_enabled: false,
            tile: TileSettings::default(),
            pattern: PatternSettings::default(),
            frame: FrameSettings::default(),
            effects: EffectSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Settings {
    /// Layers of one family, in collection order.
    pub fn layers_of(&self, kind: LayerKind) -> impl DoubleEndedIterator<Item = &Layer> {
        self.layers.iter().filter(move |l| l.kind() == kind)
    }

    pub fn group_enabled(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::Text => self.texts_enabled,
            LayerKind::Logo => self.logos_enabled,
            LayerKind::Icon => self.icons_enabled,
        }
    }

    pub fn find(&self, target: ActiveLayer) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|l| l.kind() == target.kind && l.id() == target.id)
    }

    pub fn find_mut(&mut self, target: ActiveLayer) -> Option<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.kind() == target.kind && l.id() == target.id)
    }

    /// Remove a layer, returning it if it existed.
    pub fn remove(&mut self, target: ActiveLayer) -> Option<Layer> {
        let index = self
            .layers
            .iter()
            .position(|l| l.kind() == target.kind && l.id() == target.id)?;
        Some(self.layers.remove(index))
    }

    pub fn logos(&self) -> impl Iterator<Item = &LogoLayer> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Logo(logo) => Some(logo),
            _ => None,
        })
    }
}

/// A user-selected source image. Never mutated by rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub name: String,
    pub path: PathBuf,
    pub original_width: u32,
    pub original_height: u32,
}

/// Editor pointer to the layer bound to the sidebar and draggable in preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveLayer {
    pub kind: LayerKind,
    pub id: LayerId,
}

impl ActiveLayer {
    pub fn new(kind: LayerKind, id: LayerId) -> Self {
        Self { kind, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_ids_strictly_increase() {
        let a = next_layer_id();
        let b = next_layer_id();
        let c = next_layer_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_text_layer_defaults() {
        let t = TextLayer::new(7);
        assert_eq!(t.content, "New Text");
        assert_eq!(t.font_family, "Arial");
        assert_eq!(t.font_size, 48.0);
        assert_eq!(t.line_height, 1.2);
        assert_eq!(t.base.opacity, 0.7);
        assert_eq!(t.base.padding, 20.0);
        assert_eq!(t.base.position, Position::center());
        assert!(!t.base.free_placement);
        assert_eq!(t.gradient.color, "#4a90e2");
        assert_eq!(t.stroke.width, 2.0);
        assert_eq!(t.shadow.blur, 5.0);
    }

    #[test]
    fn test_icon_layer_defaults() {
        let i = IconLayer::new(1);
        assert_eq!(i.size, 64.0);
        assert_eq!(i.icon.name, "copyright");
        assert_eq!(i.icon.unicode, "\u{a9}");
    }

    #[test]
    fn test_layer_serializes_with_type_tag() {
        let layer = Layer::Logo(LogoLayer::new(42, "logo.png", "/tmp/logo.png"));
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "logo");
        assert_eq!(json["id"], 42);
        assert_eq!(json["size"], 15.0);
        assert!(json.get("element").is_none());

        let back: Layer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{"texts_enabled": false, "frame": {"enabled": true, "style": "corner-tech"}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(!settings.texts_enabled);
        assert!(settings.logos_enabled);
        assert!(settings.frame.enabled);
        assert_eq!(settings.frame.style, FrameStyle::CornerTech);
        assert_eq!(settings.frame.width, 10.0);
        assert_eq!(settings.effects.brightness, 1.0);
    }

    #[test]
    fn test_pattern_kind_serializes_as_type() {
        let p = PatternSettings {
            kind: PatternKind::Honeycomb,
            ..Default::default()
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "honeycomb");
    }

    #[test]
    fn test_find_and_remove_layer() {
        let mut settings = Settings::default();
        settings.layers.push(Layer::Text(TextLayer::new(1)));
        settings.layers.push(Layer::Icon(IconLayer::new(2)));

        let icon = ActiveLayer::new(LayerKind::Icon, 2);
        assert!(settings.find(icon).is_some());
        assert!(settings.find(ActiveLayer::new(LayerKind::Text, 2)).is_none());

        let removed = settings.remove(icon).unwrap();
        assert_eq!(removed.id(), 2);
        assert_eq!(settings.layers.len(), 1);
        assert!(settings.remove(icon).is_none());
    }

    #[test]
    fn test_layers_of_keeps_collection_order() {
        let mut settings = Settings::default();
        settings.layers.push(Layer::Text(TextLayer::new(3)));
        settings.layers.push(Layer::Icon(IconLayer::new(4)));
        settings.layers.push(Layer::Text(TextLayer::new(5)));

        let ids: Vec<_> = settings.layers_of(LayerKind::Text).map(|l| l.id()).collect();
        assert_eq!(ids, vec![3, 5]);
    }
}
