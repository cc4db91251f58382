//! Watermark compositing and layer positioning.
//!
//! A [`Settings`] snapshot describes every watermark stage: pixel effects, a
//! frame, a background pattern, a rotated tile grid and any number of text,
//! logo and icon layers. [`compose`] bakes a snapshot into a bitmap at its
//! native resolution; [`render_composite`] adds the final resize and encode.
//!
//! # Placement
//!
//! Layers are positioned with a normalized [`Position`]. In anchor mode each
//! axis is `0`, `0.5` or `1` and padding insets from the anchored edge; in
//! free mode the position is the normalized top-left corner of the layer box.
//! Both map through [`anchor_to_top_left`], and every box used for drawing or
//! hit-testing comes from [`bounding_box`], so preview and export agree at
//! any scale.
//!
//! # Example
//!
//! ```no_run
//! use firemark::watermark::{
//!     compose, FontBook, Layer, LogoCache, RenderOptions, RenderResources, Settings, TextLayer,
//! };
//!
//! let mut settings = Settings::default();
//! let mut text = TextLayer::new(1);
//! text.content = "© 2024".to_string();
//! settings.layers.push(Layer::Text(text));
//!
//! let fonts = FontBook::new();
//! let logos = LogoCache::new();
//! let source = image::RgbaImage::new(1000, 800);
//! let out = compose(
//!     &source,
//!     &settings,
//!     &RenderResources::new(&fonts, &logos),
//!     &RenderOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(out.dimensions(), (1000, 800));
//! ```

pub mod bbox;
pub mod color;
pub mod effects;
pub mod error;
pub mod fonts;
pub mod frame;
pub mod geometry;
pub mod icons;
pub mod logo_cache;
pub mod model;
pub mod pattern;
pub mod renderer;
pub mod surface;
pub mod text_renderer;
pub mod tile;

pub use bbox::{bounding_box, measure_text_block, TextBlock};
pub use color::{parse_hex_color, Color};
pub use error::WatermarkError;
pub use fonts::{enumerate_font_families, font_menu, FontBook, FontStyle, GlyphSource, InkExtent};
pub use geometry::{
    anchor_to_top_left, resolved_output_size, AnchorSlot, Position, Rect, ResizeMode, ResizePolicy,
};
pub use icons::{filter_icons, parse_icon_catalog, IconRef};
pub use logo_cache::LogoCache;
pub use model::{
    next_layer_id, ActiveLayer, EffectSettings, FrameSettings, FrameStyle, IconLayer, ImageEntry,
    Layer, LayerBase, LayerId, LayerKind, LogoLayer, OutputSettings, PatternKind, PatternSettings,
    Settings, TextAlign, TextLayer, TileSettings,
};
pub use renderer::{compose, render_composite, RenderOptions, RenderResources};
