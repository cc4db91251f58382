//! Placement geometry for watermark layers.
//!
//! Pure functions that turn a normalized layer position into pixel
//! coordinates on a surface of arbitrary resolution, plus the output-size
//! calculation used by the final resize.
//!
//! # Position Modes
//!
//! - **Anchor mode**: each axis is one of `0`, `0.5` or `1` (start, center,
//!   end). Padding insets the element from the edge it is anchored to and is
//!   not applied when centered.
//! - **Free mode**: the position is the normalized top-left corner of the
//!   element; padding is ignored.
//!
//! # Example
//!
//! ```
//! use firemark::watermark::geometry::{anchor_to_top_left, Position};
//!
//! let (x, y) = anchor_to_top_left(Position::new(1.0, 1.0), 1000.0, 800.0, 120.0, 30.0, 20.0, false);
//! assert_eq!((x, y), (860.0, 750.0)); // 1000 - 120 - 20, 800 - 30 - 20
//! ```

use serde::{Deserialize, Serialize};

/// Normalized 2D position, each axis nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn center() -> Self {
        Self::new(0.5, 0.5)
    }

    /// Copy of this position with both axes clamped to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::center()
    }
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// True when the rectangle has no drawable area.
    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Strict containment: points on the border are outside.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px > self.x && px < self.right() && py > self.y && py < self.bottom()
    }
}

/// How the final output is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    #[default]
    None,
    Width,
    Height,
    Fit,
}

/// Resize policy: mode plus the target box (only the relevant axes are read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizePolicy {
    #[serde(default)]
    pub mode: ResizeMode,
    #[serde(default = "default_resize_width")]
    pub width: u32,
    #[serde(default = "default_resize_height")]
    pub height: u32,
}

fn default_resize_width() -> u32 {
    1920
}

fn default_resize_height() -> u32 {
    1080
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            mode: ResizeMode::None,
            width: default_resize_width(),
            height: default_resize_height(),
        }
    }
}

/// Calculate output dimensions for a resize policy.
///
/// Only ever shrinks. The aspect ratio of the source is preserved and both
/// dimensions are rounded to the nearest integer, with a floor of one pixel
/// for any non-empty source axis. Zero targets are not special-cased; they
/// produce one-pixel results rather than NaN.
pub fn resolved_output_size(
    original_width: u32,
    original_height: u32,
    policy: &ResizePolicy,
) -> (u32, u32) {
    let ow = original_width as f64;
    let oh = original_height as f64;
    let ratio = ow / oh;

    let (w, h) = match policy.mode {
        ResizeMode::None => return (original_width, original_height),
        ResizeMode::Width => {
            if original_width <= policy.width {
                return (original_width, original_height);
            }
            let w = policy.width as f64;
            (w, w / ratio)
        }
        ResizeMode::Height => {
            if original_height <= policy.height {
                return (original_width, original_height);
            }
            let h = policy.height as f64;
            (h * ratio, h)
        }
        ResizeMode::Fit => {
            if original_width <= policy.width && original_height <= policy.height {
                return (original_width, original_height);
            }
            let bw = policy.width as f64;
            let bh = policy.height as f64;
            if ratio > bw / bh {
                (bw, bw / ratio)
            } else {
                (bh * ratio, bh)
            }
        }
    };

    (round_dim(w, original_width), round_dim(h, original_height))
}

/// Round to whole pixels. A non-empty source axis never collapses to zero.
fn round_dim(v: f64, original: u32) -> u32 {
    let floor = if original > 0 { 1.0 } else { 0.0 };
    if v.is_finite() {
        v.round().max(floor) as u32
    } else {
        floor as u32
    }
}

/// Convert a layer position into the top-left pixel coordinate of its box.
///
/// In free mode the position already is the normalized top-left corner. In
/// anchor mode each axis is resolved independently: `0` insets by `padding`
/// from the start edge, `1` insets by `padding` from the end edge, anything
/// else centers the element and ignores `padding`.
pub fn anchor_to_top_left(
    position: Position,
    surface_w: f32,
    surface_h: f32,
    element_w: f32,
    element_h: f32,
    padding: f32,
    free_placement: bool,
) -> (f32, f32) {
    if free_placement {
        return (position.x * surface_w, position.y * surface_h);
    }

    (
        anchor_axis(position.x, surface_w, element_w, padding),
        anchor_axis(position.y, surface_h, element_h, padding),
    )
}

fn anchor_axis(value: f32, surface: f32, element: f32, padding: f32) -> f32 {
    if value == 0.0 {
        padding
    } else if value == 1.0 {
        surface - element - padding
    } else {
        (surface - element) / 2.0
    }
}

/// One of the nine canonical anchor slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorSlot {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AnchorSlot {
    pub const ALL: [AnchorSlot; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::CenterLeft,
        Self::Center,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Canonical anchor position for this slot.
    pub fn position(self) -> Position {
        let (x, y) = match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::CenterLeft => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::CenterRight => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomCenter => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Position::new(x, y)
    }

    /// Nearest slot for an arbitrary position (`< 0.25` start, `> 0.75` end).
    pub fn from_position(position: Position) -> Self {
        let col = third(position.x);
        let row = third(position.y);
        Self::ALL[row * 3 + col]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::CenterLeft => "center-left",
            Self::Center => "center",
            Self::CenterRight => "center-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

fn third(v: f32) -> usize {
    if v < 0.25 {
        0
    } else if v > 0.75 {
        2
    } else {
        1
    }
}
