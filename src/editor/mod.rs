//! Interactive preview editor.
//!
//! Pointer gestures on the preview either drag a layer or pan the view:
//!
//! - **Idle**: waiting for a pointer-down
//! - **Dragging**: pointer-down landed on a free-placement layer
//!   - move → layer follows the pointer, clamped inside the surface
//!   - up/leave → Idle, settings need persisting
//! - **Panning**: pointer-down landed on no layer
//!   - move → view shifts by the pointer delta
//!   - up/leave → Idle
//!
//! Anchor-mode layers are repositioned through the anchor grid only; they
//! are never hit by the pointer.

pub mod viewport;

pub use viewport::Viewport;

use crate::imaging::{decode_file, ImageError};
use crate::state::AppState;
use crate::watermark::{
    bounding_box, compose, ActiveLayer, GlyphSource, ImageEntry, LayerKind, Position, Rect,
    RenderOptions, RenderResources, Settings, WatermarkError,
};
use image::RgbaImage;

/// Current pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    /// Last pointer position in screen space
    Panning { last_x: f32, last_y: f32 },
    /// Pointer offset from the dragged layer's top-left, in surface pixels
    Dragging {
        target: ActiveLayer,
        offset_x: f32,
        offset_y: f32,
    },
}

/// What the caller must do after an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorOutcome {
    pub redraw: bool,
    /// Schedule a (debounced) settings save
    pub persist: bool,
}

impl EditorOutcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            persist: false,
        }
    }
}

/// Preview session over the image list in [`AppState`].
#[derive(Debug)]
pub struct Editor {
    pub viewport: Viewport,
    gesture: Gesture,
    current: usize,
    show_watermark: bool,
    source: Option<RgbaImage>,
}

impl Editor {
    pub fn new(container_w: f32, container_h: f32) -> Self {
        Self {
            viewport: Viewport::new(container_w, container_h),
            gesture: Gesture::Idle,
            current: 0,
            show_watermark: true,
            source: None,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_image<'a>(&self, state: &'a AppState) -> Option<&'a ImageEntry> {
        self.source.as_ref()?;
        state.images.get(self.current)
    }

    /// Dimensions of the previewed bitmap in surface pixels.
    pub fn surface_size(&self) -> Option<(f32, f32)> {
        self.source
            .as_ref()
            .map(|s| (s.width() as f32, s.height() as f32))
    }

    /// Decode and show image `index`. Returns `false` for an out-of-range index.
    pub fn open_image(&mut self, state: &AppState, index: usize) -> Result<bool, ImageError> {
        let Some(entry) = state.images.get(index) else {
            return Ok(false);
        };
        let bitmap = decode_file(&entry.path)?;
        tracing::debug!(image = %entry.name, index, "Opening preview image");
        self.show_image(index, bitmap);
        Ok(true)
    }

    /// Show an already decoded bitmap as image `index`, fitted to the view.
    pub fn show_image(&mut self, index: usize, bitmap: RgbaImage) {
        self.viewport
            .set_image(bitmap.width() as f32, bitmap.height() as f32);
        self.current = index;
        self.source = Some(bitmap);
        self.gesture = Gesture::Idle;
    }

    /// Drop the preview, e.g. after the image list was cleared.
    pub fn close(&mut self) {
        self.source = None;
        self.current = 0;
        self.gesture = Gesture::Idle;
    }

    pub fn next_image(&mut self, state: &AppState) -> Result<bool, ImageError> {
        let len = state.images.len();
        if len == 0 {
            return Ok(false);
        }
        self.open_image(state, (self.current + 1) % len)
    }

    pub fn prev_image(&mut self, state: &AppState) -> Result<bool, ImageError> {
        let len = state.images.len();
        if len == 0 {
            return Ok(false);
        }
        self.open_image(state, (self.current + len - 1) % len)
    }

    pub fn show_watermark(&self) -> bool {
        self.show_watermark
    }

    pub fn toggle_watermark(&mut self) -> bool {
        self.show_watermark = !self.show_watermark;
        self.show_watermark
    }

    /// Compose the preview bitmap, or the plain source when the watermark is
    /// hidden. `None` when no image is open.
    pub fn render_preview(
        &self,
        state: &AppState,
        glyphs: &dyn GlyphSource,
    ) -> Result<Option<RgbaImage>, WatermarkError> {
        let Some(source) = &self.source else {
            return Ok(None);
        };
        if !self.show_watermark {
            return Ok(Some(source.clone()));
        }
        let options = RenderOptions::default().with_active_layer(state.active_layer);
        compose(source, &state.settings, &state.resources(glyphs), &options).map(Some)
    }

    /// Center the active free-placement layer on the previewed image.
    pub fn recenter_active(&self, state: &mut AppState, glyphs: &dyn GlyphSource) -> bool {
        match self.surface_size() {
            Some((w, h)) => state.recenter_active_layer(w, h, glyphs),
            None => false,
        }
    }

    pub fn pointer_down(
        &mut self,
        state: &mut AppState,
        glyphs: &dyn GlyphSource,
        screen_x: f32,
        screen_y: f32,
    ) -> EditorOutcome {
        let Some((sw, sh)) = self.surface_size() else {
            return EditorOutcome::default();
        };
        let (x, y) = self.viewport.screen_to_surface(screen_x, screen_y);

        let hit = hit_test(&state.settings, &state.resources(glyphs), sw, sh, x, y);
        match hit {
            Some((target, rect)) => {
                state.select_layer(Some(target));
                self.gesture = Gesture::Dragging {
                    target,
                    offset_x: x - rect.x,
                    offset_y: y - rect.y,
                };
                tracing::debug!(kind = target.kind.as_str(), layer_id = target.id, "Drag started");
                EditorOutcome::redraw()
            }
            None => {
                self.gesture = Gesture::Panning {
                    last_x: screen_x,
                    last_y: screen_y,
                };
                EditorOutcome::default()
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        state: &mut AppState,
        glyphs: &dyn GlyphSource,
        screen_x: f32,
        screen_y: f32,
    ) -> EditorOutcome {
        match self.gesture {
            Gesture::Idle => EditorOutcome::default(),
            Gesture::Panning { last_x, last_y } => {
                self.viewport.pan_by(screen_x - last_x, screen_y - last_y);
                self.gesture = Gesture::Panning {
                    last_x: screen_x,
                    last_y: screen_y,
                };
                EditorOutcome::redraw()
            }
            Gesture::Dragging {
                target,
                offset_x,
                offset_y,
            } => {
                let Some((sw, sh)) = self.surface_size() else {
                    return EditorOutcome::default();
                };
                let (x, y) = self.viewport.screen_to_surface(screen_x, screen_y);
                if drag_layer(state, glyphs, target, sw, sh, x - offset_x, y - offset_y) {
                    EditorOutcome::redraw()
                } else {
                    EditorOutcome::default()
                }
            }
        }
    }

    /// End the current gesture. Pointer-leave behaves the same.
    pub fn pointer_up(&mut self) -> EditorOutcome {
        let ended = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match ended {
            Gesture::Idle => EditorOutcome::default(),
            Gesture::Panning { .. } => EditorOutcome::redraw(),
            Gesture::Dragging { target, .. } => {
                tracing::debug!(layer_id = target.id, "Drag finished");
                EditorOutcome {
                    redraw: true,
                    persist: true,
                }
            }
        }
    }

    pub fn pointer_leave(&mut self) -> EditorOutcome {
        self.pointer_up()
    }
}

/// Topmost draggable layer under surface point `(x, y)`, with its box.
///
/// Families are checked in [`LayerKind::ORDER`], newest layer first within a
/// family. Only enabled free-placement layers in enabled groups are hit.
pub fn hit_test(
    settings: &Settings,
    resources: &RenderResources<'_>,
    surface_w: f32,
    surface_h: f32,
    x: f32,
    y: f32,
) -> Option<(ActiveLayer, Rect)> {
    LayerKind::ORDER
        .iter()
        .filter(|kind| settings.group_enabled(**kind))
        .flat_map(|kind| settings.layers_of(*kind).rev())
        .filter(|layer| layer.base().enabled && layer.base().free_placement)
        .find_map(|layer| {
            let rect = bounding_box(layer, surface_w, surface_h, resources)?;
            rect.contains(x, y).then(|| (layer.active_ref(), rect))
        })
}

/// Move `target` so its top-left lands at `(left, top)`, clamped so the box
/// stays on the surface.
fn drag_layer(
    state: &mut AppState,
    glyphs: &dyn GlyphSource,
    target: ActiveLayer,
    surface_w: f32,
    surface_h: f32,
    left: f32,
    top: f32,
) -> bool {
    let Some(layer) = state.settings.find(target) else {
        return false;
    };
    let Some(rect) = bounding_box(layer, surface_w, surface_h, &state.resources(glyphs)) else {
        return false;
    };
    let position = clamped_position(left, top, rect.w, rect.h, surface_w, surface_h);

    match state.settings.find_mut(target) {
        Some(layer) if layer.base().free_placement => {
            layer.base_mut().position = position;
            true
        }
        _ => false,
    }
}

fn clamped_position(left: f32, top: f32, w: f32, h: f32, surface_w: f32, surface_h: f32) -> Position {
    let x = left.clamp(0.0, (surface_w - w).max(0.0));
    let y = top.clamp(0.0, (surface_h - h).max(0.0));
    Position::new(x / surface_w, y / surface_h)
}
