//! Preview viewport: zoom, pan and the screen <-> surface mapping.
//!
//! The image is drawn centered in its container, scaled by `zoom` and then
//! shifted by `pan`. Every pointer position goes through
//! [`Viewport::screen_to_surface`] before it is hit-tested or used to move a
//! layer, so both always see the same surface coordinates.

/// Smallest allowed zoom
pub const MIN_ZOOM: f32 = 0.1;
/// Largest allowed zoom
pub const MAX_ZOOM: f32 = 10.0;
/// Discrete zoom-in step
pub const ZOOM_IN_STEP: f32 = 1.25;
/// Discrete zoom-out step
pub const ZOOM_OUT_STEP: f32 = 0.8;
/// Zoom factor per wheel notch
pub const WHEEL_FACTOR: f32 = 1.1;
/// Margin kept around the image when fitting it to the container
pub const FIT_MARGIN: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub container_w: f32,
    pub container_h: f32,
    pub image_w: f32,
    pub image_h: f32,
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            container_w: 0.0,
            container_h: 0.0,
            image_w: 0.0,
            image_h: 0.0,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(container_w: f32, container_h: f32) -> Self {
        Self {
            container_w,
            container_h,
            ..Default::default()
        }
    }

    pub fn set_container(&mut self, w: f32, h: f32) {
        self.container_w = w;
        self.container_h = h;
    }

    /// Show a new image, fitted to the container.
    pub fn set_image(&mut self, w: f32, h: f32) {
        self.image_w = w;
        self.image_h = h;
        self.reset();
    }

    /// Screen position of the image's top-left corner.
    pub fn offset(&self) -> (f32, f32) {
        (
            (self.container_w - self.image_w * self.zoom) / 2.0 + self.pan_x,
            (self.container_h - self.image_h * self.zoom) / 2.0 + self.pan_y,
        )
    }

    pub fn screen_to_surface(&self, sx: f32, sy: f32) -> (f32, f32) {
        let (ox, oy) = self.offset();
        ((sx - ox) / self.zoom, (sy - oy) / self.zoom)
    }

    pub fn surface_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        let (ox, oy) = self.offset();
        (x * self.zoom + ox, y * self.zoom + oy)
    }

    /// Multiply the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_by(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_IN_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(ZOOM_OUT_STEP);
    }

    /// Wheel notch: scrolling up (negative delta) zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.zoom_by(WHEEL_FACTOR);
        } else if delta_y > 0.0 {
            self.zoom_by(1.0 / WHEEL_FACTOR);
        }
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Fit the whole image in the container and zero the pan.
    pub fn reset(&mut self) {
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        if self.image_w <= 0.0 || self.image_h <= 0.0 || self.container_w <= 0.0 || self.container_h <= 0.0 {
            self.zoom = 1.0;
            return;
        }
        let fit = (self.container_w / self.image_w).min(self.container_h / self.image_h);
        self.zoom = (fit * FIT_MARGIN).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}
