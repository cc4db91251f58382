//! Frame stage.
//!
//! Border styles stroke a rectangle inset by `padding`. Corner styles draw a
//! small fixed shape, given as path data, at each corner of the inset
//! rectangle, rotated 0/90/180/270 degrees clockwise.

use super::color::parse_hex_color;
use super::model::{FrameSettings, FrameStyle};
use super::WatermarkError;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, StrokeDash, Transform};

const CORNER_PHOTO: &str = "M0,60 L60,0 L0,0 Z";
const CORNER_CLASSIC: &str = "M0,0 L40,0 L40,5 L5,5 L5,40 L0,40 Z";
const CORNER_TECH: &str = "M40,0 L0,0 L0,40 M40,10 L10,10 L10,40";
const CORNER_SLASH: &str = "M0,5 L5,0 M0,20 L20,0 M0,35 L35,0";

impl FrameStyle {
    /// Path data for corner styles, `None` for border styles.
    pub fn corner_shape(&self) -> Option<&'static str> {
        match self {
            FrameStyle::CornerPhoto => Some(CORNER_PHOTO),
            FrameStyle::CornerClassic => Some(CORNER_CLASSIC),
            FrameStyle::CornerTech => Some(CORNER_TECH),
            FrameStyle::CornerSlash => Some(CORNER_SLASH),
            _ => None,
        }
    }
}

/// Draw the frame onto the full surface.
pub fn draw_frame(pixmap: &mut Pixmap, frame: &FrameSettings) -> Result<(), WatermarkError> {
    let color = parse_hex_color(&frame.color)?;
    let mut paint = Paint::default();
    paint.set_color(color.to_skia(1.0));
    paint.anti_alias = true;

    let w = pixmap.width() as f32;
    let h = pixmap.height() as f32;
    let p = frame.padding;

    if let Some(data) = frame.style.corner_shape() {
        let Some(shape) = parse_path_data(data) else {
            return Err(WatermarkError::RenderError(format!(
                "invalid corner path '{}'",
                data
            )));
        };
        let filled = data.trim_end().ends_with(['Z', 'z']);
        let stroke = Stroke {
            width: frame.width,
            ..Default::default()
        };

        for (tx, ty, degrees) in [(p, p, 0.0), (w - p, p, 90.0), (w - p, h - p, 180.0), (p, h - p, 270.0)] {
            let transform = Transform::from_translate(tx, ty).pre_rotate(degrees);
            if filled {
                pixmap.fill_path(&shape, &paint, FillRule::Winding, transform, None);
            } else if frame.width > 0.0 {
                pixmap.stroke_path(&shape, &paint, &stroke, transform, None);
            }
        }
        return Ok(());
    }

    if frame.width <= 0.0 {
        return Ok(());
    }

    let dash = match frame.style {
        FrameStyle::Dashed => StrokeDash::new(vec![15.0, 10.0], 0.0),
        FrameStyle::Dotted => StrokeDash::new(vec![frame.width, frame.width * 1.5], 0.0),
        _ => None,
    };

    if frame.style == FrameStyle::Inset {
        let thin = (frame.width / 3.0).max(1.0);
        let thick = frame.width - thin;
        stroke_inset_rect(pixmap, &paint, p, thin, None);
        stroke_inset_rect(pixmap, &paint, p + thin * 2.0, thick, None);
    } else {
        stroke_inset_rect(pixmap, &paint, p, frame.width, dash.clone());
        if frame.style == FrameStyle::Double {
            stroke_inset_rect(pixmap, &paint, p + frame.width * 2.0, frame.width, dash);
        }
    }

    Ok(())
}

fn stroke_inset_rect(pixmap: &mut Pixmap, paint: &Paint, inset: f32, width: f32, dash: Option<StrokeDash>) {
    if width <= 0.0 {
        return;
    }
    let w = pixmap.width() as f32;
    let h = pixmap.height() as f32;
    let Some(rect) = Rect::from_xywh(inset, inset, w - inset * 2.0, h - inset * 2.0) else {
        return;
    };

    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width,
        dash,
        ..Default::default()
    };
    pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}

/// Parse absolute `M x,y`, `L x,y` and `Z` commands.
pub fn parse_path_data(data: &str) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for token in data.split_whitespace() {
        let mut chars = token.chars();
        let command = chars.next()?;
        let args = chars.as_str();
        match command {
            'M' | 'L' => {
                let (x, y) = args.split_once(',')?;
                let x: f32 = x.trim().parse().ok()?;
                let y: f32 = y.trim().parse().ok()?;
                if command == 'M' {
                    pb.move_to(x, y);
                } else {
                    pb.line_to(x, y);
                }
            }
            'Z' | 'z' => pb.close(),
            _ => return None,
        }
    }
    pb.finish()
}
