// Drag round trips through the preview viewport

use super::support::{gradient_image, write_png, BoxGlyphs};
use firemark::editor::{Editor, Gesture};
use firemark::state::AppState;
use firemark::watermark::{bounding_box, Position};

fn free_text_state() -> AppState {
    let mut state = AppState::new();
    state.add_text_layer();
    if let Some(layer) = state.active_mut() {
        layer.base_mut().free_placement = true;
        layer.base_mut().position = Position::new(0.25, 0.25);
    }
    state
}

#[test]
fn test_drag_clamp_keeps_box_on_surface() {
    let mut state = free_text_state();
    let target = state.active_layer.unwrap();

    let mut editor = Editor::new(900.0, 700.0);
    editor.show_image(0, gradient_image(1200, 800));
    editor.viewport.zoom_in();
    editor.viewport.pan_by(-40.0, 25.0);

    let (sw, sh) = editor.surface_size().unwrap();
    let layer = state.settings.find(target).unwrap();
    let rect = bounding_box(layer, sw, sh, &state.resources(&BoxGlyphs)).unwrap();
    let (grab_x, grab_y) = editor
        .viewport
        .surface_to_screen(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0);

    editor.pointer_down(&mut state, &BoxGlyphs, grab_x, grab_y);
    assert!(matches!(editor.gesture(), Gesture::Dragging { .. }));

    for sx in (-2000..=3000).step_by(250) {
        for sy in (-2000..=3000).step_by(250) {
            editor.pointer_move(&mut state, &BoxGlyphs, sx as f32, sy as f32);

            let layer = state.settings.find(target).unwrap();
            let pos = layer.base().position;
            assert!((0.0..=1.0).contains(&pos.x), "x out of range: {}", pos.x);
            assert!((0.0..=1.0).contains(&pos.y), "y out of range: {}", pos.y);

            let rect = bounding_box(layer, sw, sh, &state.resources(&BoxGlyphs)).unwrap();
            assert!(rect.x >= 0.0 && rect.y >= 0.0);
            assert!(rect.right() <= sw + 1e-3, "right edge {} past {}", rect.right(), sw);
            assert!(rect.bottom() <= sh + 1e-3, "bottom edge {} past {}", rect.bottom(), sh);
        }
    }

    let outcome = editor.pointer_up();
    assert!(outcome.persist && outcome.redraw);
}

#[test]
fn test_drag_and_render_agree_at_export_scale() {
    let mut state = free_text_state();
    let target = state.active_layer.unwrap();

    let mut editor = Editor::new(600.0, 400.0);
    editor.show_image(0, gradient_image(1200, 800));

    let (sw, sh) = editor.surface_size().unwrap();
    let before = bounding_box(state.settings.find(target).unwrap(), sw, sh, &state.resources(&BoxGlyphs)).unwrap();
    let (sx, sy) = editor.viewport.surface_to_screen(before.x + 5.0, before.y + 5.0);

    editor.pointer_down(&mut state, &BoxGlyphs, sx, sy);
    editor.pointer_move(&mut state, &BoxGlyphs, sx + 57.0, sy + 38.0);
    editor.pointer_leave();

    let after = bounding_box(state.settings.find(target).unwrap(), sw, sh, &state.resources(&BoxGlyphs)).unwrap();
    let zoom = editor.viewport.zoom;
    assert!((after.x - (before.x + 57.0 / zoom)).abs() < 1e-2);
    assert!((after.y - (before.y + 38.0 / zoom)).abs() < 1e-2);

    // The same normalized position at half the resolution lands at half the pixels
    let half = bounding_box(state.settings.find(target).unwrap(), sw / 2.0, sh / 2.0, &state.resources(&BoxGlyphs)).unwrap();
    assert!((half.x - after.x / 2.0).abs() < 1e-2);
    assert!((half.y - after.y / 2.0).abs() < 1e-2);
}

#[test]
fn test_logo_layer_drag() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_png(dir.path(), "logo.png", 100, 50);

    let mut state = AppState::new();
    let target = state.add_logo_layer(&logo).unwrap();
    if let Some(layer) = state.active_mut() {
        layer.base_mut().free_placement = true;
        layer.base_mut().position = Position::new(0.0, 0.0);
    }

    let mut editor = Editor::new(1000.0, 1000.0);
    editor.show_image(0, gradient_image(1000, 1000));
    editor.viewport.zoom = 1.0;

    // 15% of 1000 wide -> 150x75 box at the origin
    editor.pointer_down(&mut state, &BoxGlyphs, 10.0, 10.0);
    editor.pointer_move(&mut state, &BoxGlyphs, 510.0, 210.0);
    editor.pointer_up();

    let pos = state.settings.find(target).unwrap().base().position;
    assert!((pos.x - 0.5).abs() < 1e-6);
    assert!((pos.y - 0.2).abs() < 1e-6);
}
