//! Integration tests: editor controller flows (itc-editor).
//!
//! Drives `Editor` the way the UI does and checks that selection, drag
//! feedback and image loads stay consistent with the layer store.

use itc_core::fonts::UploadedFont;
use itc_core::image::ImageDimensions;
use itc_core::model::*;
use itc_core::{CanvasSize, LayerId};
use itc_editor::{Editor, InputEvent};
use itc_render::{FixedAdvance, Scene};
use pretty_assertions::assert_eq;

struct Fake(u32, u32);

impl ImageDimensions for Fake {
    fn dimensions(&self) -> (u32, u32) {
        (self.0, self.1)
    }
}

fn editor() -> Editor<Fake> {
    let _ = env_logger::builder().is_test(true).try_init();
    Editor::default()
}

/// Text is measured at half an em per character throughout.
fn feed(ed: &mut Editor<Fake>, event: InputEvent) -> bool {
    ed.handle_input(&event, &mut FixedAdvance::default())
}

fn scene(ed: &Editor<Fake>) -> Scene {
    ed.scene(&mut FixedAdvance::default())
}

fn down(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerDown { x, y }
}

fn moved(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMove { x, y }
}

fn up(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerUp { x, y }
}

// ─── Layer lifecycle ────────────────────────────────────────────────────

#[test]
fn add_update_remove_round() {
    let mut ed = editor();
    let a = ed.add_text();
    let created = ed.store().get(a).unwrap().clone();
    assert_eq!(created.text, "New text");
    assert_eq!(created.font_size, 36);
    assert_eq!(created.fill.to_hex(), "#ffffff");

    assert!(ed.update_layer(a, &LayerPatch::text("Hello")));
    let updated = ed.store().get(a).unwrap().clone();
    assert_eq!(
        updated,
        TextLayer {
            text: "Hello".into(),
            ..created
        }
    );

    assert!(ed.remove_layer(a));
    assert!(ed.store().is_empty());
    assert_eq!(ed.selected(), None);
}

#[test]
fn removing_other_layer_keeps_selection() {
    let mut ed = editor();
    let a = ed.add_text();
    let b = ed.add_text();
    assert!(ed.select(Some(a)));
    assert!(ed.remove_layer(b));
    assert_eq!(ed.selected(), Some(a));
    assert!(!ed.remove_layer(b));
}

#[test]
fn new_layer_is_placed_from_canvas_center() {
    let mut ed = editor();
    ed.resize_container(1200.0);
    let a = ed.add_text();
    let layer = ed.store().get(a).unwrap();
    assert_eq!(layer.position, Position::new(100.0, 600.0));
}

// ─── Pointer gestures ───────────────────────────────────────────────────

#[test]
fn drag_commits_only_on_release() {
    let mut ed = editor();
    let a = ed.add_text();
    ed.select(None);
    // Default canvas is 800×600: the layer box spans x -100..700, y 300..336.
    let start = ed.store().get(a).unwrap().position;
    assert_eq!(start, Position::new(-100.0, 300.0));

    assert!(feed(&mut ed, down(50.0, 310.0)));
    assert_eq!(ed.selected(), Some(a));

    let snapshot = ed.store().snapshot();
    assert!(feed(&mut ed, moved(60.0, 330.0)));
    assert_eq!(ed.store().get(a).unwrap().position, start);
    assert_eq!(
        scene(&ed).text(a).unwrap().position,
        Position::new(-90.0, 320.0)
    );
    assert!(std::sync::Arc::ptr_eq(&snapshot, &ed.store().snapshot()));

    assert!(feed(&mut ed, up(70.0, 340.0)));
    assert!(!ed.is_dragging());
    assert_eq!(ed.store().get(a).unwrap().position, Position::new(-80.0, 330.0));
    assert_eq!(
        scene(&ed).text(a).unwrap().position,
        Position::new(-80.0, 330.0)
    );
}

#[test]
fn click_without_motion_commits_nothing() {
    let mut ed = editor();
    let a = ed.add_text();
    let before = ed.store().snapshot();
    feed(&mut ed, down(50.0, 310.0));
    assert!(!feed(&mut ed, up(50.0, 310.0)));
    assert!(std::sync::Arc::ptr_eq(&before, &ed.store().snapshot()));
    assert_eq!(ed.selected(), Some(a));
}

#[test]
fn click_on_empty_canvas_clears_selection() {
    let mut ed = editor();
    ed.add_text();
    assert!(feed(&mut ed, down(50.0, 100.0)));
    assert_eq!(ed.selected(), None);
    assert!(!feed(&mut ed, moved(60.0, 110.0)));
    assert!(!feed(&mut ed, up(60.0, 110.0)));
}

#[test]
fn topmost_layer_wins_the_click() {
    let mut ed = editor();
    let a = ed.add_text();
    let b = ed.add_text();
    feed(&mut ed, down(50.0, 310.0));
    assert_eq!(ed.selected(), Some(b));

    feed(&mut ed, up(50.0, 310.0));
    ed.move_forward(a);
    feed(&mut ed, down(50.0, 310.0));
    assert_eq!(ed.selected(), Some(a));
}

#[test]
fn removing_dragged_layer_cancels_gesture() {
    let mut ed = editor();
    let a = ed.add_text();
    feed(&mut ed, down(50.0, 310.0));
    feed(&mut ed, moved(80.0, 310.0));
    assert!(ed.remove_layer(a));
    assert!(!ed.is_dragging());
    assert!(!feed(&mut ed, up(90.0, 310.0)));
    assert!(ed.store().is_empty());
}

#[test]
fn press_after_lost_release_keeps_the_dragged_position() {
    let mut ed = editor();
    let a = ed.add_text();
    feed(&mut ed, down(50.0, 310.0));
    feed(&mut ed, moved(80.0, 320.0));
    // The release never arrives; the next press starts fresh.
    assert!(feed(&mut ed, down(50.0, 320.0)));
    assert_eq!(ed.store().get(a).unwrap().position, Position::new(-70.0, 310.0));
    // The new press grabbed the layer where it now is.
    assert_eq!(ed.selected(), Some(a));
    assert!(!feed(&mut ed, up(50.0, 320.0)));
    assert_eq!(ed.store().get(a).unwrap().position, Position::new(-70.0, 310.0));
}

#[test]
fn wrapped_second_line_is_clickable() {
    let mut ed = editor();
    let a = ed.add_text();
    // 60 chars at 18 px each overflow the 800 px box into a second line.
    ed.update_layer(a, &LayerPatch::text("word ".repeat(12)));
    ed.select(None);
    assert_eq!(scene(&ed).text(a).unwrap().line_count(), 2);

    assert!(feed(&mut ed, down(50.0, 350.0)));
    assert_eq!(ed.selected(), Some(a));
}

// ─── Images ─────────────────────────────────────────────────────────────

#[test]
fn stale_image_load_is_ignored() {
    let mut ed = editor();
    ed.resize_container(300.0);
    let first = ed.begin_image_load(Some("image/png")).unwrap();
    let second = ed.begin_image_load(Some("image/png")).unwrap();

    assert!(ed.finish_image_load(second, Some(Fake(300, 150))));
    assert!(!ed.finish_image_load(first, Some(Fake(100, 300))));
    assert_eq!(ed.image().map(|i| i.dimensions()), Some((300, 150)));
    assert_eq!(ed.canvas(), CanvasSize::new(300.0, 150.0));
}

#[test]
fn failed_decode_clears_image() {
    let mut ed = editor();
    let t = ed.begin_image_load(Some("image/png")).unwrap();
    ed.finish_image_load(t, Some(Fake(10, 10)));
    let t = ed.begin_image_load(Some("image/png")).unwrap();
    assert!(ed.finish_image_load(t, None));
    assert!(ed.image().is_none());
    assert!(scene(&ed).image.is_none());
}

// ─── Fonts ──────────────────────────────────────────────────────────────

#[test]
fn uploaded_font_is_listed_first_and_once() {
    let mut ed = editor();
    let a = ed.add_text();
    let font = UploadedFont::from_file("MyFont.woff2", "").unwrap();
    assert_eq!(font.family, "MyFont");
    ed.accept_uploaded_font(&font);
    ed.accept_uploaded_font(&font);

    let list = ed.available_fonts(a);
    assert_eq!(list[..2], ["Arial".to_string(), "MyFont".to_string()]);
    assert_eq!(list.iter().filter(|f| *f == "MyFont").count(), 1);

    ed.choose_font(a, "MyFont");
    assert_eq!(ed.available_fonts(a)[0], "MyFont");
}

#[test]
fn catalog_font_is_requested_once() {
    let mut ed = editor();
    let a = ed.add_text();
    let b = ed.add_text();

    let key = ed.choose_font(a, "Open Sans").unwrap();
    assert_eq!(key.key, "gfont-Open-Sans");
    assert_eq!(ed.store().get(a).unwrap().font_family, "Open Sans");

    assert_eq!(ed.choose_font(b, "Open Sans"), None);
    assert_eq!(ed.store().get(b).unwrap().font_family, "Open Sans");
    assert_eq!(ed.choose_font(a, "Arial"), None);

    ed.font_loaded(&key, Ok(()));
    assert!(ed.fonts().is_loaded("Open Sans"));
}

#[test]
fn unknown_layer_lists_default_family_first() {
    let ed = editor();
    let list = ed.available_fonts(LayerId::intern("missing"));
    assert_eq!(list[0], DEFAULT_FONT_FAMILY);
}
