//! Integration tests: scene → raster → PNG.
//!
//! Exercises the full `itc-render` export path without relying on any
//! installed fonts: glyph checks install the bundled Fira Mono face.

use image::{ImageFormat, Rgba, RgbaImage};
use itc_core::model::TextAlign;
use itc_core::{CanvasSize, Color, LayerId, LayerPatch, LayerStore};
use itc_render::{FontBook, Scene, decode_png, export_png, hit_test};
use pretty_assertions::assert_eq;
use std::io::Cursor;

const MONO: &[u8] = include_bytes!("fixtures/FiraMono-Medium.ttf");

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn png_of(img: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

/// Bilinear sampling may drift by one step per channel.
fn assert_close(actual: &Rgba<u8>, expected: [u8; 4]) {
    let near = actual.0.iter().zip(expected).all(|(a, e)| a.abs_diff(e) <= 1);
    assert!(near, "expected ~{expected:?}, got {:?}", actual.0);
}

const BACKGROUND: Color = Color::rgba(247.0 / 255.0, 247.0 / 255.0, 247.0 / 255.0, 1.0);

#[test]
fn empty_composition_is_only_background() {
    init_logging();
    let canvas = CanvasSize::new(64.0, 48.0);
    let scene = Scene::compose(&[], canvas, BACKGROUND, false, None);

    let png = export_png(&scene, None, &mut FontBook::empty()).unwrap();
    let img = decode(&png);
    assert_eq!(img.dimensions(), (64, 48));
    assert!(img.pixels().all(|p| *p == Rgba([247, 247, 247, 255])));
}

#[test]
fn export_size_tracks_canvas() {
    init_logging();
    let canvas = CanvasSize::derive(120.0, Some((400, 100)));
    let scene = Scene::compose(&[], canvas, BACKGROUND, false, None);
    let img = decode(&export_png(&scene, None, &mut FontBook::empty()).unwrap());
    assert_eq!(img.dimensions(), (120, 30));
}

#[test]
fn image_is_stretched_over_the_background() {
    init_logging();
    let source = RgbaImage::from_pixel(2, 2, Rgba([200, 10, 10, 255]));
    let bitmap = decode_png(&png_of(&source)).unwrap();

    let canvas = CanvasSize::new(32.0, 32.0);
    let scene = Scene::compose(&[], canvas, BACKGROUND, true, None);
    let img = decode(&export_png(&scene, Some(&bitmap), &mut FontBook::empty()).unwrap());

    // Interior pixels are fully covered by the stretched image.
    assert_close(img.get_pixel(16, 16), [200, 10, 10, 255]);
    assert_close(img.get_pixel(4, 27), [200, 10, 10, 255]);
}

#[test]
fn invisible_and_offscreen_layers_leave_no_trace() {
    init_logging();
    let canvas = CanvasSize::new(40.0, 40.0);
    let mut store = LayerStore::new();
    let hidden = store.add(canvas);
    store.update(
        hidden,
        &LayerPatch {
            opacity: Some(0.0),
            ..LayerPatch::default()
        },
    );
    let away = store.add(canvas);
    store.update(
        away,
        &LayerPatch {
            x: Some(5000.0),
            y: Some(5000.0),
            ..LayerPatch::default()
        },
    );

    let scene = Scene::compose(&store.snapshot(), canvas, BACKGROUND, false, None);
    let img = decode(&export_png(&scene, None, &mut FontBook::empty()).unwrap());
    assert!(img.pixels().all(|p| *p == Rgba([247, 247, 247, 255])));
}

#[test]
fn translucent_image_blends_with_background() {
    init_logging();
    let source = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
    let bitmap = decode_png(&png_of(&source)).unwrap();
    let canvas = CanvasSize::new(8.0, 8.0);
    let scene = Scene::compose(&[], canvas, BACKGROUND, true, None);
    let img = decode(&export_png(&scene, Some(&bitmap), &mut FontBook::empty()).unwrap());
    assert_eq!(*img.get_pixel(3, 3), Rgba([247, 247, 247, 255]));
}

// ─── Text with a real face ──────────────────────────────────────────────

const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

fn mono() -> FontBook {
    let mut fonts = FontBook::empty();
    fonts.install("Mono", MONO.to_vec()).unwrap();
    fonts
}

/// Left-aligned black Mono text; `patch` overrides the rest.
fn text_layer(store: &mut LayerStore, canvas: CanvasSize, patch: LayerPatch) -> LayerId {
    let id = store.add(canvas);
    store.update(
        id,
        &LayerPatch {
            font_family: Some("Mono".into()),
            font_size: Some(20),
            fill: Some(BLACK),
            align: Some(TextAlign::Left),
            ..LayerPatch::default()
        },
    );
    store.update(id, &patch);
    id
}

fn render_with(store: &LayerStore, canvas: CanvasSize, fonts: &mut FontBook) -> RgbaImage {
    let scene =
        Scene::compose(&store.snapshot(), canvas, BACKGROUND, false, None).layout(&mut *fonts);
    decode(&export_png(&scene, None, fonts).unwrap())
}

/// Coordinates of every pixel noticeably darker than the background.
fn inked(img: &RgbaImage) -> Vec<(u32, u32)> {
    img.enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] < 200 || p.0[1] < 200 || p.0[2] < 200)
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
fn glyphs_land_inside_the_text_box() {
    init_logging();
    let canvas = CanvasSize::new(200.0, 100.0);
    let mut store = LayerStore::new();
    text_layer(
        &mut store,
        canvas,
        LayerPatch {
            x: Some(10.0),
            y: Some(10.0),
            text: Some("HH".into()),
            ..LayerPatch::default()
        },
    );
    let ink = inked(&render_with(&store, canvas, &mut mono()));
    assert!(!ink.is_empty(), "no glyph was drawn");
    // Two 12 px cells from (10, 10), one 20 px line.
    assert!(
        ink.iter().all(|&(x, y)| (8..40).contains(&x) && (8..32).contains(&y)),
        "ink outside the box: {ink:?}"
    );
}

#[test]
fn rotation_and_scale_move_the_glyphs() {
    init_logging();
    let canvas = CanvasSize::new(200.0, 100.0);

    // Quarter turn about (100, 10): the run points down, left of the anchor.
    let mut store = LayerStore::new();
    text_layer(
        &mut store,
        canvas,
        LayerPatch {
            x: Some(100.0),
            y: Some(10.0),
            rotation: Some(90.0),
            text: Some("HH".into()),
            ..LayerPatch::default()
        },
    );
    let ink = inked(&render_with(&store, canvas, &mut mono()));
    assert!(!ink.is_empty());
    assert!(
        ink.iter().all(|&(x, y)| (76..=102).contains(&x) && (8..40).contains(&y)),
        "rotated ink misplaced: {ink:?}"
    );

    // Doubled: the second cell ends near x = 10 + 2 * 24.
    let mut store = LayerStore::new();
    text_layer(
        &mut store,
        canvas,
        LayerPatch {
            x: Some(10.0),
            y: Some(10.0),
            scale: Some(2.0),
            text: Some("HH".into()),
            ..LayerPatch::default()
        },
    );
    let ink = inked(&render_with(&store, canvas, &mut mono()));
    assert!(ink.iter().any(|&(x, _)| x > 40), "scale not applied");
    assert!(ink.iter().all(|&(x, _)| x < 64));
}

#[test]
fn opacity_scales_glyph_coverage() {
    init_logging();
    let canvas = CanvasSize::new(200.0, 80.0);
    let darkest = |opacity: f32| {
        let mut store = LayerStore::new();
        text_layer(
            &mut store,
            canvas,
            LayerPatch {
                x: Some(10.0),
                y: Some(10.0),
                font_size: Some(40),
                opacity: Some(opacity),
                text: Some("HH".into()),
                ..LayerPatch::default()
            },
        );
        let img = render_with(&store, canvas, &mut mono());
        img.pixels().map(|p| p.0[0]).min().unwrap()
    };

    assert!(darkest(1.0) <= 10, "opaque stems should be black");
    // Half of 247 over a fully covered stem.
    let half = darkest(0.5);
    assert!((115..=135).contains(&half), "got {half}");
}

#[test]
fn upper_layer_covers_the_lower_one() {
    init_logging();
    let canvas = CanvasSize::new(200.0, 60.0);
    let mut store = LayerStore::new();
    for fill in [Color::rgba(1.0, 0.0, 0.0, 1.0), Color::rgba(0.0, 0.0, 1.0, 1.0)] {
        text_layer(
            &mut store,
            canvas,
            LayerPatch {
                x: Some(10.0),
                y: Some(10.0),
                font_size: Some(30),
                fill: Some(fill),
                text: Some("HHH".into()),
                ..LayerPatch::default()
            },
        );
    }
    let img = render_with(&store, canvas, &mut mono());
    assert!(img.pixels().any(|p| p.0[2] > 230 && p.0[0] < 30), "no blue ink");
    assert!(
        !img.pixels().any(|p| p.0[0] > 200 && p.0[2] < 100),
        "red shows through the top layer"
    );
}

#[test]
fn wrapped_lines_are_drawn_and_hit() {
    init_logging();
    let canvas = CanvasSize::new(200.0, 100.0);
    let mut store = LayerStore::new();
    // 19 cells of 12 px do not fit 200 px.
    let id = text_layer(
        &mut store,
        canvas,
        LayerPatch {
            x: Some(0.0),
            y: Some(10.0),
            text: Some("HHHH HHHH HHHH HHHH".into()),
            ..LayerPatch::default()
        },
    );
    let mut fonts = mono();
    let scene =
        Scene::compose(&store.snapshot(), canvas, BACKGROUND, false, None).layout(&mut fonts);
    let node = scene.text(id).unwrap();
    assert_eq!(node.lines().collect::<Vec<_>>(), vec!["HHHH HHHH HHHH", "HHHH"]);
    assert_eq!(node.local_bounds().height(), 40.0);

    let ink = inked(&decode(&export_png(&scene, None, &mut fonts).unwrap()));
    assert!(ink.iter().any(|&(_, y)| y >= 32), "second line missing");
    assert!(ink.iter().all(|&(x, _)| x < 200));

    assert_eq!(hit_test(&scene, 20.0, 40.0), Some(id));
    assert_eq!(hit_test(&scene, 20.0, 60.0), None);
}
