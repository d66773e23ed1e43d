//! CPU raster backend and PNG export.
//!
//! Draws into a `tiny_skia::Pixmap`. Each laid-out line is shaped by
//! cosmic-text into a node-local pixmap the size of the text box, which is
//! then composited onto the canvas with the node transform and opacity.

use crate::fonts::{FontBook, line_width};
use crate::layout::line_offset;
use crate::paint::{Painter, paint_scene};
use crate::scene::{ImageNode, Scene, TextNode};
use image::{ImageFormat, RgbaImage};
use itc_core::image::{ImageDimensions, ImageError};
use itc_core::model::Color;
use kurbo::{Affine, Rect};
use std::io::Cursor;
use thiserror::Error;
use tiny_skia::{
    BlendMode, FilterQuality, IntSize, Pixmap, PixmapPaint, PremultipliedColorU8, Transform,
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot allocate a {0}x{1} pixmap")]
    Allocation(u32, u32),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// A decoded image ready to draw.
#[derive(Clone)]
pub struct Bitmap {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bitmap({}x{})", self.pixmap.width(), self.pixmap.height())
    }
}

impl ImageDimensions for Bitmap {
    fn dimensions(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }
}

/// Decode PNG bytes into a premultiplied bitmap.
pub fn decode_png(bytes: &[u8]) -> Result<Bitmap, ImageError> {
    let rgba = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| ImageError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = IntSize::from_wh(width, height).ok_or(ImageError::Empty)?;

    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    let pixmap = Pixmap::from_vec(data, size).ok_or(ImageError::Empty)?;
    Ok(Bitmap { pixmap })
}

fn skia_transform(t: Affine) -> Transform {
    let [a, b, c, d, e, f] = t.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        color.a.clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

/// Source-over blend of one straight-alpha color onto a premultiplied pixel.
fn blend_pixel(dst: &mut PremultipliedColorU8, [r, g, b, a]: [u8; 4]) {
    if a == 0 {
        return;
    }
    let sa = a as u32;
    let inv = 255 - sa;
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * inv + 127) / 255) as u8;
    let out_a = ((sa * 255 + dst.alpha() as u32 * inv + 127) / 255) as u8;
    let (out_r, out_g, out_b) = (mix(r, dst.red()), mix(g, dst.green()), mix(b, dst.blue()));
    // Premultiplied channels never exceed alpha; clamp rounding drift.
    if let Some(px) = PremultipliedColorU8::from_rgba(
        out_r.min(out_a),
        out_g.min(out_a),
        out_b.min(out_a),
        out_a,
    ) {
        *dst = px;
    }
}

/// Paints a scene into a pixmap.
pub struct RasterPainter<'f> {
    pixmap: Pixmap,
    fonts: &'f mut FontBook,
}

impl<'f> RasterPainter<'f> {
    pub fn new(width: u32, height: u32, fonts: &'f mut FontBook) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or(ExportError::Allocation(width, height))?;
        Ok(Self { pixmap, fonts })
    }

    pub fn finish(self) -> Pixmap {
        self.pixmap
    }

    /// Rasterize the laid-out lines of `node` into a pixmap the size of
    /// its text box.
    fn rasterize_text(&mut self, node: &TextNode) -> Option<Pixmap> {
        let bounds = node.local_bounds();
        let mut local = Pixmap::new(bounds.width().ceil() as u32, bounds.height().ceil() as u32)?;
        let (w, h) = (local.width() as i32, local.height() as i32);
        let pixels = local.pixels_mut();

        let [r, g, b, a] = node.fill.to_rgba8();
        let fill = cosmic_text::Color::rgba(r, g, b, a);
        for (i, line) in node.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let buffer = self.fonts.shape_line(node, line);
            let dx = line_offset(node.align, node.box_width, line_width(&buffer)).round() as i32;
            let dy = (i as f64 * node.line_height()).round() as i32;

            let FontBook { system, swash, .. } = &mut *self.fonts;
            buffer.draw(system, swash, fill, |x, y, cw, ch, color| {
                let (x, y) = (x + dx, y + dy);
                for py in y.max(0)..(y + ch as i32).min(h) {
                    for px in x.max(0)..(x + cw as i32).min(w) {
                        let idx = (py * w + px) as usize;
                        blend_pixel(&mut pixels[idx], [color.r(), color.g(), color.b(), color.a()]);
                    }
                }
            });
        }
        Some(local)
    }
}

impl Painter for RasterPainter<'_> {
    type Image = Bitmap;

    fn fill_background(&mut self, color: Color, _width: f32, _height: f32) {
        self.pixmap.fill(skia_color(color));
    }

    fn draw_image(&mut self, image: &Bitmap, node: &ImageNode) {
        let (iw, ih) = image.dimensions();
        let transform =
            Transform::from_scale(node.width / iw as f32, node.height / ih as f32);
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        self.pixmap
            .draw_pixmap(0, 0, image.pixmap.as_ref(), &paint, transform, None);
    }

    fn draw_text(&mut self, node: &TextNode) {
        if node.opacity <= 0.0 || node.text.is_empty() {
            return;
        }
        let canvas = Rect::new(0.0, 0.0, self.pixmap.width() as f64, self.pixmap.height() as f64);
        if node.canvas_bounds().intersect(canvas).area() <= 0.0 {
            log::trace!("raster: {} is off canvas", node.id);
            return;
        }
        if self.fonts.is_empty() {
            log::warn!("raster: no fonts available, {} not drawn", node.id);
            return;
        }
        let Some(local) = self.rasterize_text(node) else {
            log::trace!("raster: {} has an empty text box", node.id);
            return;
        };
        let paint = PixmapPaint {
            opacity: node.opacity.clamp(0.0, 1.0),
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            local.as_ref(),
            &paint,
            skia_transform(node.transform()),
            None,
        );
    }
}

/// Rasterize `scene` at the canvas' pixel size.
pub fn render(
    scene: &Scene,
    image: Option<&Bitmap>,
    fonts: &mut FontBook,
) -> Result<Pixmap, ExportError> {
    let (width, height) = scene.canvas.pixel_dimensions();
    let mut painter = RasterPainter::new(width, height, fonts)?;
    paint_scene(scene, &mut painter, image);
    Ok(painter.finish())
}

/// Rasterize `scene` and encode it as PNG.
pub fn export_png(
    scene: &Scene,
    image: Option<&Bitmap>,
    fonts: &mut FontBook,
) -> Result<Vec<u8>, ExportError> {
    let pixmap = render(scene, image, fonts)?;
    let (width, height) = (pixmap.width(), pixmap.height());

    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let rgba = RgbaImage::from_raw(width, height, data)
        .ok_or(ExportError::Allocation(width, height))?;

    let mut out = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    log::debug!("export: {width}x{height} PNG, {} bytes", out.len());
    Ok(out)
}
