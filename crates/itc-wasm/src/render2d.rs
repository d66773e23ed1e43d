//! Canvas2D painter and text measure.
//!
//! Draws a `Scene` to an HTML `<canvas>` via `CanvasRenderingContext2d`.
//! The same painter serves the live view and PNG export; lines are broken
//! with the context's own metrics so they match what `fill_text` draws.

use crate::image::WebImage;
use itc_core::Color;
use itc_core::model::TextAlign;
use itc_render::{FixedAdvance, ImageNode, Painter, TextMeasure, TextNode};
use web_sys::CanvasRenderingContext2d;

/// Appended to every family so a missing face still renders.
const FALLBACK_FAMILY: &str = "sans-serif";

pub struct CanvasPainter<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasPainter<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

/// CSS `font` shorthand for a node.
fn css_font(node: &TextNode) -> String {
    let style = if node.font_style.is_italic() {
        "italic"
    } else {
        "normal"
    };
    format!(
        "{style} {} {}px \"{}\", {FALLBACK_FAMILY}",
        node.font_style.weight(),
        node.font_size,
        node.font_family.replace('"', "")
    )
}

/// Anchor x inside the text box for the given alignment.
fn anchor_x(align: TextAlign, box_width: f32) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => box_width as f64 / 2.0,
        TextAlign::Right => box_width as f64,
    }
}

/// Measures text with a 2D context's font metrics.
pub struct CanvasMeasure<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasMeasure<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasMeasure<'_> {
    fn measure(&mut self, node: &TextNode, text: &str) -> f32 {
        self.ctx.set_font(&css_font(node));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width() as f32,
            Err(e) => {
                log::debug!("render2d: measure_text failed: {e:?}");
                FixedAdvance::default().measure(node, text)
            }
        }
    }
}

impl Painter for CanvasPainter<'_> {
    type Image = WebImage;

    fn fill_background(&mut self, color: Color, width: f32, height: f32) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn draw_image(&mut self, image: &WebImage, node: &ImageNode) {
        let _ = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                image.element(),
                0.0,
                0.0,
                node.width as f64,
                node.height as f64,
            );
    }

    fn draw_text(&mut self, node: &TextNode) {
        if node.opacity <= 0.0 {
            return;
        }
        let ctx = self.ctx;
        ctx.save();
        let _ = ctx.translate(node.position.x as f64, node.position.y as f64);
        let _ = ctx.rotate((node.rotation as f64).to_radians());
        let _ = ctx.scale(node.scale as f64, node.scale as f64);
        ctx.set_global_alpha(node.opacity.clamp(0.0, 1.0) as f64);

        ctx.set_font(&css_font(node));
        ctx.set_fill_style_str(&node.fill.to_css());
        ctx.set_text_align(node.align.as_str());
        ctx.set_text_baseline("top");

        let x = anchor_x(node.align, node.box_width);
        let lh = node.line_height();
        for (i, line) in node.lines().enumerate() {
            let _ = ctx.fill_text(line, x, i as f64 * lh);
        }
        ctx.restore();
    }
}
