//! Scene → drawing commands.
//!
//! `paint_scene` is the one traversal every backend goes through: the
//! on-screen Canvas2D painter and the raster painter used for export both
//! receive the same calls in the same order, so an export can't diverge
//! from what is on screen.

use crate::scene::{ImageNode, Scene, TextNode};
use itc_core::model::Color;

/// A drawing backend.
pub trait Painter {
    /// The backend's decoded bitmap type.
    type Image;

    /// Solid fill over the whole canvas.
    fn fill_background(&mut self, color: Color, width: f32, height: f32);

    /// Draw `image` stretched to the node bounds.
    fn draw_image(&mut self, image: &Self::Image, node: &ImageNode);

    /// Draw one text node with its transform and opacity.
    fn draw_text(&mut self, node: &TextNode);
}

/// Paint background, image, then text nodes in store order.
pub fn paint_scene<P: Painter>(scene: &Scene, painter: &mut P, image: Option<&P::Image>) {
    painter.fill_background(scene.background, scene.canvas.width, scene.canvas.height);

    match (&scene.image, image) {
        (Some(node), Some(bitmap)) => painter.draw_image(bitmap, node),
        (Some(_), None) => log::trace!("paint: image node without a bitmap, skipped"),
        _ => {}
    }

    for node in &scene.texts {
        log::trace!(
            "TEXT {} {:?} at ({}, {})",
            node.id,
            node.text,
            node.position.x,
            node.position.y
        );
        painter.draw_text(node);
    }
}
