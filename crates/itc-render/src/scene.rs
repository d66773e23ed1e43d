//! Store → scene.
//!
//! The scene is rebuilt from the layer store on every change; it owns no
//! state the store does not have. The single exception is the drag
//! override, which replaces one node's position while a gesture is in
//! flight.

use crate::layout::{TextMeasure, wrap_lines};
use itc_core::id::LayerId;
use itc_core::model::{Color, FontStyle, Position, TextAlign, TextLayer};
use itc_core::CanvasSize;
use kurbo::{Affine, Rect};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.0;

/// Transient position for the layer being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOverride {
    pub id: LayerId,
    pub position: Position,
}

/// The loaded image, stretched over the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageNode {
    pub width: f32,
    pub height: f32,
}

/// One text layer as drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub id: LayerId,
    pub position: Position,
    pub rotation: f32,
    pub scale: f32,
    pub text: String,
    pub font_size: f32,
    pub font_family: String,
    pub font_style: FontStyle,
    pub fill: Color,
    pub opacity: f32,
    pub align: TextAlign,
    /// Width of the text box lines wrap and align in.
    pub box_width: f32,
    /// Lines as drawn. Hard breaks only until the scene is laid out.
    pub lines: Vec<String>,
}

impl TextNode {
    fn from_layer(layer: &TextLayer, box_width: f32, position: Position) -> Self {
        Self {
            id: layer.id,
            position,
            rotation: layer.rotation,
            scale: layer.scale,
            text: layer.text.clone(),
            font_size: layer.font_size as f32,
            font_family: layer.font_family.clone(),
            font_style: layer.font_style,
            fill: layer.fill,
            opacity: layer.opacity,
            align: layer.align,
            box_width,
            lines: layer.text.split('\n').map(str::to_string).collect(),
        }
    }

    /// Empty lines still take up height.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_height(&self) -> f64 {
        self.font_size as f64 * LINE_HEIGHT
    }

    /// Text box in node-local coordinates (before rotation and scale).
    pub fn local_bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.box_width as f64,
            self.line_height() * self.line_count() as f64,
        )
    }

    /// Node → canvas: translate to the anchor, rotate about it, then scale.
    pub fn transform(&self) -> Affine {
        Affine::translate((self.position.x as f64, self.position.y as f64))
            * Affine::rotate((self.rotation as f64).to_radians())
            * Affine::scale(self.scale as f64)
    }

    /// Axis-aligned canvas bounds of the transformed text box.
    pub fn canvas_bounds(&self) -> Rect {
        self.transform().transform_rect_bbox(self.local_bounds())
    }
}

/// Background, optional image, and text nodes in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub canvas: CanvasSize,
    pub background: Color,
    pub image: Option<ImageNode>,
    pub texts: Vec<TextNode>,
}

impl Scene {
    /// Build the scene for the current store contents.
    pub fn compose(
        layers: &[TextLayer],
        canvas: CanvasSize,
        background: Color,
        image_present: bool,
        drag: Option<&DragOverride>,
    ) -> Self {
        let texts = layers
            .iter()
            .map(|layer| {
                let position = match drag {
                    Some(d) if d.id == layer.id => d.position,
                    _ => layer.position,
                };
                TextNode::from_layer(layer, canvas.width, position)
            })
            .collect();

        Self {
            canvas,
            background,
            image: image_present.then_some(ImageNode {
                width: canvas.width,
                height: canvas.height,
            }),
            texts,
        }
    }

    /// Break every node's text into lines that fit its box.
    pub fn layout(mut self, measure: &mut dyn TextMeasure) -> Self {
        for node in &mut self.texts {
            node.lines = wrap_lines(node, measure);
        }
        self
    }

    pub fn text(&self, id: LayerId) -> Option<&TextNode> {
        self.texts.iter().find(|t| t.id == id)
    }
}
