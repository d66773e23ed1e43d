//! Text-layer data model.
//!
//! A composition is a raster image with an ordered list of `TextLayer`s on
//! top. Layers carry every visual property directly; there is no style
//! inheritance and no explicit z-index (sequence position is the z-order,
//! see `store`). Partial edits arrive as a `LayerPatch`.

use crate::canvas::CanvasSize;
use crate::id::LayerId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        match bytes.len() {
            3 => Some(Self::from_rgba8(short(0)?, short(1)?, short(2)?, 255)),
            4 => Some(Self::from_rgba8(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::from_rgba8(long(0)?, long(2)?, long(4)?, 255)),
            8 => Some(Self::from_rgba8(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Channels as 8-bit values.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as lowercase hex: `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    /// This is the form an HTML color input round-trips.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// CSS `rgba()` string for Canvas2D fill styles.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ─── Typography ──────────────────────────────────────────────────────────

/// Font style of a layer. Bold and italic are mutually exclusive, as in the
/// style picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
}

impl FontStyle {
    /// CSS numeric weight.
    pub fn weight(self) -> u16 {
        match self {
            FontStyle::Bold => 700,
            FontStyle::Normal | FontStyle::Italic => 400,
        }
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic)
    }
}

/// Horizontal text alignment within the layer's text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Keyword used by Canvas2D `textAlign`.
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// Top-left anchor in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

pub const DEFAULT_TEXT: &str = "New text";
pub const DEFAULT_FONT_SIZE: u32 = 36;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
/// Horizontal pull-back applied to new layers so their canvas-wide text box
/// lands near the middle.
pub const NEW_LAYER_X_OFFSET: f32 = 500.0;

/// One independently positioned, styled text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: LayerId,
    #[serde(flatten)]
    pub position: Position,
    /// Degrees, unbounded.
    pub rotation: f32,
    pub scale: f32,
    pub text: String,
    pub font_size: u32,
    pub font_family: String,
    pub font_style: FontStyle,
    pub fill: Color,
    pub opacity: f32,
    pub align: TextAlign,
}

impl TextLayer {
    /// A layer with default content, placed relative to the canvas.
    pub fn new(id: LayerId, canvas: CanvasSize) -> Self {
        Self {
            id,
            position: Position::new(
                canvas.width / 2.0 - NEW_LAYER_X_OFFSET,
                canvas.height / 2.0,
            ),
            rotation: 0.0,
            scale: 1.0,
            text: DEFAULT_TEXT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_style: FontStyle::Normal,
            fill: Color::WHITE,
            opacity: 1.0,
            align: TextAlign::Center,
        }
    }

    /// First line of the content, for layer lists.
    pub fn title(&self) -> &str {
        match self.text.lines().next() {
            Some(line) if !line.is_empty() => line,
            _ => "Text",
        }
    }
}

/// A partial update to a `TextLayer`. `None` fields are left untouched.
///
/// Deserializes from the camelCase object the property panel sends
/// (`{"fontSize": 48, "fill": "#ff0000"}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
}

impl LayerPatch {
    /// Patch that moves a layer to `position` (drag-end commit).
    pub fn position(position: Position) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn font_family(family: impl Into<String>) -> Self {
        Self {
            font_family: Some(family.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write the `Some` fields into `layer`.
    ///
    /// Opacity is clamped to [0, 1]; non-positive or non-finite scale and
    /// zero font size are ignored so those fields stay positive.
    pub fn apply(&self, layer: &mut TextLayer) {
        if let Some(x) = self.x {
            layer.position.x = x;
        }
        if let Some(y) = self.y {
            layer.position.y = y;
        }
        if let Some(rotation) = self.rotation {
            layer.rotation = rotation;
        }
        if let Some(scale) = self.scale
            && scale.is_finite()
            && scale > 0.0
        {
            layer.scale = scale;
        }
        if let Some(ref text) = self.text {
            layer.text.clone_from(text);
        }
        if let Some(size) = self.font_size
            && size > 0
        {
            layer.font_size = size;
        }
        if let Some(ref family) = self.font_family {
            layer.font_family.clone_from(family);
        }
        if let Some(style) = self.font_style {
            layer.font_style = style;
        }
        if let Some(fill) = self.fill {
            layer.fill = fill;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(align) = self.align {
            layer.align = align;
        }
    }
}
