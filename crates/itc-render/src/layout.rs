//! Line breaking for text nodes.
//!
//! Lines are broken once, when the scene is laid out, and every consumer
//! (raster painter, Canvas2D painter, hit testing) reads the same
//! `TextNode::lines`. Breaking follows the usual canvas text-box rule:
//! hard breaks first, then the widest prefix that fits the box, pulled
//! back to the last space or hyphen when a word would be split.

use crate::scene::TextNode;
use itc_core::model::TextAlign;

/// Measures the advance of a run of text in a node's font, before scale.
pub trait TextMeasure {
    fn measure(&mut self, node: &TextNode, text: &str) -> f32;
}

/// Every character advances by `em` × font size. Stands in when no real
/// font metrics are available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    pub em: f32,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self { em: 0.5 }
    }
}

impl TextMeasure for FixedAdvance {
    fn measure(&mut self, node: &TextNode, text: &str) -> f32 {
        text.chars().count() as f32 * self.em * node.font_size
    }
}

/// Break `node.text` into the lines drawn inside its box.
pub fn wrap_lines(node: &TextNode, measure: &mut dyn TextMeasure) -> Vec<String> {
    let max = node.box_width;
    let mut lines = Vec::new();

    for hard in node.text.split('\n') {
        let mut rest = hard;
        loop {
            if rest.is_empty() || measure.measure(node, rest) <= max {
                lines.push(rest.to_string());
                break;
            }
            let end = break_point(node, rest, max, measure);
            lines.push(rest[..end].trim_end().to_string());
            rest = rest[end..].trim_start();
            if rest.is_empty() {
                break;
            }
        }
    }
    lines
}

/// Byte offset ending the first line of `text`. Always at least one char.
fn break_point(node: &TextNode, text: &str, max: f32, measure: &mut dyn TextMeasure) -> usize {
    let ends: Vec<usize> = text
        .char_indices()
        .skip(1)
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    // Widest prefix that fits, by binary search over char counts.
    let mut fit = 1;
    let (mut low, mut high) = (1, ends.len());
    while low <= high {
        let mid = (low + high) / 2;
        if measure.measure(node, &text[..ends[mid - 1]]) <= max {
            fit = mid;
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }
    let end = ends[fit - 1];

    if text[end..].starts_with(char::is_whitespace) {
        return end;
    }
    match text[..end].rfind([' ', '-']) {
        Some(pos) if pos > 0 => pos + 1,
        _ => end,
    }
}

/// Left edge of a line of `width` inside a box of `box_width`.
pub fn line_offset(align: TextAlign, box_width: f32, width: f32) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => (box_width - width) / 2.0,
        TextAlign::Right => box_width - width,
    }
}
