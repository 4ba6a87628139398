//! Box model primitives shared by measurement and placement.
//!
//! Nothing here mutates layout state. Decorations are returned as draw
//! command descriptors for the renderer; they never change sizes.

use serde::Serialize;

use super::DrawCommand;
use crate::model::Edges;
use crate::style::{BoxStyle, Color, EdgeValues, HAlign, VAlign};

/// An axis-aligned rectangle in page coordinates (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The content rectangle inside border and padding, relative to the border box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentArea {
    /// Offset from the border box's left edge.
    pub left: f64,
    /// Offset from the border box's top edge.
    pub top: f64,
    pub width: f64,
}

/// Shrink an outer width by padding and border on both sides.
/// Height stays unconstrained; it is whatever the content measures.
pub fn resolve_content_area(outer_width: f64, padding: &Edges, border: &EdgeValues<f64>) -> ContentArea {
    ContentArea {
        left: padding.left + border.left,
        top: padding.top + border.top,
        width: (outer_width - padding.horizontal() - border.horizontal()).max(0.0),
    }
}

/// Width of a node's border box when offered `available` points.
pub fn border_box_width(style: &BoxStyle, available: f64) -> f64 {
    style
        .width
        .unwrap_or(available - style.margin.horizontal())
        .max(0.0)
}

/// Horizontal offset of a child inside its parent. Children wider than the
/// parent are pinned to the start edge.
pub fn align_offset(parent_width: f64, child_width: f64, align: HAlign) -> f64 {
    ((parent_width - child_width) * align.factor()).max(0.0)
}

/// Vertical counterpart of [`align_offset`].
pub fn valign_offset(parent_height: f64, child_height: f64, align: VAlign) -> f64 {
    ((parent_height - child_height) * align.factor()).max(0.0)
}

/// Draw command for a box's own background and border.
pub fn decoration(style: &BoxStyle) -> DrawCommand {
    if !style.has_decoration() {
        return DrawCommand::None;
    }
    DrawCommand::Rect {
        background: style.background,
        border_width: style.border,
        border_color: style.border_color.unwrap_or(Color::BLACK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_area_subtracts_padding_and_border() {
        let area = resolve_content_area(
            200.0,
            &Edges::symmetric(5.0, 10.0),
            &EdgeValues::uniform(1.0),
        );
        assert_eq!(area.width, 178.0);
        assert_eq!(area.left, 11.0);
        assert_eq!(area.top, 6.0);
    }

    #[test]
    fn content_area_never_negative() {
        let area = resolve_content_area(4.0, &Edges::uniform(5.0), &EdgeValues::uniform(0.0));
        assert_eq!(area.width, 0.0);
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(align_offset(100.0, 40.0, HAlign::Start), 0.0);
        assert_eq!(align_offset(100.0, 40.0, HAlign::Center), 30.0);
        assert_eq!(align_offset(100.0, 40.0, HAlign::End), 60.0);
        assert_eq!(align_offset(100.0, 140.0, HAlign::End), 0.0);
        assert_eq!(valign_offset(50.0, 20.0, VAlign::Middle), 15.0);
    }

    #[test]
    fn fixed_width_wins_over_available() {
        let style = BoxStyle {
            width: Some(80.0),
            margin: Edges::uniform(10.0),
            ..Default::default()
        };
        assert_eq!(border_box_width(&style, 500.0), 80.0);
        let auto = BoxStyle {
            margin: Edges::uniform(10.0),
            ..Default::default()
        };
        assert_eq!(border_box_width(&auto, 500.0), 480.0);
    }

    #[test]
    fn undecorated_box_draws_nothing() {
        assert_eq!(decoration(&BoxStyle::default()), DrawCommand::None);
        let painted = BoxStyle {
            background: Some(Color::WHITE),
            ..Default::default()
        };
        assert!(matches!(decoration(&painted), DrawCommand::Rect { .. }));
    }
}
