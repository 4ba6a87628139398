//! # Flow Placement
//!
//! Positions a node, and everything below it, at absolute page coordinates.
//! Sizes come from the [`Measurer`] so that what pagination budgeted is
//! exactly what gets placed.
//!
//! Rows and table rows stretch their children to the row height, so cell
//! borders and backgrounds line up across a row.

use super::boxes::{
    align_offset, border_box_width, decoration, resolve_content_area, valign_offset, Rect,
};
use super::measure::Measurer;
use super::{DrawCommand, LayoutElement, PositionedRun, TextLine};
use crate::model::{Node, NodeKind, TableRow, TextSpan};
use crate::style::{BoxStyle, ResolvedTextStyle, VAlign};

pub struct FlowLayout<'m, 'f> {
    measurer: &'m Measurer<'f>,
}

impl<'m, 'f> FlowLayout<'m, 'f> {
    pub fn new(measurer: &'m Measurer<'f>) -> Self {
        Self { measurer }
    }

    /// Place `node` with its margin box's top-left corner at (`x`, `y`),
    /// offered `width` points.
    pub fn place(
        &self,
        node: &Node,
        x: f64,
        y: f64,
        width: f64,
        inherited: &ResolvedTextStyle,
    ) -> LayoutElement {
        self.place_stretched(node, x, y, width, inherited, None)
    }

    /// Like [`place`](Self::place), but the border box grows to at least
    /// `min_height` unless the node has a fixed height.
    pub fn place_stretched(
        &self,
        node: &Node,
        x: f64,
        y: f64,
        width: f64,
        inherited: &ResolvedTextStyle,
        min_height: Option<f64>,
    ) -> LayoutElement {
        let ts = node.text_style.resolve(inherited);
        let style = &node.style;
        let box_width = border_box_width(style, width);
        let area = resolve_content_area(box_width, &style.padding, &style.border);

        let natural = match style.height {
            Some(h) => h,
            None => self.measurer.content_height(node, area.width, &ts) + style.inset_vertical(),
        };
        let box_height = match (style.height, min_height) {
            (None, Some(min)) => natural.max(min),
            _ => natural,
        };

        let bx = x + style.margin.left;
        let by = y + style.margin.top;
        let content = Rect {
            x: bx + area.left,
            y: by + area.top,
            width: area.width,
            height: (box_height - style.inset_vertical()).max(0.0),
        };

        let mut element = LayoutElement {
            x: bx,
            y: by,
            width: box_width,
            height: box_height,
            draw: decoration(style),
            children: Vec::new(),
            node_type: node.kind_name().to_string(),
            id: node.id.clone(),
        };

        match &node.kind {
            NodeKind::Text { spans } => {
                let lines = self.text_lines(spans, style, &content, &ts);
                attach(&mut element, DrawCommand::Text { lines }, content);
            }

            NodeKind::Image { src, width, height } => {
                let (w, h) = self
                    .measurer
                    .image_size(src.as_deref(), *width, *height, content.width);
                let image_box = Rect {
                    x: content.x + align_offset(content.width, w, style.align),
                    y: content.y + valign_offset(content.height, h, style.valign),
                    width: w,
                    height: h,
                };
                let draw = match src {
                    Some(src) if self.measurer.image_available(Some(src)) => {
                        DrawCommand::Image { src: src.clone() }
                    }
                    _ => DrawCommand::ImagePlaceholder,
                };
                attach(&mut element, draw, image_box);
            }

            NodeKind::Container { child } => {
                if let Some(child) = child {
                    let child_width = self.measurer.child_width(node, child, content.width, &ts);
                    let child_height = self.measurer.measure(child, child_width, &ts);
                    let dx = align_offset(content.width, child_width, style.align);
                    let dy = valign_offset(content.height, child_height, style.valign);
                    // Top-aligned children fill the box
                    let stretch = (style.valign == VAlign::Top)
                        .then(|| content.height - child.style.margin.vertical());
                    element.children.push(self.place_stretched(
                        child,
                        content.x + dx,
                        content.y + dy,
                        child_width,
                        &ts,
                        stretch,
                    ));
                }
            }

            NodeKind::Row { items, spacing } => {
                let widths = self.measurer.row_widths(items, *spacing, content.width);
                let mut cx = content.x;
                for (item, w) in items.iter().zip(widths) {
                    let stretch = content.height - item.node.style.margin.vertical();
                    element.children.push(self.place_stretched(
                        &item.node,
                        cx,
                        content.y,
                        w,
                        &ts,
                        Some(stretch),
                    ));
                    cx += w + spacing;
                }
            }

            NodeKind::Column { items, spacing } => {
                let mut cy = content.y;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        cy += spacing;
                    }
                    let dx = fixed_width_offset(item, content.width, style);
                    element
                        .children
                        .push(self.place(item, content.x + dx, cy, content.width - dx, &ts));
                    cy += self.measurer.measure(item, content.width, &ts);
                }
            }

            NodeKind::Table(table) => {
                let columns = self.measurer.column_widths(table, content.width);
                let mut cy = content.y;
                if let Some(header) = &table.header {
                    let row = self.place_table_row(header, &columns, content.x, cy, &ts, "TableHeader");
                    cy += row.height;
                    element.children.push(row);
                }
                for data in &table.rows {
                    let row = self.place_table_row(data, &columns, content.x, cy, &ts, "TableRow");
                    cy += row.height;
                    element.children.push(row);
                }
            }
        }

        element
    }

    /// Place one table row. Every cell is stretched to the row height.
    pub fn place_table_row(
        &self,
        row: &TableRow,
        columns: &[f64],
        x: f64,
        y: f64,
        inherited: &ResolvedTextStyle,
        node_type: &str,
    ) -> LayoutElement {
        let height = self.measurer.row_height(row, columns, inherited);
        let mut cx = x;
        let mut cells = Vec::with_capacity(row.cells.len());
        for (cell, w) in row.cells.iter().zip(columns) {
            let stretch = height - cell.style.margin.vertical();
            cells.push(self.place_stretched(cell, cx, y, *w, inherited, Some(stretch)));
            cx += w;
        }
        LayoutElement {
            x,
            y,
            width: columns.iter().sum(),
            height,
            draw: DrawCommand::None,
            children: cells,
            node_type: node_type.to_string(),
            id: None,
        }
    }

    fn text_lines(
        &self,
        spans: &[TextSpan],
        style: &BoxStyle,
        content: &Rect,
        ts: &ResolvedTextStyle,
    ) -> Vec<TextLine> {
        let (styles, lines) = self.measurer.break_text(spans, ts, content.width);
        let text_height: f64 = lines.iter().map(|l| l.height).sum();
        let mut line_top = content.y + valign_offset(content.height, text_height, style.valign);

        let mut out = Vec::with_capacity(lines.len());
        for line in &lines {
            let x = content.x + align_offset(content.width, line.width, style.align);
            let runs = line
                .runs
                .iter()
                .map(|run| {
                    let s = &styles[run.span];
                    PositionedRun {
                        text: run.text.clone(),
                        x: x + run.x_offset,
                        width: run.width,
                        font_family: s.font_family.clone(),
                        font_size: s.font_size,
                        font_weight: s.font_weight,
                        italic: s.italic,
                        color: s.color,
                    }
                })
                .collect();
            out.push(TextLine {
                x,
                y: line_top + line.baseline,
                width: line.width,
                height: line.height,
                runs,
            });
            line_top += line.height;
        }
        out
    }
}

/// Put a node's content drawing on its own element, or on a child element
/// over the content box when the element already paints a decoration.
fn attach(element: &mut LayoutElement, draw: DrawCommand, content: Rect) {
    if element.draw == DrawCommand::None {
        element.draw = draw;
        return;
    }
    element.children.push(LayoutElement {
        x: content.x,
        y: content.y,
        width: content.width,
        height: content.height,
        draw,
        children: Vec::new(),
        node_type: element.node_type.clone(),
        id: None,
    });
}

/// Offset of a fixed-width column item under the column's alignment.
fn fixed_width_offset(item: &Node, available: f64, parent: &BoxStyle) -> f64 {
    match item.style.width {
        Some(w) => align_offset(available, w + item.style.margin.horizontal(), parent.align),
        None => 0.0,
    }
}
