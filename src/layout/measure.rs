//! # Measurement
//!
//! Answers "how tall is this node at this width?" without placing anything.
//!
//! Heights are pure functions of (node, width, inherited text style), and
//! pagination asks the same question many times while it searches for page
//! breaks, so results are memoized by (node address, width). A node sits at
//! exactly one place in the tree, which fixes its inherited style, so the
//! style does not need to be part of the key. A [`Measurer`] lives for one
//! layout call; nothing carries over between calls.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::boxes::{border_box_width, resolve_content_area};
use super::flex;
use crate::font::FontContext;
use crate::model::{ItemSize, Node, NodeKind, RowItem, Table, TableRow, TextSpan};
use crate::style::{HAlign, ResolvedTextStyle};
use crate::text::{BrokenLine, TextLayout};

/// Height/width ratio used when an image's own dimensions are unknown.
const FALLBACK_ASPECT: f64 = 0.75;

pub struct Measurer<'a> {
    fonts: &'a FontContext,
    text_layout: TextLayout,
    heights: RefCell<HashMap<(usize, u64), f64>>,
    image_dims: RefCell<HashMap<String, Option<(u32, u32)>>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<'a> Measurer<'a> {
    pub fn new(fonts: &'a FontContext) -> Self {
        Self {
            fonts,
            text_layout: TextLayout::new(),
            heights: RefCell::new(HashMap::new()),
            image_dims: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Outer height of `node` (margin box) when given `width` points.
    pub fn measure(&self, node: &Node, width: f64, inherited: &ResolvedTextStyle) -> f64 {
        let key = (node as *const Node as usize, width.to_bits());
        if let Some(height) = self.heights.borrow().get(&key).copied() {
            self.hits.set(self.hits.get() + 1);
            return height;
        }
        self.misses.set(self.misses.get() + 1);

        let height = self.measure_uncached(node, width, inherited);
        self.heights.borrow_mut().insert(key, height);
        height
    }

    /// (hits, misses) of the height cache so far.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.get(), self.misses.get())
    }

    fn measure_uncached(&self, node: &Node, width: f64, inherited: &ResolvedTextStyle) -> f64 {
        let style = &node.style;
        let border_box = match style.height {
            Some(h) => h,
            None => {
                let ts = node.text_style.resolve(inherited);
                let outer = border_box_width(style, width);
                let area = resolve_content_area(outer, &style.padding, &style.border);
                self.content_height(node, area.width, &ts) + style.inset_vertical()
            }
        };
        border_box + style.margin.vertical()
    }

    /// Height of a node's content box at content width `width`. `style` is
    /// the node's own resolved text style.
    pub fn content_height(&self, node: &Node, width: f64, style: &ResolvedTextStyle) -> f64 {
        match &node.kind {
            NodeKind::Text { spans } => {
                let (_, lines) = self.break_text(spans, style, width);
                lines.iter().map(|l| l.height).sum()
            }
            NodeKind::Image { src, width: w, height: h } => {
                self.image_size(src.as_deref(), *w, *h, width).1
            }
            NodeKind::Container { child } => match child {
                Some(child) => {
                    let child_width = self.child_width(node, child, width, style);
                    self.measure(child, child_width, style)
                }
                None => 0.0,
            },
            NodeKind::Row { items, spacing } => self
                .row_widths(items, *spacing, width)
                .into_iter()
                .zip(items)
                .map(|(w, item)| self.measure(&item.node, w, style))
                .fold(0.0, f64::max),
            NodeKind::Column { items, spacing } => {
                let gaps = spacing * items.len().saturating_sub(1) as f64;
                items
                    .iter()
                    .map(|item| self.measure(item, width, style))
                    .sum::<f64>()
                    + gaps
            }
            NodeKind::Table(table) => {
                let columns = self.column_widths(table, width);
                table
                    .header
                    .iter()
                    .chain(table.rows.iter())
                    .map(|row| self.row_height(row, &columns, style))
                    .sum()
            }
        }
    }

    /// Break a paragraph at `width`. Returns the resolved style of every
    /// span alongside the lines, whose runs index into it.
    pub fn break_text(
        &self,
        spans: &[TextSpan],
        style: &ResolvedTextStyle,
        width: f64,
    ) -> (Vec<ResolvedTextStyle>, Vec<BrokenLine>) {
        let styles: Vec<ResolvedTextStyle> = spans.iter().map(|s| s.style.resolve(style)).collect();
        let pairs: Vec<(&str, &ResolvedTextStyle)> = spans
            .iter()
            .zip(&styles)
            .map(|(span, st)| (span.text.as_str(), st))
            .collect();
        let lines = self.text_layout.break_spans(self.fonts, &pairs, style, width);
        (styles, lines)
    }

    /// Width offered to a container's child. Aligned children shrink to
    /// their intrinsic width so the alignment has room to act.
    pub fn child_width(&self, parent: &Node, child: &Node, width: f64, style: &ResolvedTextStyle) -> f64 {
        if parent.style.align == HAlign::Start {
            width
        } else {
            self.intrinsic_width(child, style).min(width)
        }
    }

    /// Final widths of a row's items.
    pub fn row_widths(&self, items: &[RowItem], spacing: f64, width: f64) -> Vec<f64> {
        let sizes: Vec<ItemSize> = items.iter().map(|i| i.size).collect();
        flex::distribute(&sizes, width, spacing)
    }

    /// Final widths of a table's columns.
    pub fn column_widths(&self, table: &Table, width: f64) -> Vec<f64> {
        let sizes: Vec<ItemSize> = table.columns.iter().map(|c| c.as_item_size()).collect();
        flex::distribute(&sizes, width, 0.0)
    }

    /// Height of a table row: its tallest cell.
    pub fn row_height(&self, row: &TableRow, columns: &[f64], style: &ResolvedTextStyle) -> f64 {
        row.cells
            .iter()
            .zip(columns)
            .map(|(cell, w)| self.measure(cell, *w, style))
            .fold(0.0, f64::max)
    }

    /// Widest the node gets without wrapping text, margins included.
    pub fn intrinsic_width(&self, node: &Node, inherited: &ResolvedTextStyle) -> f64 {
        let style = &node.style;
        if let Some(w) = style.width {
            return w + style.margin.horizontal();
        }
        let ts = node.text_style.resolve(inherited);
        let content = match &node.kind {
            NodeKind::Text { spans } => {
                let styles: Vec<ResolvedTextStyle> = spans.iter().map(|s| s.style.resolve(&ts)).collect();
                let pairs: Vec<(&str, &ResolvedTextStyle)> = spans
                    .iter()
                    .zip(&styles)
                    .map(|(span, st)| (span.text.as_str(), st))
                    .collect();
                self.text_layout.measure_natural_width(self.fonts, &pairs, &ts)
            }
            NodeKind::Image { src, width, height } => match (width, height) {
                (Some(w), _) => *w,
                (None, Some(h)) => h / self.aspect(src.as_deref()),
                (None, None) => self
                    .image_dimensions(src.as_deref())
                    .map_or(0.0, |(w, _)| w as f64),
            },
            NodeKind::Container { child } => child
                .as_ref()
                .map_or(0.0, |c| self.intrinsic_width(c, &ts)),
            NodeKind::Row { items, spacing } => {
                let gaps = spacing * items.len().saturating_sub(1) as f64;
                items
                    .iter()
                    .map(|item| match item.size {
                        ItemSize::Constant(w) => w,
                        ItemSize::Relative(_) => self.intrinsic_width(&item.node, &ts),
                    })
                    .sum::<f64>()
                    + gaps
            }
            NodeKind::Column { items, .. } => items
                .iter()
                .map(|item| self.intrinsic_width(item, &ts))
                .fold(0.0, f64::max),
            NodeKind::Table(table) => table
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| match col.as_item_size() {
                    ItemSize::Constant(w) => w,
                    ItemSize::Relative(_) => table
                        .header
                        .iter()
                        .chain(table.rows.iter())
                        .filter_map(|row| row.cells.get(i))
                        .map(|cell| self.intrinsic_width(cell, &ts))
                        .fold(0.0, f64::max),
                })
                .sum(),
        };
        content + style.inset_horizontal() + style.margin.horizontal()
    }

    /// Size of an image's content box. Explicit sizes win; a missing side
    /// follows the image's aspect ratio; with neither, the image fills the
    /// available width.
    pub fn image_size(
        &self,
        src: Option<&str>,
        width: Option<f64>,
        height: Option<f64>,
        available: f64,
    ) -> (f64, f64) {
        match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * self.aspect(src)),
            (None, Some(h)) => (h / self.aspect(src), h),
            (None, None) => (available, available * self.aspect(src)),
        }
    }

    /// Whether the image source can be read at all.
    pub fn image_available(&self, src: Option<&str>) -> bool {
        self.image_dimensions(src).is_some()
    }

    fn aspect(&self, src: Option<&str>) -> f64 {
        match self.image_dimensions(src) {
            Some((w, h)) if w > 0 && h > 0 => h as f64 / w as f64,
            _ => FALLBACK_ASPECT,
        }
    }

    fn image_dimensions(&self, src: Option<&str>) -> Option<(u32, u32)> {
        let src = src?;
        if let Some(dims) = self.image_dims.borrow().get(src).copied() {
            return dims;
        }
        let dims = match crate::image_loader::load_image_dimensions(src) {
            Ok(dims) => Some(dims),
            Err(e) => {
                log::warn!("{}; drawing a placeholder", e);
                None
            }
        };
        self.image_dims.borrow_mut().insert(src.to_string(), dims);
        dims
    }
}
