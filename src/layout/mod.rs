//! # Page-Aware Layout
//!
//! Turns a [`Template`] into a [`Document`]: pages of absolutely positioned
//! elements with every text line already broken.
//!
//! The engine never lays content out on an infinitely tall canvas and slices
//! it afterwards. Instead:
//!
//! 1. The content tree is flattened into a stream of units: atomic blocks,
//!    spacing, and table rows ([`paginate`]).
//! 2. Each unit is measured at the width it will be laid out at
//!    ([`measure`]). Measurements are memoized per (node, width) for the
//!    duration of one layout call.
//! 3. A small state machine decides per unit whether it fits the page
//!    being filled, forces a new page, or is placed as overflow
//!    ([`page_break`]).
//! 4. Placed units become element trees with absolute coordinates
//!    ([`flow`]).
//!
//! Layout never mutates the template, so the same tree can be laid out
//! again under different page settings.

pub mod boxes;
pub mod flex;
pub mod flow;
pub mod measure;
pub mod page_break;
mod paginate;

use serde::Serialize;

use crate::error::Result;
use crate::font::FontContext;
use crate::model::{PageSettings, Template};
use crate::style::{Color, EdgeValues};

use measure::Measurer;
use paginate::Paginator;

/// The result of a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub settings: PageSettings,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A fully laid-out page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    /// Background first, then header, body and footer, in paint order.
    pub elements: Vec<LayoutElement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LayoutWarning>,
}

impl Page {
    /// First element with the given id, searching depth-first.
    pub fn find(&self, id: &str) -> Option<&LayoutElement> {
        self.elements.iter().find_map(|e| e.find(id))
    }

    /// Every text line on the page, in paint order.
    pub fn text_lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for element in &self.elements {
            element.collect_lines(&mut out);
        }
        out
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutElement {
    /// Absolute position on the page (top-left corner of the border box).
    pub x: f64,
    pub y: f64,
    /// Border box size: padding and border included, margin excluded.
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
    /// Positioned relative to the page, not the parent.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutElement>,
    /// Logical node type (e.g. "Text", "Row", "TableRow").
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl LayoutElement {
    pub fn find(&self, id: &str) -> Option<&LayoutElement> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Text of every line in this subtree.
    pub fn text_lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_lines(&mut out);
        out
    }

    fn collect_lines(&self, out: &mut Vec<String>) {
        if let DrawCommand::Text { lines } = &self.draw {
            out.extend(lines.iter().map(TextLine::text));
        }
        for child in &self.children {
            child.collect_lines(out);
        }
    }

    /// Bottom edge of the border box.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// What to draw for an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawCommand {
    /// Nothing to draw (just a layout container).
    None,
    /// Background inside the border, then the border.
    #[serde(rename_all = "camelCase")]
    Rect {
        background: Option<Color>,
        border_width: EdgeValues<f64>,
        border_color: Color,
    },
    Text { lines: Vec<TextLine> },
    Image { src: String },
    /// Drawn in place of an image whose source could not be read.
    ImagePlaceholder,
}

/// One broken line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub x: f64,
    /// Baseline position.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub runs: Vec<PositionedRun>,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A run of characters sharing one resolved style.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedRun {
    pub text: String,
    /// Absolute x of the run's first character.
    pub x: f64,
    pub width: f64,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    pub italic: bool,
    pub color: Color,
}

/// Non-fatal problems found during layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutWarning {
    /// A unit taller than an empty page was placed anyway and runs past
    /// the bottom of the body area.
    Overflow {
        id: String,
        required: f64,
        available: f64,
    },
}

/// The main layout engine.
#[derive(Debug, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    pub fn new() -> Self {
        Self
    }

    /// Lay out a template into pages.
    ///
    /// Fails before any layout work if the template is invalid: malformed
    /// tables, unresolvable weights, or page furniture leaving no room for
    /// the body.
    pub fn layout(&self, template: &Template, font_context: &FontContext) -> Result<Document> {
        template.validate()?;

        let measurer = Measurer::new(font_context);
        let paginator = Paginator::new(template, &measurer)?;
        let pages = paginator.run(&template.content);

        let (hits, misses) = measurer.stats();
        log::debug!(
            "laid out {} page(s); measurement cache {} hits, {} misses",
            pages.len(),
            hits,
            misses
        );

        Ok(Document {
            settings: template.page.clone(),
            pages,
        })
    }
}
