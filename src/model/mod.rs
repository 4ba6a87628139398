//! # Content Model
//!
//! The input representation for the layout engine: a [`Template`] holding
//! page settings, optional per-page header and footer, and one content tree.
//!
//! Node kinds form a closed set (text, image, container, row, column, table)
//! so measurement and layout can match on them exhaustively. Every node also
//! carries a [`BoxStyle`] for its margin/border/background/padding and a
//! [`TextStyle`] that cascades to text below it.
//!
//! Trees are built either from JSON or with the fluent builders in this
//! module. Builders consume and return their value: one chained call adds
//! exactly one child, so there is no shared, mutable composition state to
//! reuse by accident.

mod table;

pub use table::{ColumnWidth, Table, TableBuilder, TableRow};

use crate::error::{FolioError, Result};
use crate::style::{BoxStyle, Color, EdgeValues, HAlign, ResolvedTextStyle, TextStyle, VAlign};
use serde::{Deserialize, Serialize};

/// A complete layout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub page: PageSettings,

    /// Laid out at the top of every page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Node>,

    /// The flowing body content.
    pub content: Node,

    /// Laid out at the bottom of every page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Node>,

    /// Custom fonts to register before layout.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontEntry>,
}

impl Template {
    pub fn new(content: Node) -> Self {
        Self {
            page: PageSettings::default(),
            header: None,
            content,
            footer: None,
            fonts: Vec::new(),
        }
    }

    pub fn page(mut self, page: PageSettings) -> Self {
        self.page = page;
        self
    }

    pub fn header(mut self, header: Node) -> Self {
        self.header = Some(header);
        self
    }

    pub fn footer(mut self, footer: Node) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Check the whole tree for problems that must be reported before layout.
    pub fn validate(&self) -> Result<()> {
        self.page.validate()?;
        if let Some(header) = &self.header {
            header.validate()?;
        }
        self.content.validate()?;
        if let Some(footer) = &self.footer {
            footer.validate()?;
        }
        Ok(())
    }
}

/// A custom font to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter").
    pub family: String,
    /// Base64-encoded font data, or a data URI.
    pub src: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

/// Page size, margins, background and default text style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    #[serde(default)]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,

    /// Root of the text style cascade.
    #[serde(default)]
    pub default_text: TextStyle,
}

fn default_margin() -> Edges {
    Edges::uniform(54.0) // ~0.75 inch
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
            background: None,
            default_text: TextStyle::default(),
        }
    }
}

impl PageSettings {
    pub fn size(mut self, size: PageSize) -> Self {
        self.size = size;
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = Edges::uniform(margin);
        self
    }

    pub fn margins(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn default_text(mut self, style: TextStyle) -> Self {
        self.default_text = style;
        self
    }

    /// Width and height of the area inside the margins.
    pub fn content_size(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        (w - self.margin.horizontal(), h - self.margin.vertical())
    }

    pub fn resolved_text(&self) -> ResolvedTextStyle {
        self.default_text.resolve(&ResolvedTextStyle::default())
    }

    fn validate(&self) -> Result<()> {
        let (w, h) = self.content_size();
        if !(w > 0.0 && h > 0.0) {
            return Err(FolioError::Config(format!(
                "margins leave no content area on a {:.2}x{:.2} page",
                self.size.dimensions().0,
                self.size.dimensions().1
            )));
        }
        check_text_style(&self.default_text, "page default text")
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margin and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A node in the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Optional identifier, carried into layout output and warnings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub kind: NodeKind,

    #[serde(default)]
    pub style: BoxStyle,

    /// Typography inherited by every text node below this one.
    #[serde(default, skip_serializing_if = "TextStyle::is_empty")]
    pub text_style: TextStyle,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// A paragraph made of styled spans.
    Text { spans: Vec<TextSpan> },

    /// An image. Missing dimensions come from the image's aspect ratio.
    Image {
        /// Base64 data, a data URI, or a file path.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },

    /// A box with at most one child. With no child it is an empty box
    /// (a spacer, or a painted rectangle with a fixed height).
    Container {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        child: Option<Box<Node>>,
    },

    /// Children side by side, sharing the width by weight.
    Row {
        items: Vec<RowItem>,
        #[serde(default)]
        spacing: f64,
    },

    /// Children stacked top to bottom.
    Column {
        items: Vec<Node>,
        #[serde(default)]
        spacing: f64,
    },

    Table(Table),
}

/// An inline styled run within a Text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    pub text: String,
    #[serde(default, skip_serializing_if = "TextStyle::is_empty")]
    pub style: TextStyle,
}

impl TextSpan {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            style: TextStyle::default(),
        }
    }

    pub fn styled(text: &str, style: TextStyle) -> Self {
        Self {
            text: text.to_string(),
            style,
        }
    }
}

/// A slot in a Row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowItem {
    #[serde(default)]
    pub size: ItemSize,
    pub node: Node,
}

/// How a row item claims width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemSize {
    /// A share of the width left after constant items and spacing.
    Relative(f64),
    /// A fixed width in points.
    Constant(f64),
}

impl Default for ItemSize {
    fn default() -> Self {
        ItemSize::Relative(1.0)
    }
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            id: None,
            kind,
            style: BoxStyle::default(),
            text_style: TextStyle::default(),
        }
    }

    /// A paragraph with a single unstyled span.
    pub fn text(text: &str) -> Self {
        Self::with_kind(NodeKind::Text {
            spans: vec![TextSpan::new(text)],
        })
    }

    /// A paragraph made of several spans.
    pub fn spans(spans: Vec<TextSpan>) -> Self {
        Self::with_kind(NodeKind::Text { spans })
    }

    pub fn image(src: &str) -> Self {
        Self::with_kind(NodeKind::Image {
            src: Some(src.to_string()),
            width: None,
            height: None,
        })
    }

    /// An image of known size that needs no source lookup.
    pub fn image_sized(src: Option<&str>, width: f64, height: f64) -> Self {
        Self::with_kind(NodeKind::Image {
            src: src.map(str::to_string),
            width: Some(width),
            height: Some(height),
        })
    }

    /// An empty box.
    pub fn empty() -> Self {
        Self::with_kind(NodeKind::Container { child: None })
    }

    /// A box around a single child.
    pub fn container(child: Node) -> Self {
        Self::with_kind(NodeKind::Container {
            child: Some(Box::new(child)),
        })
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    // ── Box builders ───────────────────────────────────────────

    pub fn padding(mut self, v: f64) -> Self {
        self.style.padding = Edges::uniform(v);
        self
    }

    pub fn padding_vertical(mut self, v: f64) -> Self {
        self.style.padding.top = v;
        self.style.padding.bottom = v;
        self
    }

    pub fn padding_horizontal(mut self, v: f64) -> Self {
        self.style.padding.left = v;
        self.style.padding.right = v;
        self
    }

    pub fn padding_top(mut self, v: f64) -> Self {
        self.style.padding.top = v;
        self
    }

    pub fn padding_bottom(mut self, v: f64) -> Self {
        self.style.padding.bottom = v;
        self
    }

    pub fn padding_left(mut self, v: f64) -> Self {
        self.style.padding.left = v;
        self
    }

    pub fn margin(mut self, margin: Edges) -> Self {
        self.style.margin = margin;
        self
    }

    pub fn margin_top(mut self, v: f64) -> Self {
        self.style.margin.top = v;
        self
    }

    pub fn border(mut self, width: f64) -> Self {
        self.style.border = EdgeValues::uniform(width);
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.style.border_color = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.style.background = Some(color);
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.style.width = Some(width);
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.style.height = Some(height);
        self
    }

    pub fn align_center(mut self) -> Self {
        self.style.align = HAlign::Center;
        self
    }

    pub fn align_right(mut self) -> Self {
        self.style.align = HAlign::End;
        self
    }

    pub fn align_middle(mut self) -> Self {
        self.style.valign = VAlign::Middle;
        self
    }

    pub fn align_bottom(mut self) -> Self {
        self.style.valign = VAlign::Bottom;
        self
    }

    // ── Text builders ──────────────────────────────────────────

    pub fn text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    pub fn font_family(mut self, family: &str) -> Self {
        self.text_style.font_family = Some(family.to_string());
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.text_style.font_size = Some(size);
        self
    }

    pub fn semi_bold(mut self) -> Self {
        self.text_style.font_weight = Some(600);
        self
    }

    pub fn bold(mut self) -> Self {
        self.text_style.font_weight = Some(700);
        self
    }

    pub fn italic(mut self) -> Self {
        self.text_style.italic = Some(true);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.text_style.color = Some(color);
        self
    }

    pub fn line_height(mut self, multiplier: f64) -> Self {
        self.text_style.line_height = Some(multiplier);
        self
    }

    /// A short label for diagnostics: the id when present, otherwise the kind.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => self.kind_name().to_string(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Text { .. } => "Text",
            NodeKind::Image { .. } => "Image",
            NodeKind::Container { .. } => "Container",
            NodeKind::Row { .. } => "Row",
            NodeKind::Column { .. } => "Column",
            NodeKind::Table(_) => "Table",
        }
    }

    /// Check this subtree for problems that must be reported before layout:
    /// unresolvable weights, negative sizes, malformed tables.
    pub fn validate(&self) -> Result<()> {
        let s = &self.style;
        let negative = [
            s.padding.top,
            s.padding.right,
            s.padding.bottom,
            s.padding.left,
            s.margin.top,
            s.margin.right,
            s.margin.bottom,
            s.margin.left,
            s.border.top,
            s.border.right,
            s.border.bottom,
            s.border.left,
            s.width.unwrap_or(0.0),
            s.height.unwrap_or(0.0),
        ]
        .iter()
        .any(|v| !valid_length(*v));
        if negative {
            return Err(FolioError::Config(format!(
                "{} has a negative or non-finite box size",
                self.label()
            )));
        }

        check_text_style(&self.text_style, &self.label())?;

        match &self.kind {
            NodeKind::Text { spans } => {
                for span in spans {
                    check_text_style(&span.style, &self.label())?;
                }
                Ok(())
            }
            NodeKind::Image { width, height, .. } => {
                if [width, height].iter().any(|v| !valid_length(v.unwrap_or(0.0))) {
                    return Err(FolioError::Config(format!(
                        "{} has a negative or non-finite image size",
                        self.label()
                    )));
                }
                Ok(())
            }
            NodeKind::Container { child } => match child {
                Some(child) => child.validate(),
                None => Ok(()),
            },
            NodeKind::Row { items, spacing } => {
                if !valid_length(*spacing) {
                    return Err(FolioError::Config(format!(
                        "{} has negative or non-finite spacing",
                        self.label()
                    )));
                }
                let sizes: Vec<ItemSize> = items.iter().map(|i| i.size).collect();
                crate::layout::flex::check_sizes(&sizes)
                    .map_err(|msg| FolioError::Config(format!("{}: {}", self.label(), msg)))?;
                for item in items {
                    item.node.validate()?;
                }
                Ok(())
            }
            NodeKind::Column { items, spacing } => {
                if !valid_length(*spacing) {
                    return Err(FolioError::Config(format!(
                        "{} has negative or non-finite spacing",
                        self.label()
                    )));
                }
                for item in items {
                    item.validate()?;
                }
                Ok(())
            }
            NodeKind::Table(table) => {
                table
                    .check_shape()
                    .map_err(|msg| FolioError::Structure(format!("{}: {}", self.label(), msg)))?;
                let sizes: Vec<ItemSize> = table.columns.iter().map(|c| c.as_item_size()).collect();
                crate::layout::flex::check_sizes(&sizes)
                    .map_err(|msg| FolioError::Config(format!("{}: {}", self.label(), msg)))?;
                for row in table.header.iter().chain(table.rows.iter()) {
                    for cell in &row.cells {
                        cell.validate()?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn valid_length(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Font sizes and line heights must be positive when set.
fn check_text_style(style: &TextStyle, owner: &str) -> Result<()> {
    let positive = |v: Option<f64>| v.map_or(true, |v| v.is_finite() && v > 0.0);
    if !positive(style.font_size) {
        return Err(FolioError::Config(format!(
            "{} has a non-positive font size",
            owner
        )));
    }
    if !positive(style.line_height) {
        return Err(FolioError::Config(format!(
            "{} has a non-positive line height",
            owner
        )));
    }
    Ok(())
}

/// Builder for a Row node.
#[derive(Debug, Clone, Default)]
pub struct Row {
    items: Vec<RowItem>,
    spacing: f64,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Space between adjacent items.
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Add an item taking `weight` shares of the free width.
    pub fn relative(mut self, weight: f64, node: Node) -> Self {
        self.items.push(RowItem {
            size: ItemSize::Relative(weight),
            node,
        });
        self
    }

    /// Add an item with a fixed width.
    pub fn constant(mut self, width: f64, node: Node) -> Self {
        self.items.push(RowItem {
            size: ItemSize::Constant(width),
            node,
        });
        self
    }

    pub fn into_node(self) -> Node {
        Node::with_kind(NodeKind::Row {
            items: self.items,
            spacing: self.spacing,
        })
    }
}

/// Builder for a Column node.
#[derive(Debug, Clone, Default)]
pub struct Column {
    items: Vec<Node>,
    spacing: f64,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    /// Space between adjacent items.
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn item(mut self, node: Node) -> Self {
        self.items.push(node);
        self
    }

    pub fn into_node(self) -> Node {
        Node::with_kind(NodeKind::Column {
            items: self.items,
            spacing: self.spacing,
        })
    }
}

impl From<Table> for Node {
    fn from(table: Table) -> Self {
        Node::with_kind(NodeKind::Table(table))
    }
}
