//! # Style System
//!
//! Two small style models cover everything the layout engine needs:
//!
//! - [`BoxStyle`] describes the box around a node: margin, border,
//!   background, padding, fixed sizes, and alignment of the content inside.
//! - [`TextStyle`] describes typography. Every field is optional and cascades
//!   from the page default through ancestors down to individual spans.
//!
//! Both are plain values. Builder methods consume and return `self`, so a
//! style is assembled by chaining rather than by mutating shared state.

use crate::model::Edges;
use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RGB` or `#RRGGBB`. Anything else yields black.
    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        let (r, g, b) = match hex.len() {
            3 => (
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Values for each edge (top, right, bottom, left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeValues<T: Copy> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> EdgeValues<T> {
    pub fn uniform(v: T) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

impl EdgeValues<f64> {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        self.top <= 0.0 && self.right <= 0.0 && self.bottom <= 0.0 && self.left <= 0.0
    }
}

impl Default for EdgeValues<f64> {
    fn default() -> Self {
        Self::uniform(0.0)
    }
}

/// Horizontal placement of content narrower than its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Start,
    Center,
    End,
}

impl HAlign {
    /// Fraction of the free space placed before the content.
    pub fn factor(self) -> f64 {
        match self {
            HAlign::Start => 0.0,
            HAlign::Center => 0.5,
            HAlign::End => 1.0,
        }
    }
}

/// Vertical placement of content shorter than its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    pub fn factor(self) -> f64 {
        match self {
            VAlign::Top => 0.0,
            VAlign::Middle => 0.5,
            VAlign::Bottom => 1.0,
        }
    }
}

/// The box around a node, from the outside in: margin, border, background
/// (painted inside the border), padding, content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxStyle {
    #[serde(default)]
    pub margin: Edges,
    #[serde(default)]
    pub padding: Edges,
    #[serde(default)]
    pub border: EdgeValues<f64>,
    #[serde(default)]
    pub border_color: Option<Color>,
    #[serde(default)]
    pub background: Option<Color>,
    /// Fixed width of the border box, in points.
    #[serde(default)]
    pub width: Option<f64>,
    /// Fixed height of the border box, in points.
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub align: HAlign,
    #[serde(default)]
    pub valign: VAlign,
}

impl BoxStyle {
    /// Whether anything is painted for the box itself.
    pub fn has_decoration(&self) -> bool {
        self.background.is_some() || !self.border.is_zero()
    }

    /// A box that only insets its content and paints nothing. Such boxes can
    /// be dissolved into their content during pagination.
    pub fn is_transparent(&self) -> bool {
        !self.has_decoration()
            && self.width.is_none()
            && self.height.is_none()
            && self.align == HAlign::Start
            && self.valign == VAlign::Top
    }

    /// Horizontal space taken by border and padding.
    pub fn inset_horizontal(&self) -> f64 {
        self.padding.horizontal() + self.border.horizontal()
    }

    /// Vertical space taken by border and padding.
    pub fn inset_vertical(&self) -> f64 {
        self.padding.vertical() + self.border.vertical()
    }
}

/// Typography. Every field is optional; unset fields inherit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Font weight (100-900). 600 is semibold, 700 bold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Line height as a multiplier of font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_string());
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.font_weight = Some(weight);
        self
    }

    pub fn semi_bold(self) -> Self {
        self.weight(600)
    }

    pub fn bold(self) -> Self {
        self.weight(700)
    }

    pub fn italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn line_height(mut self, multiplier: f64) -> Self {
        self.line_height = Some(multiplier);
        self
    }

    /// Resolve against the inherited style.
    pub fn resolve(&self, parent: &ResolvedTextStyle) -> ResolvedTextStyle {
        ResolvedTextStyle {
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| parent.font_family.clone()),
            font_size: self.font_size.unwrap_or(parent.font_size),
            font_weight: self.font_weight.unwrap_or(parent.font_weight),
            italic: self.italic.unwrap_or(parent.italic),
            color: self.color.unwrap_or(parent.color),
            line_height: self.line_height.unwrap_or(parent.line_height),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TextStyle::default()
    }
}

/// Concrete typography after the cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    pub italic: bool,
    pub color: Color,
    pub line_height: f64,
}

impl ResolvedTextStyle {
    /// Height of one line set in this style.
    pub fn line_box(&self) -> f64 {
        self.font_size * self.line_height
    }
}

impl Default for ResolvedTextStyle {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            font_weight: 400,
            italic: false,
            color: Color::BLACK,
            line_height: 1.2,
        }
    }
}
