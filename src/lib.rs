//! # Folio
//!
//! A flow-based document layout and pagination engine.
//!
//! Callers describe a document as a tree of boxes (text, images, rows,
//! columns, tables) with margins, borders, backgrounds and padding. Folio
//! measures that tree, breaks text into lines, and distributes the content
//! over fixed-size pages. The result is a [`Document`](layout::Document):
//! pages of absolutely positioned draw instructions, ready for any renderer.
//!
//! The page is the unit of layout. Content flows *into* pages: each block is
//! measured at the width it will occupy and placed only if it fits the page
//! being filled. Tables break between rows and repeat their header on every
//! page they touch.
//!
//! ## Architecture
//!
//! ```text
//! Input (builders / JSON)
//!       ↓
//!   [model]    Content tree, page settings, template
//!       ↓
//!   [style]    Box model values, text style cascade
//!       ↓
//!   [layout]   Measurement, flow placement, pagination
//!       ↓
//!   Document   Pages of positioned elements
//! ```
//!
//! Rendering a Document to bytes is left to the caller.

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;

pub use error::{FolioError, Result};
pub use layout::{Document, LayoutEngine};
pub use model::Template;

use font::FontContext;

/// Lay out a template into pages.
///
/// This is the primary entry point. Custom fonts listed in the template are
/// registered first; the built-in Helvetica and Courier are always
/// available.
pub fn layout(template: &Template) -> Result<Document> {
    let mut font_context = FontContext::new();
    for entry in &template.fonts {
        font_context.register_entry(entry)?;
    }
    LayoutEngine::new().layout(template, &font_context)
}

/// Lay out a template described as JSON.
pub fn layout_json(json: &str) -> Result<Document> {
    let template: Template = serde_json::from_str(json)?;
    layout(&template)
}
