//! # Font Management
//!
//! Maps a (family, weight, italic) request to advance-width metrics.
//!
//! Helvetica and Courier are built in. Custom TrueType/OpenType faces can be
//! registered from raw bytes; their metrics are read once with `ttf-parser`
//! and cached as plain tables so measurement never touches the font file
//! again.

pub mod metrics;

use std::collections::HashMap;

use crate::error::{FolioError, Result};
use crate::model::FontEntry;
pub use metrics::StandardFontMetrics;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// A built-in face. Oblique variants share upright metrics.
    Standard(StandardFont),
    /// A registered TrueType/OpenType face.
    Custom(CustomFontMetrics),
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    pub fn ascent(&self, font_size: f64) -> f64 {
        (self.ascender as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| FolioError::Font(format!("failed to parse font: {}", e)))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Basic Multilingual Plane is enough for advance lookup
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
        })
    }
}

/// The built-in faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
}

impl StandardFont {
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            StandardFont::Helvetica => &metrics::HELVETICA,
            StandardFont::HelveticaBold => &metrics::HELVETICA_BOLD,
            // Courier is fixed pitch in every weight.
            StandardFont::Courier => &metrics::COURIER,
        }
    }
}

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = [
            (("Helvetica", 400), StandardFont::Helvetica),
            (("Helvetica", 700), StandardFont::HelveticaBold),
            (("Courier", 400), StandardFont::Courier),
            (("Courier", 700), StandardFont::Courier),
        ];

        for ((family, weight), font) in standard_mappings {
            for italic in [false, true] {
                fonts.insert(
                    FontKey {
                        family: family.to_string(),
                        weight,
                        italic,
                    },
                    FontData::Standard(font),
                );
            }
        }

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        let lookup = |family: &str, weight: u32, italic: bool| {
            self.fonts.get(&FontKey {
                family: family.to_string(),
                weight,
                italic,
            })
        };

        if let Some(font) = lookup(family, weight, italic) {
            return font;
        }

        // Snap to 400 or 700; semibold renders bold
        let snapped_weight = if weight >= 600 { 700 } else { 400 };
        if let Some(font) = lookup(family, snapped_weight, italic) {
            return font;
        }
        // Custom faces are often registered upright only
        if let Some(font) = lookup(family, snapped_weight, false) {
            return font;
        }

        static FALLBACK_REGULAR: FontData = FontData::Standard(StandardFont::Helvetica);
        static FALLBACK_BOLD: FontData = FontData::Standard(StandardFont::HelveticaBold);
        lookup("Helvetica", snapped_weight, italic).unwrap_or(if snapped_weight >= 700 {
            &FALLBACK_BOLD
        } else {
            &FALLBACK_REGULAR
        })
    }

    /// Register a custom font from raw TrueType/OpenType bytes.
    pub fn register(&mut self, family: &str, weight: u32, italic: bool, data: &[u8]) -> Result<()> {
        let metrics = CustomFontMetrics::from_font_data(data)?;
        log::debug!(
            "registered font {} ({} weight {}, {} glyph advances)",
            family,
            if italic { "italic" } else { "upright" },
            weight,
            metrics.advance_widths.len()
        );
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            FontData::Custom(metrics),
        );
        Ok(())
    }
}

/// Shared font context used during measurement and layout.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, family: &str, weight: u32, italic: bool, font_size: f64) -> f64 {
        match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom(m) => m.char_width(ch, font_size),
        }
    }

    /// Measure the width of a string in points.
    pub fn measure_string(
        &self,
        text: &str,
        family: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
    ) -> f64 {
        match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size, 0.0),
            FontData::Custom(m) => text.chars().map(|ch| m.char_width(ch, font_size)).sum(),
        }
    }

    /// Distance from the top of the em box to the baseline.
    pub fn ascent(&self, family: &str, weight: u32, italic: bool, font_size: f64) -> f64 {
        match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font.metrics().ascent(font_size),
            FontData::Custom(m) => m.ascent(font_size),
        }
    }

    /// Register a custom font from raw bytes.
    pub fn register_font(&mut self, family: &str, weight: u32, italic: bool, data: &[u8]) -> Result<()> {
        self.registry.register(family, weight, italic, data)
    }

    /// Register a font entry from a template (base64 or data URI payload).
    pub fn register_entry(&mut self, entry: &FontEntry) -> Result<()> {
        let b64 = match entry.src.find("base64,") {
            Some(pos) => &entry.src[pos + "base64,".len()..],
            None => entry.src.as_str(),
        };
        let data = crate::image_loader::base64_decode(b64)
            .map_err(|e| FolioError::Font(format!("font '{}': {}", entry.family, e)))?;
        self.register_font(&entry.family, entry.weight, entry.italic, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', "Helvetica", 400, false, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.char_width('a', "Helvetica", 400, false, 12.0);
        let bold = ctx.char_width('a', "Helvetica", 700, false, 12.0);
        assert!(bold > regular, "Bold a should be wider than regular a");
    }

    #[test]
    fn test_semibold_snaps_to_bold() {
        let ctx = FontContext::new();
        let semi = ctx.char_width('b', "Helvetica", 600, false, 10.0);
        let bold = ctx.char_width('b', "Helvetica", 700, false, 10.0);
        assert_eq!(semi, bold);
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.char_width('A', "Helvetica", 400, false, 12.0);
        let w2 = ctx.char_width('A', "UnknownFont", 400, true, 12.0);
        assert!((w1 - w2).abs() < 0.001);
    }

    #[test]
    fn test_invalid_font_bytes_rejected() {
        let mut ctx = FontContext::new();
        let result = ctx.register_font("Broken", 400, false, b"not a font");
        assert!(matches!(result, Err(FolioError::Font(_))));
    }

    #[test]
    fn test_invalid_font_entry_base64() {
        let mut ctx = FontContext::new();
        let entry = FontEntry {
            family: "Broken".to_string(),
            src: "data:font/ttf;base64,@@@".to_string(),
            weight: 400,
            italic: false,
        };
        assert!(matches!(ctx.register_entry(&entry), Err(FolioError::Font(_))));
    }
}
