//! Structured error types for the Folio layout engine.
//!
//! Layout itself never fails once a tree is accepted: overflow is reported as
//! a page warning, not an error. Everything here is raised before the first
//! page is opened, either while building the content tree or while checking
//! it against the page settings.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FolioError>;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input failed to parse as a valid Folio template.
    #[error("Failed to parse template: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The content tree is malformed (e.g. a table row with the wrong number of cells).
    #[error("Invalid structure: {0}")]
    Structure(String),

    /// The tree is well-formed but cannot be laid out with these settings
    /// (e.g. all relative weights are zero, or the page has no room for content).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A font could not be decoded or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// An image source could not be read.
    #[error("Image error: {0}")]
    Image(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Folio template schema. Check field names, types, and table shapes.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: FolioError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse template"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn structure_error_display() {
        let err = FolioError::Structure("row 2 has 3 cells, expected 5".to_string());
        assert_eq!(err.to_string(), "Invalid structure: row 2 has 3 cells, expected 5");
    }
}
