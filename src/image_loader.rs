//! # Image Sources
//!
//! Layout only needs an image's pixel dimensions, to derive a height from a
//! width when the caller gives just one of them. Dimensions are read from
//! the image header without decoding pixels.

use std::io::Cursor;

use crate::error::{FolioError, Result};

/// Read the pixel dimensions of an image source.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` data URI
/// - File path starting with `/`, `./` or `../`
/// - Raw base64-encoded image data
pub fn load_image_dimensions(src: &str) -> Result<(u32, u32)> {
    let bytes = read_source_bytes(src)?;
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FolioError::Image(format!("failed to sniff image format: {}", e)))?
        .into_dimensions()
        .map_err(|e| FolioError::Image(format!("failed to read image dimensions: {}", e)))
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| FolioError::Image("invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]).map_err(FolioError::Image);
    }

    // Only explicit path prefixes, since base64 text may contain '/'
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src)
            .map_err(|e| FolioError::Image(format!("failed to read image file '{}': {}", src, e)));
    }

    base64_decode(src).map_err(FolioError::Image)
}

pub(crate) fn base64_decode(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("base64 decode error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageOutputFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_data_uri_dimensions() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(tiny_png(8, 4));
        let src = format!("data:image/png;base64,{}", b64);
        assert_eq!(load_image_dimensions(&src).unwrap(), (8, 4));
    }

    #[test]
    fn test_raw_base64_dimensions() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(tiny_png(3, 9));
        assert_eq!(load_image_dimensions(&b64).unwrap(), (3, 9));
    }

    #[test]
    fn test_invalid_data_uri() {
        let result = load_image_dimensions("data:image/png;base64");
        assert!(matches!(result, Err(FolioError::Image(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_image_dimensions("./definitely/not/here.png");
        assert!(matches!(result, Err(FolioError::Image(_))));
    }

    #[test]
    fn test_garbage_bytes() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(b"hello world");
        assert!(load_image_dimensions(&b64).is_err());
    }
}
