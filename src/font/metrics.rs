//! Advance widths for the built-in fonts, in 1/1000 em.
//!
//! Values come from the Adobe Font Metrics files for the standard PDF fonts.
//! Only printable ASCII is tabulated; anything else measures as the average
//! lowercase advance, which keeps measurement total and deterministic.

/// Metrics for one built-in face.
#[derive(Debug)]
pub struct StandardFontMetrics {
    /// Widths for code points 32..=126.
    widths: &'static [u16; 95],
    /// Width used for characters outside the table.
    fallback: u16,
    /// Ascender height, used to place the baseline.
    pub ascender: u16,
}

impl StandardFontMetrics {
    /// Advance width of `ch` in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let code = ch as u32;
        let w = if (32..=126).contains(&code) {
            self.widths[(code - 32) as usize]
        } else if ch == '\u{00A0}' {
            self.widths[0]
        } else {
            self.fallback
        };
        w as f64 * font_size / 1000.0
    }

    /// Width of a string in points, with `letter_spacing` after every char.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }

    pub fn ascent(&self, font_size: f64) -> f64 {
        self.ascender as f64 * font_size / 1000.0
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const COURIER_WIDTHS: [u16; 95] = [600; 95];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_WIDTHS,
    fallback: 556,
    ascender: 718,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_BOLD_WIDTHS,
    fallback: 611,
    ascender: 718,
};

pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    widths: &COURIER_WIDTHS,
    fallback: 600,
    ascender: 629,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 1e-9);
    }

    #[test]
    fn courier_is_fixed_pitch() {
        assert_eq!(COURIER.char_width('i', 10.0), COURIER.char_width('W', 10.0));
        assert_eq!(COURIER.char_width('é', 10.0), 6.0);
    }

    #[test]
    fn string_width_with_spacing() {
        let w = HELVETICA.measure_string("ab", 10.0, 1.0);
        assert!((w - (5.56 + 5.56 + 2.0)).abs() < 1e-9);
    }
}
