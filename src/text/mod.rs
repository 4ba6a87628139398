//! # Text Layout
//!
//! Greedy line breaking over multi-style spans.
//!
//! Break opportunities come from UAX#14, computed over the concatenated text
//! of all spans so a break can fall on a span boundary. Lines are filled
//! greedily: a line ends at the last opportunity before the overflowing
//! character. A word wider than the whole line is cut by character, and every
//! line takes at least one character, so a width narrower than a single glyph
//! degrades to one character per line instead of looping.
//!
//! Breaking is a pure function of (text, styles, width). Pagination measures
//! the same paragraph many times and relies on getting the same answer.

use crate::font::FontContext;
use crate::style::ResolvedTextStyle;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Tolerance for width comparisons, so text measured at its own intrinsic
/// width does not wrap because of float noise.
const WIDTH_EPSILON: f64 = 1e-6;

/// A contiguous run of one span's characters on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRun {
    /// Index of the source span.
    pub span: usize,
    pub text: String,
    /// Offset from the start of the line.
    pub x_offset: f64,
    pub width: f64,
}

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub runs: Vec<LineRun>,
    /// Width without trailing spaces.
    pub width: f64,
    /// Line box height: the tallest `font_size * line_height` on the line.
    pub height: f64,
    /// Distance from the top of the line box to the baseline.
    pub baseline: f64,
}

impl BrokenLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Each entry is the opportunity *before* that character. Index 0 is always
/// `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the start of the next segment
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break styled spans into lines no wider than `max_width`.
    ///
    /// `base` sets the height of lines that contain no characters (an empty
    /// paragraph, or a blank line between two newlines).
    pub fn break_spans(
        &self,
        font_context: &FontContext,
        spans: &[(&str, &ResolvedTextStyle)],
        base: &ResolvedTextStyle,
        max_width: f64,
    ) -> Vec<BrokenLine> {
        let mut chars: Vec<char> = Vec::new();
        let mut owners: Vec<usize> = Vec::new();
        let mut widths: Vec<f64> = Vec::new();
        let mut full_text = String::new();

        for (span_idx, (text, style)) in spans.iter().enumerate() {
            for ch in text.chars() {
                chars.push(ch);
                owners.push(span_idx);
                widths.push(font_context.char_width(
                    ch,
                    &style.font_family,
                    style.font_weight,
                    style.italic,
                    style.font_size,
                ));
            }
            full_text.push_str(text);
        }

        if chars.is_empty() {
            return vec![self.make_line(font_context, spans, base, &[], &[], &[])];
        }

        let break_opps = compute_break_opportunities(&full_text);
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        let emit = |lines: &mut Vec<BrokenLine>, start: usize, end: usize| {
            // Newlines are never drawn
            let mut end = end;
            while end > start && is_newline(chars[end - 1]) {
                end -= 1;
            }
            lines.push(self.make_line(
                font_context,
                spans,
                base,
                &chars[start..end],
                &owners[start..end],
                &widths[start..end],
            ));
        };

        for i in 0..chars.len() {
            let ch = chars[i];

            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        emit(&mut lines, line_start, i);
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        // The line may end after char[i - 1]
                        last_break_point = Some(i - 1);
                    }
                    None => {}
                }
            }

            if is_newline(ch) {
                continue;
            }

            let char_width = widths[i];
            // Spaces hang past the edge; the break lands after them
            if ch != ' ' && line_width + char_width > max_width + WIDTH_EPSILON && line_start < i {
                if let Some(bp) = last_break_point.filter(|bp| *bp >= line_start) {
                    emit(&mut lines, line_start, bp + 1);
                    line_start = bp + 1;
                    line_width = widths[line_start..=i].iter().sum();
                    last_break_point = None;
                    if line_width <= max_width + WIDTH_EPSILON || line_start == i {
                        continue;
                    }
                    // The carried-over word alone overflows: cut it too
                    line_width -= char_width;
                }

                // No opportunity on this line: cut the word here
                emit(&mut lines, line_start, i);
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        if line_start < chars.len() {
            emit(&mut lines, line_start, chars.len());
        }

        lines
    }

    /// Width of the widest line when only mandatory breaks apply.
    pub fn measure_natural_width(
        &self,
        font_context: &FontContext,
        spans: &[(&str, &ResolvedTextStyle)],
        base: &ResolvedTextStyle,
    ) -> f64 {
        self.break_spans(font_context, spans, base, f64::INFINITY)
            .iter()
            .map(|l| l.width)
            .fold(0.0, f64::max)
    }

    fn make_line(
        &self,
        font_context: &FontContext,
        spans: &[(&str, &ResolvedTextStyle)],
        base: &ResolvedTextStyle,
        chars: &[char],
        owners: &[usize],
        widths: &[f64],
    ) -> BrokenLine {
        let mut runs: Vec<LineRun> = Vec::new();
        let mut x = 0.0;
        for ((&ch, &owner), &w) in chars.iter().zip(owners).zip(widths) {
            match runs.last_mut() {
                Some(run) if run.span == owner => {
                    run.text.push(ch);
                    run.width += w;
                }
                _ => runs.push(LineRun {
                    span: owner,
                    text: ch.to_string(),
                    x_offset: x,
                    width: w,
                }),
            }
            x += w;
        }

        // Trailing spaces do not count toward the line width
        let mut effective_width = x;
        let mut i = chars.len();
        while i > 0 && chars[i - 1] == ' ' {
            i -= 1;
            effective_width -= widths[i];
        }

        let metrics = |style: &ResolvedTextStyle| {
            let line_box = style.line_box();
            let ascent = font_context.ascent(
                &style.font_family,
                style.font_weight,
                style.italic,
                style.font_size,
            );
            (line_box, (line_box - style.font_size) / 2.0 + ascent)
        };

        let (height, baseline) = if runs.is_empty() {
            metrics(base)
        } else {
            runs.iter()
                .map(|run| metrics(spans[run.span].1))
                .fold((0.0f64, 0.0f64), |(h, b), (lh, lb)| (h.max(lh), b.max(lb)))
        };

        BrokenLine {
            runs,
            width: effective_width.max(0.0),
            height,
            baseline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(size: f64) -> ResolvedTextStyle {
        ResolvedTextStyle {
            font_size: size,
            ..Default::default()
        }
    }

    fn break_plain(text: &str, width: f64) -> Vec<BrokenLine> {
        let fc = FontContext::new();
        let s = style(12.0);
        TextLayout::new().break_spans(&fc, &[(text, &s)], &s, width)
    }

    #[test]
    fn test_single_line() {
        let lines = break_plain("Hello", 200.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Hello");
        assert!((lines[0].height - 14.4).abs() < 1e-9);
    }

    #[test]
    fn test_line_break_at_space() {
        let lines = break_plain("Hello World", 40.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello ");
        assert_eq!(lines[1].text(), "World");
    }

    #[test]
    fn test_trailing_space_not_counted() {
        let lines = break_plain("Hello World", 40.0);
        let fc = FontContext::new();
        let hello = fc.measure_string("Hello", "Helvetica", 400, false, 12.0);
        assert!((lines[0].width - hello).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_at_exact_word_width() {
        let fc = FontContext::new();
        let word = fc.measure_string("aaaa", "Helvetica", 400, false, 12.0);
        let lines = break_plain("aaaa bb", word);
        let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["aaaa ", "bb"]);
        assert!((lines[0].width - word).abs() < 1e-9);
    }

    #[test]
    fn test_next_line_never_starts_with_space() {
        let fc = FontContext::new();
        let word = fc.measure_string("aaaa", "Helvetica", 400, false, 12.0);
        let lines = break_plain("aaaa  bb cc", word);
        assert!(lines.iter().skip(1).all(|l| !l.text().starts_with(' ')));
        assert_eq!(lines[0].text(), "aaaa  ");
    }

    #[test]
    fn test_explicit_newline() {
        let lines = break_plain("Hello\nWorld", 200.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello");
        assert_eq!(lines[1].text(), "World");
    }

    #[test]
    fn test_blank_line_between_newlines() {
        let lines = break_plain("a\n\nb", 200.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text(), "");
        assert!(lines[1].height > 0.0);
    }

    #[test]
    fn test_empty_string() {
        let lines = break_plain("", 200.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 0.0);
        assert!(lines[0].height > 0.0);
    }

    #[test]
    fn test_long_word_is_cut() {
        let lines = break_plain("Supercalifragilistic", 30.0);
        assert!(lines.len() > 1);
        let joined: String = lines.iter().map(|l| l.text()).collect();
        assert_eq!(joined, "Supercalifragilistic");
        assert!(lines.iter().all(|l| l.width <= 30.0 + 1e-6));
    }

    #[test]
    fn test_narrower_than_one_char_places_one_per_line() {
        let lines = break_plain("abc", 0.5);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text(), "a");
        assert_eq!(lines[2].text(), "c");
    }

    #[test]
    fn test_zero_width_terminates() {
        let lines = break_plain("a b", 0.0);
        assert!(!lines.is_empty());
        assert!(lines.len() <= 3);
    }

    #[test]
    fn test_break_is_deterministic() {
        let a = break_plain("The quick brown fox jumps over the lazy dog", 73.0);
        let b = break_plain("The quick brown fox jumps over the lazy dog", 73.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_spans_keep_their_runs() {
        let fc = FontContext::new();
        let label = ResolvedTextStyle {
            font_weight: 700,
            ..style(10.0)
        };
        let value = style(10.0);
        let lines = TextLayout::new().break_spans(
            &fc,
            &[("Date: ", &label), ("May 12", &value)],
            &value,
            500.0,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].runs.len(), 2);
        assert_eq!(lines[0].runs[0].span, 0);
        assert_eq!(lines[0].runs[1].span, 1);
        assert!((lines[0].runs[1].x_offset - lines[0].runs[0].width).abs() < 1e-9);
    }

    #[test]
    fn test_tallest_span_sets_line_height() {
        let fc = FontContext::new();
        let small = style(10.0);
        let big = style(24.0);
        let lines =
            TextLayout::new().break_spans(&fc, &[("a ", &small), ("B", &big)], &small, 500.0);
        assert!((lines[0].height - 24.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_natural_width_matches_measure() {
        let fc = FontContext::new();
        let s = style(12.0);
        let tl = TextLayout::new();
        let natural = tl.measure_natural_width(&fc, &[("Hello World", &s)], &s);
        let direct = fc.measure_string("Hello World", "Helvetica", 400, false, 12.0);
        assert!((natural - direct).abs() < 1e-9);
        // Laying out at exactly the natural width keeps one line
        assert_eq!(tl.break_spans(&fc, &[("Hello World", &s)], &s, natural).len(), 1);
    }
}
