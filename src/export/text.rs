//! Glyph metrics for the standard Helvetica faces and greedy line breaking.
//!
//! Widths are the AFM advance widths (1/1000 em) for printable ASCII. Anything
//! outside that range is measured as a digit-width glyph.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn glyph_width(face: Face, c: char) -> u16 {
    let table = match face {
        Face::Regular => &HELVETICA,
        Face::Bold => &HELVETICA_BOLD,
    };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, face: Face, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(face, c) as u32).sum();
    units as f32 * size / 1000.0
}

/// Break `text` into lines no wider than `max_width` points. Explicit newlines
/// are kept, words are never split unless a single word is wider than the line,
/// in which case it is broken between characters. Empty input yields one empty
/// line so every cell occupies at least one line.
pub fn wrap(text: &str, face: Face, size: f32, max_width: f32) -> Vec<String> {
    let space = text_width(" ", face, size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_width = text_width(word, face, size);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space + word_width
            };

            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width = needed;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            // Hard-break a word that cannot fit on any line.
            for c in word.chars() {
                let w = glyph_width(face, c) as f32 * size / 1000.0;
                if !current.is_empty() && current_width + w > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += w;
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Builtin PDF fonts only cover Latin-1; replace anything else.
pub fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_the_afm_tables() {
        assert_eq!(text_width("A", Face::Regular, 1000.0), 667.0);
        assert_eq!(text_width("i", Face::Regular, 1000.0), 222.0);
        assert_eq!(text_width("i", Face::Bold, 1000.0), 278.0);
        assert_eq!(text_width("~", Face::Bold, 1000.0), 584.0);
        assert!((text_width("abc", Face::Regular, 8.0) - 12.896).abs() < 1e-3);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("Coffee table", Face::Regular, 8.0, 100.0), vec!["Coffee table"]);
    }

    #[test]
    fn long_text_wraps_at_word_boundaries_within_width() {
        let text = "Looking for a large live edge dining table with an ocean blue resin river \
                    and matching benches for eight people";
        let lines = wrap(text, Face::Regular, 8.0, 89.0);
        assert!(lines.len() > 2);
        for line in &lines {
            assert!(text_width(line, Face::Regular, 8.0) <= 89.0, "{line:?} overflows");
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn oversized_word_is_broken_by_character() {
        let word = "x".repeat(60);
        let lines = wrap(&word, Face::Regular, 8.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, Face::Regular, 8.0) <= 50.0);
        }
    }

    #[test]
    fn empty_text_is_a_single_empty_line() {
        assert_eq!(wrap("", Face::Regular, 8.0, 50.0), vec![String::new()]);
    }

    #[test]
    fn newlines_start_new_lines() {
        assert_eq!(wrap("one\ntwo", Face::Regular, 8.0, 200.0), vec!["one", "two"]);
    }

    #[test]
    fn non_latin_glyphs_are_replaced() {
        assert_eq!(printable("café ✓"), "café ?");
    }
}
