//! Terminal column accounting
//!
//! Measures how many terminal cells a string occupies. Color escape sequences
//! (CSI, `ESC [ ... final`) occupy no cells, combining marks and zero-width
//! format characters occupy none, East Asian wide/fullwidth characters and
//! most emoji occupy two, everything else one.

use unicode_width::UnicodeWidthChar;

const ESC: char = '\x1b';

/// A piece of an ANSI-colored string: either a complete CSI sequence or a
/// single visible code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Csi(&'a str),
    Char(char),
}

/// Byte length of the CSI sequence at the start of `s`.
///
/// Returns `None` when `s` does not start with `ESC [` or the sequence never
/// reaches a final byte; such input is treated as literal text.
pub(crate) fn csi_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix("\x1b[")?;
    for (i, b) in rest.bytes().enumerate() {
        match b {
            // parameter and intermediate bytes
            0x20..=0x3f => continue,
            0x40..=0x7e => return Some(2 + i + 1),
            _ => return None,
        }
    }
    None
}

/// Iterate over `s` as CSI sequences and code points.
pub(crate) fn segments(s: &str) -> impl Iterator<Item = Segment<'_>> + '_ {
    let mut rest = s;
    std::iter::from_fn(move || {
        let ch = rest.chars().next()?;
        if ch == ESC {
            if let Some(len) = csi_len(rest) {
                let (seq, tail) = rest.split_at(len);
                rest = tail;
                return Some(Segment::Csi(seq));
            }
        }
        rest = &rest[ch.len_utf8()..];
        Some(Segment::Char(ch))
    })
}

/// Number of terminal columns a single code point occupies (0, 1 or 2).
///
/// C0/C1 control characters report zero.
pub fn code_point_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).map(|w| w.min(2)).unwrap_or(0)
}

/// Visual width of `s` in terminal columns, ignoring CSI sequences.
pub fn string_width(s: &str) -> usize {
    segments(s)
        .map(|segment| match segment {
            Segment::Csi(_) => 0,
            Segment::Char(ch) => code_point_width(ch),
        })
        .sum()
}

/// Remove complete CSI sequences, leaving everything else untouched.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for segment in segments(s) {
        if let Segment::Char(ch) = segment {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ascii_is_one_column_per_char() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width(""), 0);
    }

    #[test]
    fn cjk_and_fullwidth_are_double() {
        assert_eq!(code_point_width('日'), 2);
        assert_eq!(string_width("日本語"), 6);
        assert_eq!(code_point_width('Ａ'), 2);
    }

    #[test]
    fn combining_marks_and_joiners_are_zero() {
        assert_eq!(code_point_width('\u{0301}'), 0);
        assert_eq!(string_width("e\u{0301}"), 1);
        assert_eq!(code_point_width('\u{200d}'), 0);
    }

    #[test]
    fn emoji_outside_bmp_counted_once() {
        assert_eq!(string_width("🎉"), 2);
        assert_eq!(string_width("a🎉b"), 4);
    }

    #[test]
    fn control_characters_are_zero() {
        assert_eq!(code_point_width('\x07'), 0);
    }

    #[test]
    fn color_codes_do_not_count() {
        let colored = "\x1b[38;2;255;0;0mred\x1b[0m";
        assert_eq!(string_width(colored), 3);
        assert_eq!(strip_ansi(colored), "red");
    }

    #[test]
    fn non_color_csi_sequences_are_stripped_too() {
        assert_eq!(strip_ansi("\x1b[2J\x1b[Hx"), "x");
    }

    #[test]
    fn unterminated_escape_passes_through() {
        let broken = "ab\x1b[31";
        assert_eq!(strip_ansi(broken), broken);
        // ESC has no width, '[', '3', '1' each take a column
        assert_eq!(string_width(broken), 5);
    }

    #[test]
    fn escape_interrupted_by_text_is_literal() {
        let s = "\x1b[3\u{00e9}x";
        assert_eq!(csi_len(s), None);
        assert_eq!(strip_ansi(s), s);
    }

    #[test]
    fn segments_split_sequences_from_chars() {
        let parts: Vec<_> = segments("\x1b[1mA\x1b[0m").collect();
        assert_eq!(
            parts,
            vec![
                Segment::Csi("\x1b[1m"),
                Segment::Char('A'),
                Segment::Csi("\x1b[0m")
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_stripping_preserves_width(s in "(\\PC|\x1b\\[[0-9;]{0,6}m){0,40}") {
            prop_assert_eq!(string_width(&strip_ansi(&s)), string_width(&s));
        }

        #[test]
        fn prop_plain_text_survives_strip(s in "[a-zA-Z0-9 日本語🎉]{0,40}") {
            prop_assert_eq!(strip_ansi(&s), s);
        }
    }
}
