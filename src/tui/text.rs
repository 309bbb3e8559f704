//! Text layout for fixed-width terminal cells
//!
//! Wrapping and truncation operate on visual columns (see [`super::width`]),
//! never on bytes or code points, so double-width glyphs and color escapes
//! keep grid cells aligned.

use super::width::{code_point_width, segments, string_width, Segment};

/// Narrowest budget `wrap_text` will pack to.
pub const MIN_WRAP_WIDTH: usize = 10;

const ELLIPSIS: char = '…';
const TAB_EXPANSION: &str = "    ";

/// Wrap `text` into lines no wider than `max(width, MIN_WRAP_WIDTH)` columns.
///
/// Explicit newlines (LF or CRLF) always break; empty input lines stay as
/// empty output lines. Words longer than the budget are split at grapheme-ish
/// boundaries (a base code point together with its zero-width followers).
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let budget = width.max(MIN_WRAP_WIDTH);
    let normalized = text.replace("\r\n", "\n").replace('\t', TAB_EXPANSION);

    let mut lines = Vec::new();
    for raw in normalized.split('\n') {
        wrap_line(raw, budget, &mut lines);
    }
    lines
}

fn wrap_line(raw: &str, budget: usize, out: &mut Vec<String>) {
    if raw.trim().is_empty() {
        out.push(String::new());
        return;
    }

    let mut line = LineBuf::default();
    let mut at_line_start = true;

    for run in runs(raw) {
        let run_width = string_width(run);
        if starts_with_whitespace(run) {
            // Leading indentation of the source line is kept; whitespace that
            // would start a continuation line is dropped.
            if line.is_empty() && !at_line_start {
                continue;
            }
            if line.width + run_width <= budget {
                line.push(run, run_width);
            } else {
                line.flush_into(out);
                at_line_start = false;
            }
            continue;
        }

        if line.width + run_width <= budget {
            line.push(run, run_width);
        } else if run_width <= budget {
            line.flush_into(out);
            line.push(run, run_width);
        } else {
            hard_split(run, budget, &mut line, out);
        }
        at_line_start = false;
    }

    line.flush_into(out);
}

/// Split an over-long word across lines, filling the current line first.
fn hard_split(word: &str, budget: usize, line: &mut LineBuf, out: &mut Vec<String>) {
    for cluster in clusters(word) {
        let w = string_width(cluster);
        if line.width + w > budget && !line.is_empty() {
            line.flush_into(out);
        }
        line.push(cluster, w);
    }
}

#[derive(Default)]
struct LineBuf {
    text: String,
    width: usize,
}

impl LineBuf {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn push(&mut self, s: &str, w: usize) {
        self.text.push_str(s);
        self.width += w;
    }

    /// Emit the buffered line. A buffer holding only indentation is dropped;
    /// blank source lines are emitted by `wrap_line` itself.
    fn flush_into(&mut self, out: &mut Vec<String>) {
        let trimmed = self.text.trim_end();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
        self.text.clear();
        self.width = 0;
    }
}

fn starts_with_whitespace(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_whitespace)
}

/// Alternating runs of whitespace and non-whitespace.
fn runs(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, ch) in s.char_indices() {
        let ws = ch.is_whitespace();
        match current {
            Some(prev) if prev == ws => {}
            Some(_) => {
                out.push(&s[start..i]);
                start = i;
                current = Some(ws);
            }
            None => current = Some(ws),
        }
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

/// A visible code point plus any zero-width code points and escapes after it.
fn clusters(s: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for segment in segments(s) {
        let len = match segment {
            Segment::Csi(seq) => seq.len(),
            Segment::Char(ch) => ch.len_utf8(),
        };
        let joins_previous = match segment {
            Segment::Csi(_) => true,
            Segment::Char(ch) => code_point_width(ch) == 0,
        };
        if !joins_previous && offset > start {
            out.push(&s[start..offset]);
            start = offset;
        }
        offset += len;
    }
    if offset > start {
        out.push(&s[start..offset]);
    }
    out
}

fn is_reset(seq: &str) -> bool {
    seq == "\x1b[0m" || seq == "\x1b[m"
}

fn is_sgr(seq: &str) -> bool {
    seq.ends_with('m')
}

/// Shorten `s` to at most `len` visual columns, ending in an ellipsis.
///
/// Escape sequences are copied through without counting against the budget,
/// including any resets sitting between the last kept character and the cut.
/// If the kept prefix still leaves a color open while the original closes it
/// further on, a reset follows the ellipsis so the color cannot bleed into
/// the rest of the frame.
pub fn truncate(s: &str, len: usize) -> String {
    if string_width(s) <= len {
        return s.to_string();
    }
    match len {
        0 => return String::new(),
        1 => return ELLIPSIS.to_string(),
        _ => {}
    }

    let budget = len - 1;
    let mut out = String::with_capacity(s.len().min(len * 4 + 16));
    let mut used = 0;
    let mut color_open = false;
    let mut iter = segments(s).peekable();

    while let Some(segment) = iter.peek().copied() {
        match segment {
            Segment::Csi(seq) => {
                if is_sgr(seq) {
                    color_open = !is_reset(seq);
                }
                out.push_str(seq);
            }
            Segment::Char(ch) => {
                let w = code_point_width(ch);
                if used + w > budget {
                    break;
                }
                used += w;
                out.push(ch);
            }
        }
        iter.next();
    }

    out.push(ELLIPSIS);

    if color_open && iter.any(|segment| matches!(segment, Segment::Csi(seq) if is_reset(seq))) {
        out.push_str("\x1b[0m");
    }

    out
}

/// Pad `s` with spaces up to `width` visual columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let w = string_width(s);
    if w >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - w);
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(width - w));
    out
}

/// Truncate then pad so the result is exactly `width` columns wide.
pub fn fit(s: &str, width: usize) -> String {
    pad_right(&truncate(s, width), width)
}
