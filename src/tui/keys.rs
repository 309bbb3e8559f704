//! Key decoding
//!
//! Every screen works on one closed set of key symbols. Input arrives either
//! as crossterm key events (the interactive session) or as raw bytes read
//! from a terminal in raw mode; both decode to [`Key`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    ShiftTab,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Esc,
    Enter,
    Space,
    /// Digit keys `1`..=`9`
    Digit(u8),
    Q,
    CtrlC,
    H,
    Question,
    C,
    Y,
    N,
    Unknown,
}

impl Key {
    /// Zero-based panel index for digit keys.
    pub fn panel_index(self) -> Option<usize> {
        match self {
            Key::Digit(d) => Some(usize::from(d) - 1),
            _ => None,
        }
    }

    pub fn is_quit(self) -> bool {
        matches!(self, Key::Q | Key::CtrlC)
    }

    pub fn is_help(self) -> bool {
        matches!(self, Key::H | Key::Question)
    }
}

/// Decode one chunk of raw terminal input.
pub fn decode_bytes(bytes: &[u8]) -> Key {
    match bytes {
        b"\x03" => Key::CtrlC,
        b"\x1b" => Key::Esc,
        b"\t" => Key::Tab,
        b"\x1b[Z" => Key::ShiftTab,
        b"\x1b[A" => Key::Up,
        b"\x1b[B" => Key::Down,
        b"\x1b[C" => Key::Right,
        b"\x1b[D" => Key::Left,
        b"\x1b[5~" => Key::PageUp,
        b"\x1b[6~" => Key::PageDown,
        b"\x1b[H" | b"\x1bOH" => Key::Home,
        b"\x1b[F" | b"\x1bOF" => Key::End,
        b"\r" | b"\n" => Key::Enter,
        [b] => decode_char(char::from(*b)),
        _ => Key::Unknown,
    }
}

fn decode_char(ch: char) -> Key {
    match ch {
        'q' | 'Q' => Key::Q,
        '1'..='9' => Key::Digit(ch as u8 - b'0'),
        'h' | 'H' => Key::H,
        '?' => Key::Question,
        'c' | 'C' => Key::C,
        'y' | 'Y' => Key::Y,
        'n' | 'N' => Key::N,
        ' ' => Key::Space,
        '\t' => Key::Tab,
        _ => Key::Unknown,
    }
}

/// Decode a crossterm key event. Releases and repeats on platforms that
/// report them are mapped to `Unknown`.
pub fn decode_event(event: &KeyEvent) -> Key {
    if event.kind == KeyEventKind::Release {
        return Key::Unknown;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => Key::CtrlC,
        _ if ctrl => Key::Unknown,
        KeyCode::Tab if event.modifiers.contains(KeyModifiers::SHIFT) => Key::ShiftTab,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::ShiftTab,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Esc,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(ch) => decode_char(ch),
        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escape_sequences() {
        assert_eq!(decode_bytes(b"\x1b[A"), Key::Up);
        assert_eq!(decode_bytes(b"\x1b[D"), Key::Left);
        assert_eq!(decode_bytes(b"\x1b[Z"), Key::ShiftTab);
        assert_eq!(decode_bytes(b"\x1b[5~"), Key::PageUp);
        assert_eq!(decode_bytes(b"\x1bOH"), Key::Home);
        assert_eq!(decode_bytes(b"\x1b[F"), Key::End);
        assert_eq!(decode_bytes(b"\x1b"), Key::Esc);
        assert_eq!(decode_bytes(b"\x1b[99~"), Key::Unknown);
    }

    #[test]
    fn decodes_single_bytes() {
        assert_eq!(decode_bytes(b"\x03"), Key::CtrlC);
        assert_eq!(decode_bytes(b"\r"), Key::Enter);
        assert_eq!(decode_bytes(b"Q"), Key::Q);
        assert_eq!(decode_bytes(b"3"), Key::Digit(3));
        assert_eq!(decode_bytes(b"0"), Key::Unknown);
        assert_eq!(decode_bytes(b"?"), Key::Question);
        assert_eq!(decode_bytes(b" "), Key::Space);
        assert_eq!(decode_bytes(b"x"), Key::Unknown);
        assert_eq!(decode_bytes(b""), Key::Unknown);
    }

    #[test]
    fn decodes_crossterm_events() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(decode_event(&ctrl_c), Key::CtrlC);
        let plain_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(decode_event(&plain_c), Key::C);
        let back = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(decode_event(&back), Key::ShiftTab);
        let digit = KeyEvent::new(KeyCode::Char('4'), KeyModifiers::NONE);
        assert_eq!(decode_event(&digit), Key::Digit(4));
        assert_eq!(Key::Digit(4).panel_index(), Some(3));
    }

    #[test]
    fn release_events_are_ignored() {
        let mut ev = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert_eq!(decode_event(&ev), Key::Unknown);
    }
}
