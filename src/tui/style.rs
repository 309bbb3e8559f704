//! Styling palette for the escape-coded screens
//!
//! Everything here produces plain strings with embedded SGR sequences; the
//! renderers concatenate them and measure with [`super::width`].

use crate::catalog::ProviderId;

/// Raw escape sequences.
pub mod ansi {
    pub const CLEAR: &str = "\x1b[2J\x1b[H";
    pub const HIDE_CURSOR: &str = "\x1b[?25l";
    pub const SHOW_CURSOR: &str = "\x1b[?25h";

    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const FG_BLACK: &str = "\x1b[30m";
    pub const FG_WHITE: &str = "\x1b[37m";
    pub const FG_RED: &str = "\x1b[31m";
    pub const FG_GRAY: &str = "\x1b[90m";
    pub const FG_BRIGHT_RED: &str = "\x1b[91m";
    pub const FG_BRIGHT_GREEN: &str = "\x1b[92m";
    pub const FG_BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const FG_BRIGHT_CYAN: &str = "\x1b[96m";
    pub const FG_BRIGHT_WHITE: &str = "\x1b[97m";

    pub const BG_GREEN: &str = "\x1b[42m";
}

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn fg(self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.0, self.1, self.2)
    }

    pub fn bg(self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.0, self.1, self.2)
    }

    /// `text` in this color followed by a reset.
    pub fn paint(self, text: &str) -> String {
        format!("{}{}{}", self.fg(), text, ansi::RESET)
    }
}

/// Semantic colors shared by every screen.
pub mod ui {
    use super::Rgb;

    pub const SUCCESS: Rgb = Rgb(74, 222, 128);
    pub const ERROR: Rgb = Rgb(248, 113, 113);
    pub const WARNING: Rgb = Rgb(250, 204, 21);
    pub const INFO: Rgb = Rgb(56, 189, 248);
    pub const MUTED: Rgb = Rgb(148, 163, 184);
    pub const MUTED_DARK: Rgb = Rgb(100, 116, 139);
    pub const TEXT: Rgb = Rgb(248, 250, 252);
    pub const TEXT_SECONDARY: Rgb = Rgb(226, 232, 240);
    pub const TEXT_TERTIARY: Rgb = Rgb(203, 213, 225);
    pub const BORDER: Rgb = Rgb(71, 85, 105);
    pub const ACCENT1: Rgb = Rgb(139, 92, 246);
    pub const ACCENT2: Rgb = Rgb(236, 72, 153);
    pub const ACCENT3: Rgb = Rgb(168, 85, 247);
    pub const PINK: Rgb = Rgb(244, 114, 182);
    pub const FUCHSIA: Rgb = Rgb(217, 70, 239);
    pub const LIME: Rgb = Rgb(163, 230, 53);
    pub const CYAN: Rgb = Rgb(34, 211, 238);
    pub const EMERALD: Rgb = Rgb(52, 211, 153);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Background of the active tab / highlighted key.
    pub const ACTIVE_BG: Rgb = Rgb(51, 65, 85);
    pub const GO_BG: Rgb = Rgb(22, 163, 74);
}

pub mod box_chars {
    pub const TOP_LEFT: char = '╭';
    pub const TOP_RIGHT: char = '╮';
    pub const BOTTOM_LEFT: char = '╰';
    pub const BOTTOM_RIGHT: char = '╯';
    pub const HORIZONTAL: char = '─';
    pub const VERTICAL: char = '│';
    pub const TEE_RIGHT: char = '├';
    pub const TEE_LEFT: char = '┤';
    pub const TEE_DOWN: char = '┬';
    pub const TEE_UP: char = '┴';
    pub const CROSS: char = '┼';
}

pub mod symbols {
    pub const CHECK: &str = "✔";
    pub const CROSS: &str = "✘";
    pub const CIRCLE_EMPTY: &str = "○";
    pub const CIRCLE: &str = "●";
    pub const BULLET: &str = "•";
    pub const MIDDLE_DOT: &str = "·";
    pub const POINTER: &str = "❯";
    pub const TRIANGLE_RIGHT: &str = "▸";
    pub const TRIANGLE_DOWN: &str = "▾";
    pub const LIGHTNING: &str = "⚡";
    pub const WARNING: &str = "⚠";
    pub const SPARKLE: &str = "✦";
    pub const SPARKLES: &str = "✨";
    pub const ROCKET: &str = "🚀";
    pub const STAR: &str = "⭐";
}

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub const RAINBOW: [Rgb; 7] = [
    Rgb(255, 107, 107),
    Rgb(255, 159, 67),
    Rgb(254, 211, 48),
    Rgb(38, 222, 129),
    Rgb(69, 170, 242),
    Rgb(165, 94, 234),
    Rgb(243, 104, 224),
];

/// Spinner frame `idx` in a color that cycles independently of the glyph.
pub fn rainbow_spinner(idx: usize) -> String {
    let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
    RAINBOW[idx % RAINBOW.len()].paint(frame)
}

/// Color each non-space character with the next rainbow color.
pub fn rainbow_text(text: &str, offset: usize) -> String {
    let mut out = String::new();
    for (i, ch) in text.chars().enumerate() {
        if ch == ' ' {
            out.push(' ');
            continue;
        }
        out.push_str(&RAINBOW[(i + offset) % RAINBOW.len()].fg());
        out.push(ch);
    }
    out.push_str(ansi::RESET);
    out
}

/// Spread `colors` evenly across the characters of `text`.
pub fn gradient_text(text: &str, colors: &[Rgb]) -> String {
    match colors {
        [] => return text.to_string(),
        [only] => return only.paint(text),
        _ => {}
    }
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    for (i, ch) in chars.iter().enumerate() {
        let idx = i * colors.len() / chars.len();
        out.push_str(&colors[idx].fg());
        out.push(*ch);
    }
    out.push_str(ansi::RESET);
    out
}

/// Horizontal rule of `len` cells blending through `colors`.
pub fn gradient_rule(len: usize, colors: &[Rgb]) -> String {
    if colors.is_empty() || len == 0 {
        return String::new();
    }
    let mut out = String::new();
    for i in 0..len {
        out.push_str(&colors[i * colors.len() / len].fg());
        out.push(box_chars::HORIZONTAL);
    }
    out.push_str(ansi::RESET);
    out
}

/// Display styling for one provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderStyle {
    pub name: &'static str,
    pub color: Rgb,
    pub icon: &'static str,
}

pub fn provider_style(provider: ProviderId) -> ProviderStyle {
    let color = match provider {
        ProviderId::OpenAi => Rgb(16, 185, 129),
        ProviderId::Claude => Rgb(251, 146, 60),
        ProviderId::Gemini => Rgb(96, 165, 250),
    };
    ProviderStyle {
        name: provider.display_name(),
        color,
        icon: symbols::CIRCLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::width::{string_width, strip_ansi};

    #[test]
    fn spinner_cycles_glyph_and_color() {
        assert_eq!(strip_ansi(&rainbow_spinner(0)), "⠋");
        assert_eq!(strip_ansi(&rainbow_spinner(11)), "⠙");
        assert!(rainbow_spinner(7).starts_with(&RAINBOW[0].fg()));
    }

    #[test]
    fn rainbow_text_keeps_visible_text() {
        let s = rainbow_text("LLM Comparison", 0);
        assert_eq!(strip_ansi(&s), "LLM Comparison");
        assert!(s.ends_with(ansi::RESET));
    }

    #[test]
    fn gradient_rule_has_requested_width() {
        let rule = gradient_rule(12, &[ui::ACCENT1, ui::ACCENT2]);
        assert_eq!(string_width(&rule), 12);
    }

    #[test]
    fn gradient_text_degenerate_palettes() {
        assert_eq!(gradient_text("abc", &[]), "abc");
        assert_eq!(strip_ansi(&gradient_text("abc", &[ui::INFO])), "abc");
    }
}
