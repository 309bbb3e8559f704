//! Keyboard shortcut overlay

use crate::tui::style::{ansi, box_chars, rainbow_text, symbols, ui};
use crate::tui::text::truncate;
use crate::tui::width::string_width;

const BOX_MAX_WIDTH: usize = 56;

fn key_cap(label: &str) -> String {
    format!("{}{} {} {}", ui::ACTIVE_BG.bg(), ui::TEXT.fg(), label, ansi::RESET)
}

fn key_text(label: &str) -> String {
    ui::TEXT.paint(label)
}

fn box_line(content: &str, inner_width: usize) -> String {
    let padding = inner_width.saturating_sub(string_width(content));
    format!(
        "  {} {}{} {}",
        ui::ACCENT1.paint(&box_chars::VERTICAL.to_string()),
        content,
        " ".repeat(padding),
        ui::ACCENT2.paint(&box_chars::VERTICAL.to_string())
    )
}

fn box_rule(left: char, right: char, inner_width: usize) -> String {
    format!(
        "  {}{}{}{}{}{}",
        ui::ACCENT1.fg(),
        left,
        ui::BORDER.fg(),
        box_chars::HORIZONTAL.to_string().repeat(inner_width + 2),
        ui::ACCENT2.paint(&right.to_string()),
        ansi::RESET
    )
}

fn section(lines: &mut Vec<String>, header: String, items: &[(String, &str)], inner_width: usize) {
    lines.push(box_line(&header, inner_width));
    lines.push(box_rule(box_chars::TEE_RIGHT, box_chars::TEE_LEFT, inner_width));
    for (key, desc) in items {
        let row = format!("{}  {}", key, ui::MUTED.paint(desc));
        lines.push(box_line(&row, inner_width));
    }
}

fn centered(text: &str, box_width: usize) -> String {
    let pad = box_width.saturating_sub(string_width(text)) / 2;
    format!("{}{}", " ".repeat(pad.max(2)), text)
}

/// Full-screen help. `fullscreen` adds the panel-return and scrolling keys.
pub fn render_help_screen(width: u16, height: u16, fullscreen: bool) -> String {
    let w = usize::from(width);
    let box_width = BOX_MAX_WIDTH.min(w.saturating_sub(4));
    let inner_width = box_width.saturating_sub(4);

    let mut lines = vec![String::new()];
    let title = format!(
        "{} {}{}{} {}",
        ui::ACCENT1.paint(symbols::SPARKLE),
        ansi::BOLD,
        rainbow_text("Keyboard Shortcuts", 0),
        ansi::RESET,
        ui::ACCENT2.paint(symbols::SPARKLE)
    );
    lines.push(centered(&title, box_width));
    lines.push(String::new());
    lines.push(box_rule(box_chars::TOP_LEFT, box_chars::TOP_RIGHT, inner_width));

    let mut navigation = vec![
        (format!("{} / {}", key_cap("Tab"), key_text("←→")), "Switch provider"),
        (
            key_text("1-4"),
            if fullscreen { "Switch panel / return" } else { "View full response" },
        ),
    ];
    if fullscreen {
        navigation.push((format!("{} / {}", key_cap("Esc"), key_cap("Enter")), "Return to grid"));
    }
    section(
        &mut lines,
        format!("{}{}Navigation{}", ui::WARNING.fg(), ansi::BOLD, ansi::RESET),
        &navigation,
        inner_width,
    );

    if fullscreen {
        lines.push(box_rule(box_chars::TEE_RIGHT, box_chars::TEE_LEFT, inner_width));
        let scrolling = [
            (format!("{} / {}", key_text("↑"), key_text("↓")), "Scroll line"),
            (format!("{} / {}", key_text("PgUp"), key_text("PgDn")), "Scroll page"),
            (format!("{} / {}", key_text("Home"), key_text("End")), "Jump to start/end"),
        ];
        section(
            &mut lines,
            format!("{}{}Scrolling{}", ui::INFO.fg(), ansi::BOLD, ansi::RESET),
            &scrolling,
            inner_width,
        );
    }

    lines.push(box_rule(box_chars::TEE_RIGHT, box_chars::TEE_LEFT, inner_width));
    let actions = [
        (key_cap("C"), "Copy to clipboard"),
        (format!("{} / {}", key_cap("Q"), key_text("Ctrl+C")), "Quit"),
        (format!("{} / {}", key_cap("?"), key_text("H")), "Toggle help"),
    ];
    section(
        &mut lines,
        format!("{}{}Actions{}", ui::SUCCESS.fg(), ansi::BOLD, ansi::RESET),
        &actions,
        inner_width,
    );
    lines.push(box_rule(box_chars::BOTTOM_LEFT, box_chars::BOTTOM_RIGHT, inner_width));

    lines.push(String::new());
    lines.push(centered(&ui::MUTED.paint("Press any key to close"), box_width));

    let available = usize::from(height).saturating_sub(4).max(5);
    if lines.len() < available {
        lines.resize(available, String::new());
    }

    let body: Vec<String> = lines.iter().map(|l| truncate(l, w)).collect();
    format!("{}{}", ansi::CLEAR, body.join("\n"))
}
