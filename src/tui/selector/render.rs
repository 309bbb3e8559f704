//! Selection and confirm screens

use crate::catalog::Tier;
use crate::tui::style::{
    ansi, box_chars, gradient_rule, gradient_text, provider_style, rainbow_text, symbols, ui, Rgb,
};
use crate::tui::text::truncate;
use crate::tui::width::string_width;

use super::{group_by_provider, ModelSelectionState, ProviderSelectionState, SelectedModel, SelectionState};

const TITLE: &str = "LLM Comparison";
const SUBTITLE: &str = "Select models to compare responses";

fn tier_badge(tier: Tier) -> String {
    match tier {
        Tier::Flagship => format!(
            "{}{}{} {} {}",
            ui::ACCENT1.bg(),
            ui::WHITE.fg(),
            ansi::BOLD,
            symbols::STAR,
            ansi::RESET
        ),
        Tier::Standard => ui::CYAN.paint(symbols::SPARKLE),
        Tier::Fast => ui::EMERALD.paint(symbols::LIGHTNING),
        Tier::Legacy => format!(
            "{}{}{}{}",
            ansi::FG_GRAY,
            ansi::DIM,
            symbols::CIRCLE_EMPTY,
            ansi::RESET
        ),
    }
}

fn centered(content: String, box_width: usize) -> String {
    let pad = box_width.saturating_sub(string_width(&content)) / 2;
    format!("{}{}", " ".repeat(pad.max(2)), content)
}

fn render_title(width: usize) -> Vec<String> {
    let box_width = 60.min(width.saturating_sub(4));
    let title = format!(
        "{} {}{}{} {}",
        ui::ACCENT1.paint(symbols::SPARKLE),
        ansi::BOLD,
        rainbow_text(TITLE, 0),
        ansi::RESET,
        ui::PINK.paint(symbols::SPARKLE)
    );
    let subtitle = gradient_text(SUBTITLE, &[ui::MUTED, ui::TEXT_TERTIARY]);
    let rule_colors = [ui::ACCENT1, ui::ACCENT3, ui::FUCHSIA, ui::ACCENT2, ui::PINK];

    vec![
        String::new(),
        centered(title, box_width),
        centered(subtitle, box_width),
        String::new(),
        format!("  {}", gradient_rule(box_width.saturating_sub(2), &rule_colors)),
        String::new(),
    ]
}

fn render_provider_header(provider: &ProviderSelectionState, expanded: bool, is_cursor: bool) -> String {
    let style = provider_style(provider.provider);
    let expand_icon = format!(
        "{}{}{}",
        ansi::FG_GRAY,
        if expanded {
            symbols::TRIANGLE_DOWN
        } else {
            symbols::TRIANGLE_RIGHT
        },
        ansi::RESET
    );

    let total = provider.models.len();
    let selected = provider.selected_count();
    let count = if selected == 0 {
        format!("{}{}0/{}{}", ansi::FG_GRAY, ansi::DIM, total, ansi::RESET)
    } else if selected == total {
        format!(
            "{}{}{}/{} {}{}",
            ansi::FG_BRIGHT_GREEN,
            ansi::BOLD,
            selected,
            total,
            symbols::CHECK,
            ansi::RESET
        )
    } else {
        format!(
            "{}{}{}{}{}/{}{}",
            ansi::FG_BRIGHT_CYAN,
            ansi::BOLD,
            selected,
            ansi::RESET,
            ansi::FG_GRAY,
            total,
            ansi::RESET
        )
    };

    let cursor = if is_cursor {
        format!("{}{}{} ", ansi::FG_BRIGHT_CYAN, symbols::POINTER, ansi::RESET)
    } else {
        "  ".to_string()
    };

    format!(
        "{}{} {} {}{}{}{}  {}",
        cursor,
        expand_icon,
        style.color.paint(style.icon),
        style.color.fg(),
        ansi::BOLD,
        style.name,
        ansi::RESET,
        count
    )
}

fn render_model_row(model: &ModelSelectionState, is_cursor: bool) -> String {
    let checkbox = if model.selected {
        ui::SUCCESS.paint(symbols::CHECK)
    } else {
        ui::MUTED_DARK.paint(symbols::CIRCLE_EMPTY)
    };

    let name = if model.selected {
        format!("{}{}{}{}", ui::TEXT.fg(), ansi::BOLD, model.display_name, ansi::RESET)
    } else if is_cursor {
        ui::TEXT_SECONDARY.paint(&model.display_name)
    } else {
        ui::MUTED.paint(&model.display_name)
    };

    let cursor = if is_cursor {
        ui::INFO.paint(symbols::POINTER)
    } else {
        " ".to_string()
    };

    format!(
        "     {}  {}  {} {}",
        cursor,
        checkbox,
        name,
        tier_badge(model.tier)
    )
}

fn render_status_bar(total_selected: usize, width: usize) -> Vec<String> {
    let box_width = 60.min(width.saturating_sub(4));
    let rule_colors = [ui::PINK, ui::ACCENT2, ui::FUCHSIA, ui::ACCENT3, ui::ACCENT1];

    let status = match total_selected {
        0 => format!(
            "{} {}",
            ui::MUTED.paint(symbols::CIRCLE_EMPTY),
            ui::MUTED.paint("No models selected")
        ),
        n => format!(
            "{} {}{}{}{} {}",
            ui::SUCCESS.paint(if n == 1 { symbols::SPARKLES } else { symbols::ROCKET }),
            ui::SUCCESS.fg(),
            ansi::BOLD,
            n,
            ansi::RESET,
            ui::LIME.paint(if n == 1 { "model selected" } else { "models selected" })
        ),
    };

    let hints = [
        format!("{} {}", ui::MUTED.paint("↑↓"), ui::TEXT_TERTIARY.paint("move")),
        format!(
            "{}{} SPACE {} {}",
            ui::ACTIVE_BG.bg(),
            ui::TEXT.fg(),
            ansi::RESET,
            ui::INFO.paint("select")
        ),
        format!(
            "{}{} ENTER {} {}",
            ui::GO_BG.bg(),
            ui::WHITE.fg(),
            ansi::RESET,
            ui::SUCCESS.paint("go!")
        ),
        format!("{} {}", ui::MUTED.paint("q"), ui::MUTED_DARK.paint("quit")),
    ];

    vec![
        String::new(),
        format!("  {}", gradient_rule(box_width.saturating_sub(2), &rule_colors)),
        String::new(),
        format!("  {}", status),
        String::new(),
        format!("  {}", hints.join("  ")),
    ]
}

/// Pad to the screen, clip every line and prefix the clear sequence.
fn finish_frame(mut lines: Vec<String>, width: usize, height: usize) -> String {
    let available = height.saturating_sub(4).max(5);
    if lines.len() < available {
        lines.resize(available, String::new());
    }
    let body: Vec<String> = lines.iter().map(|l| truncate(l, width)).collect();
    format!("{}{}", ansi::CLEAR, body.join("\n"))
}

pub fn render_selection_screen(state: &SelectionState, width: usize, height: usize) -> String {
    let mut lines = render_title(width);

    if let Some(error) = &state.error_message {
        lines.push(format!(
            "  {}{}{} {}{}",
            ui::ERROR.fg(),
            ansi::BOLD,
            symbols::WARNING,
            error,
            ansi::RESET
        ));
        lines.push(String::new());
    }

    for (p_idx, provider) in state.providers.iter().enumerate() {
        let expanded = state.is_expanded(provider.provider);
        let on_provider = state.cursor_provider == p_idx;
        lines.push(render_provider_header(
            provider,
            expanded,
            on_provider && state.cursor_model.is_none(),
        ));

        if expanded {
            for (m_idx, model) in provider.models.iter().enumerate() {
                lines.push(render_model_row(
                    model,
                    on_provider && state.cursor_model == Some(m_idx),
                ));
            }
        }

        if p_idx + 1 < state.providers.len() {
            lines.push(String::new());
        }
    }

    lines.extend(render_status_bar(state.total_selected(), width));
    finish_frame(lines, width, height)
}

fn box_line(content: &str, inner_width: usize, left: Rgb, right: Rgb) -> String {
    let padding = inner_width.saturating_sub(string_width(content));
    format!(
        "{} {}{} {}",
        left.paint(&box_chars::VERTICAL.to_string()),
        content,
        " ".repeat(padding),
        right.paint(&box_chars::VERTICAL.to_string())
    )
}

fn box_border(start: char, end: char, inner_width: usize) -> String {
    format!(
        "  {}{}{}{}{}{}",
        ui::ACCENT1.fg(),
        start,
        ui::ACCENT3.fg(),
        box_chars::HORIZONTAL.to_string().repeat(inner_width + 2),
        ui::ACCENT2.fg(),
        end,
    ) + ansi::RESET
}

pub fn render_confirm_screen(models: &[SelectedModel], width: usize, height: usize) -> String {
    let box_width = 50.min(width.saturating_sub(4));
    let inner_width = box_width.saturating_sub(4);
    let (left, right) = (ui::ACCENT1, ui::ACCENT2);

    let header = format!(
        "{} {}{}{}",
        symbols::ROCKET,
        ansi::BOLD,
        gradient_text("Ready to Compare", &[ui::SUCCESS, ui::CYAN, ui::ACCENT3]),
        ansi::RESET
    );

    let mut lines = vec![String::new(), centered(header, box_width), String::new()];
    lines.push(box_border(box_chars::TOP_LEFT, box_chars::TOP_RIGHT, inner_width));

    let count = format!(
        "{}{}{}{} {}",
        ui::INFO.fg(),
        ansi::BOLD,
        models.len(),
        ansi::RESET,
        ui::MUTED.paint(&format!(
            "model{} will run in parallel {}",
            if models.len() == 1 { "" } else { "s" },
            symbols::LIGHTNING
        ))
    );
    lines.push(format!("  {}", box_line(&count, inner_width, left, right)));
    lines.push(box_border(box_chars::TEE_RIGHT, box_chars::TEE_LEFT, inner_width));

    for (provider, group) in group_by_provider(models) {
        let style = provider_style(provider);
        let provider_line = format!(
            "{}{} {}{}{}",
            style.color.fg(),
            style.icon,
            ansi::BOLD,
            style.name,
            ansi::RESET
        );
        lines.push(format!("  {}", box_line(&provider_line, inner_width, left, right)));

        for model in group {
            let model_line = format!(
                "  {} {}",
                ui::SUCCESS.paint(symbols::CHECK),
                ui::TEXT.paint(&model.display_name)
            );
            lines.push(format!("  {}", box_line(&model_line, inner_width, left, right)));
        }
    }

    lines.push(box_border(box_chars::BOTTOM_LEFT, box_chars::BOTTOM_RIGHT, inner_width));
    lines.push(String::new());
    lines.push(String::new());

    let yes = format!("{}{}{} Y {}", ui::GO_BG.bg(), ui::WHITE.fg(), ansi::BOLD, ansi::RESET);
    let no = format!("{}{} N {}", ui::BORDER.bg(), ui::TEXT_SECONDARY.fg(), ansi::RESET);
    lines.push(format!(
        "  {} {} {}  {} {}",
        ui::WARNING.paint(symbols::POINTER),
        yes,
        ui::SUCCESS.paint("Run comparison"),
        no,
        ui::MUTED.paint("Go back")
    ));

    finish_frame(lines, width, height)
}
