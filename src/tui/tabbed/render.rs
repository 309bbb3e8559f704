//! Frame composition for the comparison screen
//!
//! Rendering is a pure function of the state, the terminal size and the
//! current instant. Every frame starts with clear+home and is written to the
//! terminal in one go.

use std::time::Instant;

use super::help::render_help_screen;
use super::state::{ProviderState, ProviderStatus, TabbedState};
use crate::persistence::RESULTS_FILE;
use crate::tui::style::{ansi, box_chars, provider_style, rainbow_spinner, rainbow_text, symbols, ui, RAINBOW};
use crate::tui::text::{fit, truncate, wrap_text};
use crate::tui::width::string_width;

/// Smallest terminal the comparison screen lays out for.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 20;

/// Header block plus the provider tab strip.
const CHROME_LINES: usize = 4;
/// Slots in the 2x2 grid.
const GRID_PANELS: usize = 4;

/// Content rows visible in the fullscreen panel for a terminal `height`
/// rows tall. Shared by the renderer and the scroll clamp.
pub fn fullscreen_viewport_lines(height: u16) -> usize {
    usize::from(height).saturating_sub(9).max(1)
}

/// Render the whole screen.
pub fn compose_frame(state: &TabbedState, width: u16, height: u16, now: Instant) -> String {
    if state.show_help {
        return render_help_screen(width, height, state.focused_panel.is_some());
    }
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return render_too_small(width, height);
    }

    let w = usize::from(width);
    let h = usize::from(height);

    let mut lines = render_header(state, w);
    lines.extend(render_provider_tabs(state));

    let fullscreen = state.focused_tab().is_some();
    if fullscreen {
        lines.extend(render_fullscreen_panel(state, w, height, now));
    } else {
        lines.extend(render_grid(state, w, h.saturating_sub(CHROME_LINES), now));
    }

    let available = (if fullscreen { h.saturating_sub(1) } else { h.saturating_sub(4) }).max(5);
    lines.resize(available, String::new());

    let mut lines: Vec<String> = lines.iter().map(|l| truncate(l, w)).collect();

    if let Some(message) = state.active_notification(now) {
        let badge = format!(
            "  {}{}{} {} {}",
            ansi::BG_GREEN,
            ansi::FG_BRIGHT_WHITE,
            ansi::BOLD,
            message,
            ansi::RESET
        );
        if let Some(last) = lines.last_mut() {
            let room = w.saturating_sub(string_width(&badge));
            *last = truncate(&format!("{}{}", truncate(last, room), badge), w);
        }
    }

    format!("{}{}", ansi::CLEAR, lines.join("\n"))
}

fn render_too_small(width: u16, height: u16) -> String {
    let w = usize::from(width);
    let lines = [
        String::new(),
        format!("  {}", ui::WARNING.paint("Terminal too small")),
        format!("  {}", ui::MUTED.paint(&format!("Current: {}x{}", width, height))),
        format!("  {}", ui::MUTED.paint(&format!("Required: {}x{}", MIN_WIDTH, MIN_HEIGHT))),
    ];
    let body: Vec<String> = lines.iter().map(|l| truncate(l, w)).collect();
    format!("{}{}", ansi::CLEAR, body.join("\n"))
}

fn status_icon(status: Option<ProviderStatus>, spinner_idx: usize) -> String {
    match status {
        Some(ProviderStatus::Loading) => rainbow_spinner(spinner_idx),
        Some(ProviderStatus::Done) => ui::SUCCESS.paint(symbols::CHECK),
        Some(ProviderStatus::Error) => ui::ERROR.paint(symbols::CROSS),
        _ => ui::MUTED.paint(symbols::CIRCLE_EMPTY),
    }
}

fn elapsed_color(elapsed_ms: u64) -> &'static str {
    match elapsed_ms {
        0..=9_999 => ansi::FG_BRIGHT_GREEN,
        10_000..=29_999 => ansi::FG_BRIGHT_YELLOW,
        _ => ansi::FG_BRIGHT_RED,
    }
}

fn format_secs(elapsed_ms: u64) -> String {
    format!("{:.2}s", elapsed_ms as f64 / 1000.0)
}

fn format_char_count(count: usize) -> String {
    if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

/// `[N] icon label (count chars) 1.23s`, with the label cut to fit `max_width`.
fn render_panel_header(
    panel_num: usize,
    label: &str,
    state: Option<&ProviderState>,
    spinner_idx: usize,
    max_width: usize,
) -> String {
    let icon = status_icon(state.map(ProviderState::status), spinner_idx);
    let color = RAINBOW[panel_num % RAINBOW.len()];

    let (count, time) = match state {
        Some(ProviderState::Done { text, elapsed_ms, .. }) => {
            let chars = text.chars().count();
            let count = if chars > 0 {
                ui::MUTED.paint(&format!(" ({} chars)", format_char_count(chars)))
            } else {
                String::new()
            };
            let time = format!(" {}{}{}", elapsed_color(*elapsed_ms), format_secs(*elapsed_ms), ansi::RESET);
            (count, time)
        }
        _ => (String::new(), String::new()),
    };

    let label_width = max_width
        .saturating_sub(8)
        .saturating_sub(string_width(&count))
        .saturating_sub(string_width(&time));

    format!(
        "{} {} {}{}{}{}{}{}",
        color.paint(&format!("[{}]", panel_num)),
        icon,
        ansi::BOLD,
        ui::TEXT.fg(),
        truncate(label, label_width),
        ansi::RESET,
        count,
        time
    )
}

/// Wrapped body of a tab as shown in the fullscreen view.
pub fn content_lines(state: &ProviderState, width: usize, now: Instant) -> Vec<String> {
    match state {
        ProviderState::Idle { .. } | ProviderState::Loading { .. } => {
            let elapsed = state
                .elapsed_ms(now)
                .map(|ms| format!(" {}({:.1}s){}", ansi::FG_GRAY, ms as f64 / 1000.0, ansi::RESET))
                .unwrap_or_default();
            vec![
                String::new(),
                format!(
                    "  {}{}{} {}Waiting for response{}{}",
                    ansi::FG_BRIGHT_YELLOW,
                    symbols::BULLET,
                    ansi::RESET,
                    ansi::FG_GRAY,
                    elapsed,
                    ansi::RESET
                ),
                String::new(),
            ]
        }
        ProviderState::Error { error, .. } => {
            let mut lines = vec![
                String::new(),
                format!("  {}{}{} Error{}", ansi::FG_BRIGHT_RED, ansi::BOLD, symbols::CROSS, ansi::RESET),
                String::new(),
            ];
            lines.extend(
                wrap_text(error, width.saturating_sub(4))
                    .into_iter()
                    .map(|l| format!("  {}{}{}", ansi::FG_RED, l, ansi::RESET)),
            );
            lines
        }
        ProviderState::Skipped { error, .. } => {
            let mut lines = vec![
                String::new(),
                format!("  {}{} Skipped{}", ansi::FG_GRAY, symbols::BULLET, ansi::RESET),
                String::new(),
            ];
            lines.extend(
                wrap_text(error, width.saturating_sub(4))
                    .into_iter()
                    .map(|l| format!("  {}{}{}", ansi::FG_GRAY, l, ansi::RESET)),
            );
            lines
        }
        ProviderState::Done { text, .. } => wrap_text(text, width),
    }
}

fn grid_content_lines(state: &ProviderState, width: usize, now: Instant) -> Vec<String> {
    match state {
        ProviderState::Idle { .. } | ProviderState::Loading { .. } => {
            let elapsed = state
                .elapsed_ms(now)
                .map(|ms| format!(" ({:.1}s)", ms as f64 / 1000.0))
                .unwrap_or_default();
            vec![format!("{}Waiting...{}{}", ansi::FG_GRAY, elapsed, ansi::RESET)]
        }
        ProviderState::Error { error, .. } => wrap_text(error, width)
            .into_iter()
            .map(|l| format!("{}{}{}", ansi::FG_RED, l, ansi::RESET))
            .collect(),
        ProviderState::Skipped { error, .. } => wrap_text(error, width)
            .into_iter()
            .map(|l| format!("{}{}{}", ansi::FG_GRAY, l, ansi::RESET))
            .collect(),
        ProviderState::Done { text, .. } => wrap_text(text, width),
    }
}

fn render_header(state: &TabbedState, width: usize) -> Vec<String> {
    let (mut done, mut loading, mut errors) = (0, 0, 0);
    for tab in state.tabs() {
        match state.state_of(&tab.id).map(ProviderState::status) {
            Some(ProviderStatus::Done) => done += 1,
            Some(ProviderStatus::Loading | ProviderStatus::Idle) => loading += 1,
            Some(ProviderStatus::Error) => errors += 1,
            _ => {}
        }
    }

    let title = format!("{}{}{}", ansi::BOLD, rainbow_text(&state.title, state.spinner_idx), ansi::RESET);

    let summary = if loading > 0 {
        format!(
            "{} {}",
            rainbow_spinner(state.spinner_idx),
            ui::WARNING.paint(&format!("{} loading", loading))
        )
    } else if errors > 0 && done > 0 {
        format!(
            "{} {}",
            ui::SUCCESS.paint(&format!("{} {}", symbols::CHECK, done)),
            ui::ERROR.paint(&format!("{} {}", symbols::CROSS, errors))
        )
    } else if done > 0 {
        ui::SUCCESS.paint(&format!("{} All complete!", symbols::SPARKLES))
    } else if errors > 0 {
        format!(
            "{} {}",
            ui::ERROR.paint(&format!("{} {}", symbols::CROSS, errors)),
            ui::MUTED.paint("Finished")
        )
    } else if !state.states.is_empty() {
        ui::MUTED.paint(&format!("{} Finished", symbols::CIRCLE_EMPTY))
    } else {
        String::new()
    };

    let help_hint = format!(
        "{}Tab {}switch{}  {}? {}help{}  {}q {}quit{}",
        ui::MUTED.fg(),
        ui::MUTED_DARK.fg(),
        ansi::RESET,
        ui::MUTED.fg(),
        ui::MUTED_DARK.fg(),
        ansi::RESET,
        ui::MUTED.fg(),
        ui::MUTED_DARK.fg(),
        ansi::RESET
    );
    let right = if summary.is_empty() {
        help_hint
    } else {
        format!("{}  {}", summary, help_hint)
    };
    let gap = width
        .saturating_sub(string_width(&title))
        .saturating_sub(string_width(&right))
        .max(1);

    let prompt = truncate(&state.prompt, width.saturating_sub(9).max(10));

    let results_hint = if loading > 0 {
        format!("⏳ Results will be saved to {}", RESULTS_FILE)
    } else {
        format!("💾 Results saved to {}", RESULTS_FILE)
    };

    vec![
        format!("{}{}{}", title, " ".repeat(gap), right),
        format!(
            "{} {}{}{}",
            ui::ACCENT1.paint("Prompt:"),
            ui::TEXT_SECONDARY.fg(),
            prompt,
            ansi::RESET
        ),
        truncate(&ui::MUTED_DARK.paint(&results_hint), width),
    ]
}

fn render_provider_tabs(state: &TabbedState) -> Vec<String> {
    let segments: Vec<String> = state
        .provider_groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            let statuses: Vec<Option<ProviderStatus>> = group
                .tabs
                .iter()
                .map(|t| state.state_of(&t.id).map(ProviderState::status))
                .collect();
            let done = statuses.iter().filter(|s| **s == Some(ProviderStatus::Done)).count();
            let loading = statuses
                .iter()
                .any(|s| matches!(s, Some(ProviderStatus::Loading | ProviderStatus::Idle)));
            let errored = statuses.iter().any(|s| *s == Some(ProviderStatus::Error));

            let indicator = if loading {
                rainbow_spinner(state.spinner_idx)
            } else if errored {
                ui::ERROR.paint(symbols::CROSS)
            } else if done == group.tabs.len() {
                ui::SUCCESS.paint(symbols::CHECK)
            } else {
                ui::MUTED.paint(symbols::CIRCLE_EMPTY)
            };

            let count = format!("{}/{}", done, group.tabs.len());
            let style = provider_style(group.provider);

            if idx == state.active_provider_idx {
                let bg = ui::ACTIVE_BG.bg();
                format!(
                    "{bg}{} {}{} {}{}{bg} {}({}){}{bg} {} {}",
                    ansi::BOLD,
                    style.color.fg(),
                    style.icon,
                    group.display_name,
                    ansi::RESET,
                    ui::MUTED.fg(),
                    count,
                    ansi::RESET,
                    indicator,
                    ansi::RESET,
                )
            } else {
                format!(
                    " {} {} ",
                    ui::MUTED_DARK.paint(&format!("{} ({})", group.display_name, count)),
                    indicator
                )
            }
        })
        .collect();

    vec![segments.join(&ui::BORDER.paint(&box_chars::VERTICAL.to_string()))]
}

fn render_panel_content(
    state: Option<&ProviderState>,
    panel_num: usize,
    label: &str,
    panel_width: usize,
    panel_height: usize,
    spinner_idx: usize,
    now: Instant,
) -> Vec<String> {
    let mut lines = vec![render_panel_header(panel_num, label, state, spinner_idx, panel_width)];

    let Some(state) = state else {
        lines.push(format!("{}(empty){}", ansi::FG_GRAY, ansi::RESET));
        if lines.len() < panel_height {
            lines.resize(panel_height, String::new());
        }
        return lines;
    };

    let content = grid_content_lines(state, panel_width.saturating_sub(2), now);
    let max_content = panel_height.saturating_sub(1);
    for i in 0..max_content {
        lines.push(content.get(i).map(|l| truncate(l, panel_width)).unwrap_or_default());
    }

    if content.len() > max_content {
        if let Some(last) = lines.last_mut() {
            *last = format!("{}... (press {} for full view){}", ansi::FG_GRAY, panel_num, ansi::RESET);
        }
    }
    lines
}

/// 2x2 grid of the active group's first four tabs, `height` rows below the
/// chrome.
fn render_grid(state: &TabbedState, width: usize, height: usize, now: Instant) -> Vec<String> {
    let Some(group) = state.active_group() else {
        return Vec::new();
    };

    let panel_width = width.saturating_sub(3) / 2;
    let panel_height = height.saturating_sub(6).saturating_sub(1) / 2;

    let panels: Vec<Vec<String>> = (0..GRID_PANELS)
        .map(|i| {
            let tab = group.tabs.get(i);
            render_panel_content(
                tab.and_then(|t| state.state_of(&t.id)),
                i + 1,
                tab.map(|t| t.label.as_str()).unwrap_or(""),
                panel_width,
                panel_height,
                state.spinner_idx,
                now,
            )
        })
        .collect();

    let border = provider_style(group.provider).color.fg();
    let rule = box_chars::HORIZONTAL.to_string().repeat(panel_width);
    let edge = |l: char, m: char, r: char| format!("{border}{l}{rule}{m}{rule}{r}{}", ansi::RESET);
    let bar = format!("{border}{}{}", box_chars::VERTICAL, ansi::RESET);

    let row = |left: &[String], right: &[String], i: usize| {
        let cell = |lines: &[String]| fit(lines.get(i).map(String::as_str).unwrap_or(""), panel_width);
        format!("{bar}{}{bar}{}{bar}", cell(left), cell(right))
    };

    let mut lines = vec![edge(box_chars::TOP_LEFT, box_chars::TEE_DOWN, box_chars::TOP_RIGHT)];
    lines.extend((0..panel_height).map(|i| row(&panels[0], &panels[1], i)));
    lines.push(edge(box_chars::TEE_RIGHT, box_chars::CROSS, box_chars::TEE_LEFT));
    lines.extend((0..panel_height).map(|i| row(&panels[2], &panels[3], i)));
    lines.push(edge(box_chars::BOTTOM_LEFT, box_chars::TEE_UP, box_chars::BOTTOM_RIGHT));
    lines
}

/// The focused tab with a scrolled viewport and a footer. `height` is the
/// full terminal height.
fn render_fullscreen_panel(state: &TabbedState, width: usize, height: u16, now: Instant) -> Vec<String> {
    let (Some(idx), Some(tab)) = (state.focused_panel, state.focused_tab()) else {
        return Vec::new();
    };
    let Some(tab_state) = state.state_of(&tab.id) else {
        return Vec::new();
    };

    let panel_num = idx + 1;
    let separator = format!("{}{}{}", ansi::FG_GRAY, box_chars::HORIZONTAL.to_string().repeat(width), ansi::RESET);

    let mut lines = vec![
        render_panel_header(panel_num, &tab.label, Some(tab_state), state.spinner_idx, width),
        separator.clone(),
    ];

    let content = content_lines(tab_state, width, now);
    let viewport = fullscreen_viewport_lines(height);
    let scroll = state.scroll_of(&tab.id);
    for i in 0..viewport {
        lines.push(content.get(scroll + i).map(|l| truncate(l, width)).unwrap_or_default());
    }
    lines.push(separator);

    let mut footer_parts = Vec::new();
    if let ProviderState::Done {
        model,
        elapsed_ms,
        tokens,
        ..
    } = tab_state
    {
        footer_parts.push(format!("{}{}{}{}", ansi::FG_BRIGHT_WHITE, ansi::BOLD, model, ansi::RESET));
        footer_parts.push(format!("{}{}{}", elapsed_color(*elapsed_ms), format_secs(*elapsed_ms), ansi::RESET));
        if let Some(tokens) = tokens {
            let count = |n: Option<u64>| n.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
            footer_parts.push(format!(
                "{}{}→{}{}{}{}{}{}tok{}",
                ansi::FG_GRAY,
                count(tokens.input_tokens),
                ansi::RESET,
                ansi::FG_BRIGHT_CYAN,
                ansi::BOLD,
                count(tokens.output_tokens),
                ansi::RESET,
                ansi::FG_GRAY,
                ansi::RESET
            ));
        }
    }

    let overflows = content.len() > viewport;
    let hint = format!(
        "{}{}Press {}Esc{}/{}Enter{}/{}{}{} to return{}",
        if overflows {
            format!("{}↑↓{} {}scroll{}  ", ui::MUTED.fg(), ansi::RESET, ui::MUTED_DARK.fg(), ansi::RESET)
        } else {
            String::new()
        },
        ansi::FG_GRAY,
        ansi::FG_BRIGHT_WHITE,
        ansi::FG_GRAY,
        ansi::FG_BRIGHT_WHITE,
        ansi::FG_GRAY,
        ansi::FG_BRIGHT_WHITE,
        panel_num,
        ansi::FG_GRAY,
        ansi::RESET
    );
    let right = if overflows {
        format!(
            "{}{}-{}/{}{}  {}",
            ansi::FG_GRAY,
            scroll + 1,
            (scroll + viewport).min(content.len()),
            content.len(),
            ansi::RESET,
            hint
        )
    } else {
        hint
    };

    let left = footer_parts.join(&format!("  {}{}{}  ", ansi::FG_GRAY, symbols::MIDDLE_DOT, ansi::RESET));
    let gap = width
        .saturating_sub(string_width(&left))
        .saturating_sub(string_width(&right))
        .max(1);
    lines.push(format!("{}{}{}", left, " ".repeat(gap), right));
    lines
}
