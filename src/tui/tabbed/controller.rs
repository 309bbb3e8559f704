//! Key handling for the comparison screen
//!
//! [`TabbedController::handle_key`] mutates the state and tells the session
//! what to do next. It never renders and never touches the terminal; the
//! clipboard is the only side effect and it sits behind [`ClipboardService`].

use std::time::Instant;

use super::render::{content_lines, fullscreen_viewport_lines};
use super::state::{ProviderState, TabbedState};
use crate::tui::clipboard::ClipboardService;
use crate::tui::keys::Key;

/// Panels reachable through the digit keys.
pub const MAX_PANELS: usize = 4;

/// What the session should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerAction {
    Quit,
    Render,
    Notify(String),
    None,
}

pub struct TabbedController<C: ClipboardService> {
    clipboard: C,
}

impl<C: ClipboardService> TabbedController<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    /// Dispatch one key. `size` is the terminal size in cells, used to clamp
    /// scrolling in the fullscreen view.
    pub fn handle_key(&mut self, state: &mut TabbedState, key: Key, size: (u16, u16)) -> ControllerAction {
        if state.show_help {
            state.show_help = false;
            return ControllerAction::Render;
        }

        if key.is_quit() {
            return ControllerAction::Quit;
        }

        if key.is_help() {
            state.show_help = true;
            return ControllerAction::Render;
        }

        match state.focused_panel {
            Some(focused) => self.handle_fullscreen(state, focused, key, size),
            None => self.handle_grid(state, key),
        }
    }

    fn handle_fullscreen(
        &mut self,
        state: &mut TabbedState,
        focused: usize,
        key: Key,
        size: (u16, u16),
    ) -> ControllerAction {
        match key {
            Key::Esc | Key::Enter => {
                state.focused_panel = None;
                ControllerAction::Render
            }
            Key::Digit(_) => match panel_for(state, key) {
                Some(idx) if idx == focused => {
                    state.focused_panel = None;
                    ControllerAction::Render
                }
                Some(idx) => {
                    state.focused_panel = Some(idx);
                    ControllerAction::Render
                }
                None => ControllerAction::None,
            },
            Key::C => self.copy_focused(state),
            Key::Up | Key::Down | Key::PageUp | Key::PageDown | Key::Home | Key::End => {
                scroll_focused(state, key, size)
            }
            _ => ControllerAction::None,
        }
    }

    fn handle_grid(&mut self, state: &mut TabbedState, key: Key) -> ControllerAction {
        let groups = state.provider_groups.len();
        match key {
            Key::Tab | Key::Right if groups > 0 => {
                state.set_active_provider((state.active_provider_idx + 1) % groups);
                ControllerAction::Render
            }
            Key::ShiftTab | Key::Left if groups > 0 => {
                state.set_active_provider((state.active_provider_idx + groups - 1) % groups);
                ControllerAction::Render
            }
            Key::Digit(_) => match panel_for(state, key) {
                Some(idx) => {
                    state.focused_panel = Some(idx);
                    ControllerAction::Render
                }
                None => ControllerAction::None,
            },
            Key::C => self.copy_focused(state),
            _ => ControllerAction::None,
        }
    }

    fn copy_focused(&mut self, state: &TabbedState) -> ControllerAction {
        let Some(tab) = state.focused_tab() else {
            return ControllerAction::Notify("Press 1-4 to select a panel first".to_string());
        };

        let message = match state.state_of(&tab.id) {
            Some(ProviderState::Done { text, .. }) => {
                let result = self.clipboard.copy(text);
                tracing::debug!("Copy of {} succeeded: {}", tab.id, result.success);
                result.message
            }
            Some(ProviderState::Idle { .. } | ProviderState::Loading { .. }) => "Still loading...".to_string(),
            Some(ProviderState::Error { .. }) => "Cannot copy error".to_string(),
            Some(ProviderState::Skipped { .. }) => "Skipped".to_string(),
            None => "Nothing to copy".to_string(),
        };
        ControllerAction::Notify(message)
    }
}

/// Panel index for a digit key, if that panel exists in the active group.
fn panel_for(state: &TabbedState, key: Key) -> Option<usize> {
    key.panel_index()
        .filter(|idx| *idx < MAX_PANELS && *idx < state.current_tabs().len())
}

/// Focused tab id with its largest valid scroll offset and page size.
fn scroll_limits(state: &TabbedState, (width, height): (u16, u16)) -> Option<(String, usize, usize)> {
    let tab = state.focused_tab()?;
    let tab_state = state.state_of(&tab.id)?;

    let total = content_lines(tab_state, usize::from(width), Instant::now()).len();
    let viewport = fullscreen_viewport_lines(height);
    let page = viewport.saturating_sub(2).max(1);
    Some((tab.id.clone(), total.saturating_sub(viewport), page))
}

fn scroll_focused(state: &mut TabbedState, key: Key, size: (u16, u16)) -> ControllerAction {
    let Some((id, max_scroll, page)) = scroll_limits(state, size) else {
        return ControllerAction::None;
    };

    let current = state.scroll_of(&id);
    let next = match key {
        Key::Up => current.saturating_sub(1),
        Key::Down => current + 1,
        Key::PageUp => current.saturating_sub(page),
        Key::PageDown => current + page,
        Key::Home => 0,
        Key::End => max_scroll,
        _ => current,
    }
    .min(max_scroll);

    if next == current {
        return ControllerAction::None;
    }
    state.scroll.insert(id, next);
    ControllerAction::Render
}

/// Pull the focused tab's scroll offset back into range after a resize.
/// Returns whether it changed.
pub fn clamp_focused_scroll(state: &mut TabbedState, size: (u16, u16)) -> bool {
    let Some((id, max_scroll, _)) = scroll_limits(state, size) else {
        return false;
    };
    let current = state.scroll_of(&id);
    if current <= max_scroll {
        return false;
    }
    state.scroll.insert(id, max_scroll);
    true
}
