//! Model selection screen
//!
//! [`SelectionState`] is changed only through [`reduce`]. [`ModelSelector`]
//! maps keys to actions, owns the confirm step and renders both screens.

mod render;

use std::collections::{HashMap, HashSet};
use std::io::Write;

use serde::{Deserialize, Serialize};

pub use render::{render_confirm_screen, render_selection_screen};

use super::events::{EventReceiver, UiEvent};
use super::keys::Key;
use super::terminal;
use crate::catalog::{ProviderCatalog, ProviderId, Tier};

/// Most models that can be selected for one provider.
pub const MAX_MODELS_PER_PROVIDER: usize = 4;
pub const MAX_MODELS_ERROR: &str = "Max 4 models per provider";

/// A model chosen for comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedModel {
    pub provider: ProviderId,
    pub model_id: String,
    pub display_name: String,
}

impl SelectedModel {
    pub fn new(
        provider: ProviderId,
        model_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            display_name: display_name.into(),
        }
    }

    /// `provider:model`, unique within a session.
    pub fn tab_id(&self) -> String {
        tab_id(self.provider, &self.model_id)
    }
}

pub fn tab_id(provider: ProviderId, model_id: &str) -> String {
    format!("{}:{}", provider, model_id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelectionState {
    pub id: String,
    pub display_name: String,
    pub selected: bool,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelectionState {
    pub provider: ProviderId,
    pub display_name: String,
    pub models: Vec<ModelSelectionState>,
}

impl ProviderSelectionState {
    pub fn selected_count(&self) -> usize {
        self.models.iter().filter(|m| m.selected).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub providers: Vec<ProviderSelectionState>,
    pub cursor_provider: usize,
    /// `None` while the cursor is on the provider header
    pub cursor_model: Option<usize>,
    pub expanded: HashSet<ProviderId>,
    pub error_message: Option<String>,
}

impl SelectionState {
    /// Every provider expanded, cursor on the first model row, and models
    /// in `defaults` (tab ids) preselected.
    pub fn from_catalog(catalog: &[ProviderCatalog], defaults: &HashSet<String>) -> Self {
        let providers: Vec<ProviderSelectionState> = catalog
            .iter()
            .map(|p| ProviderSelectionState {
                provider: p.provider,
                display_name: p.display_name.to_string(),
                models: p
                    .models
                    .iter()
                    .map(|m| ModelSelectionState {
                        id: m.id.to_string(),
                        display_name: m.display_name.to_string(),
                        selected: defaults.contains(&tab_id(p.provider, m.id)),
                        tier: m.tier,
                    })
                    .collect(),
            })
            .collect();

        let cursor_model = match providers.first() {
            Some(first) if !first.models.is_empty() => Some(0),
            _ => None,
        };

        Self {
            expanded: providers.iter().map(|p| p.provider).collect(),
            providers,
            cursor_provider: 0,
            cursor_model,
            error_message: None,
        }
    }

    pub fn total_selected(&self) -> usize {
        self.providers.iter().map(|p| p.selected_count()).sum()
    }

    /// Selected models in catalog order.
    pub fn selected_models(&self) -> Vec<SelectedModel> {
        self.providers
            .iter()
            .flat_map(|p| {
                p.models
                    .iter()
                    .filter(|m| m.selected)
                    .map(move |m| SelectedModel::new(p.provider, &m.id, &m.display_name))
            })
            .collect()
    }

    pub fn is_expanded(&self, provider: ProviderId) -> bool {
        self.expanded.contains(&provider)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    MoveUp,
    MoveDown,
    Toggle,
    ClearError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceResult {
    pub state: SelectionState,
    pub error: Option<&'static str>,
}

impl From<SelectionState> for ReduceResult {
    fn from(state: SelectionState) -> Self {
        Self { state, error: None }
    }
}

/// Apply one action. Pure: the input state is consumed, the next one returned.
pub fn reduce(state: SelectionState, action: SelectionAction) -> ReduceResult {
    match action {
        SelectionAction::MoveUp => move_up(state).into(),
        SelectionAction::MoveDown => move_down(state).into(),
        SelectionAction::Toggle => toggle(state),
        SelectionAction::ClearError => SelectionState {
            error_message: None,
            ..state
        }
        .into(),
    }
}

fn move_up(mut state: SelectionState) -> SelectionState {
    match state.cursor_model {
        Some(0) => state.cursor_model = None,
        Some(m) => state.cursor_model = Some(m - 1),
        None if state.cursor_provider > 0 => {
            let prev_idx = state.cursor_provider - 1;
            let prev = &state.providers[prev_idx];
            state.cursor_model = if state.is_expanded(prev.provider) && !prev.models.is_empty() {
                Some(prev.models.len() - 1)
            } else {
                None
            };
            state.cursor_provider = prev_idx;
        }
        None => {}
    }
    state
}

fn move_down(mut state: SelectionState) -> SelectionState {
    let Some(current) = state.providers.get(state.cursor_provider) else {
        return state;
    };
    let model_count = current.models.len();
    let expanded = state.is_expanded(current.provider);
    let has_next = state.cursor_provider + 1 < state.providers.len();

    match state.cursor_model {
        None if expanded && model_count > 0 => {
            state.cursor_model = Some(0);
        }
        Some(m) if m + 1 < model_count => state.cursor_model = Some(m + 1),
        _ if has_next => {
            state.cursor_provider += 1;
            state.cursor_model = None;
        }
        _ => {}
    }
    state
}

fn toggle(mut state: SelectionState) -> ReduceResult {
    let Some(current) = state.providers.get_mut(state.cursor_provider) else {
        return state.into();
    };

    let Some(model_idx) = state.cursor_model else {
        let provider = current.provider;
        if !state.expanded.remove(&provider) {
            state.expanded.insert(provider);
        }
        return state.into();
    };

    let selected_count = current.selected_count();
    let Some(model) = current.models.get_mut(model_idx) else {
        return state.into();
    };

    if !model.selected && selected_count >= MAX_MODELS_PER_PROVIDER {
        state.error_message = Some(MAX_MODELS_ERROR.to_string());
        return ReduceResult {
            state,
            error: Some(MAX_MODELS_ERROR),
        };
    }

    model.selected = !model.selected;
    state.error_message = None;
    state.into()
}

/// How the selection screens ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub confirmed: bool,
    pub models: Vec<SelectedModel>,
}

impl SelectionResult {
    pub fn aborted() -> Self {
        Self {
            confirmed: false,
            models: Vec::new(),
        }
    }
}

/// What the caller should do after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorStep {
    Render,
    Ignore,
    Finish(SelectionResult),
}

/// Selection screen followed by a confirm screen
#[derive(Debug, Clone)]
pub struct ModelSelector {
    state: SelectionState,
    confirm_mode: bool,
}

impl ModelSelector {
    pub fn new(catalog: &[ProviderCatalog], defaults: &HashSet<String>) -> Self {
        Self {
            state: SelectionState::from_catalog(catalog, defaults),
            confirm_mode: false,
        }
    }

    #[cfg(test)]
    fn is_confirming(&self) -> bool {
        self.confirm_mode
    }

    pub fn handle_key(&mut self, key: Key) -> SelectorStep {
        if key.is_quit() {
            return SelectorStep::Finish(SelectionResult::aborted());
        }

        if self.confirm_mode {
            return match key {
                Key::Y | Key::Enter => SelectorStep::Finish(SelectionResult {
                    confirmed: true,
                    models: self.state.selected_models(),
                }),
                Key::N => {
                    self.confirm_mode = false;
                    SelectorStep::Render
                }
                _ => SelectorStep::Ignore,
            };
        }

        let action = match key {
            Key::Up => SelectionAction::MoveUp,
            Key::Down => SelectionAction::MoveDown,
            Key::Space => SelectionAction::Toggle,
            Key::Enter => {
                if self.state.total_selected() == 0 {
                    return SelectorStep::Ignore;
                }
                self.confirm_mode = true;
                return SelectorStep::Render;
            }
            _ => return SelectorStep::Ignore,
        };

        let result = reduce(self.state.clone(), action);
        if let Some(error) = result.error {
            tracing::debug!("Selection rejected: {}", error);
        }
        self.state = result.state;
        SelectorStep::Render
    }

    pub fn render(&self, width: u16, height: u16) -> String {
        let (width, height) = (usize::from(width), usize::from(height));
        if self.confirm_mode {
            render_confirm_screen(&self.state.selected_models(), width, height)
        } else {
            render_selection_screen(&self.state, width, height)
        }
    }

    /// Drive the screens from `events` until the user confirms or quits.
    pub async fn run(
        &mut self,
        events: &mut EventReceiver,
        out: &mut impl Write,
    ) -> anyhow::Result<SelectionResult> {
        let (mut width, mut height) = terminal::size();
        terminal::write_frame(out, &self.render(width, height))?;

        while let Some(event) = events.recv().await {
            match event {
                UiEvent::Key(key) => match self.handle_key(key) {
                    SelectorStep::Render => {
                        terminal::write_frame(out, &self.render(width, height))?
                    }
                    SelectorStep::Ignore => {}
                    SelectorStep::Finish(result) => {
                        tracing::info!(
                            confirmed = result.confirmed,
                            models = result.models.len(),
                            "Selection finished"
                        );
                        return Ok(result);
                    }
                },
                UiEvent::Resize(w, h) => {
                    (width, height) = (w, h);
                    terminal::write_frame(out, &self.render(width, height))?;
                }
                UiEvent::Outcome { .. } => {}
            }
        }

        Ok(SelectionResult::aborted())
    }
}

/// Group `models` by provider in first-seen order.
pub fn group_by_provider(models: &[SelectedModel]) -> Vec<(ProviderId, Vec<&SelectedModel>)> {
    let mut order: Vec<ProviderId> = Vec::new();
    let mut groups: HashMap<ProviderId, Vec<&SelectedModel>> = HashMap::new();
    for model in models {
        groups
            .entry(model.provider)
            .or_insert_with(|| {
                order.push(model.provider);
                Vec::new()
            })
            .push(model);
    }
    order
        .into_iter()
        .map(|p| {
            let tabs = groups.remove(&p).unwrap_or_default();
            (p, tabs)
        })
        .collect()
}
