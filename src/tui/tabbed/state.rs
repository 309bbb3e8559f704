//! Comparison view model
//!
//! One [`TabbedState`] per run. Provider results, key handling and the
//! spinner tick all mutate it from the session loop; nothing else holds it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::catalog::ProviderId;
use crate::llm::{ProviderOutcome, TokenUsage, EMPTY_RESPONSE};
use crate::tui::selector::{group_by_provider, SelectedModel};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(2000);

/// One model's panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: String,
    pub provider: ProviderId,
    pub model_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderGroup {
    pub provider: ProviderId,
    pub display_name: String,
    pub tabs: Vec<TabInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Idle,
    Loading,
    Done,
    Error,
    Skipped,
}

impl ProviderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderStatus::Idle => "idle",
            ProviderStatus::Loading => "loading",
            ProviderStatus::Done => "done",
            ProviderStatus::Error => "error",
            ProviderStatus::Skipped => "skipped",
        }
    }
}

/// Per-tab state; `Done`, `Error` and `Skipped` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderState {
    Idle {
        started_at: Option<Instant>,
    },
    Loading {
        started_at: Option<Instant>,
    },
    Done {
        model: String,
        text: String,
        elapsed_ms: u64,
        tokens: Option<TokenUsage>,
        /// Provider payload, kept only when the text came back empty
        raw: Option<Value>,
    },
    Error {
        model: Option<String>,
        error: String,
        elapsed_ms: u64,
    },
    Skipped {
        model: Option<String>,
        error: String,
        elapsed_ms: u64,
    },
}

impl ProviderState {
    pub fn status(&self) -> ProviderStatus {
        match self {
            ProviderState::Idle { .. } => ProviderStatus::Idle,
            ProviderState::Loading { .. } => ProviderStatus::Loading,
            ProviderState::Done { .. } => ProviderStatus::Done,
            ProviderState::Error { .. } => ProviderStatus::Error,
            ProviderState::Skipped { .. } => ProviderStatus::Skipped,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ProviderState::Idle { .. } | ProviderState::Loading { .. })
    }

    /// Elapsed time: recorded for settled tabs, measured from `started_at`
    /// for pending ones.
    pub fn elapsed_ms(&self, now: Instant) -> Option<u64> {
        match self {
            ProviderState::Idle { started_at } | ProviderState::Loading { started_at } => {
                started_at.map(|t| now.saturating_duration_since(t).as_millis() as u64)
            }
            ProviderState::Done { elapsed_ms, .. }
            | ProviderState::Error { elapsed_ms, .. }
            | ProviderState::Skipped { elapsed_ms, .. } => Some(*elapsed_ms),
        }
    }

    fn from_outcome(outcome: ProviderOutcome) -> Self {
        match outcome {
            ProviderOutcome::Success(s) => {
                let raw = if s.text == EMPTY_RESPONSE { s.raw } else { None };
                ProviderState::Done {
                    model: s.model,
                    text: s.text,
                    elapsed_ms: s.elapsed_ms,
                    tokens: s.tokens,
                    raw,
                }
            }
            ProviderOutcome::Failure(f) if f.failure_type.is_skip() => ProviderState::Skipped {
                model: f.model,
                error: f.message,
                elapsed_ms: f.elapsed_ms,
            },
            ProviderOutcome::Failure(f) => ProviderState::Error {
                model: f.model,
                error: f.message,
                elapsed_ms: f.elapsed_ms,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub until: Instant,
}

#[derive(Debug, Clone)]
pub struct TabbedState {
    pub provider_groups: Vec<ProviderGroup>,
    pub title: String,
    pub prompt: String,
    pub active_provider_idx: usize,
    /// Index into the active group's tabs. Cleared whenever the active
    /// group changes.
    pub focused_panel: Option<usize>,
    pub spinner_idx: usize,
    pub show_help: bool,
    pub states: HashMap<String, ProviderState>,
    pub scroll: HashMap<String, usize>,
    pub notification: Option<Notification>,
    settled_callback_fired: bool,
}

impl TabbedState {
    pub fn new(title: impl Into<String>, prompt: impl Into<String>, models: &[SelectedModel]) -> Self {
        Self::started_at(title, prompt, models, Instant::now())
    }

    /// Every tab loading since `now`, scrolled to the top, nothing focused.
    pub fn started_at(
        title: impl Into<String>,
        prompt: impl Into<String>,
        models: &[SelectedModel],
        now: Instant,
    ) -> Self {
        let provider_groups: Vec<ProviderGroup> = group_by_provider(models)
            .into_iter()
            .map(|(provider, group)| ProviderGroup {
                provider,
                display_name: provider.display_name().to_string(),
                tabs: group
                    .into_iter()
                    .map(|m| TabInfo {
                        id: m.tab_id(),
                        provider,
                        model_id: m.model_id.clone(),
                        label: m.display_name.clone(),
                    })
                    .collect(),
            })
            .collect();

        let mut states = HashMap::new();
        let mut scroll = HashMap::new();
        for tab in provider_groups.iter().flat_map(|g| &g.tabs) {
            states.insert(
                tab.id.clone(),
                ProviderState::Loading {
                    started_at: Some(now),
                },
            );
            scroll.insert(tab.id.clone(), 0);
        }

        Self {
            provider_groups,
            title: title.into(),
            prompt: prompt.into(),
            active_provider_idx: 0,
            focused_panel: None,
            spinner_idx: 0,
            show_help: false,
            states,
            scroll,
            notification: None,
            settled_callback_fired: false,
        }
    }

    /// Replace each group's tab-strip label.
    pub fn relabel_groups(&mut self, label: impl Fn(ProviderId) -> String) {
        for group in &mut self.provider_groups {
            group.display_name = label(group.provider);
        }
    }

    /// Every tab in group order.
    pub fn tabs(&self) -> impl Iterator<Item = &TabInfo> {
        self.provider_groups.iter().flat_map(|g| g.tabs.iter())
    }

    pub fn active_group(&self) -> Option<&ProviderGroup> {
        self.provider_groups.get(self.active_provider_idx)
    }

    /// Tabs of the active group; empty if the index is out of range.
    pub fn current_tabs(&self) -> &[TabInfo] {
        self.active_group().map(|g| g.tabs.as_slice()).unwrap_or(&[])
    }

    pub fn focused_tab(&self) -> Option<&TabInfo> {
        self.focused_panel.and_then(|i| self.current_tabs().get(i))
    }

    pub fn state_of(&self, tab_id: &str) -> Option<&ProviderState> {
        self.states.get(tab_id)
    }

    pub fn scroll_of(&self, tab_id: &str) -> usize {
        self.scroll.get(tab_id).copied().unwrap_or(0)
    }

    /// Switch groups. Focus always returns to the grid.
    pub fn set_active_provider(&mut self, idx: usize) {
        self.active_provider_idx = idx;
        self.focused_panel = None;
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    /// Record a provider outcome. Skip-type failures become `Skipped`.
    pub fn record_success(&mut self, model: &SelectedModel, outcome: ProviderOutcome) {
        let id = model.tab_id();
        let Some(entry) = self.states.get_mut(&id) else {
            tracing::debug!("Ignoring outcome for unknown tab {}", id);
            return;
        };
        *entry = ProviderState::from_outcome(outcome);
    }

    /// Record an invocation that failed without an outcome.
    pub fn record_failure(&mut self, model: &SelectedModel, error: impl std::fmt::Display) {
        let id = model.tab_id();
        let Some(entry) = self.states.get_mut(&id) else {
            tracing::debug!("Ignoring failure for unknown tab {}", id);
            return;
        };
        *entry = ProviderState::Error {
            model: None,
            error: error.to_string(),
            elapsed_ms: 0,
        };
    }

    /// No tab is loading or idle.
    pub fn is_settled(&self) -> bool {
        self.states.values().all(|s| !s.is_pending())
    }

    /// True exactly once: the first time this is called on a settled state.
    pub fn take_settlement(&mut self) -> bool {
        if self.settled_callback_fired || !self.is_settled() {
            return false;
        }
        self.settled_callback_fired = true;
        true
    }

    #[cfg(test)]
    pub(crate) fn settled_callback_fired(&self) -> bool {
        self.settled_callback_fired
    }

    pub fn notify(&mut self, message: impl Into<String>, now: Instant) {
        self.notification = Some(Notification {
            message: message.into(),
            until: now + NOTIFICATION_TTL,
        });
    }

    /// The notification text, if it has not expired at `now`.
    pub fn active_notification(&self, now: Instant) -> Option<&str> {
        self.notification
            .as_ref()
            .filter(|n| now < n.until)
            .map(|n| n.message.as_str())
    }

    /// Drop an expired notification; true if one was dropped.
    pub fn expire_notification(&mut self, now: Instant) -> bool {
        match &self.notification {
            Some(n) if now >= n.until => {
                self.notification = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FailureType, ProviderFailure, ProviderSuccess};

    fn models() -> Vec<SelectedModel> {
        vec![
            SelectedModel::new(ProviderId::OpenAi, "gpt-a", "GPT A"),
            SelectedModel::new(ProviderId::Claude, "claude-a", "Claude A"),
            SelectedModel::new(ProviderId::OpenAi, "gpt-b", "GPT B"),
            SelectedModel::new(ProviderId::Claude, "claude-b", "Claude B"),
        ]
    }

    fn success(provider: ProviderId, model: &str, text: &str) -> ProviderOutcome {
        ProviderOutcome::Success(ProviderSuccess {
            provider,
            model: model.to_string(),
            text: text.to_string(),
            raw: Some(serde_json::json!({"id": 1})),
            elapsed_ms: 1200,
            tokens: None,
        })
    }

    fn failure(provider: ProviderId, failure_type: FailureType) -> ProviderOutcome {
        ProviderOutcome::Failure(ProviderFailure {
            failure_type,
            provider,
            model: None,
            message: "nope".to_string(),
            status: None,
            details: None,
            elapsed_ms: 5,
        })
    }

    #[test]
    fn initial_state_groups_in_first_seen_order() {
        let state = TabbedState::new("t", "p", &models());
        assert_eq!(state.provider_groups.len(), 2);
        assert_eq!(state.provider_groups[0].provider, ProviderId::OpenAi);
        assert_eq!(state.provider_groups[0].tabs[1].id, "openai:gpt-b");
        assert_eq!(state.provider_groups[1].display_name, "Claude");
        assert_eq!(state.states.len(), 4);
        assert!(state
            .states
            .values()
            .all(|s| s.status() == ProviderStatus::Loading));
        assert!(state.scroll.values().all(|s| *s == 0));
        assert_eq!(state.focused_panel, None);
        assert!(!state.show_help);
        assert!(!state.settled_callback_fired());
    }

    #[test]
    fn missing_key_is_skipped_not_error() {
        let models = models();
        let mut state = TabbedState::new("t", "p", &models);
        state.record_success(&models[0], failure(ProviderId::OpenAi, FailureType::ApiKeyMissing));
        state.record_success(&models[1], failure(ProviderId::Claude, FailureType::Timeout));
        assert_eq!(state.states["openai:gpt-a"].status(), ProviderStatus::Skipped);
        assert_eq!(state.states["claude:claude-a"].status(), ProviderStatus::Error);
    }

    #[test]
    fn raw_is_kept_only_for_empty_responses() {
        let models = models();
        let mut state = TabbedState::new("t", "p", &models);
        state.record_success(&models[0], success(ProviderId::OpenAi, "gpt-a", "hi"));
        state.record_success(&models[2], success(ProviderId::OpenAi, "gpt-b", EMPTY_RESPONSE));
        assert!(matches!(&state.states["openai:gpt-a"], ProviderState::Done { raw: None, .. }));
        assert!(matches!(&state.states["openai:gpt-b"], ProviderState::Done { raw: Some(_), .. }));
    }

    #[test]
    fn unknown_tabs_are_ignored() {
        let mut state = TabbedState::new("t", "p", &models());
        let stranger = SelectedModel::new(ProviderId::Gemini, "x", "X");
        state.record_success(&stranger, success(ProviderId::Gemini, "x", "hi"));
        state.record_failure(&stranger, "boom");
        assert_eq!(state.states.len(), 4);
        assert!(!state.states.contains_key("gemini:x"));
    }

    #[test]
    fn thrown_errors_have_zero_elapsed() {
        let models = models();
        let mut state = TabbedState::new("t", "p", &models);
        state.record_failure(&models[3], "task panicked");
        assert_eq!(
            state.states["claude:claude-b"],
            ProviderState::Error {
                model: None,
                error: "task panicked".to_string(),
                elapsed_ms: 0
            }
        );
    }

    #[test]
    fn settlement_fires_once() {
        let models = vec![
            SelectedModel::new(ProviderId::OpenAi, "a", "A"),
            SelectedModel::new(ProviderId::OpenAi, "b", "B"),
        ];
        let mut state = TabbedState::new("t", "p", &models);
        state.record_success(&models[0], success(ProviderId::OpenAi, "a", "x"));
        assert!(!state.is_settled());
        assert!(!state.take_settlement());

        state.record_failure(&models[1], "boom");
        assert!(state.is_settled());
        assert!(state.take_settlement());

        // Duplicate delivery after settlement
        state.record_success(&models[1], success(ProviderId::OpenAi, "b", "late"));
        assert!(!state.take_settlement());
        assert!(state.settled_callback_fired());
    }

    #[test]
    fn current_tabs_out_of_range_is_empty() {
        let mut state = TabbedState::new("t", "p", &models());
        state.active_provider_idx = 7;
        assert!(state.current_tabs().is_empty());
        assert!(state.focused_tab().is_none());
    }

    #[test]
    fn switching_groups_clears_focus() {
        let mut state = TabbedState::new("t", "p", &models());
        state.focused_panel = Some(1);
        state.set_active_provider(1);
        assert_eq!(state.focused_panel, None);
        assert_eq!(state.current_tabs()[0].id, "claude:claude-a");
    }

    #[test]
    fn groups_can_be_relabeled() {
        let mut state = TabbedState::new("t", "p", &models());
        state.relabel_groups(|p| format!("{}!", p.as_str()));
        assert_eq!(state.provider_groups[0].display_name, "openai!");
        assert_eq!(state.provider_groups[1].display_name, "claude!");
    }

    #[test]
    fn notifications_expire() {
        let mut state = TabbedState::new("t", "p", &models());
        let now = Instant::now();
        state.notify("Copied", now);
        assert_eq!(state.active_notification(now), Some("Copied"));
        assert!(!state.expire_notification(now + Duration::from_millis(1999)));
        let later = now + NOTIFICATION_TTL;
        assert_eq!(state.active_notification(later), None);
        assert!(state.expire_notification(later));
        assert!(state.notification.is_none());
    }

    #[test]
    fn loading_elapsed_is_measured() {
        let start = Instant::now();
        let state = TabbedState::started_at("t", "p", &models(), start);
        let s = &state.states["openai:gpt-a"];
        assert_eq!(s.elapsed_ms(start + Duration::from_millis(1500)), Some(1500));
    }
}
