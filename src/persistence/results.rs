//! Results of the last finished comparison

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PersistenceError;
use crate::tui::tabbed::{ProviderState, TabbedState};

pub const RESULTS_FILE: &str = ".latest-results.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTokens {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub provider: String,
    pub model: String,
    pub status: String,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<ResultTokens>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResults {
    pub prompt: String,
    pub executed_at: DateTime<Utc>,
    pub results: Vec<ResultEntry>,
}

impl SavedResults {
    /// Snapshot of every tab, in tab order.
    pub fn from_state(prompt: &str, state: &TabbedState) -> Self {
        let results = state
            .tabs()
            .filter_map(|tab| {
                let tab_state = state.state_of(&tab.id)?;
                let mut entry = ResultEntry {
                    provider: tab.provider.to_string(),
                    model: tab.model_id.clone(),
                    status: tab_state.status().as_str().to_string(),
                    elapsed_ms: 0,
                    tokens: None,
                    text: None,
                    error: None,
                    raw: None,
                };
                match tab_state {
                    ProviderState::Done {
                        text,
                        elapsed_ms,
                        tokens,
                        raw,
                        ..
                    } => {
                        entry.elapsed_ms = *elapsed_ms;
                        entry.text = Some(text.clone());
                        entry.tokens = tokens.as_ref().map(|t| ResultTokens {
                            input: t.input_tokens,
                            output: t.output_tokens,
                        });
                        entry.raw = raw.clone();
                    }
                    ProviderState::Error { error, elapsed_ms, .. }
                    | ProviderState::Skipped { error, elapsed_ms, .. } => {
                        entry.elapsed_ms = *elapsed_ms;
                        entry.error = Some(error.clone());
                    }
                    ProviderState::Idle { .. } | ProviderState::Loading { .. } => {}
                }
                Some(entry)
            })
            .collect();

        Self {
            prompt: prompt.to_string(),
            executed_at: Utc::now(),
            results,
        }
    }
}

/// Write `.latest-results.json` for a settled comparison.
pub fn save_results(cwd: &Path, prompt: &str, state: &TabbedState) -> Result<PathBuf, PersistenceError> {
    let saved = SavedResults::from_state(prompt, state);
    let path = cwd.join(RESULTS_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(&saved)?)?;
    tracing::info!("Saved {} results to {}", saved.results.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProviderId;
    use crate::llm::{FailureType, ProviderFailure, ProviderOutcome, ProviderSuccess, TokenUsage, EMPTY_RESPONSE};
    use crate::tui::selector::SelectedModel;
    use tempfile::TempDir;

    fn settled_state() -> TabbedState {
        let models = vec![
            SelectedModel::new(ProviderId::OpenAi, "gpt-a", "GPT A"),
            SelectedModel::new(ProviderId::Claude, "claude-a", "Claude A"),
            SelectedModel::new(ProviderId::OpenAi, "gpt-b", "GPT B"),
        ];
        let mut state = TabbedState::new("T", "p", &models);
        state.record_success(
            &models[0],
            ProviderOutcome::Success(ProviderSuccess {
                provider: ProviderId::OpenAi,
                model: "gpt-a".to_string(),
                text: "hello".to_string(),
                raw: Some(serde_json::json!({"dropped": true})),
                elapsed_ms: 420,
                tokens: TokenUsage::new(Some(3), Some(7)),
            }),
        );
        state.record_success(
            &models[1],
            ProviderOutcome::Failure(ProviderFailure {
                failure_type: FailureType::ApiKeyMissing,
                provider: ProviderId::Claude,
                model: None,
                message: "Missing ANTHROPIC_API_KEY".to_string(),
                status: None,
                details: None,
                elapsed_ms: 0,
            }),
        );
        state.record_success(
            &models[2],
            ProviderOutcome::Success(ProviderSuccess {
                provider: ProviderId::OpenAi,
                model: "gpt-b".to_string(),
                text: EMPTY_RESPONSE.to_string(),
                raw: Some(serde_json::json!({"output": []})),
                elapsed_ms: 90,
                tokens: None,
            }),
        );
        state
    }

    #[test]
    fn entries_follow_tab_order() {
        let saved = SavedResults::from_state("why", &settled_state());
        let order: Vec<(&str, &str)> = saved
            .results
            .iter()
            .map(|r| (r.provider.as_str(), r.model.as_str()))
            .collect();
        assert_eq!(order, vec![("openai", "gpt-a"), ("openai", "gpt-b"), ("claude", "claude-a")]);
    }

    #[test]
    fn written_file_shape() {
        let dir = TempDir::new().unwrap();
        let path = save_results(dir.path(), "why", &settled_state()).unwrap();
        assert_eq!(path, dir.path().join(RESULTS_FILE));

        let json: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["prompt"], "why");
        assert!(json["executedAt"].is_string());

        let done = &json["results"][0];
        assert_eq!(done["status"], "done");
        assert_eq!(done["elapsed_ms"], 420);
        assert_eq!(done["text"], "hello");
        assert_eq!(done["tokens"]["input"], 3);
        assert_eq!(done["tokens"]["output"], 7);
        assert!(done.get("raw").is_none());
        assert!(done.get("error").is_none());

        assert_eq!(json["results"][1]["raw"]["output"], serde_json::json!([]));

        let skipped = &json["results"][2];
        assert_eq!(skipped["status"], "skipped");
        assert_eq!(skipped["error"], "Missing ANTHROPIC_API_KEY");
        assert!(skipped.get("text").is_none());
    }
}
