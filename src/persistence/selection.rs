//! Last confirmed model selection

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PersistenceError;
use crate::catalog::ProviderId;
use crate::tui::selector::{tab_id, SelectedModel};

pub const SELECTION_FILE: &str = ".llm-comp-selection.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEntry {
    pub provider_id: ProviderId,
    pub model_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSelection {
    pub selected_models: Vec<SelectionEntry>,
    pub updated_at: DateTime<Utc>,
}

fn selection_path(cwd: &Path) -> PathBuf {
    cwd.join(SELECTION_FILE)
}

/// Tab ids (`provider:model`) of the last saved selection. A missing or
/// unreadable file yields an empty set.
pub fn load_selection(cwd: &Path) -> HashSet<String> {
    let path = selection_path(cwd);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return HashSet::new();
    };
    match serde_json::from_str::<SavedSelection>(&content) {
        Ok(saved) => saved
            .selected_models
            .iter()
            .map(|m| tab_id(m.provider_id, &m.model_id))
            .collect(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable selection file {}: {}", path.display(), e);
            HashSet::new()
        }
    }
}

pub fn save_selection(cwd: &Path, models: &[SelectedModel]) -> Result<PathBuf, PersistenceError> {
    let saved = SavedSelection {
        selected_models: models
            .iter()
            .map(|m| SelectionEntry {
                provider_id: m.provider,
                model_id: m.model_id.clone(),
            })
            .collect(),
        updated_at: Utc::now(),
    };
    let path = selection_path(cwd);
    std::fs::write(&path, serde_json::to_string_pretty(&saved)?)?;
    tracing::debug!("Saved {} selected models to {}", models.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_selection(dir.path()).is_empty());
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SELECTION_FILE), "{not json").unwrap();
        assert!(load_selection(dir.path()).is_empty());
    }

    #[test]
    fn saved_selection_loads_as_tab_ids() {
        let dir = TempDir::new().unwrap();
        let models = vec![
            SelectedModel::new(ProviderId::OpenAi, "gpt-4.1-nano", "GPT-4.1 Nano"),
            SelectedModel::new(ProviderId::Gemini, "gemini-2.5-flash", "Gemini 2.5 Flash"),
        ];
        save_selection(dir.path(), &models).unwrap();

        let loaded = load_selection(dir.path());
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("openai:gpt-4.1-nano"));
        assert!(loaded.contains("gemini:gemini-2.5-flash"));
    }

    #[test]
    fn file_uses_camel_case_keys() {
        let dir = TempDir::new().unwrap();
        let models = vec![SelectedModel::new(ProviderId::Claude, "claude-haiku", "Haiku")];
        let path = save_selection(dir.path(), &models).unwrap();
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["selectedModels"][0]["providerId"], "claude");
        assert_eq!(json["selectedModels"][0]["modelId"], "claude-haiku");
        assert!(json["updatedAt"].is_string());
    }
}
