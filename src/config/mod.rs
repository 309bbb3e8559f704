//! Configuration management for llm-comp
//!
//! Configuration is a TOML file with `[app]`, `[providers.*]` and `[ui]`
//! sections. Every field is optional; [`Config::normalize`] fills per-provider
//! values from the catalog and inherits shared values from `[app]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{self, ProviderId};

pub const CONFIG_FILE_NAME: &str = "llm-comp.toml";
/// Environment variable pointing at an explicit config file.
pub const ENV_CONFIG_PATH: &str = "LLM_COMP_CONFIG";

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 800;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default = "Config::unnormalized")]
pub struct Config {
    pub app: AppConfig,
    pub providers: ProvidersConfig,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self::unnormalized();
        config.normalize();
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub system: String,
    pub timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "llm-comp".to_string(),
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderRunConfig,
    pub claude: ProviderRunConfig,
    pub gemini: ProviderRunConfig,
}

impl ProvidersConfig {
    pub fn get(&self, provider: ProviderId) -> &ProviderRunConfig {
        match provider {
            ProviderId::OpenAi => &self.openai,
            ProviderId::Claude => &self.claude,
            ProviderId::Gemini => &self.gemini,
        }
    }

    pub fn get_mut(&mut self, provider: ProviderId) -> &mut ProviderRunConfig {
        match provider {
            ProviderId::OpenAi => &mut self.openai,
            ProviderId::Claude => &mut self.claude,
            ProviderId::Gemini => &mut self.gemini,
        }
    }
}

/// OpenAI `reasoning.effort` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    None,
    Low,
    Medium,
    High,
    Xhigh,
}

impl ReasoningEffort {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasoningEffort::None => "none",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
            ReasoningEffort::Xhigh => "xhigh",
        }
    }
}

/// A single model id or an ordered fallback list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSpec {
    One(String),
    Many(Vec<String>),
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::Many(Vec::new())
    }
}

impl ModelSpec {
    /// Non-empty model ids in the order they should be tried.
    pub fn models(&self) -> Vec<String> {
        let all = match self {
            ModelSpec::One(m) => vec![m.clone()],
            ModelSpec::Many(list) => list.clone(),
        };
        all.into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.models().is_empty()
    }
}

/// Per-provider request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderRunConfig {
    pub enabled: bool,
    pub model: ModelSpec,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub system: Option<String>,
    pub timeout_ms: Option<u64>,
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl Default for ProviderRunConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: ModelSpec::default(),
            temperature: None,
            max_output_tokens: None,
            system: None,
            timeout_ms: None,
            reasoning_effort: None,
        }
    }
}

impl ProviderRunConfig {
    pub fn models(&self) -> Vec<String> {
        self.model.models()
    }

    /// Same settings pinned to one model.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: ModelSpec::One(model.to_string()),
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS)
    }

    /// System prompt, if it contains anything besides whitespace.
    pub fn system_prompt(&self) -> Option<&str> {
        self.system.as_deref().filter(|s| !s.trim().is_empty())
    }

    fn normalize(&mut self, provider: ProviderId, app: &AppConfig) {
        if self.model.is_empty() {
            self.model = ModelSpec::Many(catalog::default_models(provider));
        }
        self.temperature.get_or_insert(DEFAULT_TEMPERATURE);
        self.max_output_tokens.get_or_insert(DEFAULT_MAX_OUTPUT_TOKENS);
        if self.system.is_none() {
            self.system = Some(app.system.clone());
        }
        self.timeout_ms.get_or_insert(app.timeout_ms);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    #[default]
    Tabbed,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub mode: UiMode,
    /// Provider id -> label shown in the tab strip
    pub tab_labels: BTreeMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        let tab_labels = ProviderId::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), p.display_name().to_string()))
            .collect();
        Self {
            mode: UiMode::Tabbed,
            tab_labels,
        }
    }
}

impl UiConfig {
    pub fn tab_label(&self, provider: ProviderId) -> String {
        self.tab_labels
            .get(provider.as_str())
            .filter(|l| !l.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| provider.display_name().to_string())
    }
}

impl Config {
    fn unnormalized() -> Self {
        Self {
            app: AppConfig::default(),
            providers: ProvidersConfig::default(),
            ui: UiConfig::default(),
        }
    }

    /// Fill every unset provider field from the catalog and `[app]`.
    pub fn normalize(&mut self) {
        for provider in ProviderId::ALL {
            let app = self.app.clone();
            self.providers.get_mut(provider).normalize(provider, &app);
        }
    }

    /// Parse and normalize a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path of the per-user config file.
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "llm-comp")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

impl ResolvedConfig {
    pub fn help_text(&self) -> String {
        match &self.source {
            ConfigSource::File(path) => format!("Config: {}", path.display()),
            ConfigSource::Default => format!(
                "Config: (built-in defaults; place ./{} to customize)",
                CONFIG_FILE_NAME
            ),
        }
    }
}

/// Config file candidates in priority order.
pub fn config_candidates(cwd: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(explicit) = std::env::var(ENV_CONFIG_PATH) {
        let explicit = explicit.trim();
        if !explicit.is_empty() {
            candidates.push(PathBuf::from(explicit));
        }
    }
    candidates.push(cwd.join(CONFIG_FILE_NAME));
    if let Some(global) = Config::global_config_path() {
        candidates.push(global);
    }
    candidates
}

/// Load the first existing config file, or built-in defaults.
pub fn resolve_config(cwd: &Path) -> Result<ResolvedConfig, ConfigError> {
    resolve_from(&config_candidates(cwd))
}

fn resolve_from(candidates: &[PathBuf]) -> Result<ResolvedConfig, ConfigError> {
    for path in candidates {
        if path.is_file() {
            let config = Config::load_from(path)?;
            tracing::debug!("Loaded config from {}", path.display());
            return Ok(ResolvedConfig {
                config,
                source: ConfigSource::File(path.clone()),
            });
        }
    }
    tracing::debug!("No config file found, using defaults");
    Ok(ResolvedConfig {
        config: Config::default(),
        source: ConfigSource::Default,
    })
}
