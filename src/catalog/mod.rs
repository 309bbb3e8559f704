//! Static model catalog
//!
//! The providers llm-comp knows how to call and the models offered for each
//! in the selector. The catalog guarantees model ids are unique per provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported LLM providers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
    Gemini,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAi, ProviderId::Claude, ProviderId::Gemini];

    /// Config / wire identifier
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Claude => "claude",
            ProviderId::Gemini => "gemini",
        }
    }

    pub fn display_name(self) -> &'static str {
        provider_catalog(self).display_name
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "claude" | "anthropic" => Ok(ProviderId::Claude),
            "gemini" | "google" => Ok(ProviderId::Gemini),
            other => anyhow::bail!("Unknown provider: {}", other),
        }
    }
}

/// Rough capability/cost class shown as a badge in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Flagship,
    Standard,
    Fast,
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderCatalog {
    pub provider: ProviderId,
    pub display_name: &'static str,
    pub models: &'static [ModelInfo],
}

const fn model(id: &'static str, display_name: &'static str, tier: Tier) -> ModelInfo {
    ModelInfo {
        id,
        display_name,
        tier,
    }
}

const OPENAI_MODELS: &[ModelInfo] = &[
    model("gpt-5.2-pro", "GPT-5.2 Pro", Tier::Flagship),
    model("gpt-5.2", "GPT-5.2", Tier::Flagship),
    model("gpt-5.1", "GPT-5.1", Tier::Flagship),
    model("gpt-5", "GPT-5", Tier::Flagship),
    model("gpt-5-mini", "GPT-5 Mini", Tier::Standard),
    model("gpt-5-nano", "GPT-5 Nano", Tier::Fast),
    model("gpt-4.1", "GPT-4.1", Tier::Standard),
    model("gpt-4.1-mini", "GPT-4.1 Mini", Tier::Standard),
    model("gpt-4.1-nano", "GPT-4.1 Nano", Tier::Fast),
];

const CLAUDE_MODELS: &[ModelInfo] = &[
    model("claude-opus-4-5-20251101", "Claude Opus 4.5", Tier::Flagship),
    model("claude-sonnet-4-5-20250929", "Claude Sonnet 4.5", Tier::Standard),
    model("claude-opus-4-1-20250805", "Claude Opus 4.1", Tier::Standard),
    model("claude-opus-4-20250514", "Claude Opus 4", Tier::Standard),
    model("claude-sonnet-4-20250514", "Claude Sonnet 4", Tier::Standard),
    model("claude-haiku-4-5-20251001", "Claude Haiku 4.5", Tier::Fast),
];

const GEMINI_MODELS: &[ModelInfo] = &[
    model("gemini-3-pro-preview", "Gemini 3 Pro Preview", Tier::Flagship),
    model("gemini-3-flash-preview", "Gemini 3 Flash Preview", Tier::Standard),
    model("gemini-2.5-pro", "Gemini 2.5 Pro", Tier::Flagship),
    model("gemini-2.5-flash", "Gemini 2.5 Flash", Tier::Standard),
    model("gemini-2.5-flash-lite", "Gemini 2.5 Flash Lite", Tier::Fast),
    model("gemini-2.0-flash", "Gemini 2.0 Flash", Tier::Fast),
    model("gemini-2.0-flash-001", "Gemini 2.0 Flash 001", Tier::Fast),
    model("gemini-2.0-flash-lite", "Gemini 2.0 Flash Lite", Tier::Fast),
    model("gemini-2.0-flash-lite-001", "Gemini 2.0 Flash Lite 001", Tier::Fast),
];

pub const MODEL_CATALOG: [ProviderCatalog; 3] = [
    ProviderCatalog {
        provider: ProviderId::OpenAi,
        display_name: "OpenAI",
        models: OPENAI_MODELS,
    },
    ProviderCatalog {
        provider: ProviderId::Claude,
        display_name: "Claude",
        models: CLAUDE_MODELS,
    },
    ProviderCatalog {
        provider: ProviderId::Gemini,
        display_name: "Gemini",
        models: GEMINI_MODELS,
    },
];

pub fn provider_catalog(provider: ProviderId) -> &'static ProviderCatalog {
    match provider {
        ProviderId::OpenAi => &MODEL_CATALOG[0],
        ProviderId::Claude => &MODEL_CATALOG[1],
        ProviderId::Gemini => &MODEL_CATALOG[2],
    }
}

/// Models used when the config does not name any: the fast tier, or the
/// provider's first model when it has no fast tier.
pub fn default_models(provider: ProviderId) -> Vec<String> {
    let models = provider_catalog(provider).models;
    let fast: Vec<String> = models
        .iter()
        .filter(|m| m.tier == Tier::Fast)
        .map(|m| m.id.to_string())
        .collect();
    if !fast.is_empty() {
        return fast;
    }
    models.first().map(|m| vec![m.id.to_string()]).unwrap_or_default()
}
