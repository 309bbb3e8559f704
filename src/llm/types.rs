//! Provider outcome types
//!
//! Every provider call resolves to a [`ProviderOutcome`]; failures the user
//! can act on (missing key, HTTP error, timeout, disabled provider) are values,
//! not `Err`s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::ProviderId;
use crate::config::CONFIG_FILE_NAME;

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl TokenUsage {
    pub fn new(input_tokens: Option<u64>, output_tokens: Option<u64>) -> Option<Self> {
        if input_tokens.is_none() && output_tokens.is_none() {
            None
        } else {
            Some(Self {
                input_tokens,
                output_tokens,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    ApiKeyMissing,
    ApiError,
    Timeout,
    Disabled,
}

impl FailureType {
    /// The user chose not to configure this provider; shown as skipped
    /// instead of failed.
    pub fn is_skip(self) -> bool {
        matches!(self, FailureType::ApiKeyMissing | FailureType::Disabled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureType::ApiKeyMissing => "api_key_missing",
            FailureType::ApiError => "api_error",
            FailureType::Timeout => "timeout",
            FailureType::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSuccess {
    pub provider: ProviderId,
    pub model: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFailure {
    #[serde(rename = "failureType")]
    pub failure_type: FailureType,
    pub provider: ProviderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderOutcome {
    Success(ProviderSuccess),
    Failure(ProviderFailure),
}

/// Text used when a provider answers with nothing.
pub const EMPTY_RESPONSE: &str = "(empty response)";

fn api_key_hint(env_var: &str) -> &'static str {
    match env_var {
        "OPENAI_API_KEY" => "sk-...",
        "ANTHROPIC_API_KEY" => "sk-ant-...",
        "GEMINI_API_KEY" => "AI...",
        _ => "...",
    }
}

impl ProviderOutcome {
    pub fn provider(&self) -> ProviderId {
        match self {
            ProviderOutcome::Success(s) => s.provider,
            ProviderOutcome::Failure(f) => f.provider,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            ProviderOutcome::Success(s) => Some(&s.model),
            ProviderOutcome::Failure(f) => f.model.as_deref(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            ProviderOutcome::Success(s) => s.elapsed_ms,
            ProviderOutcome::Failure(f) => f.elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }

    pub fn disabled(provider: ProviderId) -> Self {
        ProviderOutcome::Failure(ProviderFailure {
            failure_type: FailureType::Disabled,
            provider,
            model: None,
            message: format!("Disabled. Set 'enabled = true' in {}", CONFIG_FILE_NAME),
            status: None,
            details: None,
            elapsed_ms: 0,
        })
    }

    pub fn api_key_missing(provider: ProviderId, env_var: &str, elapsed_ms: u64) -> Self {
        ProviderOutcome::Failure(ProviderFailure {
            failure_type: FailureType::ApiKeyMissing,
            provider,
            model: None,
            message: format!(
                "Missing {var}. Add to .env: {var}={hint}",
                var = env_var,
                hint = api_key_hint(env_var)
            ),
            status: None,
            details: None,
            elapsed_ms,
        })
    }

    pub fn timeout(provider: ProviderId, model: &str, timeout_ms: u64, elapsed_ms: u64) -> Self {
        let secs = (timeout_ms as f64 / 1000.0).round() as u64;
        ProviderOutcome::Failure(ProviderFailure {
            failure_type: FailureType::Timeout,
            provider,
            model: Some(model.to_string()),
            message: format!(
                "Timed out after {}s. Increase app.timeout_ms in config.",
                secs
            ),
            status: None,
            details: None,
            elapsed_ms,
        })
    }

    pub fn api_error(
        provider: ProviderId,
        model: Option<&str>,
        message: impl Into<String>,
        status: Option<u16>,
        details: Option<Value>,
        elapsed_ms: u64,
    ) -> Self {
        ProviderOutcome::Failure(ProviderFailure {
            failure_type: FailureType::ApiError,
            provider,
            model: model.map(str::to_string),
            message: message.into(),
            status,
            details,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_classification() {
        assert!(FailureType::ApiKeyMissing.is_skip());
        assert!(FailureType::Disabled.is_skip());
        assert!(!FailureType::ApiError.is_skip());
        assert!(!FailureType::Timeout.is_skip());
    }

    #[test]
    fn missing_key_message_includes_hint() {
        let outcome = ProviderOutcome::api_key_missing(ProviderId::Claude, "ANTHROPIC_API_KEY", 0);
        let ProviderOutcome::Failure(f) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(
            f.message,
            "Missing ANTHROPIC_API_KEY. Add to .env: ANTHROPIC_API_KEY=sk-ant-..."
        );
    }

    #[test]
    fn timeout_message_rounds_seconds() {
        let outcome = ProviderOutcome::timeout(ProviderId::Gemini, "gemini-2.5-pro", 1500, 1502);
        let ProviderOutcome::Failure(f) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(f.message, "Timed out after 2s. Increase app.timeout_ms in config.");
        assert_eq!(f.model.as_deref(), Some("gemini-2.5-pro"));
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_value(ProviderOutcome::disabled(ProviderId::OpenAi)).unwrap();
        assert_eq!(json["kind"], "failure");
        assert_eq!(json["failureType"], "disabled");
        assert_eq!(json["provider"], "openai");
        assert!(json.get("model").is_none());
    }
}
