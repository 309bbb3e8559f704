//! Google Gemini provider implementation
//!
//! SECURITY: API keys are ONLY sent to official Google endpoints.
//! The GEMINI_API_KEY is never sent to any third-party services.

use serde::Serialize;
use serde_json::Value;

use super::{usage_tokens, ProviderSpec, TokenUsage};
use crate::catalog::ProviderId;
use crate::config::ProviderRunConfig;

/// Official Gemini API base - API key is ONLY sent here
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiSpec;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl ProviderSpec for GeminiSpec {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn api_key_env_var(&self) -> &'static str {
        "GEMINI_API_KEY"
    }

    fn endpoint(&self, model: &str, api_key: &str) -> String {
        let base = format!("{}/{}:generateContent", GEMINI_API_BASE, model);
        match reqwest::Url::parse_with_params(&base, &[("key", api_key)]) {
            Ok(url) => url.to_string(),
            Err(_) => base,
        }
    }

    fn headers(&self, _api_key: &str) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn build_body(&self, _model: &str, prompt: &str, cfg: &ProviderRunConfig) -> Value {
        let request = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: cfg.max_output_tokens(),
                temperature: cfg.temperature,
            },
            system_instruction: cfg.system_prompt().map(|system| Content {
                role: "system",
                parts: [Part { text: system }],
            }),
        };
        serde_json::to_value(&request).unwrap_or(Value::Null)
    }

    fn extract_text(&self, payload: &Value) -> String {
        if let Some(reason) = payload
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            return format!("[Blocked: {}]", reason);
        }

        match payload.get("candidates").and_then(Value::as_array) {
            Some(candidates) if candidates.is_empty() => {
                return "[No candidates returned]".to_string();
            }
            Some(candidates) => {
                let first = &candidates[0];
                let parts: Vec<&str> = first
                    .pointer("/content/parts")
                    .and_then(Value::as_array)
                    .map(|parts| {
                        parts
                            .iter()
                            .filter_map(|p| p.get("text").and_then(Value::as_str))
                            .collect()
                    })
                    .unwrap_or_default();
                if !parts.is_empty() {
                    return parts.join("\n");
                }
                if let Some(reason) = first
                    .get("finishReason")
                    .and_then(Value::as_str)
                    .filter(|r| *r != "STOP")
                {
                    return format!("[No content: {}]", reason);
                }
            }
            None => {}
        }

        payload
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn extract_tokens(&self, payload: &Value) -> Option<TokenUsage> {
        usage_tokens(
            payload,
            "/usageMetadata/promptTokenCount",
            "/usageMetadata/candidatesTokenCount",
        )
    }
}
