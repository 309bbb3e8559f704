//! Claude (Anthropic) provider implementation
//!
//! SECURITY: API keys are ONLY sent to official Anthropic endpoints.
//! The ANTHROPIC_API_KEY is never sent to any third-party services.

use serde::Serialize;
use serde_json::Value;

use super::{usage_tokens, ProviderSpec, TokenUsage};
use crate::catalog::ProviderId;
use crate::config::ProviderRunConfig;

/// Official Anthropic API endpoint - API key is ONLY sent here
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeSpec;

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ClaudeMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl ProviderSpec for ClaudeSpec {
    fn provider(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn api_key_env_var(&self) -> &'static str {
        "ANTHROPIC_API_KEY"
    }

    fn endpoint(&self, _model: &str, _api_key: &str) -> String {
        ANTHROPIC_API_URL.to_string()
    }

    fn headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("x-api-key", api_key.to_string()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ]
    }

    fn build_body(&self, model: &str, prompt: &str, cfg: &ProviderRunConfig) -> Value {
        let request = ClaudeRequest {
            model,
            max_tokens: cfg.max_output_tokens(),
            messages: [ClaudeMessage {
                role: "user",
                content: prompt,
            }],
            temperature: cfg.temperature,
            system: cfg.system_prompt(),
        };
        serde_json::to_value(&request).unwrap_or(Value::Null)
    }

    fn extract_text(&self, payload: &Value) -> String {
        if let Some(blocks) = payload.get("content").and_then(Value::as_array) {
            let parts: Vec<&str> = blocks
                .iter()
                .flat_map(|b| ["text", "content"].map(|k| b.get(k).and_then(Value::as_str)))
                .flatten()
                .collect();
            if !parts.is_empty() {
                return parts.join("\n");
            }
        }

        payload
            .get("completion")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn extract_tokens(&self, payload: &Value) -> Option<TokenUsage> {
        usage_tokens(payload, "/usage/input_tokens", "/usage/output_tokens")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    #[test]
    fn body_shape() {
        let mut cfg = Config::default().providers.claude;
        cfg.max_output_tokens = Some(321);
        let body = ClaudeSpec.build_body("claude-sonnet-4-5", "Why?", &cfg);
        assert_eq!(body["model"], "claude-sonnet-4-5");
        assert_eq!(body["max_tokens"], 321);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Why?");
        assert_eq!(body["system"], "You are a helpful assistant.");

        cfg.system = Some("   ".to_string());
        let body = ClaudeSpec.build_body("m", "p", &cfg);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn headers_carry_version() {
        let headers = ClaudeSpec.headers("sk-ant-x");
        assert!(headers.contains(&("x-api-key", "sk-ant-x".to_string())));
        assert!(headers.contains(&("anthropic-version", "2023-06-01".to_string())));
    }

    #[test]
    fn text_blocks_are_joined() {
        let payload = json!({"content": [
            {"type": "text", "text": "one"},
            {"type": "tool_use", "id": "x"},
            {"type": "text", "text": "two"}
        ]});
        assert_eq!(ClaudeSpec.extract_text(&payload), "one\ntwo");
        assert_eq!(ClaudeSpec.extract_text(&json!({"completion": "old"})), "old");
        assert_eq!(ClaudeSpec.extract_text(&json!({"content": []})), "");
    }
}
