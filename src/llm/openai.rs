//! OpenAI provider (Responses API)
//!
//! SECURITY: API keys are ONLY sent to official OpenAI endpoints.
//! The OPENAI_API_KEY is never sent to any third-party services.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::{usage_tokens, ProviderSpec, TokenUsage};
use crate::catalog::ProviderId;
use crate::config::{ProviderRunConfig, ReasoningEffort};

/// Official OpenAI API endpoint - API key is ONLY sent here
const OPENAI_API_URL: &str = "https://api.openai.com/v1/responses";

/// Floor for reasoning models, which spend output tokens on hidden reasoning.
const REASONING_MIN_OUTPUT_TOKENS: u32 = 4000;

/// `gpt-5.1`, `gpt-5.2`, ...
static NUMBERED_GPT5: Lazy<Regex> = Lazy::new(|| Regex::new(r"^gpt-5\.\d+$").unwrap());
/// `gpt-5-pro`, `gpt-5.2-pro`, ...
static GPT5_PRO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^gpt-5(\.\d+)?-pro$").unwrap());

pub struct OpenAiSpec;

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    store: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Reasoning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Reasoning {
    effort: &'static str,
}

fn is_reasoning_model(model: &str) -> bool {
    matches!(model, "gpt-5-mini" | "gpt-5-nano")
}

/// Whether the model accepts `temperature` with the given reasoning effort.
fn supports_temperature(model: &str, effort: Option<ReasoningEffort>) -> bool {
    if GPT5_PRO.is_match(model) || matches!(model, "gpt-5" | "gpt-5-mini" | "gpt-5-nano") {
        return false;
    }
    if NUMBERED_GPT5.is_match(model) {
        return effort == Some(ReasoningEffort::None);
    }
    true
}

impl ProviderSpec for OpenAiSpec {
    fn provider(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn api_key_env_var(&self) -> &'static str {
        "OPENAI_API_KEY"
    }

    fn endpoint(&self, _model: &str, _api_key: &str) -> String {
        OPENAI_API_URL.to_string()
    }

    fn headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![("authorization", format!("Bearer {}", api_key))]
    }

    fn build_body(&self, model: &str, prompt: &str, cfg: &ProviderRunConfig) -> Value {
        let base_tokens = cfg.max_output_tokens();
        let max_output_tokens = if is_reasoning_model(model) {
            (base_tokens.saturating_mul(4)).max(REASONING_MIN_OUTPUT_TOKENS)
        } else {
            base_tokens
        };

        let reasoning = if NUMBERED_GPT5.is_match(model) {
            cfg.reasoning_effort.map(|e| Reasoning { effort: e.as_str() })
        } else {
            None
        };

        let temperature = cfg
            .temperature
            .filter(|_| supports_temperature(model, cfg.reasoning_effort));

        let request = ResponsesRequest {
            model,
            input: prompt,
            max_output_tokens,
            instructions: cfg.system_prompt(),
            store: false,
            reasoning,
            temperature,
        };
        serde_json::to_value(&request).unwrap_or(Value::Null)
    }

    fn extract_text(&self, payload: &Value) -> String {
        if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
            return text.to_string();
        }

        if let Some(items) = payload.get("output").and_then(Value::as_array) {
            let mut parts = Vec::new();
            for item in items {
                if item.get("type").and_then(Value::as_str) != Some("message") {
                    continue;
                }
                let Some(content) = item.get("content").and_then(Value::as_array) else {
                    continue;
                };
                for block in content {
                    for key in ["text", "output_text"] {
                        if let Some(text) = block.get(key).and_then(Value::as_str) {
                            parts.push(text);
                        }
                    }
                }
            }
            if !parts.is_empty() {
                return parts.join("\n");
            }
        }

        payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn extract_tokens(&self, payload: &Value) -> Option<TokenUsage> {
        usage_tokens(payload, "/usage/input_tokens", "/usage/output_tokens")
            .or_else(|| usage_tokens(payload, "/usage/prompt_tokens", "/usage/completion_tokens"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn cfg() -> ProviderRunConfig {
        Config::default().providers.openai
    }

    #[test]
    fn reasoning_models_get_larger_budget() {
        let body = OpenAiSpec.build_body("gpt-5-nano", "hi", &cfg());
        assert_eq!(body["max_output_tokens"], 4000);
        assert!(body.get("temperature").is_none());

        let mut big = cfg();
        big.max_output_tokens = Some(2000);
        let body = OpenAiSpec.build_body("gpt-5-mini", "hi", &big);
        assert_eq!(body["max_output_tokens"], 8000);
    }

    #[test]
    fn classic_models_keep_temperature() {
        let body = OpenAiSpec.build_body("gpt-4.1-nano", "hi", &cfg());
        assert_eq!(body["max_output_tokens"], 800);
        assert_eq!(body["store"], false);
        assert_eq!(body["input"], "hi");
        assert_eq!(body["instructions"], "You are a helpful assistant.");
        assert!(body["temperature"].as_f64().is_some());
        assert!(body.get("reasoning").is_none());
    }

    #[test]
    fn numbered_gpt5_uses_reasoning_effort() {
        let mut c = cfg();
        c.reasoning_effort = Some(ReasoningEffort::High);
        let body = OpenAiSpec.build_body("gpt-5.2", "hi", &c);
        assert_eq!(body["reasoning"]["effort"], "high");
        assert!(body.get("temperature").is_none());

        c.reasoning_effort = Some(ReasoningEffort::None);
        let body = OpenAiSpec.build_body("gpt-5.2", "hi", &c);
        assert_eq!(body["reasoning"]["effort"], "none");
        assert!(body.get("temperature").is_some());

        let body = OpenAiSpec.build_body("gpt-5.2-pro", "hi", &c);
        assert!(body.get("reasoning").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn text_extraction_order() {
        assert_eq!(OpenAiSpec.extract_text(&json!({"output_text": "direct"})), "direct");

        let nested = json!({"output": [
            {"type": "reasoning", "content": [{"text": "hidden"}]},
            {"type": "message", "content": [{"text": "a"}, {"output_text": "b"}]}
        ]});
        assert_eq!(OpenAiSpec.extract_text(&nested), "a\nb");

        let chat = json!({"choices": [{"message": {"content": "legacy"}}]});
        assert_eq!(OpenAiSpec.extract_text(&chat), "legacy");
        assert_eq!(OpenAiSpec.extract_text(&json!("nope")), "");
    }

    #[test]
    fn token_fields() {
        let responses = json!({"usage": {"input_tokens": 10, "output_tokens": 20}});
        let usage = OpenAiSpec.extract_tokens(&responses).unwrap();
        assert_eq!((usage.input_tokens, usage.output_tokens), (Some(10), Some(20)));

        let chat = json!({"usage": {"prompt_tokens": 1, "completion_tokens": 2}});
        let usage = OpenAiSpec.extract_tokens(&chat).unwrap();
        assert_eq!((usage.input_tokens, usage.output_tokens), (Some(1), Some(2)));

        assert!(OpenAiSpec.extract_tokens(&json!({})).is_none());
    }
}
