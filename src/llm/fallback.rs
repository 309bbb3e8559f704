//! Shared request loop: API key check, model fallback, outcome construction

use std::time::Instant;

use serde_json::Value;

use super::transport::Transport;
use super::{ProviderOutcome, ProviderSpec, ProviderSuccess, EMPTY_RESPONSE};
use crate::config::ProviderRunConfig;

/// Statuses a provider uses to reject an unknown or unavailable model.
const MODEL_FALLBACK_STATUS_CODES: [u16; 2] = [400, 404];

/// Lower-case fragments that identify a model-level rejection.
const MODEL_ERROR_PATTERNS: [&str; 9] = [
    "model_not_found",
    "model not found",
    "model:",
    "does not exist",
    "is not found",
    "not supported",
    "unsupported model",
    "invalid model",
    "unknown model",
];

/// Read the provider's API key from the environment, ignoring blank values.
pub fn read_api_key(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Human-readable error from a failed response body.
pub fn extract_error_message(status: u16, body: &str, json: Option<&Value>) -> String {
    if let Some(json) = json {
        if let Some(msg) = json
            .pointer("/error/message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
        {
            return msg.to_string();
        }
        if let Some(msg) = json
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
        {
            return msg.to_string();
        }
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    format!("HTTP {}", status)
}

/// Whether a rejected model should fall through to the next configured one.
pub fn should_try_next_model(message: &str, status: u16, models_remaining: usize) -> bool {
    if models_remaining == 0 || !MODEL_FALLBACK_STATUS_CODES.contains(&status) {
        return false;
    }
    let lower = message.to_lowercase();
    MODEL_ERROR_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Run `prompt` against the configured models in order until one answers.
pub async fn run_with_fallback(
    spec: &dyn ProviderSpec,
    transport: &dyn Transport,
    prompt: &str,
    cfg: &ProviderRunConfig,
) -> ProviderOutcome {
    let api_key = read_api_key(spec.api_key_env_var());
    run_with_key(spec, transport, prompt, cfg, api_key.as_deref()).await
}

pub(crate) async fn run_with_key(
    spec: &dyn ProviderSpec,
    transport: &dyn Transport,
    prompt: &str,
    cfg: &ProviderRunConfig,
    api_key: Option<&str>,
) -> ProviderOutcome {
    let provider = spec.provider();
    let started = Instant::now();
    let elapsed = || started.elapsed().as_millis() as u64;

    let Some(api_key) = api_key else {
        tracing::info!(%provider, "{} not set, skipping", spec.api_key_env_var());
        return ProviderOutcome::api_key_missing(provider, spec.api_key_env_var(), elapsed());
    };

    let models = cfg.models();
    let timeout = cfg.timeout();
    let mut last_failure = None;

    for (i, model) in models.iter().enumerate() {
        let url = spec.endpoint(model, api_key);
        let headers = spec.headers(api_key);
        let body = spec.build_body(model, prompt, cfg);

        tracing::debug!(%provider, %model, "Sending request");
        let reply = match transport.post_json(&url, &headers, &body, timeout).await {
            Ok(reply) => reply,
            Err(e) if e.is_timeout() => {
                tracing::warn!(%provider, %model, "Request timed out");
                return ProviderOutcome::timeout(
                    provider,
                    model,
                    timeout.as_millis() as u64,
                    elapsed(),
                );
            }
            Err(e) => {
                tracing::warn!(%provider, %model, "Request failed: {}", e);
                return ProviderOutcome::api_error(
                    provider,
                    Some(model),
                    e.to_string(),
                    None,
                    None,
                    elapsed(),
                );
            }
        };

        let json = reply.json();

        if !reply.is_success() {
            let message = extract_error_message(reply.status, &reply.body, json.as_ref());
            let remaining = models.len() - i - 1;
            let retry = should_try_next_model(&message, reply.status, remaining);
            tracing::warn!(
                %provider,
                %model,
                status = reply.status,
                fallback = retry,
                "Provider rejected request: {}",
                message
            );
            let details = json.or_else(|| Some(Value::String(reply.body.clone())));
            let failure = ProviderOutcome::api_error(
                provider,
                Some(model),
                message,
                Some(reply.status),
                details,
                elapsed(),
            );
            if retry {
                last_failure = Some(failure);
                continue;
            }
            return failure;
        }

        let payload = json.unwrap_or(Value::Null);
        let text = spec.extract_text(&payload);
        let tokens = spec.extract_tokens(&payload);
        tracing::info!(%provider, %model, elapsed_ms = elapsed(), "Response received");

        return ProviderOutcome::Success(ProviderSuccess {
            provider,
            model: model.clone(),
            text: if text.is_empty() {
                EMPTY_RESPONSE.to_string()
            } else {
                text
            },
            raw: Some(payload),
            elapsed_ms: elapsed(),
            tokens,
        });
    }

    last_failure.unwrap_or_else(|| {
        ProviderOutcome::api_error(
            provider,
            None,
            "All models failed. Check API key and network.",
            None,
            None,
            elapsed(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProviderId;
    use crate::config::{Config, ModelSpec};
    use crate::llm::testing::{FakeTransport, Scripted};
    use crate::llm::{spec_for, FailureType};
    use serde_json::json;

    fn claude_cfg(models: &[&str]) -> ProviderRunConfig {
        let mut cfg = Config::default().providers.claude;
        cfg.model = ModelSpec::Many(models.iter().map(|m| m.to_string()).collect());
        cfg
    }

    fn failure_of(outcome: ProviderOutcome) -> crate::llm::ProviderFailure {
        match outcome {
            ProviderOutcome::Failure(f) => f,
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn error_message_precedence() {
        let nested = json!({"error": {"message": "bad model"}, "message": "outer"});
        assert_eq!(extract_error_message(400, "", Some(&nested)), "bad model");
        let flat = json!({"message": "outer"});
        assert_eq!(extract_error_message(400, "", Some(&flat)), "outer");
        assert_eq!(extract_error_message(502, "Bad Gateway", None), "Bad Gateway");
        assert_eq!(extract_error_message(503, "  ", None), "HTTP 503");
    }

    #[test]
    fn fallback_needs_status_pattern_and_remaining_models() {
        assert!(should_try_next_model("The model `x` does not exist", 404, 1));
        assert!(!should_try_next_model("The model `x` does not exist", 404, 0));
        assert!(!should_try_next_model("The model `x` does not exist", 500, 1));
        assert!(!should_try_next_model("max_tokens too large", 400, 2));
    }

    #[tokio::test]
    async fn missing_key_short_circuits() {
        let transport = FakeTransport::new(vec![]);
        let spec = spec_for(ProviderId::Claude);
        let outcome = run_with_key(spec, &transport, "hi", &claude_cfg(&["a"]), None).await;
        let failure = failure_of(outcome);
        assert_eq!(failure.failure_type, FailureType::ApiKeyMissing);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_next_model_on_unknown_model() {
        let transport = FakeTransport::new(vec![
            Scripted::Reply(404, r#"{"error":{"message":"model: claude-nope"}}"#.to_string()),
            Scripted::Reply(
                200,
                r#"{"content":[{"type":"text","text":"hello"}],"usage":{"input_tokens":3,"output_tokens":5}}"#
                    .to_string(),
            ),
        ]);
        let spec = spec_for(ProviderId::Claude);
        let cfg = claude_cfg(&["claude-nope", "claude-haiku-4-5-20251001"]);
        let outcome = run_with_key(spec, &transport, "hi", &cfg, Some("k")).await;

        let ProviderOutcome::Success(success) = outcome else {
            panic!("expected success");
        };
        assert_eq!(success.model, "claude-haiku-4-5-20251001");
        assert_eq!(success.text, "hello");
        assert_eq!(success.tokens.and_then(|t| t.output_tokens), Some(5));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn last_model_error_is_reported() {
        let transport = FakeTransport::new(vec![Scripted::Reply(
            404,
            r#"{"error":{"message":"model: claude-nope"}}"#.to_string(),
        )]);
        let spec = spec_for(ProviderId::Claude);
        let outcome = run_with_key(spec, &transport, "hi", &claude_cfg(&["claude-nope"]), Some("k")).await;
        let failure = failure_of(outcome);
        assert_eq!(failure.failure_type, FailureType::ApiError);
        assert_eq!(failure.status, Some(404));
        assert_eq!(failure.message, "model: claude-nope");
    }

    #[tokio::test]
    async fn non_model_errors_stop_immediately() {
        let transport = FakeTransport::new(vec![Scripted::Reply(
            401,
            r#"{"error":{"message":"invalid x-api-key"}}"#.to_string(),
        )]);
        let spec = spec_for(ProviderId::Claude);
        let cfg = claude_cfg(&["a", "b"]);
        let failure = failure_of(run_with_key(spec, &transport, "hi", &cfg, Some("k")).await);
        assert_eq!(failure.status, Some(401));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn timeout_becomes_timeout_outcome() {
        let transport = FakeTransport::new(vec![Scripted::Timeout]);
        let spec = spec_for(ProviderId::Claude);
        let mut cfg = claude_cfg(&["a", "b"]);
        cfg.timeout_ms = Some(3000);
        let failure = failure_of(run_with_key(spec, &transport, "hi", &cfg, Some("k")).await);
        assert_eq!(failure.failure_type, FailureType::Timeout);
        assert_eq!(failure.model.as_deref(), Some("a"));
        assert!(failure.message.contains("3s"));
    }

    #[tokio::test]
    async fn empty_text_is_marked() {
        let transport = FakeTransport::new(vec![Scripted::Reply(200, r#"{"content":[]}"#.to_string())]);
        let spec = spec_for(ProviderId::Claude);
        let outcome = run_with_key(spec, &transport, "hi", &claude_cfg(&["a"]), Some("k")).await;
        let ProviderOutcome::Success(success) = outcome else {
            panic!("expected success");
        };
        assert_eq!(success.text, EMPTY_RESPONSE);
        assert!(success.raw.is_some());
    }
}
