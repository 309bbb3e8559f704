//! LLM provider implementations
//!
//! Each provider is a [`ProviderSpec`]: how to address it, what to send and
//! how to read the answer. The request loop itself lives in [`fallback`].

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use crate::catalog::ProviderId;
use crate::config::{ProviderRunConfig, ProvidersConfig};

mod claude;
mod error;
pub mod fallback;
mod gemini;
mod openai;
pub mod transport;
mod types;

pub use claude::ClaudeSpec;
pub use error::LlmError;
pub use fallback::run_with_fallback;
pub use gemini::GeminiSpec;
pub use openai::OpenAiSpec;
pub use transport::{HttpReply, ReqwestTransport, Transport};
pub use types::*;

/// Everything provider-specific about one HTTP API
pub trait ProviderSpec: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Environment variable holding the API key
    fn api_key_env_var(&self) -> &'static str;

    fn endpoint(&self, model: &str, api_key: &str) -> String;

    fn headers(&self, api_key: &str) -> Vec<(&'static str, String)>;

    fn build_body(&self, model: &str, prompt: &str, cfg: &ProviderRunConfig) -> Value;

    /// Answer text, or an empty string when the payload carries none
    fn extract_text(&self, payload: &Value) -> String;

    fn extract_tokens(&self, payload: &Value) -> Option<TokenUsage>;
}

pub fn spec_for(provider: ProviderId) -> &'static dyn ProviderSpec {
    match provider {
        ProviderId::OpenAi => &OpenAiSpec,
        ProviderId::Claude => &ClaudeSpec,
        ProviderId::Gemini => &GeminiSpec,
    }
}

/// Token counts found at two JSON pointers.
pub(crate) fn usage_tokens(payload: &Value, input: &str, output: &str) -> Option<TokenUsage> {
    TokenUsage::new(
        payload.pointer(input).and_then(Value::as_u64),
        payload.pointer(output).and_then(Value::as_u64),
    )
}

/// Run one explicit model, with the provider's other settings.
pub async fn invoke_model(
    provider: ProviderId,
    model_id: &str,
    prompt: &str,
    run_config: &ProviderRunConfig,
    transport: &dyn Transport,
) -> ProviderOutcome {
    let cfg = run_config.with_model(model_id);
    run_with_fallback(spec_for(provider), transport, prompt, &cfg).await
}

/// Run a provider over its configured model list.
pub async fn run_provider(
    provider: ProviderId,
    prompt: &str,
    cfg: &ProviderRunConfig,
    transport: &dyn Transport,
) -> ProviderOutcome {
    if !cfg.enabled {
        return ProviderOutcome::disabled(provider);
    }
    run_with_fallback(spec_for(provider), transport, prompt, cfg).await
}

/// Run every provider concurrently; results come back in provider order.
pub async fn run_all(
    prompt: &str,
    providers: &ProvidersConfig,
    transport: &dyn Transport,
) -> Vec<ProviderOutcome> {
    let runs = ProviderId::ALL
        .iter()
        .map(|p| run_provider(*p, prompt, providers.get(*p), transport));
    join_all(runs).await
}

/// What the comparison session calls for each selected model
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, provider: ProviderId, model: &str, prompt: &str)
        -> Result<ProviderOutcome>;
}

/// [`ModelInvoker`] backed by the loaded provider settings
#[derive(Clone)]
pub struct ConfiguredInvoker {
    providers: ProvidersConfig,
    transport: Arc<dyn Transport>,
}

impl ConfiguredInvoker {
    pub fn new(providers: ProvidersConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            providers,
            transport,
        }
    }
}

#[async_trait]
impl ModelInvoker for ConfiguredInvoker {
    async fn invoke(
        &self,
        provider: ProviderId,
        model: &str,
        prompt: &str,
    ) -> Result<ProviderOutcome> {
        let cfg = self.providers.get(provider);
        if !cfg.enabled {
            return Ok(ProviderOutcome::disabled(provider));
        }
        Ok(invoke_model(provider, model, prompt, cfg, self.transport.as_ref()).await)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::{HttpReply, LlmError, Transport};

    pub enum Scripted {
        Reply(u16, String),
        Timeout,
    }

    /// Transport answering from a script, one entry per request.
    pub struct FakeTransport {
        script: Mutex<VecDeque<Scripted>>,
        calls: AtomicUsize,
        pub bodies: Mutex<Vec<Value>>,
    }

    impl FakeTransport {
        pub fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
                bodies: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn post_json(
            &self,
            _url: &str,
            _headers: &[(&'static str, String)],
            body: &Value,
            _timeout: Duration,
        ) -> Result<HttpReply, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(body.clone());
            match self.script.lock().unwrap().pop_front() {
                Some(Scripted::Reply(status, body)) => Ok(HttpReply { status, body }),
                Some(Scripted::Timeout) => Err(LlmError::Timeout),
                None => Err(LlmError::Network("script exhausted".to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeTransport, Scripted};
    use super::*;
    use crate::config::Config;

    #[test]
    fn spec_lookup_matches_provider() {
        for provider in ProviderId::ALL {
            assert_eq!(spec_for(provider).provider(), provider);
        }
        assert_eq!(spec_for(ProviderId::Gemini).api_key_env_var(), "GEMINI_API_KEY");
    }

    #[tokio::test]
    async fn disabled_providers_never_hit_the_network() {
        let mut config = Config::default();
        for provider in ProviderId::ALL {
            config.providers.get_mut(provider).enabled = false;
        }
        let transport = FakeTransport::new(vec![]);
        let outcomes = run_all("hi", &config.providers, &transport).await;

        assert_eq!(outcomes.len(), 3);
        for (outcome, provider) in outcomes.iter().zip(ProviderId::ALL) {
            assert_eq!(outcome.provider(), provider);
            let ProviderOutcome::Failure(f) = outcome else {
                panic!("expected failure");
            };
            assert_eq!(f.failure_type, FailureType::Disabled);
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn configured_invoker_respects_enabled_flag() {
        let mut config = Config::default();
        config.providers.openai.enabled = false;
        let invoker = ConfiguredInvoker::new(
            config.providers,
            Arc::new(FakeTransport::new(vec![Scripted::Timeout])),
        );
        let outcome = invoker
            .invoke(ProviderId::OpenAi, "gpt-4.1-nano", "hi")
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ProviderOutcome::Failure(ProviderFailure {
                failure_type: FailureType::Disabled,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn invoke_model_pins_the_requested_model() {
        let transport = FakeTransport::new(vec![Scripted::Reply(
            200,
            r#"{"output_text":"ok"}"#.to_string(),
        )]);
        let cfg = Config::default().providers.openai;
        let outcome = fallback::run_with_key(
            spec_for(ProviderId::OpenAi),
            &transport,
            "hi",
            &cfg.with_model("gpt-4.1"),
            Some("sk-test"),
        )
        .await;
        assert_eq!(outcome.model(), Some("gpt-4.1"));
        assert_eq!(transport.bodies.lock().unwrap()[0]["model"], "gpt-4.1");
    }
}
