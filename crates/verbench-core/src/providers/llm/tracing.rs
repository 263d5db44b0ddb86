use super::{LlmClient, LlmResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Wraps a client in an `llm.complete` span carrying provider, model,
/// latency and error.
pub struct TracingLlmClient {
    inner: Arc<dyn LlmClient>,
}

impl TracingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LlmClient for TracingLlmClient {
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        let span = info_span!(
            "llm.complete",
            "verbench.provider" = self.inner.provider_name(),
            "llm.request.model" = self.inner.model_name().unwrap_or("default"),
            "llm.prompt_chars" = prompt.len(),
            "llm.latency_ms" = tracing::field::Empty,
            "error" = tracing::field::Empty,
            "error.message" = tracing::field::Empty
        );

        async move {
            let start = std::time::Instant::now();
            let result = self.inner.complete(prompt, system).await;
            let span = tracing::Span::current();
            span.record("llm.latency_ms", start.elapsed().as_millis() as u64);
            if let Err(e) = &result {
                span.record("error", true);
                span.record("error.message", e.to_string().as_str());
            }
            result
        }
        .instrument(span)
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> Option<&str> {
        self.inner.model_name()
    }
}
