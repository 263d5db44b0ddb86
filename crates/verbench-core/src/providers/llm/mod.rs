pub mod fake;
pub mod openai;
pub mod tracing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub cached: bool,
    pub meta: serde_json::Value,
}

/// A text-completion backend used as the judge.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Completes `prompt`; `system` messages are sent ahead of it.
    async fn complete(&self, prompt: &str, system: Option<&[String]>)
        -> anyhow::Result<LlmResponse>;

    fn provider_name(&self) -> &'static str;

    /// Model identifier, when the client is bound to one.
    fn model_name(&self) -> Option<&str> {
        None
    }
}
