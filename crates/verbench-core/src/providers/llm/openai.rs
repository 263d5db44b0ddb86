use super::{LlmClient, LlmResponse};
use async_trait::async_trait;
use serde_json::json;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIClient {
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    /// Reads the API key from `api_key_env`.
    pub fn from_env(
        model: String,
        api_key_env: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> anyhow::Result<Self> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| anyhow::anyhow!("judge provider 'openai' requires {}", api_key_env))?;
        Ok(Self::new(model, api_key, temperature, max_tokens))
    }

    fn request_body(&self, prompt: &str, system: Option<&[String]>) -> serde_json::Value {
        let mut messages: Vec<serde_json::Value> = system
            .unwrap_or_default()
            .iter()
            .map(|s| json!({ "role": "system", "content": s }))
            .collect();
        messages.push(json!({ "role": "user", "content": prompt }));

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        let body = self.request_body(prompt, system);
        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI chat API error (status {}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("OpenAI API response missing content"))?
            .to_string();

        Ok(LlmResponse {
            text,
            provider: "openai".to_string(),
            model: self.model.clone(),
            cached: false,
            meta: json.get("usage").cloned().map_or_else(|| json!({}), |u| json!({ "usage": u })),
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }
}
