use super::{LlmClient, LlmResponse};
use crate::model::RubricCriterion;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Offline client: replays scripted replies in order, then falls back to a
/// fixed response.
#[derive(Debug)]
pub struct FakeClient {
    model: String,
    script: Mutex<VecDeque<Result<String, String>>>,
    fixed_response: Option<String>,
}

impl FakeClient {
    pub fn new(model: String) -> Self {
        Self {
            model,
            script: Mutex::new(VecDeque::new()),
            fixed_response: None,
        }
    }

    pub fn with_response(mut self, response: String) -> Self {
        self.fixed_response = Some(response);
        self
    }

    /// Queues replies; an `Err` entry is returned as a transport error.
    pub fn with_script(self, replies: impl IntoIterator<Item = Result<String, String>>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(replies);
        }
        self
    }

    /// Answers PASS for every criterion of `rubric`.
    pub fn approving(model: String, rubric: &[RubricCriterion]) -> Self {
        let verdicts: Vec<_> = rubric
            .iter()
            .map(|c| {
                serde_json::json!({
                    "criterion": c.name,
                    "verdict": "PASS",
                    "evidence": "",
                    "reasoning": "offline judge",
                })
            })
            .collect();
        Self::new(model).with_response(serde_json::Value::Array(verdicts).to_string())
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        _prompt: &str,
        _system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        let next = self
            .script
            .lock()
            .map_err(|_| anyhow::anyhow!("fake client script lock poisoned"))?
            .pop_front();
        let text = match next {
            Some(Ok(text)) => text,
            Some(Err(e)) => anyhow::bail!(e),
            None => match &self.fixed_response {
                Some(text) => text.clone(),
                None => anyhow::bail!("fake client has no scripted response left"),
            },
        };

        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            cached: false,
            meta: serde_json::json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }
}
