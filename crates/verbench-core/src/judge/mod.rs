pub mod aggregate;
pub mod parse;
pub mod prompt;

pub use aggregate::{aggregate_votes, calculate_score, majority_threshold};
pub use parse::parse_judge_response;

use crate::config::JudgeConfig;
use crate::errors::JudgeParseError;
use crate::model::{JudgeInvocationOutcome, JudgeResult, RubricCriterion};
use crate::providers::llm::LlmClient;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct JudgeRuntimeConfig {
    /// Invocations per evaluation.
    pub runs: u32,
    /// Extra attempts for replies without any JSON.
    pub parse_retries: u32,
    pub timeout: Option<Duration>,
    pub system_prompt: String,
}

impl Default for JudgeRuntimeConfig {
    fn default() -> Self {
        Self {
            runs: 3,
            parse_retries: 1,
            timeout: Some(Duration::from_secs(120)),
            system_prompt: prompt::SYSTEM_PROMPT.to_string(),
        }
    }
}

impl From<&JudgeConfig> for JudgeRuntimeConfig {
    fn from(cfg: &JudgeConfig) -> Self {
        Self {
            runs: cfg.runs,
            parse_retries: cfg.parse_retries,
            timeout: (cfg.timeout_secs > 0).then(|| Duration::from_secs(cfg.timeout_secs)),
            system_prompt: prompt::SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct JudgeService {
    config: JudgeRuntimeConfig,
    client: Arc<dyn LlmClient>,
}

impl JudgeService {
    pub fn new(config: JudgeRuntimeConfig, client: Arc<dyn LlmClient>) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &JudgeRuntimeConfig {
        &self.config
    }

    /// One judge run. Transport errors, timeouts and unparseable replies
    /// come back as `Failure` outcomes; only replies with no JSON at all are
    /// retried.
    pub async fn invoke(&self, prompt: &str) -> JudgeInvocationOutcome {
        let system = [self.config.system_prompt.clone()];
        let mut attempt = 0u32;
        loop {
            let reply = match self.config.timeout {
                Some(limit) => {
                    match tokio::time::timeout(limit, self.client.complete(prompt, Some(&system)))
                        .await
                    {
                        Ok(reply) => reply,
                        Err(_) => {
                            tracing::warn!(timeout = ?limit, "judge invocation timed out");
                            return JudgeInvocationOutcome::failure(format!(
                                "judge invocation timed out after {:?}",
                                limit
                            ));
                        }
                    }
                }
                None => self.client.complete(prompt, Some(&system)).await,
            };

            let text = match reply {
                Ok(resp) => resp.text,
                Err(e) => {
                    tracing::warn!(error = %e, provider = self.client.provider_name(), "judge call failed");
                    return JudgeInvocationOutcome::failure(e.to_string());
                }
            };

            match parse_judge_response(&text) {
                Ok(criteria) => {
                    tracing::debug!(criteria = criteria.len(), attempt, "judge reply parsed");
                    return JudgeInvocationOutcome::Success { criteria };
                }
                Err(JudgeParseError::NotJson) if attempt < self.config.parse_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, "judge reply contained no JSON, retrying");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "judge reply unusable");
                    return JudgeInvocationOutcome::failure(e.to_string());
                }
            }
        }
    }

    /// Issues `runs` invocations concurrently; outcomes keep request order.
    pub async fn invoke_many(&self, prompt: &str) -> Vec<JudgeInvocationOutcome> {
        let calls = (0..self.config.runs).map(|_| self.invoke(prompt));
        futures::future::join_all(calls).await
    }

    /// Runs the judge and majority-votes the outcomes over `rubric`.
    pub async fn judge(&self, rubric: &[RubricCriterion], prompt: &str) -> JudgeResult {
        let runs = self.invoke_many(prompt).await;
        let failed = runs.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            tracing::warn!(failed, total = runs.len(), "judge runs failed");
        }
        aggregate_votes(rubric, &runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verdict;
    use crate::providers::llm::LlmResponse;
    use async_trait::async_trait;

    struct MockLlmClient {
        responses: std::sync::Mutex<Vec<anyhow::Result<String>>>,
        calls: std::sync::atomic::AtomicU32,
        delay: Option<Duration>,
    }

    impl MockLlmClient {
        fn new(responses: Vec<anyhow::Result<String>>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses),
                calls: std::sync::atomic::AtomicU32::new(0),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(
            &self,
            _prompt: &str,
            system: Option<&[String]>,
        ) -> anyhow::Result<LlmResponse> {
            assert!(system.is_some_and(|s| s[0].contains("JSON")));
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            let next = {
                let mut resps = self.responses.lock().unwrap();
                if resps.is_empty() {
                    anyhow::bail!("No more mock responses");
                }
                resps.remove(0)
            };
            Ok(LlmResponse {
                text: next?,
                provider: "mock".to_string(),
                model: "mock".to_string(),
                cached: false,
                meta: serde_json::Value::Null,
            })
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    fn service(client: MockLlmClient, runs: u32) -> (JudgeService, Arc<MockLlmClient>) {
        let client = Arc::new(client);
        let config = JudgeRuntimeConfig {
            runs,
            timeout: None,
            ..Default::default()
        };
        (JudgeService::new(config, client.clone()), client)
    }

    #[tokio::test]
    async fn not_json_is_retried_once() {
        let (svc, mock) = service(
            MockLlmClient::new(vec![
                Ok("Sorry, I can't.".to_string()),
                Ok(r#"[{"criterion":"a","verdict":"PASS"}]"#.to_string()),
            ]),
            1,
        );
        assert!(svc.invoke("p").await.is_success());
        assert_eq!(mock.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_criteria_and_transport_errors_are_not_retried() {
        let (svc, mock) = service(
            MockLlmClient::new(vec![
                Ok("[]".to_string()),
                Err(anyhow::anyhow!("connection reset")),
                Ok("unused".to_string()),
            ]),
            1,
        );
        assert_eq!(
            svc.invoke("p").await,
            JudgeInvocationOutcome::failure("judge response contains no criteria")
        );
        assert_eq!(
            svc.invoke("p").await,
            JudgeInvocationOutcome::failure("connection reset")
        );
        assert_eq!(mock.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn two_of_three_majority() {
        let (svc, _) = service(
            MockLlmClient::new(vec![
                Ok(r#"[{"criterion":"a","verdict":"FAIL","evidence":"bad"}]"#.to_string()),
                Ok(r#"[{"criterion":"a","verdict":"PASS","evidence":"good"}]"#.to_string()),
                Ok(r#"[{"criterion":"a","verdict":"PASS","evidence":"better"}]"#.to_string()),
            ]),
            3,
        );
        let rubric = vec![RubricCriterion {
            name: "a".into(),
            weight: 1.0,
            description: String::new(),
        }];
        let result = svc.judge(&rubric, "p").await;
        assert_eq!(result.runs.len(), 3);
        assert_eq!(result.criteria[0].verdict, Verdict::Pass);
        assert_eq!(result.score, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reply_becomes_timeout_failure() {
        let mut mock = MockLlmClient::new(vec![Ok("[]".to_string())]);
        mock.delay = Some(Duration::from_secs(10));
        let config = JudgeRuntimeConfig {
            runs: 1,
            timeout: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        let svc = JudgeService::new(config, Arc::new(mock));
        match svc.invoke("p").await {
            JudgeInvocationOutcome::Failure { error } => {
                assert!(error.starts_with("judge invocation timed out after"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
