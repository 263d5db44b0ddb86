use crate::checker::{run_checks_on, SourceSet};
use crate::classify::classify_hallucinations;
use crate::config::{EvalConfig, JudgeProvider};
use crate::judge::prompt::build_judge_prompt;
use crate::judge::{JudgeRuntimeConfig, JudgeService};
use crate::model::{CheckResult, EvaluationReport, JudgeResult, Task};
use crate::providers::llm::fake::FakeClient;
use crate::providers::llm::openai::OpenAIClient;
use crate::providers::llm::tracing::TracingLlmClient;
use crate::providers::llm::LlmClient;
use crate::reference::VersionSurface;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Runs the full pipeline for one task: checks, judge fan-out, vote,
/// classification.
#[derive(Clone)]
pub struct Evaluator {
    judge: Option<JudgeService>,
}

impl Evaluator {
    pub fn new(judge: Option<JudgeService>) -> Self {
        Self { judge }
    }

    /// Checks and classification only.
    pub fn without_judge() -> Self {
        Self { judge: None }
    }

    /// Builds the judge client named by `cfg.judge.provider`.
    pub fn from_config(cfg: &EvalConfig, task: &Task) -> anyhow::Result<Self> {
        let j = &cfg.judge;
        let client: Arc<dyn LlmClient> = match j.provider {
            JudgeProvider::None => return Ok(Self::without_judge()),
            JudgeProvider::Openai => Arc::new(OpenAIClient::from_env(
                j.model.clone(),
                &j.api_key_env,
                j.temperature,
                j.max_tokens,
            )?),
            JudgeProvider::Fake => Arc::new(match &j.fake_response {
                Some(text) => FakeClient::new(j.model.clone()).with_response(text.clone()),
                None => FakeClient::approving(j.model.clone(), &task.rubric),
            }),
        };
        let client: Arc<dyn LlmClient> = Arc::new(TracingLlmClient::new(client));
        Ok(Self::new(Some(JudgeService::new(
            JudgeRuntimeConfig::from(j),
            client,
        ))))
    }

    pub fn has_judge(&self) -> bool {
        self.judge.is_some()
    }

    pub async fn evaluate(
        &self,
        task: &Task,
        sources: &SourceSet,
        reference: Option<&VersionSurface>,
    ) -> EvaluationReport {
        let checks = run_checks_on(sources, &task.ast_checks);

        let (judge, prompt_digest) = match &self.judge {
            Some(svc) => {
                let prompt = build_judge_prompt(task, sources, reference);
                let digest = hex::encode(Sha256::digest(prompt.as_bytes()));
                (svc.judge(&task.rubric, &prompt).await, digest)
            }
            None => (
                JudgeResult {
                    criteria: Vec::new(),
                    score: 0.0,
                    runs: Vec::new(),
                },
                String::new(),
            ),
        };

        let hallucinations = classify_hallucinations(task, &checks, &judge);
        let report = EvaluationReport {
            task_id: task.id.clone(),
            library: task.library.clone(),
            target_version: task.target_version.clone(),
            category: task.category,
            evaluated_at: chrono::Utc::now().to_rfc3339(),
            prompt_digest,
            check_pass_rate: pass_rate(&checks),
            checks,
            judge,
            hallucinations,
        };
        tracing::info!(
            task_id = %report.task_id,
            checks_passed = report.checks_passed(),
            checks = report.checks.len(),
            judge_score = report.judge.score,
            hallucinations = report.hallucinations.details.len(),
            "evaluation complete"
        );
        report
    }
}

/// Share of passed checks; a task without checks has nothing failing.
pub fn pass_rate(checks: &[CheckResult]) -> f64 {
    if checks.is_empty() {
        return 1.0;
    }
    checks.iter().filter(|c| c.passed).count() as f64 / checks.len() as f64
}
