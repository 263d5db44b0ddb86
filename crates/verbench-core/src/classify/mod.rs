//! Hallucination taxonomy over failed checks and failed judge criteria.

pub mod direction;
pub mod enrich;
pub mod keywords;

use crate::model::{
    CheckResult, CheckSpec, HallucinationDetail, HallucinationKind, HallucinationResult,
    JudgeResult, Task,
};

/// How a failed check maps onto the taxonomy.
enum CheckMapping {
    Fixed(HallucinationKind),
    /// Something unwanted is present; the direction depends on context.
    ByDirection,
}

fn check_mapping(check: &CheckSpec) -> CheckMapping {
    use CheckMapping::{ByDirection, Fixed};
    use HallucinationKind::{FutureApi, OutdatedApi, VersionMismatch, WrongImportPath, WrongParameter};

    match check {
        CheckSpec::ImportExists { .. } => Fixed(WrongImportPath),
        CheckSpec::FunctionExported { .. } => Fixed(VersionMismatch),
        CheckSpec::AwaitPresent { .. } => Fixed(OutdatedApi),
        CheckSpec::AwaitAbsent { .. } => Fixed(FutureApi),
        CheckSpec::CallExists { .. }
        | CheckSpec::DirectivePresent { .. }
        | CheckSpec::AsyncFunction { .. }
        | CheckSpec::AsyncGenerator { .. }
        | CheckSpec::YieldPresent { .. } => Fixed(OutdatedApi),
        CheckSpec::PropertyLocation { .. } | CheckSpec::TypeAnnotation { .. } => Fixed(WrongParameter),
        CheckSpec::ImportAbsent { .. }
        | CheckSpec::ModuleImportAbsent { .. }
        | CheckSpec::FunctionAbsent { .. }
        | CheckSpec::CallAbsent { .. }
        | CheckSpec::PropertyAbsent { .. } => ByDirection,
    }
}

/// Classifies every failure of one evaluation.
///
/// Failed checks come first, in check order, then failed hallucination
/// criteria from the judge in rubric order. A hallucination criterion only
/// counts when some other criterion failed too.
pub fn classify_hallucinations(
    task: &Task,
    checks: &[CheckResult],
    judge: &JudgeResult,
) -> HallucinationResult {
    let fingerprints = &task.common_hallucinations;
    let mut details = Vec::new();

    for result in checks.iter().filter(|r| !r.passed) {
        let kind = match check_mapping(&result.check) {
            CheckMapping::Fixed(kind) => kind,
            CheckMapping::ByDirection => direction::resolve(
                result.check.subject(),
                &result.message,
                fingerprints,
                task.category,
            ),
        };
        let description = format!("structural check {} failed", result.check);
        let matched_against = match result.check.subject() {
            Some(subject) => format!("{} {}", subject, result.message),
            None => result.message.clone(),
        };
        details.push(HallucinationDetail {
            kind,
            evidence: result.message.clone(),
            description: enrich::enrich_description(description, &matched_against, fingerprints),
        });
    }

    let core_failed = judge
        .criteria
        .iter()
        .any(|c| !c.verdict.is_pass() && !keywords::is_hallucination_criterion(&c.criterion));
    if core_failed {
        for c in judge
            .criteria
            .iter()
            .filter(|c| !c.verdict.is_pass() && keywords::is_hallucination_criterion(&c.criterion))
        {
            let kind = keywords::judge_text_kind(&format!("{} {}", c.evidence, c.reasoning));
            let description = if c.reasoning.is_empty() {
                format!("judge criterion '{}' failed", c.criterion)
            } else {
                format!("judge criterion '{}' failed: {}", c.criterion, c.reasoning)
            };
            let matched_against = format!("{} {}", c.evidence, c.reasoning);
            details.push(HallucinationDetail {
                kind,
                evidence: c.evidence.clone(),
                description: enrich::enrich_description(description, &matched_against, fingerprints),
            });
        }
    }

    let mut types = Vec::new();
    for d in &details {
        if !types.contains(&d.kind) {
            types.push(d.kind);
        }
    }
    tracing::debug!(task_id = %task.id, kinds = types.len(), details = details.len(), "hallucinations classified");
    HallucinationResult { types, details }
}
