//! Majority voting over repeated judge runs.

use crate::model::{CriterionResult, JudgeInvocationOutcome, JudgeResult, RubricCriterion, Verdict};

/// Minimum number of PASS votes out of `runs` for a PASS verdict.
pub fn majority_threshold(runs: usize) -> usize {
    runs.div_ceil(2)
}

/// Folds `runs` into one verdict per rubric criterion.
///
/// A failed run, or a run that does not mention a criterion, votes FAIL for
/// it with empty evidence. Evidence and reasoning come from the first run
/// whose vote agrees with the final verdict.
pub fn aggregate_votes(rubric: &[RubricCriterion], runs: &[JudgeInvocationOutcome]) -> JudgeResult {
    let criteria: Vec<CriterionResult> = rubric
        .iter()
        .map(|criterion| {
            let votes: Vec<(Verdict, &str, &str)> = runs
                .iter()
                .map(|run| match run.find(&criterion.name) {
                    Some(v) => (v.verdict, v.evidence.as_str(), v.reasoning.as_str()),
                    None => (Verdict::Fail, "", ""),
                })
                .collect();

            let passes = votes.iter().filter(|(v, _, _)| v.is_pass()).count();
            let verdict = if !runs.is_empty() && passes >= majority_threshold(runs.len()) {
                Verdict::Pass
            } else {
                Verdict::Fail
            };
            let (evidence, reasoning) = votes
                .iter()
                .find(|(v, _, _)| *v == verdict)
                .map(|(_, e, r)| (e.to_string(), r.to_string()))
                .unwrap_or_default();

            tracing::debug!(
                criterion = %criterion.name,
                passes,
                runs = runs.len(),
                verdict = %verdict,
                "criterion vote"
            );

            CriterionResult {
                criterion: criterion.name.clone(),
                verdict,
                weight: criterion.weight,
                evidence,
                reasoning,
            }
        })
        .collect();

    JudgeResult {
        score: calculate_score(&criteria),
        criteria,
        runs: runs.to_vec(),
    }
}

/// Weighted share of PASS criteria; 0.0 when there is no weight at all.
pub fn calculate_score(criteria: &[CriterionResult]) -> f64 {
    let total: f64 = criteria.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let passed: f64 = criteria
        .iter()
        .filter(|c| c.verdict.is_pass())
        .map(|c| c.weight)
        .sum();
    passed / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JudgeCriterionVerdict;

    fn rubric(names: &[(&str, f64)]) -> Vec<RubricCriterion> {
        names
            .iter()
            .map(|(n, w)| RubricCriterion {
                name: n.to_string(),
                weight: *w,
                description: String::new(),
            })
            .collect()
    }

    fn run(entries: &[(&str, Verdict, &str)]) -> JudgeInvocationOutcome {
        JudgeInvocationOutcome::Success {
            criteria: entries
                .iter()
                .map(|(c, v, e)| JudgeCriterionVerdict {
                    criterion: c.to_string(),
                    verdict: *v,
                    evidence: e.to_string(),
                    reasoning: format!("because {}", e),
                })
                .collect(),
        }
    }

    fn result(name: &str, verdict: Verdict, weight: f64) -> CriterionResult {
        CriterionResult {
            criterion: name.to_string(),
            verdict,
            weight,
            evidence: String::new(),
            reasoning: String::new(),
        }
    }

    #[test]
    fn score_examples() {
        assert_eq!(calculate_score(&[]), 0.0);
        let all = [result("a", Verdict::Pass, 0.5), result("b", Verdict::Pass, 0.5)];
        assert_eq!(calculate_score(&all), 1.0);
        let mixed = [
            result("a", Verdict::Pass, 0.3),
            result("b", Verdict::Pass, 0.3),
            result("c", Verdict::Fail, 0.4),
        ];
        assert!((calculate_score(&mixed) - 0.6).abs() < 1e-9);
        assert_eq!(calculate_score(&[result("a", Verdict::Pass, 0.0)]), 0.0);
    }

    #[test]
    fn failed_and_missing_runs_vote_fail() {
        let r = rubric(&[("a", 1.0)]);
        let runs = vec![
            run(&[("a", Verdict::Pass, "e1")]),
            JudgeInvocationOutcome::failure("timeout"),
            run(&[("other", Verdict::Pass, "x")]),
        ];
        let out = aggregate_votes(&r, &runs);
        assert_eq!(out.criteria[0].verdict, Verdict::Fail);
        assert_eq!(out.criteria[0].evidence, "");
        assert_eq!(out.runs.len(), 3);
    }

    #[test]
    fn representative_is_first_agreeing_run() {
        let r = rubric(&[("a", 1.0)]);
        let runs = vec![
            run(&[("a", Verdict::Fail, "bad")]),
            run(&[("a", Verdict::Pass, "good")]),
            run(&[("a", Verdict::Pass, "better")]),
        ];
        let out = aggregate_votes(&r, &runs);
        assert_eq!(out.criteria[0].verdict, Verdict::Pass);
        assert_eq!(out.criteria[0].evidence, "good");
        assert_eq!(out.criteria[0].reasoning, "because good");
        assert_eq!(out.score, 1.0);
    }

    #[test]
    fn even_split_passes() {
        let r = rubric(&[("a", 1.0)]);
        let runs = vec![
            run(&[("a", Verdict::Fail, "bad")]),
            run(&[("a", Verdict::Pass, "good")]),
        ];
        assert_eq!(aggregate_votes(&r, &runs).criteria[0].verdict, Verdict::Pass);
    }

    #[test]
    fn duplicate_criterion_uses_first_tuple() {
        let r = rubric(&[("a", 1.0)]);
        let runs = vec![run(&[("a", Verdict::Fail, "first"), ("a", Verdict::Pass, "second")])];
        let out = aggregate_votes(&r, &runs);
        assert_eq!(out.criteria[0].verdict, Verdict::Fail);
        assert_eq!(out.criteria[0].evidence, "first");
    }

    #[test]
    fn no_runs_fails_everything() {
        let out = aggregate_votes(&rubric(&[("a", 0.5), ("b", 0.5)]), &[]);
        assert!(out.criteria.iter().all(|c| c.verdict == Verdict::Fail));
        assert_eq!(out.score, 0.0);
    }
}
