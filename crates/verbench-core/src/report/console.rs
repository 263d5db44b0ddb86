use crate::model::EvaluationReport;

/// Human-readable summary lines for one report. Deterministic, unit-testable.
#[must_use]
pub fn format_summary(report: &EvaluationReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({} {}, {})",
        report.task_id, report.library, report.target_version, report.category
    )];

    lines.push(format!(
        "  checks: {}/{} passed ({:.0}%)",
        report.checks_passed(),
        report.checks.len(),
        report.check_pass_rate * 100.0
    ));
    for c in &report.checks {
        let icon = if c.passed { "✅" } else { "❌" };
        let message = match &c.file {
            Some(file) => format!("{}: {}", file, c.message),
            None => c.message.clone(),
        };
        lines.push(format!("    {} {:<48} {}", icon, c.check.to_string(), message));
    }

    if !report.judge.runs.is_empty() {
        let ok = report.judge.runs.iter().filter(|r| r.is_success()).count();
        lines.push(format!(
            "  judge: score {:.2} ({}/{} runs ok)",
            report.judge.score,
            ok,
            report.judge.runs.len()
        ));
        for c in &report.judge.criteria {
            lines.push(format!("    {} {} (weight {})", c.verdict, c.criterion, c.weight));
        }
    }

    if report.hallucinations.details.is_empty() {
        lines.push("  hallucinations: none".to_string());
    } else {
        let kinds: Vec<String> = report
            .hallucinations
            .types
            .iter()
            .map(ToString::to_string)
            .collect();
        lines.push(format!("  hallucinations: {}", kinds.join(", ")));
        for d in &report.hallucinations.details {
            lines.push(format!("    - [{}] {}", d.kind, d.description));
        }
    }
    lines
}

/// Prints the summary to stderr; stdout is reserved for machine output.
pub fn print_summary(reports: &[EvaluationReport]) {
    eprintln!();
    for r in reports {
        for line in format_summary(r) {
            eprintln!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CheckResult, CheckSpec, HallucinationDetail, HallucinationKind, HallucinationResult,
        JudgeResult, TaskCategory,
    };

    #[test]
    fn summarizes_checks_and_hallucinations() {
        let check = CheckSpec::DirectivePresent {
            directive: "use server".into(),
            file: None,
        };
        let report = EvaluationReport {
            task_id: "t1".into(),
            library: "next".into(),
            target_version: "15.0.0".into(),
            category: TaskCategory::BleedingEdge,
            evaluated_at: String::new(),
            prompt_digest: String::new(),
            checks: vec![CheckResult::fail(&check, "directive 'use server' missing")],
            check_pass_rate: 0.0,
            judge: JudgeResult {
                criteria: vec![],
                score: 0.0,
                runs: vec![],
            },
            hallucinations: HallucinationResult {
                types: vec![HallucinationKind::OutdatedApi],
                details: vec![HallucinationDetail {
                    kind: HallucinationKind::OutdatedApi,
                    evidence: String::new(),
                    description: "structural check directive_present(use server) failed".into(),
                }],
            },
        };
        let lines = format_summary(&report);
        assert_eq!(lines[0], "t1 (next 15.0.0, bleeding_edge)");
        assert_eq!(lines[1], "  checks: 0/1 passed (0%)");
        assert!(lines[2].contains("directive_present(use server)"));
        assert_eq!(lines[3], "  hallucinations: outdated_api");
        assert!(lines[4].starts_with("    - [outdated_api] structural check"));
    }
}
