//! Structural checker: evaluates declarative checks against JS/TS sources.
//!
//! Evaluation never fails. Malformed input is indexed as far as it can be;
//! empty input yields an empty index, so presence checks fail and absence
//! checks pass.

pub mod lexer;
mod matchers;
pub mod scan;
pub mod type_text;

use crate::model::{CheckResult, CheckSpec};
use matchers::FileOutcome;
use scan::SourceIndex;

/// One source file of a sample. Single-file samples have no path.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: Option<String>,
    pub text: String,
}

/// The code under evaluation, one or more files.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            files: vec![SourceFile {
                path: None,
                text: text.into(),
            }],
        }
    }

    pub fn from_files<P, T>(files: impl IntoIterator<Item = (P, T)>) -> Self
    where
        P: Into<String>,
        T: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(p, t)| SourceFile {
                    path: Some(p.into()),
                    text: t.into(),
                })
                .collect(),
        }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.iter().all(|f| f.text.trim().is_empty())
    }

    /// Indices of files a check scoped to `scope` applies to. Paths match by
    /// suffix so `app/page.tsx` selects `src/app/page.tsx`.
    fn in_scope(&self, scope: Option<&str>) -> Vec<usize> {
        let Some(scope) = scope else {
            return (0..self.files.len()).collect();
        };
        let scope = scope.trim_start_matches("./");
        self.files
            .iter()
            .enumerate()
            .filter(|(_, f)| match &f.path {
                Some(p) => p == scope || p.ends_with(&format!("/{}", scope)),
                // an unnamed single file is whatever the check refers to
                None => true,
            })
            .map(|(i, _)| i)
            .collect()
    }
}

/// Runs every check against a single source text, in order.
pub fn run_checks(source: &str, checks: &[CheckSpec]) -> Vec<CheckResult> {
    run_checks_on(&SourceSet::single(source), checks)
}

/// Runs every check against a set of files. Results have the same length
/// and order as `checks`.
pub fn run_checks_on(sources: &SourceSet, checks: &[CheckSpec]) -> Vec<CheckResult> {
    let indexes: Vec<SourceIndex> = sources
        .files
        .iter()
        .map(|f| SourceIndex::build(&f.text))
        .collect();
    checks
        .iter()
        .map(|check| {
            let result = evaluate_check(sources, &indexes, check);
            tracing::debug!(check = %check, passed = result.passed, message = %result.message, "structural check");
            result
        })
        .collect()
}

/// Whether a check asserts that something exists (as opposed to not existing).
pub fn expects_presence(check: &CheckSpec) -> bool {
    match check {
        CheckSpec::ImportExists { .. }
        | CheckSpec::FunctionExported { .. }
        | CheckSpec::AwaitPresent { .. }
        | CheckSpec::CallExists { .. }
        | CheckSpec::DirectivePresent { .. }
        | CheckSpec::PropertyLocation { .. }
        | CheckSpec::AsyncFunction { .. }
        | CheckSpec::AsyncGenerator { .. }
        | CheckSpec::YieldPresent { .. }
        | CheckSpec::TypeAnnotation { .. } => true,
        CheckSpec::ImportAbsent { .. }
        | CheckSpec::ModuleImportAbsent { .. }
        | CheckSpec::FunctionAbsent { .. }
        | CheckSpec::AwaitAbsent { .. }
        | CheckSpec::CallAbsent { .. }
        | CheckSpec::PropertyAbsent { .. } => false,
    }
}

fn evaluate_check(sources: &SourceSet, indexes: &[SourceIndex], check: &CheckSpec) -> CheckResult {
    let presence = expects_presence(check);
    let scoped = sources.in_scope(check.file());
    if scoped.is_empty() {
        let msg = match check.file() {
            Some(f) => format!("file '{}' not found in sample", f),
            None => "no source files".to_string(),
        };
        return if presence {
            CheckResult::fail(check, msg)
        } else {
            CheckResult::pass(check, msg)
        };
    }

    let labelled = sources.files.len() > 1;
    let mut passes = Vec::new();
    let mut fails = Vec::new();
    let mut others = Vec::new();
    for i in scoped {
        let file = sources.files[i].path.clone().filter(|_| labelled);
        match matchers::evaluate(&indexes[i], check) {
            FileOutcome::Pass(m) => passes.push((file, m)),
            FileOutcome::Fail(m) => fails.push((file, m)),
            FileOutcome::NotApplicable(m) => others.push((file, m)),
        }
    }

    if let Some((file, m)) = fails.into_iter().next() {
        CheckResult::fail(check, m).in_file(file)
    } else if let Some((file, m)) = passes.into_iter().next() {
        CheckResult::pass(check, m).in_file(file)
    } else {
        let m = others
            .into_iter()
            .map(|(file, m)| match file {
                Some(p) => format!("{}: {}", p, m),
                None => m,
            })
            .collect::<Vec<_>>()
            .join("; ");
        if presence {
            CheckResult::fail(check, m)
        } else {
            CheckResult::pass(check, m)
        }
    }
}
