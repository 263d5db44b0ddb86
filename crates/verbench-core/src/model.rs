use serde::{Deserialize, Serialize};
use std::fmt;

/// Which version the task targets relative to the library's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Targets the newest release; mistakes lean towards older APIs.
    BleedingEdge,
    /// Writes code against a pinned older release; mistakes lean towards newer APIs.
    VersionLockedWrite,
    /// Reviews existing code for version correctness.
    VersionLockedAudit,
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BleedingEdge => "bleeding_edge",
            Self::VersionLockedWrite => "version_locked_write",
            Self::VersionLockedAudit => "version_locked_audit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

/// One benchmark task, as produced by the task store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub category: TaskCategory,
    pub library: String,
    pub target_version: String,
    pub prompt: String,
    #[serde(default)]
    pub reference_solution: String,
    #[serde(default)]
    pub rubric: Vec<RubricCriterion>,
    /// Known failure fingerprints, human-authored.
    #[serde(default)]
    pub common_hallucinations: Vec<String>,
    #[serde(default)]
    pub ast_checks: Vec<CheckSpec>,
}

/// A single declarative assertion about source structure.
///
/// Every variant may be scoped to one file of a multi-file sample through
/// `file` (matched as a path suffix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckSpec {
    ImportExists {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    ImportAbsent {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    ModuleImportAbsent {
        module: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    FunctionExported {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    FunctionAbsent {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    AwaitPresent {
        call: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    AwaitAbsent {
        call: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    CallExists {
        call: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    CallAbsent {
        call: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    DirectivePresent {
        directive: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    PropertyLocation {
        property: String,
        inside_call: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    AsyncFunction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    AsyncGenerator {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    YieldPresent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    TypeAnnotation {
        parameter: String,
        annotation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    PropertyAbsent {
        property: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        in_object: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
}

impl CheckSpec {
    /// Wire tag of the variant, e.g. `import_absent`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ImportExists { .. } => "import_exists",
            Self::ImportAbsent { .. } => "import_absent",
            Self::ModuleImportAbsent { .. } => "module_import_absent",
            Self::FunctionExported { .. } => "function_exported",
            Self::FunctionAbsent { .. } => "function_absent",
            Self::AwaitPresent { .. } => "await_present",
            Self::AwaitAbsent { .. } => "await_absent",
            Self::CallExists { .. } => "call_exists",
            Self::CallAbsent { .. } => "call_absent",
            Self::DirectivePresent { .. } => "directive_present",
            Self::PropertyLocation { .. } => "property_location",
            Self::AsyncFunction { .. } => "async_function",
            Self::AsyncGenerator { .. } => "async_generator",
            Self::YieldPresent { .. } => "yield_present",
            Self::TypeAnnotation { .. } => "type_annotation",
            Self::PropertyAbsent { .. } => "property_absent",
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Self::ImportExists { file, .. }
            | Self::ImportAbsent { file, .. }
            | Self::ModuleImportAbsent { file, .. }
            | Self::FunctionExported { file, .. }
            | Self::FunctionAbsent { file, .. }
            | Self::AwaitPresent { file, .. }
            | Self::AwaitAbsent { file, .. }
            | Self::CallExists { file, .. }
            | Self::CallAbsent { file, .. }
            | Self::DirectivePresent { file, .. }
            | Self::PropertyLocation { file, .. }
            | Self::AsyncFunction { file, .. }
            | Self::AsyncGenerator { file, .. }
            | Self::YieldPresent { file, .. }
            | Self::TypeAnnotation { file, .. }
            | Self::PropertyAbsent { file, .. } => file.as_deref(),
        }
    }

    /// The API the check is about (import name, call, property, ...).
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::ImportExists { name, .. }
            | Self::ImportAbsent { name, .. }
            | Self::FunctionExported { name, .. }
            | Self::FunctionAbsent { name, .. } => Some(name),
            Self::ModuleImportAbsent { module, .. } => Some(module),
            Self::AwaitPresent { call, .. }
            | Self::AwaitAbsent { call, .. }
            | Self::CallExists { call, .. }
            | Self::CallAbsent { call, .. } => Some(call),
            Self::DirectivePresent { directive, .. } => Some(directive),
            Self::PropertyLocation { property, .. } | Self::PropertyAbsent { property, .. } => {
                Some(property)
            }
            Self::TypeAnnotation { parameter, .. } => Some(parameter),
            Self::AsyncFunction { name, .. }
            | Self::AsyncGenerator { name, .. }
            | Self::YieldPresent { name, .. } => name.as_deref(),
        }
    }
}

impl fmt::Display for CheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImportExists { name, from, .. } | Self::ImportAbsent { name, from, .. } => {
                match from {
                    Some(m) => write!(f, "{}({} from '{}')", self.tag(), name, m),
                    None => write!(f, "{}({})", self.tag(), name),
                }
            }
            Self::PropertyLocation {
                property,
                inside_call,
                ..
            } => write!(f, "{}({} inside {}())", self.tag(), property, inside_call),
            Self::TypeAnnotation {
                parameter,
                annotation,
                ..
            } => write!(f, "{}({}: {})", self.tag(), parameter, annotation),
            Self::PropertyAbsent {
                property,
                in_object: Some(obj),
                ..
            } => write!(f, "{}({} in {})", self.tag(), property, obj),
            _ => match self.subject() {
                Some(s) => write!(f, "{}({})", self.tag(), s),
                None => write!(f, "{}", self.tag()),
            },
        }
    }
}

/// Outcome of one structural check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckSpec,
    pub passed: bool,
    pub message: String,
    /// File of a multi-file sample whose outcome decided the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl CheckResult {
    pub fn pass(check: &CheckSpec, message: impl Into<String>) -> Self {
        Self {
            check: check.clone(),
            passed: true,
            message: message.into(),
            file: None,
        }
    }

    pub fn fail(check: &CheckSpec, message: impl Into<String>) -> Self {
        Self {
            check: check.clone(),
            passed: false,
            message: message.into(),
            file: None,
        }
    }

    pub fn in_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Only the exact literals `PASS` and `FAIL` are recognized; anything else is a FAIL.
    pub fn from_literal(s: &str) -> Self {
        if s == "PASS" {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        })
    }
}

/// One (criterion, verdict, evidence, reasoning) tuple from a single judge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeCriterionVerdict {
    pub criterion: String,
    pub verdict: Verdict,
    pub evidence: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JudgeInvocationOutcome {
    Success { criteria: Vec<JudgeCriterionVerdict> },
    Failure { error: String },
}

impl JudgeInvocationOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The first tuple this run reported for `criterion`, if the run succeeded.
    pub fn find(&self, criterion: &str) -> Option<&JudgeCriterionVerdict> {
        match self {
            Self::Success { criteria } => criteria.iter().find(|c| c.criterion == criterion),
            Self::Failure { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion: String,
    pub verdict: Verdict,
    pub weight: f64,
    pub evidence: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    pub criteria: Vec<CriterionResult>,
    pub score: f64,
    /// Raw per-run outcomes, in request order, kept for audit.
    pub runs: Vec<JudgeInvocationOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HallucinationKind {
    InventedMethod,
    WrongParameter,
    OutdatedApi,
    FutureApi,
    WrongImportPath,
    VersionMismatch,
}

impl fmt::Display for HallucinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InventedMethod => "invented_method",
            Self::WrongParameter => "wrong_parameter",
            Self::OutdatedApi => "outdated_api",
            Self::FutureApi => "future_api",
            Self::WrongImportPath => "wrong_import_path",
            Self::VersionMismatch => "version_mismatch",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallucinationDetail {
    pub kind: HallucinationKind,
    pub evidence: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HallucinationResult {
    /// Distinct kinds, in order of first appearance.
    pub types: Vec<HallucinationKind>,
    pub details: Vec<HallucinationDetail>,
}

/// Everything produced for one task evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub task_id: String,
    pub library: String,
    pub target_version: String,
    pub category: TaskCategory,
    pub evaluated_at: String,
    /// sha256 of the rendered judge prompt; empty when no judge ran.
    pub prompt_digest: String,
    pub checks: Vec<CheckResult>,
    pub check_pass_rate: f64,
    pub judge: JudgeResult,
    pub hallucinations: HallucinationResult,
}

impl EvaluationReport {
    pub fn checks_passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }
}
