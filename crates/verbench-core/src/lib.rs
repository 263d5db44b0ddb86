pub mod checker;
pub mod classify;
pub mod config;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod model;
pub mod providers;
pub mod reference;
pub mod report;
pub mod task;

pub use engine::Evaluator;
pub use model::{
    CheckResult, CheckSpec, CriterionResult, EvaluationReport, HallucinationDetail,
    HallucinationKind, HallucinationResult, JudgeCriterionVerdict, JudgeInvocationOutcome,
    JudgeResult, RubricCriterion, Task, TaskCategory, Verdict,
};
