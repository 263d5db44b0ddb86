use super::args::{Cli, Command, SampleArgs};
use anyhow::Context;
use verbench_core::checker::SourceSet;
use verbench_core::task::load_task;
use verbench_core::{EvaluationReport, Task};

pub mod check;
pub mod evaluate;
pub mod parse_judge;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Check(args) => check::run(args).await,
        Command::Evaluate(args) => evaluate::run(args).await,
        Command::ParseJudge(args) => parse_judge::run(&args),
    }
}

/// Loads the task and the code files of one sample.
///
/// A single file is unnamed so that every file-scoped check applies to it.
pub(crate) fn load_sample(args: &SampleArgs) -> anyhow::Result<(Task, SourceSet)> {
    let task = load_task(&args.task)?;
    let mut files = Vec::with_capacity(args.code.len());
    for path in &args.code {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read code file {}", path.display()))?;
        files.push((path.display().to_string(), text));
    }
    let sources = if files.len() == 1 {
        SourceSet::single(files.remove(0).1)
    } else {
        SourceSet::from_files(files)
    };
    Ok((task, sources))
}

/// Writes the JSON report if asked to and maps the outcome to an exit code.
pub(crate) fn finish(report: &EvaluationReport, json: Option<&std::path::Path>) -> anyhow::Result<i32> {
    verbench_core::report::console::print_summary(std::slice::from_ref(report));
    if let Some(out) = json {
        verbench_core::report::json::write_json(std::slice::from_ref(report), out)?;
        tracing::info!(path = %out.display(), "report written");
    }
    let clean = report.checks_passed() == report.checks.len()
        && report.hallucinations.details.is_empty();
    Ok(if clean {
        crate::exit_codes::SUCCESS
    } else {
        crate::exit_codes::FAILED
    })
}
