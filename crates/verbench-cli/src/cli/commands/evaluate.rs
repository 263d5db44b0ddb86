//! CLI command: verbench evaluate
//!
//! Usage:
//!   verbench evaluate --task T --code F... [--config C] [--judge openai|fake|none]
//!                     [--runs N] [--model M] [--json OUT]
//!
//! Examples:
//!   verbench evaluate -t tasks/react18-root.json -c out/main.tsx --judge fake
//!   verbench evaluate -t tasks/next15-params.json -c app/page.tsx app/actions.ts --json report.json

use super::{finish, load_sample};
use crate::cli::args::EvaluateArgs;
use anyhow::Context;
use verbench_core::config::{load_config, EvalConfig};
use verbench_core::reference::load_reference;
use verbench_core::Evaluator;

fn resolve_config(args: &EvaluateArgs) -> anyhow::Result<EvalConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EvalConfig::default(),
    };
    if let Some(judge) = args.judge {
        cfg.judge.provider = judge.into();
    }
    if let Some(runs) = args.runs {
        cfg.judge.runs = runs;
    }
    if let Some(model) = &args.model {
        cfg.judge.model = model.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

pub async fn run(args: EvaluateArgs) -> anyhow::Result<i32> {
    let prepared = resolve_config(&args).and_then(|cfg| {
        let (task, sources) = load_sample(&args.sample)?;
        let reference = load_reference(&cfg, &task.library, &task.target_version)?;
        let evaluator = Evaluator::from_config(&cfg, &task)?;
        Ok((task, sources, reference, evaluator))
    });
    let (task, sources, reference, evaluator) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(crate::exit_codes::CONFIG_ERROR);
        }
    };

    tracing::info!(
        task_id = %task.id,
        library = %task.library,
        version = %task.target_version,
        judge = evaluator.has_judge(),
        reference = reference.is_some(),
        "evaluating"
    );
    let report = evaluator.evaluate(&task, &sources, reference.as_ref()).await;
    finish(&report, args.sample.json.as_deref())
}
