//! CLI command: verbench check
//!
//! Structural checks only; no judge is contacted.
//!
//! Usage:
//!   verbench check --task tasks/next15-params.json --code out/page.tsx

use super::{finish, load_sample};
use crate::cli::args::CheckArgs;
use verbench_core::Evaluator;

pub async fn run(args: CheckArgs) -> anyhow::Result<i32> {
    let (task, sources) = match load_sample(&args.sample) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(crate::exit_codes::CONFIG_ERROR);
        }
    };
    let report = Evaluator::without_judge().evaluate(&task, &sources, None).await;
    finish(&report, args.sample.json.as_deref())
}
