use crate::cli::args::ParseJudgeArgs;
use anyhow::Context;
use verbench_core::judge::parse_judge_response;

/// Prints the criteria a raw judge reply normalizes to, as JSON on stdout.
pub fn run(args: &ParseJudgeArgs) -> anyhow::Result<i32> {
    let raw = match std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))
    {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(crate::exit_codes::CONFIG_ERROR);
        }
    };
    match parse_judge_response(&raw) {
        Ok(criteria) => {
            println!("{}", serde_json::to_string_pretty(&criteria)?);
            Ok(crate::exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(crate::exit_codes::FAILED)
        }
    }
}
