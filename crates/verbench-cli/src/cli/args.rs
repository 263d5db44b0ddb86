use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use verbench_core::config::JudgeProvider;

#[derive(Parser)]
#[command(
    name = "verbench",
    version,
    about = "Version-aware evaluation of generated JS/TS code: structural checks, LLM judge votes and hallucination taxonomy"
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the structural checks of a task against code, without a judge
    Check(CheckArgs),
    /// Full pipeline: checks, judge runs, majority vote, hallucination classification
    Evaluate(EvaluateArgs),
    /// Parse a raw judge reply and print the normalized criteria
    ParseJudge(ParseJudgeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct SampleArgs {
    /// Task file (JSON)
    #[arg(short, long)]
    pub task: PathBuf,

    /// Code file(s) under evaluation; several files form one sample
    #[arg(short, long, num_args = 1.., required = true)]
    pub code: Vec<PathBuf>,

    /// Write the report(s) as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub sample: SampleArgs,
}

#[derive(Args, Clone, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub sample: SampleArgs,

    /// Config file (YAML); defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Judge provider (overrides config)
    #[arg(long, value_enum)]
    pub judge: Option<JudgeArg>,

    /// Judge invocations per evaluation (overrides config)
    #[arg(long)]
    pub runs: Option<u32>,

    /// Judge model (overrides config)
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum JudgeArg {
    Openai,
    Fake,
    None,
}

impl From<JudgeArg> for JudgeProvider {
    fn from(arg: JudgeArg) -> Self {
        match arg {
            JudgeArg::Openai => JudgeProvider::Openai,
            JudgeArg::Fake => JudgeProvider::Fake,
            JudgeArg::None => JudgeProvider::None,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct ParseJudgeArgs {
    /// File holding the raw judge reply
    pub file: PathBuf,
}
