#![deny(missing_docs)]
//! TDD metrics command-line interface.
//!
//! Records commit events from the commit hook and summarises recent
//! Red/Green/Refactor cycles.

mod config;
mod record;
mod telemetry;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::resolve_log_path;
use log::info;
use record::RecordArgs;
use std::path::{Path, PathBuf};
use tddmetrics_core::{
    Analysis, DEFAULT_WINDOW_DAYS, EventStore, FileLogSource, LogSource, RenderOptions, analyze,
    render_json, render_markdown, render_text,
};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "tddmetrics", version, about = "TDD cycle metrics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct LogArgs {
    /// Event log to read or append to (defaults to ~/.claude/logs/tdd-cycle.jsonl).
    #[arg(long)]
    log_path: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Args, Clone)]
struct AnalyzeArgs {
    /// Number of days to analyze.
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    days: u32,
    /// Show per-cycle and commit-size detail.
    #[arg(long)]
    detailed: bool,
    #[command(flatten)]
    log: LogArgs,
    #[command(flatten)]
    report: OutputArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise TDD cycles recorded within a time window.
    Analyze(AnalyzeArgs),
    /// Append a commit event to the log.
    Record {
        #[command(flatten)]
        record: RecordArgs,
        #[command(flatten)]
        log: LogArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args).await?,
        Commands::Record { record, log } => {
            let log_path = resolve_log_path(log.log_path)?;
            record::run_record(record, log_path).await?
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

#[cfg_attr(test, allow(dead_code))]
async fn run_analyze(args: AnalyzeArgs) -> CliResult<()> {
    let log_path = resolve_log_path(args.log.log_path.clone())?;
    let contents = analyze_log(&log_path, &args, Utc::now())?;
    emit_output(&args.report, contents).await
}

fn analyze_log(log_path: &Path, args: &AnalyzeArgs, now: DateTime<Utc>) -> CliResult<String> {
    let store = EventStore::new(FileLogSource::new(log_path));
    let analysis = analyze(&store, args.days, now)?;
    match &analysis {
        Analysis::NoData => info!("no commits in the last {} days", args.days),
        Analysis::Report(report) => info!(
            "analyzed {} commits, {} cycles",
            report.total_commits,
            report.cycles.len()
        ),
    }

    let options = RenderOptions {
        detailed: args.detailed,
        days: args.days,
        source: store.source().describe(),
    };
    let contents = match args.report.format {
        OutputFormat::Text => render_text(&analysis, &options),
        OutputFormat::Markdown => render_markdown(&analysis, &options),
        OutputFormat::Json => format!("{}\n", render_json(&analysis)?),
    };
    Ok(contents)
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}
