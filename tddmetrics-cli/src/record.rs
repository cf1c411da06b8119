//! Appending commit events to the log from the commit hook.

use crate::CliResult;
use crate::config::TelemetryConfig;
use crate::telemetry::{ReqwestTelemetryClient, TelemetryOutcome, upload_event};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tddmetrics_core::{
    CommitRecord, EventEnvelope, EventStore, FileLogSource, LogSource, Phase, format_timestamp,
    parse_timestamp,
};

/// CLI arguments for the record command.
#[derive(Args, Clone, Debug)]
pub struct RecordArgs {
    /// Hash of the commit being recorded.
    #[arg(long)]
    pub hash: String,
    /// Commit message.
    #[arg(short, long)]
    pub message: String,
    /// Files-changed summary, e.g. "2 files changed".
    #[arg(long, default_value = "0 files changed")]
    pub files_changed: String,
    /// Project label (defaults to the current directory name).
    #[arg(long)]
    pub project: Option<String>,
    /// Workflow phase; inferred from the message prefix when omitted.
    #[arg(long, value_enum)]
    pub phase: Option<PhaseArg>,
    /// Commit time as an ISO-8601 timestamp (defaults to now).
    #[arg(long)]
    pub committed_at: Option<String>,
}

/// Phase values accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum PhaseArg {
    /// Failing test written.
    Red,
    /// Test made to pass.
    Green,
    /// Refactor without behavior change.
    Structural,
    /// Untagged commit.
    Unknown,
}

impl From<PhaseArg> for Phase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Red => Phase::Red,
            PhaseArg::Green => Phase::Green,
            PhaseArg::Structural => Phase::Structural,
            PhaseArg::Unknown => Phase::Unknown,
        }
    }
}

/// Append the commit to the log, then try the optional telemetry upload.
#[cfg_attr(test, allow(dead_code))]
pub async fn run_record(args: RecordArgs, log_path: PathBuf) -> CliResult<()> {
    let store = EventStore::new(FileLogSource::new(log_path));
    let envelope = append_commit(&store, args, Utc::now())?;
    println!(
        "Recorded {} commit {} in {}.",
        envelope.data.tdd_phase.as_deref().unwrap_or("unknown"),
        envelope.data.commit_hash,
        store.source().describe()
    );

    let config = TelemetryConfig::from_env();
    let outcome = match ReqwestTelemetryClient::new() {
        Ok(client) => upload_event(&client, &config, &envelope).await,
        Err(err) => TelemetryOutcome::Failed(format!("telemetry client unavailable: {err}")),
    };
    println!("Telemetry: {outcome}");
    Ok(())
}

/// Build the commit envelope and append it to the store.
pub(crate) fn append_commit<S: LogSource>(
    store: &EventStore<S>,
    args: RecordArgs,
    now: DateTime<Utc>,
) -> CliResult<EventEnvelope> {
    let committed_at = match args.committed_at.as_deref() {
        Some(raw) => {
            parse_timestamp(raw).ok_or_else(|| format!("invalid --committed-at timestamp: {raw}"))?
        }
        None => now,
    };
    let phase = args
        .phase
        .map(Phase::from)
        .unwrap_or_else(|| phase_from_message(&args.message));
    let project = args.project.unwrap_or_else(current_project_name);

    let envelope = EventEnvelope::commit(
        now,
        CommitRecord {
            project,
            commit_hash: args.hash.trim().to_string(),
            commit_msg: args.message,
            tdd_phase: Some(phase.as_str().to_string()),
            files_changed: args.files_changed,
            timestamp: format_timestamp(committed_at),
        },
    );
    store.append(&envelope)?;
    Ok(envelope)
}

/// Infer the phase from a conventional commit prefix such as `test:` or
/// `feat(parser):`.
pub(crate) fn phase_from_message(message: &str) -> Phase {
    let Some((prefix, _)) = message.trim_start().split_once(':') else {
        return Phase::Unknown;
    };
    let kind = prefix
        .split('(')
        .next()
        .unwrap_or(prefix)
        .trim()
        .trim_end_matches('!')
        .to_ascii_lowercase();
    match kind.as_str() {
        "test" | "tests" => Phase::Red,
        "feat" | "fix" => Phase::Green,
        "struct" | "refactor" | "tidy" => Phase::Structural,
        _ => Phase::Unknown,
    }
}

fn current_project_name() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_default()
}
