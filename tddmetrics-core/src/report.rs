//! Report formatting for analysis results.

use std::fmt::Write;

use serde::Serialize;

use crate::domain::{Analysis, CommitEvent, MetricsReport, Phase, TddCycle};

/// Average cycle time regarded as healthy, in minutes.
pub const CYCLE_TARGET_MINUTES: f64 = 15.0;
/// Average files per commit regarded as healthy.
pub const COMMIT_SIZE_TARGET: f64 = 3.0;
/// Structural commit share regarded as healthy, in percent.
pub const TIDY_FIRST_TARGET: f64 = 30.0;

const RULE_WIDTH: usize = 70;
const BAR_WIDTH: usize = 50;
const RECENT_CYCLE_LIMIT: usize = 5;

/// Presentation settings shared by the renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Include per-cycle and size-bucket detail.
    pub detailed: bool,
    /// Retention window the report covers.
    pub days: u32,
    /// Where the events were read from.
    pub source: String,
}

/// Render an analysis as a plain-text console summary.
pub fn render_text(analysis: &Analysis, options: &RenderOptions) -> String {
    let report = match analysis {
        Analysis::NoData => return render_no_data(options),
        Analysis::Report(report) => report,
    };

    let mut output = String::new();
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let _ = writeln!(output, "{heavy}");
    let _ = writeln!(output, "TDD Metrics Summary (last {} days)", options.days);
    let _ = writeln!(output, "{heavy}");
    let _ = writeln!(output, "\nTotal commits: {}", report.total_commits);

    let _ = writeln!(output, "\nPhase distribution:\n{light}");
    for (phase, count) in ranked_phases(report) {
        let percent = percentage(count, report.total_commits);
        let _ = writeln!(
            output,
            "{:<22} {count:>3} ({percent:5.1}%) {}",
            phase_title(phase),
            bar(percent)
        );
        if options.detailed {
            let _ = writeln!(output, "{:<22} -> {}", "", phase_description(phase));
        }
    }

    if let Some(stats) = report.cycle_stats {
        let _ = writeln!(output, "\nCycle time (Red -> Green):\n{light}");
        let _ = writeln!(
            output,
            "Average: {:.1} min {} (target: < {CYCLE_TARGET_MINUTES:.0} min)",
            stats.average_minutes,
            marker(stats.average_minutes < CYCLE_TARGET_MINUTES)
        );
        let _ = writeln!(output, "Minimum: {:.1} min", stats.min_minutes);
        let _ = writeln!(output, "Maximum: {:.1} min", stats.max_minutes);
        if options.detailed {
            let _ = writeln!(output, "\nLast {RECENT_CYCLE_LIMIT} cycles:");
            for cycle in last_cycles(&report.cycles) {
                append_cycle(&mut output, cycle);
            }
        }
    }

    let _ = writeln!(
        output,
        "\nAverage commit size: {:.1} files/commit {} (target: <= {COMMIT_SIZE_TARGET:.0})",
        report.average_commit_size,
        marker(report.average_commit_size <= COMMIT_SIZE_TARGET)
    );
    if options.detailed && !report.size_distribution.is_empty() {
        let _ = writeln!(output, "\nCommit size distribution:");
        for (bucket, count) in &report.size_distribution {
            let _ = writeln!(
                output,
                "  {:<12}: {count:>3} ({:5.1}%)",
                bucket.label(),
                percentage(*count, report.total_commits)
            );
        }
    }

    let _ = writeln!(
        output,
        "\nTidy First score: {:.1}% {} (target: >= {TIDY_FIRST_TARGET:.0}%)",
        report.tidy_first_score,
        marker(report.tidy_first_score >= TIDY_FIRST_TARGET)
    );
    let _ = writeln!(output, "   -> share of structural commits");

    let _ = writeln!(output, "\nRecent commits:\n{light}");
    for commit in &report.recent_commits {
        append_commit(&mut output, commit);
    }
    let _ = writeln!(output, "\n{heavy}");
    output
}

/// Render an analysis as Markdown.
pub fn render_markdown(analysis: &Analysis, options: &RenderOptions) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# TDD Metrics Report\n");
    let _ = writeln!(output, "- Window: last {} days", options.days);
    let _ = writeln!(output, "- Source: `{}`\n", options.source);

    let report = match analysis {
        Analysis::NoData => {
            let _ = writeln!(output, "No TDD commits recorded in this window.");
            return output;
        }
        Analysis::Report(report) => report,
    };

    let _ = writeln!(output, "## Phases\n");
    let _ = writeln!(output, "| Phase | Commits | Share |");
    let _ = writeln!(output, "| --- | ---: | ---: |");
    for (phase, count) in ranked_phases(report) {
        let _ = writeln!(
            output,
            "| {} | {count} | {:.1}% |",
            phase.as_str(),
            percentage(count, report.total_commits)
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Cycles\n");
    match report.cycle_stats {
        Some(stats) => {
            let _ = writeln!(output, "- Count: {}", stats.count);
            let _ = writeln!(output, "- Average: {:.1} min", stats.average_minutes);
            let _ = writeln!(output, "- Minimum: {:.1} min", stats.min_minutes);
            let _ = writeln!(output, "- Maximum: {:.1} min\n", stats.max_minutes);
        }
        None => {
            let _ = writeln!(output, "No completed cycles.\n");
        }
    }
    if options.detailed && !report.cycles.is_empty() {
        let _ = writeln!(output, "| Red | Green | Minutes |");
        let _ = writeln!(output, "| --- | --- | ---: |");
        for cycle in &report.cycles {
            let _ = writeln!(
                output,
                "| `{}` | `{}` | {:.1} |",
                short_hash(&cycle.red.commit_hash),
                short_hash(&cycle.green.commit_hash),
                cycle.duration_minutes
            );
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "## Habits\n");
    let _ = writeln!(
        output,
        "- Average commit size: {:.1} files",
        report.average_commit_size
    );
    let _ = writeln!(output, "- Tidy First score: {:.1}%", report.tidy_first_score);
    if options.detailed {
        for (bucket, count) in &report.size_distribution {
            let _ = writeln!(output, "- {}: {count}", bucket.label());
        }
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Phases ordered by commit count, largest first.
pub fn ranked_phases(report: &MetricsReport) -> Vec<(Phase, usize)> {
    let mut ranked: Vec<(Phase, usize)> = report
        .phase_distribution
        .iter()
        .map(|(phase, count)| (*phase, *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

fn render_no_data(options: &RenderOptions) -> String {
    format!(
        "No TDD commits recorded in the last {} days.\nLog file: {}\n",
        options.days, options.source
    )
}

fn append_cycle(output: &mut String, cycle: &TddCycle) {
    let _ = writeln!(
        output,
        "  {} {:5.1} min | {} -> {}",
        marker(cycle.duration_minutes < CYCLE_TARGET_MINUTES),
        cycle.duration_minutes,
        short_hash(&cycle.red.commit_hash),
        short_hash(&cycle.green.commit_hash)
    );
    let _ = writeln!(
        output,
        "     Red:   {}",
        truncate_chars(&cycle.red.commit_message, 60)
    );
    let _ = writeln!(
        output,
        "     Green: {}",
        truncate_chars(&cycle.green.commit_message, 60)
    );
}

fn append_commit(output: &mut String, commit: &CommitEvent) {
    let _ = writeln!(
        output,
        "{:<10} {} | {} | {}",
        format!("[{}]", commit.phase.as_str()),
        commit.timestamp.format("%Y-%m-%d %H:%M:%S"),
        short_hash(&commit.commit_hash),
        truncate_chars(&commit.commit_message, 50)
    );
}

fn last_cycles(cycles: &[TddCycle]) -> &[TddCycle] {
    &cycles[cycles.len().saturating_sub(RECENT_CYCLE_LIMIT)..]
}

fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Red => "Red (test:)",
        Phase::Green => "Green (feat:)",
        Phase::Structural => "Refactor (struct:)",
        Phase::Unknown => "Unknown",
    }
}

fn phase_description(phase: Phase) -> &'static str {
    match phase {
        Phase::Red => "failing test written",
        Phase::Green => "minimal implementation makes the test pass",
        Phase::Structural => "structure improved, behavior unchanged",
        Phase::Unknown => "commit without a phase tag",
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

fn bar(percent: f64) -> String {
    let filled = ((percent / 2.0) as usize).min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn marker(on_target: bool) -> &'static str {
    if on_target { "[ok]" } else { "[!!]" }
}

fn short_hash(hash: &str) -> String {
    truncate_chars(hash, 7)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
