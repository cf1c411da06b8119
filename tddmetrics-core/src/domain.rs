//! Domain entities for TDD cycle metrics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow stage a commit was tagged with by its producer.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// A failing test was written.
    Red,
    /// The minimal implementation that makes the test pass.
    Green,
    /// A refactor with no behavior change.
    Structural,
    /// The commit carried no recognised phase tag.
    Unknown,
}

impl Phase {
    /// Every phase, in reporting order.
    pub const ALL: [Phase; 4] = [Phase::Red, Phase::Green, Phase::Structural, Phase::Unknown];

    /// Wire label used in the event log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Red => "red",
            Phase::Green => "green",
            Phase::Structural => "structural",
            Phase::Unknown => "unknown",
        }
    }
}

/// One logged commit, classified at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitEvent {
    /// Business timestamp of the commit.
    pub timestamp: DateTime<Utc>,
    /// Phase tag derived when the record was loaded.
    pub phase: Phase,
    /// Commit identifier.
    pub commit_hash: String,
    /// Commit message.
    pub commit_message: String,
    /// Free-text descriptor such as `2 files changed`.
    pub files_changed_text: String,
    /// Project label.
    pub project: String,
}

/// A matched Red to Green pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TddCycle {
    /// The Red commit that opened the cycle.
    pub red: CommitEvent,
    /// The Green commit that closed it.
    pub green: CommitEvent,
    /// Minutes from the Red timestamp to the Green timestamp.
    pub duration_minutes: f64,
}

impl TddCycle {
    /// Pair two commits, taking Green as the later boundary.
    ///
    /// The duration is the raw signed difference; it is negative when the
    /// Green commit carries an earlier timestamp than the Red one.
    pub fn new(red: CommitEvent, green: CommitEvent) -> Self {
        let elapsed = green.timestamp - red.timestamp;
        let duration_minutes = elapsed.num_milliseconds() as f64 / 60_000.0;
        Self {
            red,
            green,
            duration_minutes,
        }
    }
}

/// Count of commits per phase. Phases with no commits are absent.
pub type PhaseDistribution = BTreeMap<Phase, usize>;

/// Buckets used to describe how many files commits touch.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    /// No parsable file count.
    Empty,
    /// Exactly one file.
    Single,
    /// Two or three files.
    Small,
    /// Four or five files.
    Medium,
    /// Six files or more.
    Large,
}

impl SizeBucket {
    /// Bucket a commit size.
    pub fn for_size(size: usize) -> Self {
        match size {
            0 => SizeBucket::Empty,
            1 => SizeBucket::Single,
            2..=3 => SizeBucket::Small,
            4..=5 => SizeBucket::Medium,
            _ => SizeBucket::Large,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::Empty => "0 files",
            SizeBucket::Single => "1 file",
            SizeBucket::Small => "2-3 files",
            SizeBucket::Medium => "4-5 files",
            SizeBucket::Large => "6+ files",
        }
    }
}

/// Duration statistics over matched cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStats {
    /// Number of matched cycles.
    pub count: usize,
    /// Mean cycle duration in minutes.
    pub average_minutes: f64,
    /// Shortest cycle duration in minutes.
    pub min_minutes: f64,
    /// Longest cycle duration in minutes.
    pub max_minutes: f64,
}

/// Summary statistics for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    /// Number of commit records analysed.
    pub total_commits: usize,
    /// Commits per phase.
    pub phase_distribution: PhaseDistribution,
    /// Cycle duration statistics, `None` when no cycle was matched.
    pub cycle_stats: Option<CycleStats>,
    /// Mean number of files changed per commit.
    pub average_commit_size: f64,
    /// Commits per size bucket.
    pub size_distribution: BTreeMap<SizeBucket, usize>,
    /// Percentage of commits tagged structural.
    pub tidy_first_score: f64,
    /// Matched cycles in chronological order.
    pub cycles: Vec<TddCycle>,
    /// Most recent commits, newest first.
    pub recent_commits: Vec<CommitEvent>,
}

/// Outcome of an analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum Analysis {
    /// No commit records fell within the requested window.
    NoData,
    /// Metrics for the records in the window.
    Report(MetricsReport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(minute: u32, phase: Phase) -> CommitEvent {
        CommitEvent {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0).unwrap(),
            phase,
            commit_hash: format!("hash{minute}"),
            commit_message: String::new(),
            files_changed_text: String::new(),
            project: "demo".to_string(),
        }
    }

    #[test]
    fn cycle_duration_is_in_minutes() {
        let cycle = TddCycle::new(event(0, Phase::Red), event(7, Phase::Green));
        assert_eq!(cycle.duration_minutes, 7.0);
    }

    #[test]
    fn cycle_duration_keeps_sign_for_inverted_pairs() {
        let cycle = TddCycle::new(event(10, Phase::Red), event(4, Phase::Green));
        assert_eq!(cycle.duration_minutes, -6.0);
    }

    #[test]
    fn size_buckets_cover_boundaries() {
        assert_eq!(SizeBucket::for_size(0), SizeBucket::Empty);
        assert_eq!(SizeBucket::for_size(1), SizeBucket::Single);
        assert_eq!(SizeBucket::for_size(3), SizeBucket::Small);
        assert_eq!(SizeBucket::for_size(4), SizeBucket::Medium);
        assert_eq!(SizeBucket::for_size(6), SizeBucket::Large);
        assert_eq!(SizeBucket::for_size(40), SizeBucket::Large);
    }

    #[test]
    fn analysis_serializes_with_status_tag() {
        let json = serde_json::to_value(Analysis::NoData).expect("json");
        assert_eq!(json["status"], "no_data");
    }
}
