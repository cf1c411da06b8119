//! Summary statistics over commit events and matched cycles.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::{
    Analysis, CommitEvent, CycleStats, MetricsReport, Phase, PhaseDistribution, SizeBucket,
    TddCycle,
};
use crate::error::Result;
use crate::matcher::match_cycles;
use crate::source::LogSource;
use crate::store::EventStore;

/// Number of commits listed in [`MetricsReport::recent_commits`].
pub const RECENT_COMMIT_LIMIT: usize = 5;

/// Count commits per phase.
pub fn phase_distribution(events: &[CommitEvent]) -> PhaseDistribution {
    let mut distribution = PhaseDistribution::new();
    for event in events {
        *distribution.entry(event.phase).or_insert(0) += 1;
    }
    distribution
}

/// Leading integer of a `files_changed` descriptor, or 0 when there is none.
pub fn commit_size(files_changed: &str) -> usize {
    files_changed
        .split_whitespace()
        .next()
        .filter(|token| token.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|token| token.parse().ok())
        .unwrap_or(0)
}

/// Mean commit size, 0.0 for no commits.
pub fn average_commit_size(events: &[CommitEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let total: usize = events
        .iter()
        .map(|event| commit_size(&event.files_changed_text))
        .sum();
    total as f64 / events.len() as f64
}

/// Count commits per size bucket.
pub fn size_distribution(events: &[CommitEvent]) -> BTreeMap<SizeBucket, usize> {
    let mut buckets = BTreeMap::new();
    for event in events {
        let bucket = SizeBucket::for_size(commit_size(&event.files_changed_text));
        *buckets.entry(bucket).or_insert(0) += 1;
    }
    buckets
}

/// Percentage of commits tagged structural, 0.0 for no commits.
pub fn tidy_first_score(events: &[CommitEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let structural = events
        .iter()
        .filter(|event| event.phase == Phase::Structural)
        .count();
    structural as f64 / events.len() as f64 * 100.0
}

/// Duration statistics, or `None` when there are no cycles.
pub fn cycle_stats(cycles: &[TddCycle]) -> Option<CycleStats> {
    let first = cycles.first()?.duration_minutes;
    let (sum, min, max) = cycles.iter().map(|c| c.duration_minutes).fold(
        (0.0, first, first),
        |(sum, min, max), duration: f64| (sum + duration, min.min(duration), max.max(duration)),
    );
    Some(CycleStats {
        count: cycles.len(),
        average_minutes: sum / cycles.len() as f64,
        min_minutes: min,
        max_minutes: max,
    })
}

/// The newest `limit` commits, newest first.
pub fn recent_commits(events: &[CommitEvent], limit: usize) -> Vec<CommitEvent> {
    let mut ordered: Vec<&CommitEvent> = events.iter().collect();
    ordered.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.commit_hash.cmp(&b.commit_hash))
    });
    ordered.into_iter().take(limit).cloned().collect()
}

/// Build a report from classified commits and the cycles matched from them.
pub fn aggregate(events: &[CommitEvent], cycles: Vec<TddCycle>) -> MetricsReport {
    MetricsReport {
        total_commits: events.len(),
        phase_distribution: phase_distribution(events),
        cycle_stats: cycle_stats(&cycles),
        average_commit_size: average_commit_size(events),
        size_distribution: size_distribution(events),
        tidy_first_score: tidy_first_score(events),
        cycles,
        recent_commits: recent_commits(events, RECENT_COMMIT_LIMIT),
    }
}

/// Load the commits logged in the last `days` days and compute their metrics.
pub fn analyze<S: LogSource>(
    store: &EventStore<S>,
    days: u32,
    now: DateTime<Utc>,
) -> Result<Analysis> {
    let events = store.load(days, now)?;
    if events.is_empty() {
        return Ok(Analysis::NoData);
    }
    let cycles = match_cycles(&events);
    Ok(Analysis::Report(aggregate(&events, cycles)))
}
