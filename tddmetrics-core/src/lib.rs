#![deny(missing_docs)]
//! TDD metrics core library.
//!
//! Loads the commit-event log written by the commit hook, pairs Red and
//! Green commits into timed cycles and summarises the workflow habits they
//! reveal.

pub mod aggregator;
pub mod classifier;
pub mod domain;
pub mod error;
pub mod matcher;
pub mod report;
pub mod source;
pub mod store;

pub use aggregator::{
    RECENT_COMMIT_LIMIT, aggregate, analyze, average_commit_size, commit_size, cycle_stats,
    phase_distribution, recent_commits, size_distribution, tidy_first_score,
};
pub use classifier::classify;
pub use domain::{
    Analysis, CommitEvent, CycleStats, MetricsReport, Phase, PhaseDistribution, SizeBucket,
    TddCycle,
};
pub use error::{MetricsError, Result};
pub use matcher::match_cycles;
pub use report::{RenderOptions, render_json, render_markdown, render_text};
pub use source::{FileLogSource, LogSource};
pub use store::{
    COMMIT_EVENT_TYPE, CommitRecord, DEFAULT_WINDOW_DAYS, EventEnvelope, EventStore,
    format_timestamp, parse_timestamp,
};
