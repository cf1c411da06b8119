//! Loading commit events from the append-only event log.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classifier::classify;
use crate::domain::CommitEvent;
use crate::error::{MetricsError, Result};
use crate::source::LogSource;

/// Envelope `event_type` of commit events.
pub const COMMIT_EVENT_TYPE: &str = "tdd_commit";
/// Retention window used when the caller does not pick one.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

const DEFAULT_FILES_CHANGED: &str = "0 files changed";

/// Payload of a commit event as it appears in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Project label.
    #[serde(default)]
    pub project: String,
    /// Commit identifier.
    pub commit_hash: String,
    /// Commit message.
    #[serde(default)]
    pub commit_msg: String,
    /// Declared workflow phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tdd_phase: Option<String>,
    /// Free-text descriptor of the files touched.
    #[serde(default = "default_files_changed")]
    pub files_changed: String,
    /// Business timestamp of the commit.
    pub timestamp: String,
}

fn default_files_changed() -> String {
    DEFAULT_FILES_CHANGED.to_string()
}

/// One line of the event log carrying a commit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Time the event was logged.
    pub timestamp: String,
    /// Event kind.
    pub event_type: String,
    /// Commit payload.
    pub data: CommitRecord,
}

impl EventEnvelope {
    /// Wrap a commit record in a `tdd_commit` envelope logged at `logged_at`.
    pub fn commit(logged_at: DateTime<Utc>, data: CommitRecord) -> Self {
        Self {
            timestamp: format_timestamp(logged_at),
            event_type: COMMIT_EVENT_TYPE.to_string(),
            data,
        }
    }
}

/// Loads and time-filters commit events from a [`LogSource`].
#[derive(Debug)]
pub struct EventStore<S: LogSource> {
    source: S,
}

impl<S: LogSource> EventStore<S> {
    /// Create a store reading from `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying log source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load the commit events logged within `[now - days, now]`, in arrival order.
    ///
    /// A missing log yields an empty list. Any line that is not a well-formed
    /// envelope, blank lines included, or whose commit payload or timestamps
    /// do not parse, aborts the whole load. A window reaching past the
    /// earliest representable instant covers the whole history.
    pub fn load(&self, days: u32, now: DateTime<Utc>) -> Result<Vec<CommitEvent>> {
        let Some(snapshot) = self.source.read_snapshot()? else {
            debug!("event log {} does not exist yet", self.source.describe());
            return Ok(Vec::new());
        };

        let cutoff = window_start(days, now);
        let mut events = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in snapshot.lines().enumerate() {
            match parse_line(index + 1, line)? {
                Some((logged_at, event)) if cutoff <= logged_at && logged_at <= now => {
                    events.push(event);
                }
                _ => skipped += 1,
            }
        }

        debug!(
            "loaded {} commit events from {} ({} lines outside the window or of other kinds)",
            events.len(),
            self.source.describe(),
            skipped
        );
        Ok(events)
    }

    /// Append a commit envelope to the log.
    pub fn append(&self, envelope: &EventEnvelope) -> Result<()> {
        let line = serde_json::to_string(envelope)
            .map_err(|err| MetricsError::Other(format!("encode event failed: {err}")))?;
        self.source.append_line(&line)
    }
}

fn window_start(days: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse a log line, returning the envelope timestamp and the commit event,
/// or `None` for events of other kinds.
fn parse_line(line_no: usize, line: &str) -> Result<Option<(DateTime<Utc>, CommitEvent)>> {
    let value: Value = serde_json::from_str(line)
        .map_err(|err| MetricsError::malformed(line_no, format!("invalid JSON: {err}")))?;
    let Value::Object(mut entry) = value else {
        return Err(MetricsError::malformed(line_no, "expected a JSON object"));
    };

    if entry.get("event_type").and_then(Value::as_str) != Some(COMMIT_EVENT_TYPE) {
        return Ok(None);
    }

    let logged_at = entry
        .get("timestamp")
        .and_then(Value::as_str)
        .ok_or_else(|| MetricsError::malformed(line_no, "missing envelope timestamp"))?;
    let logged_at = parse_timestamp(logged_at).ok_or_else(|| {
        MetricsError::malformed(line_no, format!("unparsable envelope timestamp `{logged_at}`"))
    })?;

    let mut data = entry
        .remove("data")
        .ok_or_else(|| MetricsError::malformed(line_no, "missing `data` payload"))?;
    // Non-string phase labels classify as unknown rather than failing the line.
    let declared_phase = data
        .as_object_mut()
        .and_then(|payload| payload.remove("tdd_phase"));
    let record: CommitRecord = serde_json::from_value(data)
        .map_err(|err| MetricsError::malformed(line_no, err.to_string()))?;
    let committed_at = parse_timestamp(&record.timestamp).ok_or_else(|| {
        MetricsError::malformed(
            line_no,
            format!("unparsable commit timestamp `{}`", record.timestamp),
        )
    })?;

    let event = CommitEvent {
        timestamp: committed_at,
        phase: classify(declared_phase.as_ref().and_then(Value::as_str)),
        commit_hash: record.commit_hash,
        commit_message: record.commit_msg,
        files_changed_text: record.files_changed,
        project: record.project,
    };
    Ok(Some((logged_at, event)))
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (including the `Z` suffix), numeric offsets without a
/// colon, and naive date-times, which are read as UTC. Either `T` or a space
/// may separate the date from the time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    None
}

/// Format a timestamp the way the log stores it.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
