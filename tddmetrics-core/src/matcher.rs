//! Pairing Red and Green commits into timed cycles.

use std::cmp::Ordering;

use log::debug;

use crate::domain::{CommitEvent, Phase, TddCycle};

/// Matcher state while walking commits in timestamp order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MatchState<'a> {
    /// No Red commit is waiting for its Green.
    Idle,
    /// The most recent unmatched Red commit.
    PendingRed(&'a CommitEvent),
}

impl<'a> MatchState<'a> {
    /// Advance the state machine by one commit, returning the next state and
    /// the cycle closed by this commit, if any.
    fn step(self, event: &'a CommitEvent) -> (Self, Option<TddCycle>) {
        match (self, event.phase) {
            (MatchState::PendingRed(previous), Phase::Red) => {
                debug!(
                    "red commit {} superseded by {}",
                    previous.commit_hash, event.commit_hash
                );
                (MatchState::PendingRed(event), None)
            }
            (MatchState::Idle, Phase::Red) => (MatchState::PendingRed(event), None),
            (MatchState::PendingRed(red), Phase::Green) => (
                MatchState::Idle,
                Some(TddCycle::new(red.clone(), event.clone())),
            ),
            (MatchState::Idle, Phase::Green) => {
                debug!("green commit {} has no pending red", event.commit_hash);
                (MatchState::Idle, None)
            }
            (state, Phase::Structural | Phase::Unknown) => (state, None),
        }
    }
}

/// Order commits by timestamp, breaking ties by commit hash so the result
/// does not depend on arrival order.
fn chronological(a: &&CommitEvent, b: &&CommitEvent) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.commit_hash.cmp(&b.commit_hash))
}

/// Match Red commits to the next Green commit in timestamp order.
///
/// A Red followed by another Red is dropped in favour of the newer one; a
/// Green with no pending Red is ignored, and a Red still pending at the end
/// does not produce a cycle. Cycles are returned in the order they closed.
pub fn match_cycles(events: &[CommitEvent]) -> Vec<TddCycle> {
    let mut ordered: Vec<&CommitEvent> = events.iter().collect();
    ordered.sort_by(chronological);

    let mut state = MatchState::Idle;
    let mut cycles = Vec::new();
    for event in ordered {
        let (next, cycle) = state.step(event);
        state = next;
        cycles.extend(cycle);
    }

    if let MatchState::PendingRed(open) = state {
        debug!("red commit {} left without a green", open.commit_hash);
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn event(hash: &str, minutes: i64, phase: Phase) -> CommitEvent {
        CommitEvent {
            timestamp: base() + Duration::minutes(minutes),
            phase,
            commit_hash: hash.to_string(),
            commit_message: format!("{} {hash}", phase.as_str()),
            files_changed_text: "1 file changed".to_string(),
            project: "demo".to_string(),
        }
    }

    fn pairs(cycles: &[TddCycle]) -> Vec<(&str, &str)> {
        cycles
            .iter()
            .map(|c| (c.red.commit_hash.as_str(), c.green.commit_hash.as_str()))
            .collect()
    }

    #[test]
    fn red_then_green_closes_a_cycle() {
        let events = vec![event("r1", 0, Phase::Red), event("g1", 5, Phase::Green)];
        let cycles = match_cycles(&events);
        assert_eq!(pairs(&cycles), vec![("r1", "g1")]);
        assert_eq!(cycles[0].duration_minutes, 5.0);
    }

    #[test]
    fn newer_red_replaces_pending_red() {
        let events = vec![
            event("r1", 0, Phase::Red),
            event("r2", 1, Phase::Red),
            event("g1", 6, Phase::Green),
        ];
        let cycles = match_cycles(&events);
        assert_eq!(pairs(&cycles), vec![("r2", "g1")]);
        assert_eq!(cycles[0].duration_minutes, 5.0);
    }

    #[test]
    fn orphan_green_is_ignored() {
        let events = vec![
            event("g0", 0, Phase::Green),
            event("r1", 1, Phase::Red),
            event("g1", 3, Phase::Green),
            event("g2", 4, Phase::Green),
        ];
        let cycles = match_cycles(&events);
        assert_eq!(pairs(&cycles), vec![("r1", "g1")]);
    }

    #[test]
    fn structural_and_unknown_commits_do_not_disturb_pending_red() {
        let events = vec![
            event("r1", 0, Phase::Red),
            event("s1", 2, Phase::Structural),
            event("u1", 3, Phase::Unknown),
            event("g1", 9, Phase::Green),
        ];
        let cycles = match_cycles(&events);
        assert_eq!(pairs(&cycles), vec![("r1", "g1")]);
        assert_eq!(cycles[0].duration_minutes, 9.0);
    }

    #[test]
    fn trailing_red_is_not_reported() {
        let events = vec![
            event("r1", 0, Phase::Red),
            event("g1", 2, Phase::Green),
            event("r2", 4, Phase::Red),
        ];
        assert_eq!(pairs(&match_cycles(&events)), vec![("r1", "g1")]);
    }

    #[test]
    fn matches_by_timestamp_not_arrival_order() {
        let events = vec![
            event("g2", 30, Phase::Green),
            event("g1", 5, Phase::Green),
            event("r2", 20, Phase::Red),
            event("r1", 0, Phase::Red),
        ];
        let cycles = match_cycles(&events);
        assert_eq!(pairs(&cycles), vec![("r1", "g1"), ("r2", "g2")]);
        assert!(cycles.iter().all(|c| c.duration_minutes >= 0.0));
    }

    #[test]
    fn rotated_inputs_produce_identical_cycles() {
        let events = vec![
            event("r1", 0, Phase::Red),
            event("g1", 4, Phase::Green),
            event("s1", 5, Phase::Structural),
            event("r2", 6, Phase::Red),
            event("r3", 6, Phase::Red),
            event("g2", 12, Phase::Green),
            event("g3", 13, Phase::Green),
        ];
        let expected = match_cycles(&events);

        for shift in 1..events.len() {
            let mut rotated = events.clone();
            rotated.rotate_left(shift);
            assert_eq!(match_cycles(&rotated), expected, "rotation {shift}");
            rotated.reverse();
            assert_eq!(match_cycles(&rotated), expected, "reversed rotation {shift}");
        }
    }

    #[test]
    fn empty_input_has_no_cycles() {
        assert!(match_cycles(&[]).is_empty());
    }
}
