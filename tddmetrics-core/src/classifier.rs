//! Phase classification for raw commit records.

use crate::domain::Phase;

/// Map a record's declared `tdd_phase` value to a [`Phase`].
///
/// Classification trusts the producer of the event: only the exact labels
/// `red`, `green` and `structural` are recognised, anything else (including
/// an absent field) is [`Phase::Unknown`].
pub fn classify(declared: Option<&str>) -> Phase {
    match declared {
        Some("red") => Phase::Red,
        Some("green") => Phase::Green,
        Some("structural") => Phase::Structural,
        Some(_) | None => Phase::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::classify;
    use crate::domain::Phase;

    #[test]
    fn recognises_declared_phases() {
        assert_eq!(classify(Some("red")), Phase::Red);
        assert_eq!(classify(Some("green")), Phase::Green);
        assert_eq!(classify(Some("structural")), Phase::Structural);
    }

    #[test]
    fn absent_or_unrecognised_values_are_unknown() {
        assert_eq!(classify(None), Phase::Unknown);
        assert_eq!(classify(Some("")), Phase::Unknown);
        assert_eq!(classify(Some("refactor")), Phase::Unknown);
        assert_eq!(classify(Some("Red")), Phase::Unknown);
    }

    #[test]
    fn labels_round_trip_through_the_classifier() {
        for phase in Phase::ALL {
            assert_eq!(classify(Some(phase.as_str())), phase);
        }
    }
}
