//! Error types for the metrics engine.

use std::{error::Error, fmt, io};

/// Error type for metrics engine operations.
#[derive(Debug)]
pub enum MetricsError {
    /// An underlying I/O error while reading or appending to the log.
    Io(io::Error),
    /// A log line that could not be parsed into a commit event.
    MalformedRecord {
        /// One-based line number within the log snapshot.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// A catch-all error with a message.
    Other(String),
}

impl MetricsError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::MalformedRecord { line, reason } => {
                write!(f, "malformed record on line {line}: {reason}")
            }
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for MetricsError {}

impl From<io::Error> for MetricsError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Convenience result type for the metrics engine.
pub type Result<T> = std::result::Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::MetricsError;
    use std::io;

    #[test]
    fn io_error_formats_message() {
        let error = MetricsError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(format!("{error}"), "io error: boom");
    }

    #[test]
    fn malformed_record_names_the_line() {
        let error = MetricsError::malformed(12, "missing field `commit_hash`");
        assert_eq!(
            format!("{error}"),
            "malformed record on line 12: missing field `commit_hash`"
        );
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: MetricsError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            MetricsError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io variant, got {other:?}"),
        }
    }
}
