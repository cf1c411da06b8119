//! Log source abstractions used by the event store.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Abstraction over the append-only event log for testability.
#[cfg_attr(test, mockall::automock)]
pub trait LogSource {
    /// Read the whole log as one snapshot, or `None` if it does not exist yet.
    fn read_snapshot(&self) -> Result<Option<String>>;
    /// Append a single line to the log.
    fn append_line(&self, line: &str) -> Result<()>;
    /// Human-readable location of the log, used in diagnostics.
    fn describe(&self) -> String;
}

/// JSON-lines log stored in a file.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    /// Create a log source backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for FileLogSource {
    fn read_snapshot(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn append_line(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line.trim_end_matches('\n'))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
