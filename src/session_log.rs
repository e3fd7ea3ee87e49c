//! Session log file.
//!
//! One JSON-lines file per process run, named after the UTC start time
//! (`lvp-test-YYYYMMDD_HHMMSS.jsonl`). Opened once at startup and held
//! for the lifetime of the process. Every flush reaches the disk.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default directory for session logs.
pub const DEFAULT_LOG_DIR: &str = "/app/logs";

/// File name for a session started at `started_at`.
pub fn session_file_name(started_at: DateTime<Utc>) -> String {
    format!("lvp-test-{}.jsonl", started_at.format("%Y%m%d_%H%M%S"))
}

/// Append-only handle on the current session's log file.
#[derive(Debug)]
pub struct SessionLog {
    file: File,
    path: PathBuf,
}

impl SessionLog {
    /// Create `dir` if needed and open a fresh session file inside it.
    ///
    /// An existing file with the same name is truncated.
    pub fn create(dir: impl AsRef<Path>, started_at: DateTime<Utc>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let path = dir.join(session_file_name(started_at));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create session log {}", path.display()))?;

        info!(path = %path.display(), "Session log opened");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for SessionLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_data()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
