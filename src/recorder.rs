//! Result recorder.
//!
//! Turns each probe outcome into a [`LogRecord`], prints it as a JSON line
//! for live observation, and appends the same line to the session sink,
//! flushing before returning. Write failures are logged, never raised.

use chrono::{DateTime, Utc};
use std::io::{self, Write};
use tracing::{error, warn};

use crate::types::{LogRecord, Pair, RequestOutcome};

/// Owns the session sink and the console mirror.
pub struct Recorder<W: Write> {
    sink: W,
    console: Box<dyn Write + Send>,
}

impl<W: Write> Recorder<W> {
    /// Recorder that mirrors to standard output.
    pub fn new(sink: W) -> Self {
        Self::with_console(sink, Box::new(io::stdout()))
    }

    pub fn with_console(sink: W, console: Box<dyn Write + Send>) -> Self {
        Self { sink, console }
    }

    /// Record one probe. Always returns the record that was emitted.
    pub fn record(&mut self, pair: &Pair, outcome: &RequestOutcome, at: DateTime<Utc>) -> LogRecord {
        let record = LogRecord::from_outcome(pair, outcome, at);

        match serde_json::to_string(&record) {
            Ok(line) => {
                self.print(&line);
                if let Err(e) = self.append(&line) {
                    error!(pair = %pair, error = %e, "Failed to append record to session log");
                }
            }
            Err(e) => error!(pair = %pair, error = %e, "Failed to serialise log record"),
        }

        record
    }

    /// Console-only line (cycle banners, sleep notices).
    pub fn announce(&mut self, line: &str) {
        self.print(line);
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    fn print(&mut self, line: &str) {
        let result = writeln!(self.console, "{line}").and_then(|_| self.console.flush());
        if let Err(e) = result {
            warn!(error = %e, "Failed to write to console");
        }
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        self.sink.write_all(line.as_bytes())?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
