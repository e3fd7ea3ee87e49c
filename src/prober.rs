//! Prober loop: the cyclic probe → record → pause driver.
//!
//! Each cycle walks the whole catalog in order, probing one pair at a
//! time with a fixed pause after every request, then waits the
//! inter-cycle delay. A failing pair never stops the loop; the only exit
//! is the shutdown token, checked at cycle boundaries.

use chrono::{DateTime, Utc};
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::client::PriceSource;
use crate::clock::Clock;
use crate::recorder::Recorder;
use crate::types::{iso_timestamp, outcome_status};

/// Pause after every request.
pub const INTER_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Default pause between cycles.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Fixed delays of the loop. Both are lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub inter_request: Duration,
    pub inter_cycle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            inter_request: INTER_REQUEST_DELAY,
            inter_cycle: DEFAULT_CYCLE_INTERVAL,
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// Summary of one traversal of the catalog.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    pub probes: usize,
    pub ok: usize,
    pub errors: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Prober
// ---------------------------------------------------------------------------

/// The probe loop. Owns the source, the recorder (and through it the
/// session sink) and the cycle counter.
pub struct Prober<W: Write> {
    source: Box<dyn PriceSource>,
    clock: Box<dyn Clock>,
    catalog: Catalog,
    recorder: Recorder<W>,
    pacing: Pacing,
    cycle: u64,
}

impl<W: Write> Prober<W> {
    pub fn new(
        source: Box<dyn PriceSource>,
        clock: Box<dyn Clock>,
        catalog: Catalog,
        recorder: Recorder<W>,
        pacing: Pacing,
    ) -> Self {
        Self {
            source,
            clock,
            catalog,
            recorder,
            pacing,
            cycle: 0,
        }
    }

    /// Number of the last cycle started (0 before the first).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn recorder(&self) -> &Recorder<W> {
        &self.recorder
    }

    /// Probe and record every pair once, in catalog order.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        let started_at = self.clock.now();
        self.recorder.announce(&format!(
            "\n=== Cycle {} at {} ===",
            self.cycle,
            iso_timestamp::format(&started_at)
        ));
        info!(cycle = self.cycle, pairs = self.catalog.len(), "Starting cycle");

        let mut ok = 0;
        let mut errors = 0;

        for pair in self.catalog.iter() {
            let outcome = self.source.probe(pair).await;
            debug!(pair = %pair, status = outcome_status(&outcome), "Probe finished");

            let record = self.recorder.record(pair, &outcome, self.clock.now());
            if record.is_ok() {
                ok += 1;
            } else {
                errors += 1;
            }

            self.clock.sleep(self.pacing.inter_request).await;
        }

        CycleReport {
            cycle: self.cycle,
            probes: ok + errors,
            ok,
            errors,
            started_at,
            finished_at: self.clock.now(),
        }
    }

    /// Run cycles until `shutdown` is cancelled. Returns the number of
    /// completed cycles.
    pub async fn run(&mut self, shutdown: CancellationToken) -> u64 {
        info!(
            pairs = self.catalog.len(),
            interval_secs = self.pacing.inter_cycle.as_secs(),
            "Entering probe loop. Press Ctrl+C to stop."
        );

        loop {
            if shutdown.is_cancelled() {
                info!(cycles = self.cycle, "Shutdown requested, leaving probe loop");
                break;
            }

            let report = self.run_cycle().await;
            log_cycle_report(&report);

            self.recorder.announce(&format!(
                "Sleeping {}s until next cycle...",
                self.pacing.inter_cycle.as_secs()
            ));

            tokio::select! {
                _ = self.clock.sleep(self.pacing.inter_cycle) => {}
                _ = shutdown.cancelled() => {
                    info!(cycles = self.cycle, "Shutdown requested, leaving probe loop");
                    break;
                }
            }
        }

        self.cycle
    }
}

/// Log a one-line cycle summary.
fn log_cycle_report(report: &CycleReport) {
    let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();
    info!(
        cycle = report.cycle,
        probes = report.probes,
        ok = report.ok,
        errors = report.errors,
        elapsed_ms,
        "Cycle complete"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
