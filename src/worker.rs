//! A record-processing loop that reports progress through a callback and
//! stops cooperatively when asked to.

use tracing::{debug, info, warn};

use crate::progress::{ProgressCallback, SignalOutcome};

/// What happened during a worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub processed: u64,
    pub forwarded: u64,
    pub throttled: u64,
    pub terminated: bool,
}

impl std::fmt::Display for WorkerReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Records processed: {}", self.processed)?;
        writeln!(f, "Signals forwarded: {}", self.forwarded)?;
        writeln!(f, "Signals throttled: {}", self.throttled)?;
        write!(
            f,
            "Status: {}",
            if self.terminated { "terminated" } else { "completed" }
        )
    }
}

/// Process `records` records, calling `step` for each one and reporting the
/// record index as progress after it.
///
/// The termination flag is polled before every record, so a listener failure
/// stops the run before the next record is touched.
pub fn run_worker<F>(callback: &dyn ProgressCallback<u64>, records: u64, mut step: F) -> WorkerReport
where
    F: FnMut(u64),
{
    let mut report = WorkerReport::default();
    info!(
        records,
        lock_timeout_seconds = callback.lock_timeout_seconds(),
        "worker started"
    );

    for index in 0..records {
        if callback.runner_should_terminate() {
            warn!(processed = report.processed, "worker asked to terminate");
            report.terminated = true;
            break;
        }

        step(index);
        report.processed += 1;

        match callback.progress_made(index) {
            SignalOutcome::Throttled => report.throttled += 1,
            outcome => {
                debug!(index, ?outcome, "progress forwarded");
                report.forwarded += 1;
            }
        }
    }

    // A failure on the final record still counts as a termination.
    if !report.terminated && callback.runner_should_terminate() {
        report.terminated = true;
    }

    info!(
        processed = report.processed,
        forwarded = report.forwarded,
        terminated = report.terminated,
        "worker finished"
    );
    report
}
