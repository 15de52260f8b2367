//! The worker-facing progress callback contract.

use crate::progress::listener::SharedListener;

/// Result of a single progress signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Dropped because the previous forward was too recent.
    Throttled,
    /// Forwarded and every listener accepted it.
    Forwarded { notified: usize },
    /// Forwarded, but at least one listener failed. The runner is now
    /// terminated.
    ListenerFailed { notified: usize, failed: usize },
}

impl SignalOutcome {
    pub fn was_forwarded(self) -> bool {
        !matches!(self, SignalOutcome::Throttled)
    }
}

/// Cooperative termination latch. `Active -> Terminated` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Active,
    Terminated,
}

/// A callback that notifies progress listeners as a worker makes progress.
///
/// Listeners must be removed explicitly once no more progress is expected;
/// the callback never drops them on its own.
pub trait ProgressCallback<T>: Send + Sync {
    /// Report progress. Listener failures are never returned here; poll
    /// [`ProgressCallback::runner_should_terminate`] instead.
    fn progress_made(&self, payload: T) -> SignalOutcome;

    /// Register a listener. Returns `false` if it was already registered.
    fn add_progress_listener(&self, listener: SharedListener<T>) -> bool;

    /// Remove a listener. Returns `false` if it was not registered.
    fn remove_progress_listener(&self, listener: &SharedListener<T>) -> bool;

    /// Set once any listener has failed. Workers should poll this in their
    /// processing loop and stop when it turns true.
    fn runner_should_terminate(&self) -> bool;

    /// Lock timeout in seconds that callers use to size heartbeats.
    fn lock_timeout_seconds(&self) -> u64;
}
