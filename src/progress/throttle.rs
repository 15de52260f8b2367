//! Throttling progress dispatcher.
//!
//! The first call to [`ProgressCallback::progress_made`] is forwarded to the
//! listeners. Every later call is forwarded only if more than `frequency_ms`
//! milliseconds have passed since the last forwarded call; otherwise it is
//! dropped. Dropped signals are never queued or delivered late, so a worker can
//! report progress as often as it likes without flooding its listeners.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{PulseConfig, ThrottleConfig};
use crate::error::{ListenerError, PulseError};
use crate::progress::callback::{ProgressCallback, RunnerState, SignalOutcome};
use crate::progress::listener::{same_listener, ProgressListener, SharedListener};

/// Whether anything has been forwarded yet, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    Unfired,
    Fired { last_fired_ms: u64 },
}

impl ThrottleState {
    /// Decide whether a signal at `now_ms` passes, recording it if so.
    ///
    /// A reading at or before the last forward never passes, so
    /// `last_fired_ms` never moves backwards.
    pub fn admit(&mut self, now_ms: u64, frequency_ms: u64) -> bool {
        let admit = match *self {
            ThrottleState::Unfired => true,
            ThrottleState::Fired { last_fired_ms } => {
                now_ms.saturating_sub(last_fired_ms) > frequency_ms
            }
        };
        if admit {
            *self = ThrottleState::Fired {
                last_fired_ms: now_ms,
            };
        }
        admit
    }
}

struct Inner<T> {
    state: ThrottleState,
    listeners: Vec<SharedListener<T>>,
}

/// Forwards progress to listeners at most once per `frequency_ms` window.
pub struct ThrottlingProgressCallback<T> {
    frequency_ms: u64,
    lock_timeout_seconds: u64,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner<T>>,
    terminated: AtomicBool,
}

impl<T> ThrottlingProgressCallback<T> {
    /// Throttle against the system clock with the default lock timeout.
    pub fn new(frequency_ms: u64) -> Self {
        Self::with_clock(frequency_ms, Arc::new(SystemClock))
    }

    pub fn with_clock(frequency_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(
            frequency_ms,
            ThrottleConfig::default().lock_timeout_seconds,
            clock,
        )
    }

    pub fn builder() -> ThrottlingProgressCallbackBuilder<T> {
        ThrottlingProgressCallbackBuilder::default()
    }

    /// Build from loaded configuration, using the system clock.
    pub fn from_config(config: &PulseConfig) -> Result<Self, PulseError> {
        Self::builder().throttle_config(&config.throttle).build()
    }

    fn from_parts(frequency_ms: u64, lock_timeout_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            frequency_ms,
            lock_timeout_seconds,
            clock,
            inner: Mutex::new(Inner {
                state: ThrottleState::Unfired,
                listeners: Vec::new(),
            }),
            terminated: AtomicBool::new(false),
        }
    }

    pub fn frequency_ms(&self) -> u64 {
        self.frequency_ms
    }

    pub fn throttle_state(&self) -> ThrottleState {
        self.inner.lock().state
    }

    pub fn runner_state(&self) -> RunnerState {
        if self.terminated.load(Ordering::SeqCst) {
            RunnerState::Terminated
        } else {
            RunnerState::Active
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Notify every listener in registration order. A failing listener does
    /// not stop the round; the remaining listeners still see the payload.
    /// Listeners removed while the round is running are skipped.
    fn fire(&self, listeners: &[SharedListener<T>], payload: &T) -> SignalOutcome {
        let mut notified = 0;
        let mut failed = 0;

        for (index, listener) in listeners.iter().enumerate() {
            if !self.is_registered(listener) {
                trace!(listener_index = index, "skipping listener removed mid-round");
                continue;
            }
            match invoke(listener.as_ref(), payload) {
                Ok(()) => notified += 1,
                Err(err) => {
                    failed += 1;
                    warn!(listener_index = index, error = %err, "progress listener failed");
                    self.latch_termination();
                }
            }
        }

        if failed == 0 {
            SignalOutcome::Forwarded { notified }
        } else {
            SignalOutcome::ListenerFailed { notified, failed }
        }
    }

    fn is_registered(&self, listener: &SharedListener<T>) -> bool {
        self.inner
            .lock()
            .listeners
            .iter()
            .any(|l| same_listener(l, listener))
    }

    fn latch_termination(&self) {
        if !self.terminated.swap(true, Ordering::SeqCst) {
            error!("listener failure latched runner termination");
        }
    }
}

impl<T> ProgressCallback<T> for ThrottlingProgressCallback<T> {
    fn progress_made(&self, payload: T) -> SignalOutcome {
        let listeners = {
            let mut inner = self.inner.lock();
            let now_ms = self.clock.now_millis();
            if !inner.state.admit(now_ms, self.frequency_ms) {
                trace!(now_ms, "progress signal throttled");
                return SignalOutcome::Throttled;
            }
            trace!(now_ms, listeners = inner.listeners.len(), "forwarding progress signal");
            // Listeners run outside the lock so they may re-register on this callback.
            // Additions apply from the next signal; removals are checked per call.
            inner.listeners.clone()
        };
        self.fire(&listeners, &payload)
    }

    fn add_progress_listener(&self, listener: SharedListener<T>) -> bool {
        let mut inner = self.inner.lock();
        if inner.listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        inner.listeners.push(listener);
        debug!(listeners = inner.listeners.len(), "progress listener added");
        true
    }

    fn remove_progress_listener(&self, listener: &SharedListener<T>) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|l| !same_listener(l, listener));
        let removed = inner.listeners.len() != before;
        if removed {
            debug!(listeners = inner.listeners.len(), "progress listener removed");
        }
        removed
    }

    fn runner_should_terminate(&self) -> bool {
        self.runner_state() == RunnerState::Terminated
    }

    fn lock_timeout_seconds(&self) -> u64 {
        self.lock_timeout_seconds
    }
}

impl<T> std::fmt::Debug for ThrottlingProgressCallback<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottlingProgressCallback")
            .field("frequency_ms", &self.frequency_ms)
            .field("lock_timeout_seconds", &self.lock_timeout_seconds)
            .field("state", &self.throttle_state())
            .field("runner", &self.runner_state())
            .finish_non_exhaustive()
    }
}

/// Run one listener, turning a panic into a [`ListenerError`].
fn invoke<T>(listener: &dyn ProgressListener<T>, payload: &T) -> Result<(), ListenerError> {
    panic::catch_unwind(AssertUnwindSafe(|| listener.on_progress(payload)))
        .unwrap_or_else(|panic| Err(ListenerError::Panicked(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Builder for [`ThrottlingProgressCallback`].
pub struct ThrottlingProgressCallbackBuilder<T> {
    throttle: ThrottleConfig,
    clock: Option<Arc<dyn Clock>>,
    _payload: PhantomData<fn(T)>,
}

impl<T> Default for ThrottlingProgressCallbackBuilder<T> {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            clock: None,
            _payload: PhantomData,
        }
    }
}

impl<T> ThrottlingProgressCallbackBuilder<T> {
    pub fn frequency_ms(mut self, frequency_ms: u64) -> Self {
        self.throttle.frequency_ms = frequency_ms;
        self
    }

    pub fn lock_timeout_seconds(mut self, seconds: u64) -> Self {
        self.throttle.lock_timeout_seconds = seconds;
        self
    }

    pub fn throttle_config(mut self, throttle: &ThrottleConfig) -> Self {
        self.throttle = throttle.clone();
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ThrottlingProgressCallback<T>, PulseError> {
        self.throttle.validate().map_err(PulseError::ConfigError)?;
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        Ok(ThrottlingProgressCallback::from_parts(
            self.throttle.frequency_ms,
            self.throttle.lock_timeout_seconds,
            clock,
        ))
    }
}
