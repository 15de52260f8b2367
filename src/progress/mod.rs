//! Throttled progress callbacks.

pub mod callback;
pub mod listener;
pub mod throttle;

pub use callback::{ProgressCallback, RunnerState, SignalOutcome};
pub use listener::{listener_fn, LoggingListener, ProgressListener, SharedListener};
pub use throttle::{ThrottleState, ThrottlingProgressCallback, ThrottlingProgressCallbackBuilder};
