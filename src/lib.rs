//! Pulse: Throttled Progress Callbacks
//!
//! Long-running workers report progress as often as they like; a
//! [`ThrottlingProgressCallback`](progress::ThrottlingProgressCallback) forwards at
//! most one signal per configured window to its listeners, and turns listener
//! failures into a termination flag the worker polls.

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod worker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ListenerError, PulseError};
pub use progress::{
    ProgressCallback, ProgressListener, RunnerState, SharedListener, SignalOutcome,
    ThrottlingProgressCallback,
};
