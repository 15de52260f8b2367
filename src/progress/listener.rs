//! Progress listeners.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::error::ListenerError;

/// Receives progress signals forwarded by a dispatcher.
///
/// Listeners run synchronously on the worker's thread, so they should return
/// quickly. Returning an error asks the worker to terminate.
pub trait ProgressListener<T>: Send + Sync {
    fn on_progress(&self, payload: &T) -> Result<(), ListenerError>;
}

/// Registered listener handle. Identity is the allocation, so cloning the
/// handle refers to the same listener.
pub type SharedListener<T> = Arc<dyn ProgressListener<T>>;

impl<T, F> ProgressListener<T> for F
where
    F: Fn(&T) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_progress(&self, payload: &T) -> Result<(), ListenerError> {
        self(payload)
    }
}

/// Wrap a closure as a shareable listener handle.
pub fn listener_fn<T, F>(f: F) -> SharedListener<T>
where
    F: Fn(&T) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Whether two handles point at the same listener instance.
pub(crate) fn same_listener<T>(a: &SharedListener<T>, b: &SharedListener<T>) -> bool {
    // Data pointers only; vtable pointers for one type may differ across codegen units.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Emits every forwarded payload as a structured `info` event.
#[derive(Debug)]
pub struct LoggingListener {
    label: String,
    delivered: AtomicU64,
}

impl LoggingListener {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            delivered: AtomicU64::new(0),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of payloads this listener has received.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl<T: Debug> ProgressListener<T> for LoggingListener {
    fn on_progress(&self, payload: &T) -> Result<(), ListenerError> {
        let seq = self.delivered.fetch_add(1, Ordering::Relaxed) + 1;
        info!(listener = %self.label, seq, progress = ?payload, "progress made");
        Ok(())
    }
}
