//! User-facing notification events emitted by the auth service.
//! The presentation layer owns how these are rendered (toast, banner, etc);
//! this module only defines the event shape and the sink seam.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info<S: Into<String>>(message: S) -> Self {
        Self { severity: Severity::Info, message: message.into() }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }
}

/// Receives every notification the auth service emits, in emission order.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Default sink: forwards notifications to the `tracing` pipeline.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Info => info!(target: "sizehub::notify", "{}", n.message),
            Severity::Error => warn!(target: "sizehub::notify", "{}", n.message),
        }
    }
}

/// Collects notifications in memory. Used by tests and the CLI shell.
#[derive(Default, Clone)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn last(&self) -> Option<Notification> {
        self.inner.lock().last().cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.inner.lock().push(notification);
    }
}
