//! User-facing notifications.
//!
//! The upload core never renders anything; it hands a
//! `(severity, title, message)` triple to a [`NotificationSink`] and moves
//! on. [`NotificationQueue`] is the in-memory sink a UI drains.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Default display duration in milliseconds.
const DEFAULT_DURATION_MS: u64 = 4000;

/// Error display duration in milliseconds (longer for visibility).
const ERROR_DURATION_MS: u64 = 6000;

/// Visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

impl Severity {
    fn duration_ms(self) -> u64 {
        match self {
            Severity::Error => ERROR_DURATION_MS,
            _ => DEFAULT_DURATION_MS,
        }
    }
}

/// Fire-and-forget receiver of user-facing messages.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, message: &str);
}

/// A queued notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub duration_ms: u64,
}

/// In-memory notification queue with monotonic ID assignment.
///
/// Timer-based dismissal is left to the UI; this only holds the queue.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    inner: Mutex<QueueInner>,
}

#[derive(Debug, Default)]
struct QueueInner {
    items: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a notification and return its ID.
    pub fn push(
        &self,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> u64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.items.push(Notification {
            id,
            severity,
            title: title.into(),
            message: message.into(),
            duration_ms: severity.duration_ms(),
        });
        id
    }

    /// Remove a notification by ID. Returns `true` if it was queued.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let len_before = inner.items.len();
        inner.items.retain(|n| n.id != id);
        inner.items.len() != len_before
    }

    /// Copy of the queued notifications, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().items.clone()
    }

    /// Remove and return every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut self.lock().items)
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn clear(&self) {
        self.lock().items.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for NotificationQueue {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        tracing::debug!(?severity, title, "notification queued");
        self.push(severity, title, message);
    }
}
