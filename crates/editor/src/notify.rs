//! User-visible notifications, fanned out over a `tokio::sync::broadcast`
//! channel.
//!
//! The [`Notifier`] is shared via `Arc<Notifier>` between the editors, the
//! upload tasks and the session. A UI layer subscribes once and renders each
//! [`Notice`] as a toast.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// One notification shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of [`Notice`]s to any number of subscribers.
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Notifier {
    /// Create a notifier with a specific channel capacity.
    ///
    /// Slow subscribers lose the oldest notices and observe
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notice to all current subscribers.
    ///
    /// With no subscriber the notice is only logged.
    pub fn publish(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(text = %notice.message, "Notice"),
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!(text = %notice.message, "Notice")
            }
        }
        let _ = self.sender.send(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(Notice::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(Notice::error(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(Notice::info(message));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
