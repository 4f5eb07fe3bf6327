//! User-facing notifications
//!
//! The dashboard raises a toast for every fresh failure and one success toast
//! per refresh cycle that reached the network.

use parking_lot::Mutex;
use tracing::{error, info};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Something the user should look at
    Error,
    /// A cycle finished
    Success,
}

/// One notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
}

/// Receiver of user-facing notifications
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    fn notify(&self, notification: Notification);

    /// Deliver an error notification
    fn error(&self, message: String) {
        self.notify(Notification {
            kind: NotificationKind::Error,
            message,
        });
    }

    /// Deliver a success notification
    fn success(&self, message: String) {
        self.notify(Notification {
            kind: NotificationKind::Success,
            message,
        });
    }
}

/// Notifier that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => error!(toast = true, "{}", notification.message),
            NotificationKind::Success => info!(toast = true, "{}", notification.message),
        }
    }
}

/// Notifier that keeps every notification, for tests and batch output
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    recorded: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.recorded.lock().clone()
    }

    /// Messages of the received error notifications
    pub fn errors(&self) -> Vec<String> {
        self.messages(NotificationKind::Error)
    }

    /// Messages of the received success notifications
    pub fn successes(&self) -> Vec<String> {
        self.messages(NotificationKind::Success)
    }

    fn messages(&self, kind: NotificationKind) -> Vec<String> {
        self.recorded
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.recorded.lock().push(notification);
    }
}
