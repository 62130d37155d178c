//! User-visible feedback channel.

use tracing::info;

/// Title/description pair shown to the user (toast, console line, log entry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Short headline.
    pub title: String,
    /// Supporting detail.
    pub description: String,
}

impl Notification {
    /// Build a notification.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Fire-and-forget sink for notifications.
pub trait NotificationSink {
    /// Deliver `notification`.
    fn notify(&self, notification: Notification);
}

/// Sink that writes notifications to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        info!(
            title = %notification.title,
            description = %notification.description,
            "notification"
        );
    }
}
