//! Console-backed notification sink.

use crate::core::notify::{Notification, NotificationSink};

/// Writes notifications to the browser console until a toast layer is wired in.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        gloo::console::info!(notification.title, notification.description);
    }
}
