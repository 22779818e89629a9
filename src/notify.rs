//! User-visible notifications (toasts).

use std::time::Duration;
use tracing::warn;

/// Default on-screen lifetime for a toast.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

/// Single-shot, auto-dismissing message with a title and description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub duration: Duration,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            duration: DEFAULT_DURATION,
        }
    }

    /// Shown when a handshake arrives from a device outside the allow-list.
    #[must_use]
    pub fn device_not_registered() -> Self {
        Self::new(
            "Unauthorized",
            "Device not registered. Kindly log in to add this device.",
        )
    }

    #[must_use]
    pub fn logged_out() -> Self {
        Self::new("Logged out", "You have been successfully logged out.")
    }

    /// Lifetime in milliseconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that writes toasts to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        warn!(
            title = %notification.title,
            duration_ms = notification.duration_ms(),
            "{}",
            notification.description
        );
    }
}
