//! User notifications.
//!
//! Ledger operations report their outcome as a `(message, severity)` pair. Rendering the message
//! is up to whoever implements `Notifier`; the CLI routes them to the log.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// How a notification should be presented to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

serde_plain::derive_display_from_serialize!(Severity);
serde_plain::derive_fromstr_from_deserialize!(Severity);

/// A message meant for the user.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    message: String,
    severity: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// Receives notifications. Implementations must not fail.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        let message = notification.message();
        match notification.severity() {
            Severity::Error => error!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Success | Severity::Info => info!("{message}"),
        }
    }
}

/// Keeps every notification it receives, in order.
#[derive(Debug, Default)]
pub struct Recorder {
    received: std::sync::Mutex<Vec<Notification>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far.
    pub fn received(&self) -> Vec<Notification> {
        match self.received.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The most recent notification, if any.
    pub fn last(&self) -> Option<Notification> {
        self.received().pop()
    }
}

impl Notifier for Recorder {
    fn notify(&self, notification: &Notification) {
        match self.received.lock() {
            Ok(mut guard) => guard.push(notification.clone()),
            Err(poisoned) => poisoned.into_inner().push(notification.clone()),
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Success.to_string(), "success");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
    }

    #[test]
    fn test_recorder_keeps_order() {
        let recorder = Recorder::new();
        recorder.notify(&Notification::info("first"));
        recorder.notify(&Notification::error("second"));
        let received = recorder.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].message(), "first");
        assert_eq!(recorder.last().unwrap().severity(), Severity::Error);
    }
}
