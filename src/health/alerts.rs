//! Alert notifier collaborators.
//!
//! The aggregator only depends on [`AlertNotifier`]. Delivery is best-effort:
//! a failed notification is logged by the caller and never changes a status.

use super::errors::NotifierError;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub critical_failures: usize,
    pub duration_ms: u64,
}

#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send_alert(&self, alert: &Alert) -> Result<(), NotifierError>;
}

/// Emits alerts as error-level tracing events.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl AlertNotifier for LogNotifier {
    async fn send_alert(&self, alert: &Alert) -> Result<(), NotifierError> {
        tracing::error!(
            critical_failures = alert.critical_failures,
            duration_ms = alert.duration_ms,
            "{}",
            alert.message
        );
        Ok(())
    }
}

/// Used when alerting is switched off in configuration.
#[derive(Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl AlertNotifier for DisabledNotifier {
    async fn send_alert(&self, _alert: &Alert) -> Result<(), NotifierError> {
        Ok(())
    }
}

pub mod mock {
    use super::*;
    use tokio::sync::mpsc;

    /// Forwards every alert into a channel so tests can count them.
    pub struct ChannelNotifier {
        sender: mpsc::UnboundedSender<Alert>,
        fail: bool,
    }

    impl ChannelNotifier {
        pub fn new() -> (Self, mpsc::UnboundedReceiver<Alert>) {
            let (sender, receiver) = mpsc::unbounded_channel();
            (Self { sender, fail: false }, receiver)
        }

        /// Records the alert, then reports a delivery failure.
        pub fn failing() -> (Self, mpsc::UnboundedReceiver<Alert>) {
            let (sender, receiver) = mpsc::unbounded_channel();
            (Self { sender, fail: true }, receiver)
        }
    }

    #[async_trait]
    impl AlertNotifier for ChannelNotifier {
        async fn send_alert(&self, alert: &Alert) -> Result<(), NotifierError> {
            let _ = self.sender.send(alert.clone());
            if self.fail {
                return Err(NotifierError::Delivery("webhook unreachable".to_string()));
            }
            Ok(())
        }
    }
}
