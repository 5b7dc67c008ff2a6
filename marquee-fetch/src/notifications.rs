//! Notification and loading-indicator sinks.
//!
//! Everything here is fire-and-forget: the coordinator never waits on a
//! sink and ignores delivery failures.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Retry,
    Reconnect,
    Dismiss,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub action: Option<NotificationAction>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Signals sent towards the UI.
#[derive(Debug, Clone)]
pub enum UiSignal {
    Notification(Notification),
    LoadingStarted,
    LoadingFinished,
}

pub trait Notifier: Send + Sync {
    /// Show a transient banner.
    fn notify(&self, notification: Notification);

    /// A request started; drives the global loading indicator.
    fn loading_started(&self) {}

    /// A request settled, successfully or not.
    fn loading_finished(&self) {}
}

#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => tracing::error!(message = %notification.message, "Notification"),
            NotificationLevel::Warning => tracing::warn!(message = %notification.message, "Notification"),
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(message = %notification.message, "Notification")
            }
        }
    }
}

/// Forwards signals over a bounded channel; drops them when it is full.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<UiSignal>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::Sender<UiSignal>) -> Self {
        Self { sender }
    }

    fn send(&self, signal: UiSignal) {
        if let Err(err) = self.sender.try_send(signal) {
            tracing::debug!(error = %err, "UI signal dropped");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        self.send(UiSignal::Notification(notification));
    }

    fn loading_started(&self) {
        self.send(UiSignal::LoadingStarted);
    }

    fn loading_finished(&self) {
        self.send(UiSignal::LoadingFinished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_forwards_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let notifier = ChannelNotifier::new(tx);
        notifier.loading_started();
        notifier.notify(
            Notification::new(NotificationLevel::Warning, "offline")
                .with_action(NotificationAction::Reconnect),
        );
        notifier.loading_finished();

        assert!(matches!(rx.try_recv(), Ok(UiSignal::LoadingStarted)));
        match rx.try_recv() {
            Ok(UiSignal::Notification(n)) => {
                assert_eq!(n.level, NotificationLevel::Warning);
                assert_eq!(n.action, Some(NotificationAction::Reconnect));
            }
            other => panic!("unexpected signal: {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Ok(UiSignal::LoadingFinished)));
    }

    #[test]
    fn test_full_channel_drops_silently() {
        let (tx, _rx) = mpsc::channel(1);
        let notifier = ChannelNotifier::new(tx);
        notifier.loading_started();
        notifier.loading_started();
    }
}
