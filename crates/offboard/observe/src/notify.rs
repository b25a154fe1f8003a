//! Notification sinks
//!
//! Delivery is best-effort. Callers log a failed dispatch and move on; a
//! notification must never fail the step that triggered it.

use crate::ObserveResult;
use async_trait::async_trait;
use offboard_types::Notification;
use parking_lot::RwLock;

/// Trait for notification sinks
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Dispatch a notification
    async fn send(&self, notification: Notification) -> ObserveResult<()>;
}

/// In-memory notification sink for tests
#[derive(Default)]
pub struct MemoryNotificationSink {
    sent: RwLock<Vec<Notification>>,
}

impl MemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.read().clone()
    }

    /// Notifications addressed to one recipient
    pub fn sent_to(&self, recipient: &offboard_types::OrgNodeId) -> Vec<Notification> {
        self.sent
            .read()
            .iter()
            .filter(|n| &n.recipient == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn send(&self, notification: Notification) -> ObserveResult<()> {
        self.sent.write().push(notification);
        Ok(())
    }
}

/// Emits notifications to the tracing subscriber
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotificationSink;

impl TracingNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn send(&self, notification: Notification) -> ObserveResult<()> {
        tracing::info!(
            recipient = %notification.recipient,
            kind = %notification.kind,
            priority = ?notification.priority,
            title = %notification.title,
            "notification dispatched"
        );
        Ok(())
    }
}
