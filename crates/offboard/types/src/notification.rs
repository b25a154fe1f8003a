//! Notifications: best-effort messages to interested parties
//!
//! Delivery is never load-bearing. A failed dispatch is logged by the
//! caller and must not fail the operation that triggered it.

use crate::OrgNodeId;
use serde::{Deserialize, Serialize};

/// Delivery priority hint for the downstream channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NotificationPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// A message for a single recipient
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    /// Who receives the message
    pub recipient: OrgNodeId,
    /// Machine-readable kind, e.g. `offboarding_update`
    pub kind: String,
    /// Short headline
    pub title: String,
    /// Human-readable body
    pub message: String,
    /// Structured payload for the receiving channel
    #[serde(default)]
    pub data: serde_json::Value,
    /// Delivery priority
    #[serde(default)]
    pub priority: NotificationPriority,
}

impl Notification {
    pub fn new(
        recipient: OrgNodeId,
        kind: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            kind: kind.into(),
            title: title.into(),
            message: message.into(),
            data: serde_json::Value::Null,
            priority: NotificationPriority::Normal,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }
}
