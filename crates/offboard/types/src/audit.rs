//! Audit records: immutable evidence of privileged operations
//!
//! Records are append-only and owned by whatever sink receives them. The
//! engine emits one per process-level event and per step completion or
//! failure.

use crate::{OrgNodeId, ProcessId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Risk tier attached to an audited operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

/// An immutable record of an attempted or completed privileged operation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record id
    pub id: Uuid,
    /// The process this record belongs to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessId>,
    /// 1-based step position; 0 for process-level events
    pub step: u8,
    /// The entity being acted upon
    pub subject: OrgNodeId,
    /// Who performed the operation
    pub actor: OrgNodeId,
    /// Actor display name at the time of the operation
    pub actor_name: String,
    /// When the operation happened
    pub timestamp: DateTime<Utc>,
    /// Operation tag, e.g. `STEP_2_COMPLETED` or `PROCESS_STARTED`
    pub operation: String,
    /// Opaque detail payload
    #[serde(default)]
    pub details: serde_json::Value,
    /// Risk tier of the operation
    pub risk: RiskTier,
}

impl AuditRecord {
    pub fn new(
        subject: OrgNodeId,
        actor: OrgNodeId,
        actor_name: impl Into<String>,
        operation: impl Into<String>,
        risk: RiskTier,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            process: None,
            step: 0,
            subject,
            actor,
            actor_name: actor_name.into(),
            timestamp: Utc::now(),
            operation: operation.into(),
            details: serde_json::Value::Null,
            risk,
        }
    }

    pub fn with_process(mut self, process: ProcessId) -> Self {
        self.process = Some(process);
        self
    }

    pub fn with_step(mut self, step: u8) -> Self {
        self.step = step;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Check if this is a process-level event rather than a step event
    pub fn is_process_level(&self) -> bool {
        self.step == 0
    }
}
