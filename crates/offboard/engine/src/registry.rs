//! Process registry: creation behind the permission gate, snapshot queries
//!
//! The registry owns process records through the [`ProcessStore`]
//! abstraction. Creation is the only write here; all step mutation goes
//! through the state machine.

use crate::{EngineConfig, ProcessHandle, ProcessStore};
use offboard_observe::AuditSink;
use offboard_types::{
    AuditRecord, EngineError, EngineResult, OrgNode, OrgNodeId, Process, ProcessId, RiskTier,
};
use std::sync::Arc;

/// Concurrency-safe store of in-flight processes
pub struct ProcessRegistry {
    store: Arc<dyn ProcessStore>,
    audit: Arc<dyn AuditSink>,
    config: EngineConfig,
}

impl ProcessRegistry {
    pub fn new(
        store: Arc<dyn ProcessStore>,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            audit,
            config,
        }
    }

    /// Create a process for `subject`, initiated by `initiator`.
    ///
    /// The initiator must hold the required permission level; on failure no
    /// record is created.
    pub async fn create(
        &self,
        subject: OrgNodeId,
        initiator: &OrgNode,
    ) -> EngineResult<Process> {
        if initiator.permission_level < self.config.required_level {
            return Err(EngineError::PermissionDenied {
                actor: initiator.id.clone(),
                required: self.config.required_level,
                actual: initiator.permission_level,
            });
        }

        let process = Process::new(subject.clone(), initiator.id.clone());

        let record = AuditRecord::new(
            subject,
            initiator.id.clone(),
            initiator.name.clone(),
            "PROCESS_STARTED",
            RiskTier::High,
        )
        .with_process(process.id.clone());
        if let Err(error) = self.audit.record(record).await {
            tracing::warn!(process_id = %process.id, %error, "audit write failed");
        }

        tracing::info!(
            process_id = %process.id,
            subject = %process.subject,
            initiator = %process.initiator,
            "offboarding process created"
        );

        self.store.insert(process.clone()).await;
        Ok(process)
    }

    /// Live handle for the state machine's critical section
    pub async fn handle(&self, id: &ProcessId) -> Option<ProcessHandle> {
        self.store.get(id).await
    }

    /// Point-in-time snapshot of one process
    pub async fn get(&self, id: &ProcessId) -> Option<Process> {
        match self.store.get(id).await {
            Some(handle) => Some(handle.lock().await.clone()),
            None => None,
        }
    }

    /// Snapshots of every process
    pub async fn list_all(&self) -> Vec<Process> {
        self.store.list().await
    }

    /// Snapshots of the subject's processes
    pub async fn list_by_subject(&self, subject: &OrgNodeId) -> Vec<Process> {
        self.store.list_by_subject(subject).await
    }
}
