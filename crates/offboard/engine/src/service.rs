//! The caller-facing service surface
//!
//! One `OffboardingService` is constructed at application start with its
//! collaborators injected, and passed by reference into request handlers.
//! There is no global instance.

use crate::{EngineConfig, HandlerRegistry, ProcessRegistry, ProcessStateMachine, ProcessStore};
use offboard_hierarchy::{
    ApprovalEscalationResolver, ApprovalResolution, HierarchyResolver, OrgDirectory,
};
use offboard_observe::{AuditSink, NotificationSink};
use offboard_types::{
    EngineError, EngineResult, HierarchyError, OrgNodeId, Process, ProcessId, StepNumber,
    StepPayload,
};
use std::sync::Arc;

/// Facade over the registry, state machine, and hierarchy resolvers
pub struct OffboardingService {
    directory: Arc<dyn OrgDirectory>,
    hierarchy: HierarchyResolver,
    approvals: ApprovalEscalationResolver,
    registry: Arc<ProcessRegistry>,
    machine: ProcessStateMachine,
}

impl OffboardingService {
    pub fn new(
        directory: Arc<dyn OrgDirectory>,
        store: Arc<dyn ProcessStore>,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn NotificationSink>,
        handlers: HandlerRegistry,
        config: EngineConfig,
    ) -> Self {
        let hierarchy = HierarchyResolver::new(directory.clone());
        let approvals = ApprovalEscalationResolver::new(hierarchy.clone());
        let registry = Arc::new(ProcessRegistry::new(store, audit.clone(), config.clone()));
        let machine = ProcessStateMachine::new(
            registry.clone(),
            directory.clone(),
            handlers,
            audit,
            notifier,
            config,
        );
        Self {
            directory,
            hierarchy,
            approvals,
            registry,
            machine,
        }
    }

    /// Start a process against `subject`, initiated by `initiator`.
    ///
    /// Both must exist in the directory; the initiator must hold the
    /// required permission level.
    pub async fn start_process(
        &self,
        subject: OrgNodeId,
        initiator: OrgNodeId,
    ) -> EngineResult<ProcessId> {
        if !self.directory.contains(&subject) {
            return Err(HierarchyError::NodeNotFound(subject).into());
        }
        let initiator = self.hierarchy.require(&initiator)?;
        let process = self.registry.create(subject, &initiator).await?;
        Ok(process.id)
    }

    /// Execute one step of a process
    pub async fn execute_step(
        &self,
        process_id: &ProcessId,
        step: StepNumber,
        actor: &OrgNodeId,
        payload: StepPayload,
    ) -> EngineResult<()> {
        self.machine
            .execute_step(process_id, step, actor, payload)
            .await
    }

    /// Point-in-time snapshot of one process
    pub async fn process_state(&self, process_id: &ProcessId) -> EngineResult<Process> {
        self.registry
            .get(process_id)
            .await
            .ok_or_else(|| EngineError::ProcessNotFound(process_id.clone()))
    }

    /// Snapshots of every process
    pub async fn list_processes(&self) -> Vec<Process> {
        self.registry.list_all().await
    }

    /// Snapshots of the subject's processes
    pub async fn list_by_subject(&self, subject: &OrgNodeId) -> Vec<Process> {
        self.registry.list_by_subject(subject).await
    }

    /// Whether `actor` can approve `amount` unilaterally
    pub fn can_approve_budget(&self, actor: &OrgNodeId, amount: u64) -> EngineResult<bool> {
        Ok(self.approvals.can_approve(actor, amount)?)
    }

    /// Resolve the approval question for `actor` and `amount`; see
    /// [`ApprovalResolution`] for the three outcomes.
    pub fn next_approver(
        &self,
        actor: &OrgNodeId,
        amount: u64,
    ) -> EngineResult<ApprovalResolution> {
        Ok(self.approvals.resolve(actor, amount)?)
    }

    /// The underlying hierarchy resolver, for chain and subtree queries
    pub fn hierarchy(&self) -> &HierarchyResolver {
        &self.hierarchy
    }
}
