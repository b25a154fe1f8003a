//! The guarded four-step state machine
//!
//! `execute_step` is the only write path for step state. Checks run in a
//! fixed order (existence, permission, guard, payload) and every check
//! fires before any mutation. The whole sequence runs under the process's
//! lock, so two concurrent calls on the same process cannot both pass the
//! guard.
//!
//! Handler failure leaves the step in a persisted `Error` state and is
//! re-raised after being audit-logged. No compensation or rollback is
//! performed; re-running the step re-runs the full handler.

use crate::handler::run_with_policy;
use crate::{EngineConfig, HandlerRegistry, ProcessRegistry};
use offboard_hierarchy::OrgDirectory;
use offboard_observe::{AuditSink, NotificationSink};
use offboard_types::{
    AuditRecord, EngineError, EngineResult, HierarchyError, Notification, NotificationPriority,
    OrgNode, OrgNodeId, Process, ProcessId, RiskTier, StepNumber, StepPayload,
};
use std::sync::Arc;

/// Drives processes through their four steps
pub struct ProcessStateMachine {
    registry: Arc<ProcessRegistry>,
    directory: Arc<dyn OrgDirectory>,
    handlers: HandlerRegistry,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn NotificationSink>,
    config: EngineConfig,
}

impl ProcessStateMachine {
    pub fn new(
        registry: Arc<ProcessRegistry>,
        directory: Arc<dyn OrgDirectory>,
        handlers: HandlerRegistry,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            directory,
            handlers,
            audit,
            notifier,
            config,
        }
    }

    /// Execute step `step` of `process_id` as `actor_id`.
    ///
    /// On success the step is completed and its successor unblocked; after
    /// step 4 the process is terminal. On handler failure the step stays
    /// re-executable and the error is returned to the caller.
    pub async fn execute_step(
        &self,
        process_id: &ProcessId,
        step: StepNumber,
        actor_id: &OrgNodeId,
        payload: StepPayload,
    ) -> EngineResult<()> {
        let handle = self
            .registry
            .handle(process_id)
            .await
            .ok_or_else(|| EngineError::ProcessNotFound(process_id.clone()))?;

        let actor = self
            .directory
            .node(actor_id)
            .ok_or_else(|| HierarchyError::NodeNotFound(actor_id.clone()))?;

        // Critical section: checks and mutation are not interleavable with
        // another execute_step on the same process.
        let mut process = handle.lock().await;

        if actor.permission_level < self.config.required_level {
            return Err(EngineError::PermissionDenied {
                actor: actor.id,
                required: self.config.required_level,
                actual: actor.permission_level,
            });
        }

        if !process.can_execute(step) {
            return Err(EngineError::InvalidTransition {
                step,
                reason: process.rejection_reason(step),
            });
        }

        if payload.step() != step {
            return Err(EngineError::Validation {
                step,
                reason: format!("payload belongs to step {}", payload.step()),
            });
        }
        if let Err(reason) = payload.validate() {
            return Err(EngineError::Validation { step, reason });
        }

        let handler = self
            .handlers
            .get(step)
            .ok_or(EngineError::HandlerMissing(step))?;

        process.begin_step(step);
        tracing::info!(
            process_id = %process_id,
            step = %step,
            actor = %actor.id,
            "step execution started"
        );

        let outcome = run_with_policy(handler.as_ref(), step, &process, &payload, &self.config).await;
        process.record_attempts(step, outcome.attempts);

        if let Some(message) = outcome.failure {
            process.fail_step(step, message.clone());
            tracing::error!(
                process_id = %process_id,
                step = %step,
                attempts = outcome.attempts,
                error = %message,
                "step handler failed"
            );
            self.record_audit(
                &process,
                &actor,
                step,
                format!("STEP_{}_ERROR", step),
                RiskTier::High,
                serde_json::json!({ "error": message.as_str(), "attempts": outcome.attempts }),
            )
            .await;
            return Err(EngineError::StepFailed { step, message });
        }

        if outcome.attempts > 1 {
            process.warn_step(step, format!("completed after {} attempts", outcome.attempts));
        }
        process.complete_step(step, actor.id.clone(), payload);

        self.record_audit(
            &process,
            &actor,
            step,
            format!("STEP_{}_COMPLETED", step),
            step_risk(step),
            serde_json::json!({ "attempts": outcome.attempts }),
        )
        .await;

        self.notify_initiator(&process, step).await;

        tracing::info!(
            process_id = %process_id,
            step = %step,
            cursor = %process.cursor,
            "step completed"
        );
        if process.is_terminal() {
            tracing::info!(
                process_id = %process_id,
                subject = %process.subject,
                "offboarding process completed"
            );
        }

        Ok(())
    }

    async fn record_audit(
        &self,
        process: &Process,
        actor: &OrgNode,
        step: StepNumber,
        operation: String,
        risk: RiskTier,
        details: serde_json::Value,
    ) {
        let record = AuditRecord::new(
            process.subject.clone(),
            actor.id.clone(),
            actor.name.clone(),
            operation,
            risk,
        )
        .with_process(process.id.clone())
        .with_step(step.index())
        .with_details(details);

        if let Err(error) = self.audit.record(record).await {
            tracing::warn!(process_id = %process.id, %error, "audit write failed");
        }
    }

    /// Best-effort: a failed dispatch is logged, never propagated.
    async fn notify_initiator(&self, process: &Process, step: StepNumber) {
        let notification = if process.is_terminal() {
            Notification::new(
                process.initiator.clone(),
                "offboarding_update",
                "Offboarding completed",
                format!("Offboarding of {} finished", process.subject),
            )
            .with_priority(NotificationPriority::High)
        } else {
            Notification::new(
                process.initiator.clone(),
                "offboarding_update",
                format!("Offboarding step {} completed", step),
                format!("Step {} of 4 completed for {}", step, process.subject),
            )
        }
        .with_data(serde_json::json!({
            "process_id": process.id.to_string(),
            "step": step.index(),
        }));

        if let Err(error) = self.notifier.send(notification).await {
            tracing::warn!(
                process_id = %process.id,
                recipient = %process.initiator,
                %error,
                "notification dispatch failed"
            );
        }
    }
}

/// Risk tier per completed step, ordered by irreversibility of the side
/// effect: anonymization cannot be undone at all.
fn step_risk(step: StepNumber) -> RiskTier {
    match step {
        StepNumber::Deactivation => RiskTier::High,
        StepNumber::Revocation => RiskTier::High,
        StepNumber::Anonymization => RiskTier::Critical,
        StepNumber::Closure => RiskTier::Medium,
    }
}
