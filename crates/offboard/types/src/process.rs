//! Processes: running offboarding executions
//!
//! A `Process` is owned exclusively by the registry and mutated only under
//! the state machine's per-process critical section. The cursor only
//! advances; nothing here ever moves it backwards.

use crate::{OrgNodeId, ProcessId, StepCursor, StepNumber, StepPayload, StepState, StepStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One instance of the four-step offboarding applied to a single subject
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Process {
    /// Unique process identifier, generated at creation
    pub id: ProcessId,
    /// The entity being offboarded
    pub subject: OrgNodeId,
    /// Who started the process
    pub initiator: OrgNodeId,
    /// Current position: a step in 1–4, or terminal
    pub cursor: StepCursor,
    /// Per-step state, always populated for all four steps
    pub steps: BTreeMap<StepNumber, StepState>,
    /// When the process was created
    pub created_at: DateTime<Utc>,
    /// When the process was last mutated
    pub updated_at: DateTime<Utc>,
    /// Set iff step 4 completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Process {
    /// Create a fresh process: step 1 pending, steps 2–4 blocked
    pub fn new(subject: OrgNodeId, initiator: OrgNodeId) -> Self {
        let now = Utc::now();
        let mut steps = BTreeMap::new();
        steps.insert(StepNumber::Deactivation, StepState::pending());
        steps.insert(StepNumber::Revocation, StepState::blocked());
        steps.insert(StepNumber::Anonymization, StepState::blocked());
        steps.insert(StepNumber::Closure, StepState::blocked());
        Self {
            id: ProcessId::generate(),
            subject,
            initiator,
            cursor: StepCursor::At(StepNumber::Deactivation),
            steps,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// State of one step
    pub fn step(&self, number: StepNumber) -> Option<&StepState> {
        self.steps.get(&number)
    }

    fn step_mut(&mut self, number: StepNumber) -> &mut StepState {
        self.steps.entry(number).or_insert_with(StepState::blocked)
    }

    /// The guard: whether `number` may execute right now.
    ///
    /// Step 1 may execute whenever it is not already completed. A later step
    /// may execute only once its predecessor completed and it has not
    /// completed itself.
    pub fn can_execute(&self, number: StepNumber) -> bool {
        let current = match self.step(number) {
            Some(state) => state,
            None => return false,
        };
        if current.is_completed() {
            return false;
        }
        match number.previous() {
            None => true,
            Some(previous) => self
                .step(previous)
                .map(|state| state.is_completed())
                .unwrap_or(false),
        }
    }

    /// Why the guard rejects `number`, for error reporting
    pub fn rejection_reason(&self, number: StepNumber) -> String {
        if self.step(number).map(|s| s.is_completed()).unwrap_or(false) {
            return format!("step {} already completed", number);
        }
        match number.previous() {
            Some(previous) => format!("step {} is not completed", previous),
            None => "step is not executable".to_string(),
        }
    }

    /// Move a step into `InProgress` and position the cursor on it
    pub fn begin_step(&mut self, number: StepNumber) {
        let state = self.step_mut(number);
        state.status = StepStatus::InProgress;
        self.cursor = StepCursor::At(number);
        self.updated_at = Utc::now();
    }

    /// Add handler invocations to the step's attempt counter
    pub fn record_attempts(&mut self, number: StepNumber, invocations: u32) {
        let state = self.step_mut(number);
        state.attempts = state.attempts.saturating_add(invocations);
    }

    /// Record a handler failure; the step stays re-executable
    pub fn fail_step(&mut self, number: StepNumber, message: impl Into<String>) {
        let state = self.step_mut(number);
        state.status = StepStatus::Error;
        state.errors.push(message.into());
        self.updated_at = Utc::now();
    }

    /// Record a non-fatal observation on a step
    pub fn warn_step(&mut self, number: StepNumber, message: impl Into<String>) {
        self.step_mut(number).warnings.push(message.into());
    }

    /// Complete a step: stamp the outcome, unblock the successor or, on the
    /// last step, close the process and park the cursor on the terminal
    /// marker.
    pub fn complete_step(
        &mut self,
        number: StepNumber,
        actor: OrgNodeId,
        payload: StepPayload,
    ) {
        let now = Utc::now();
        let state = self.step_mut(number);
        state.status = StepStatus::Completed;
        state.completed_at = Some(now);
        state.completed_by = Some(actor);
        state.payload = Some(payload);

        match number.next() {
            Some(next) => {
                let successor = self.step_mut(next);
                if successor.status == StepStatus::Blocked {
                    successor.status = StepStatus::Pending;
                }
                self.cursor = StepCursor::At(next);
            }
            None => {
                self.completed_at = Some(now);
                self.cursor = StepCursor::Terminal;
            }
        }
        self.updated_at = now;
    }

    /// Check if the process reached its terminal state
    pub fn is_terminal(&self) -> bool {
        self.cursor.is_terminal()
    }

    /// The step currently `InProgress`, if any
    pub fn in_progress_step(&self) -> Option<StepNumber> {
        self.steps
            .iter()
            .find(|(_, state)| state.status == StepStatus::InProgress)
            .map(|(number, _)| *number)
    }
}
