//! Steps: the four ordered stages of an offboarding process
//!
//! Step 1 starts `Pending`; steps 2–4 start `Blocked` and are unblocked one
//! at a time as their predecessor completes. `Error` is not terminal; an
//! errored step stays re-executable.

use crate::{OrgNodeId, StepPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Step Number ──────────────────────────────────────────────────────

/// One of the four ordered stages, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepNumber {
    /// Step 1: account deactivation
    Deactivation,
    /// Step 2: permission revocation and handover
    Revocation,
    /// Step 3: authored-content anonymization
    Anonymization,
    /// Step 4: final notification and record closure
    Closure,
}

impl StepNumber {
    /// All steps in execution order
    pub const ALL: [StepNumber; 4] = [
        StepNumber::Deactivation,
        StepNumber::Revocation,
        StepNumber::Anonymization,
        StepNumber::Closure,
    ];

    /// 1-based position, the wire representation
    pub fn index(self) -> u8 {
        match self {
            StepNumber::Deactivation => 1,
            StepNumber::Revocation => 2,
            StepNumber::Anonymization => 3,
            StepNumber::Closure => 4,
        }
    }

    /// Parse a 1-based position
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(StepNumber::Deactivation),
            2 => Some(StepNumber::Revocation),
            3 => Some(StepNumber::Anonymization),
            4 => Some(StepNumber::Closure),
            _ => None,
        }
    }

    /// The step after this one, if any
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The step before this one, if any
    pub fn previous(self) -> Option<Self> {
        match self {
            StepNumber::Deactivation => None,
            other => Self::from_index(other.index() - 1),
        }
    }

    pub fn is_first(self) -> bool {
        self == StepNumber::Deactivation
    }

    pub fn is_last(self) -> bool {
        self == StepNumber::Closure
    }
}

impl fmt::Display for StepNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

// ── Step Status ──────────────────────────────────────────────────────

/// Execution status of a single step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StepStatus {
    /// Waiting on the previous step
    #[default]
    Blocked,
    /// Unblocked and ready to execute
    Pending,
    /// Handler currently running
    InProgress,
    /// Successfully completed; re-entry is rejected
    Completed,
    /// Handler failed; the step remains re-executable
    Error,
}

impl StepStatus {
    pub fn is_completed(self) -> bool {
        self == StepStatus::Completed
    }
}

// ── Step Cursor ──────────────────────────────────────────────────────

/// The process's position: a step in 1–4, or the terminal marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepCursor {
    /// Positioned at a step
    At(StepNumber),
    /// All four steps completed; distinct from any step value
    Terminal,
}

impl StepCursor {
    pub fn is_terminal(self) -> bool {
        self == StepCursor::Terminal
    }

    /// The current step, if not terminal
    pub fn position(self) -> Option<StepNumber> {
        match self {
            StepCursor::At(step) => Some(step),
            StepCursor::Terminal => None,
        }
    }
}

impl fmt::Display for StepCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepCursor::At(step) => write!(f, "{}", step),
            StepCursor::Terminal => write!(f, "terminal"),
        }
    }
}

// ── Step State ───────────────────────────────────────────────────────

/// Runtime state of one step within a process
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepState {
    /// Current status
    pub status: StepStatus,
    /// When the step completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Who completed the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<OrgNodeId>,
    /// The payload the step completed with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<StepPayload>,
    /// Handler failure messages, most recent last
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Non-fatal observations (e.g. completion after retries)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Handler invocations across all executions of this step
    #[serde(default)]
    pub attempts: u32,
}

impl StepState {
    /// Initial state for steps 2–4
    pub fn blocked() -> Self {
        Self {
            status: StepStatus::Blocked,
            completed_at: None,
            completed_by: None,
            payload: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            attempts: 0,
        }
    }

    /// Initial state for step 1
    pub fn pending() -> Self {
        Self {
            status: StepStatus::Pending,
            ..Self::blocked()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_ordering() {
        assert_eq!(StepNumber::Deactivation.index(), 1);
        assert_eq!(StepNumber::Closure.index(), 4);
        assert_eq!(StepNumber::Deactivation.next(), Some(StepNumber::Revocation));
        assert_eq!(StepNumber::Closure.next(), None);
        assert_eq!(StepNumber::Deactivation.previous(), None);
        assert_eq!(StepNumber::Closure.previous(), Some(StepNumber::Anonymization));
        assert!(StepNumber::Deactivation.is_first());
        assert!(StepNumber::Closure.is_last());
        assert!(!StepNumber::Revocation.is_first());
        assert!(!StepNumber::Revocation.is_last());
    }

    #[test]
    fn test_from_index_bounds() {
        assert_eq!(StepNumber::from_index(0), None);
        assert_eq!(StepNumber::from_index(1), Some(StepNumber::Deactivation));
        assert_eq!(StepNumber::from_index(4), Some(StepNumber::Closure));
        assert_eq!(StepNumber::from_index(5), None);
    }

    #[test]
    fn test_all_matches_indices() {
        for (i, step) in StepNumber::ALL.iter().enumerate() {
            assert_eq!(step.index() as usize, i + 1);
        }
    }

    #[test]
    fn test_cursor_terminal_is_not_a_step() {
        let cursor = StepCursor::Terminal;
        assert!(cursor.is_terminal());
        assert_eq!(cursor.position(), None);
        for step in StepNumber::ALL {
            assert_ne!(cursor, StepCursor::At(step));
        }
    }

    #[test]
    fn test_initial_states() {
        assert_eq!(StepState::pending().status, StepStatus::Pending);
        assert_eq!(StepState::blocked().status, StepStatus::Blocked);
        assert_eq!(StepState::blocked().attempts, 0);
    }
}
