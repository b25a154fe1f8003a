//! Error types for the offboard stack

use crate::{OrgNodeId, ProcessId, StepNumber};

/// Errors from org-hierarchy resolution
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("org node not found: {0}")]
    NodeNotFound(OrgNodeId),
}

/// Result type alias for hierarchy operations
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Errors from process orchestration
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("process not found: {0}")]
    ProcessNotFound(ProcessId),

    #[error("actor {actor} holds permission level {actual}, operation requires {required}")]
    PermissionDenied {
        actor: OrgNodeId,
        required: u8,
        actual: u8,
    },

    #[error("invalid transition for step {step}: {reason}")]
    InvalidTransition { step: StepNumber, reason: String },

    #[error("step {step} payload rejected: {reason}")]
    Validation { step: StepNumber, reason: String },

    #[error("no handler registered for step {0}")]
    HandlerMissing(StepNumber),

    #[error("step {step} handler failed: {message}")]
    StepFailed { step: StepNumber, message: String },

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_message() {
        let err = EngineError::PermissionDenied {
            actor: OrgNodeId::new("emp-1"),
            required: 6,
            actual: 3,
        };
        let message = err.to_string();
        assert!(message.contains("emp-1"));
        assert!(message.contains('6'));
        assert!(message.contains('3'));
    }

    #[test]
    fn test_hierarchy_error_converts() {
        fn lookup() -> EngineResult<()> {
            Err(HierarchyError::NodeNotFound(OrgNodeId::new("ghost")))?;
            Ok(())
        }
        assert!(matches!(
            lookup(),
            Err(EngineError::Hierarchy(HierarchyError::NodeNotFound(_)))
        ));
    }

    #[test]
    fn test_invalid_transition_names_step() {
        let err = EngineError::InvalidTransition {
            step: StepNumber::Anonymization,
            reason: "step 2 is not completed".to_string(),
        };
        assert!(err.to_string().contains("step 3"));
    }
}
