//! Step payloads: a tagged union keyed by step number
//!
//! Each step carries its own strongly-typed fields, so a payload of the
//! wrong shape is rejected before any side effect runs. Per-variant rules
//! live in [`StepPayload::validate`].

use crate::{OrgNodeId, StepNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The typed payload for one step execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepPayload {
    Deactivation(DeactivationPayload),
    Revocation(RevocationPayload),
    Anonymization(AnonymizationPayload),
    Closure(ClosurePayload),
}

impl StepPayload {
    /// The step this payload belongs to
    pub fn step(&self) -> StepNumber {
        match self {
            StepPayload::Deactivation(_) => StepNumber::Deactivation,
            StepPayload::Revocation(_) => StepNumber::Revocation,
            StepPayload::Anonymization(_) => StepNumber::Anonymization,
            StepPayload::Closure(_) => StepNumber::Closure,
        }
    }

    /// Apply the per-variant validation rules
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StepPayload::Deactivation(p) => p.validate(),
            StepPayload::Revocation(p) => p.validate(),
            StepPayload::Anonymization(p) => p.validate(),
            StepPayload::Closure(p) => p.validate(),
        }
    }
}

// ── Step 1: Deactivation ─────────────────────────────────────────────

/// Payload for account deactivation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeactivationPayload {
    /// Deferred deactivation time; absent = immediate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivate_at: Option<DateTime<Utc>>,
    /// Terminate all active sessions now
    pub force_logout: bool,
    /// Disconnect third-party integrations owned by the subject
    pub disable_integrations: bool,
}

impl DeactivationPayload {
    pub fn immediate() -> Self {
        Self {
            deactivate_at: None,
            force_logout: true,
            disable_integrations: true,
        }
    }

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

// ── Step 2: Revocation ───────────────────────────────────────────────

/// A single permission marked for revocation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevokedPermission {
    /// Permission key as the directory knows it
    pub key: String,
    /// Critical permissions require a designated handover assignee
    pub critical: bool,
}

impl RevokedPermission {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            critical: false,
        }
    }

    pub fn critical(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            critical: true,
        }
    }
}

/// Payload for permission revocation and handover
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevocationPayload {
    /// Permissions to revoke from the subject
    pub revoked: Vec<RevokedPermission>,
    /// Permission key → assignee taking it over
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub handover: HashMap<String, OrgNodeId>,
}

impl RevocationPayload {
    fn validate(&self) -> Result<(), String> {
        for permission in &self.revoked {
            if permission.critical && !self.handover.contains_key(&permission.key) {
                return Err(format!(
                    "critical permission '{}' has no handover assignee",
                    permission.key
                ));
            }
        }
        Ok(())
    }
}

// ── Step 3: Anonymization ────────────────────────────────────────────

/// Payload for authored-content anonymization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationPayload {
    /// Also scrub the body of authored content, not just attribution
    pub scrub_authored_content: bool,
    /// Label shown in place of the subject's name
    pub replacement_label: String,
    /// Keep references from existing audit records intact
    pub retain_audit_references: bool,
}

impl AnonymizationPayload {
    fn validate(&self) -> Result<(), String> {
        if self.replacement_label.trim().is_empty() {
            return Err("replacement label must not be empty".to_string());
        }
        Ok(())
    }
}

// ── Step 4: Closure ──────────────────────────────────────────────────

/// Payload for final notification and record closure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosurePayload {
    /// Who is informed that the process finished
    pub notify: Vec<OrgNodeId>,
    /// Optional note included in the closing notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farewell_note: Option<String>,
}

impl ClosurePayload {
    fn validate(&self) -> Result<(), String> {
        if self.notify.is_empty() {
            return Err("closure requires at least one notification recipient".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_step_mapping() {
        let payload = StepPayload::Deactivation(DeactivationPayload::immediate());
        assert_eq!(payload.step(), StepNumber::Deactivation);

        let payload = StepPayload::Closure(ClosurePayload {
            notify: vec![OrgNodeId::new("mgr")],
            farewell_note: None,
        });
        assert_eq!(payload.step(), StepNumber::Closure);
    }

    #[test]
    fn test_critical_permission_requires_handover() {
        let payload = RevocationPayload {
            revoked: vec![
                RevokedPermission::new("wiki.edit"),
                RevokedPermission::critical("billing.admin"),
            ],
            handover: HashMap::new(),
        };
        let err = StepPayload::Revocation(payload).validate().unwrap_err();
        assert!(err.contains("billing.admin"));
    }

    #[test]
    fn test_critical_permission_with_handover_passes() {
        let mut handover = HashMap::new();
        handover.insert("billing.admin".to_string(), OrgNodeId::new("mgr"));
        let payload = RevocationPayload {
            revoked: vec![RevokedPermission::critical("billing.admin")],
            handover,
        };
        assert!(StepPayload::Revocation(payload).validate().is_ok());
    }

    #[test]
    fn test_non_critical_permissions_need_no_handover() {
        let payload = RevocationPayload {
            revoked: vec![RevokedPermission::new("wiki.edit")],
            handover: HashMap::new(),
        };
        assert!(StepPayload::Revocation(payload).validate().is_ok());
    }

    #[test]
    fn test_blank_replacement_label_rejected() {
        let payload = AnonymizationPayload {
            scrub_authored_content: false,
            replacement_label: "   ".to_string(),
            retain_audit_references: true,
        };
        assert!(StepPayload::Anonymization(payload).validate().is_err());
    }

    #[test]
    fn test_closure_requires_recipients() {
        let payload = ClosurePayload {
            notify: vec![],
            farewell_note: Some("So long".to_string()),
        };
        assert!(StepPayload::Closure(payload).validate().is_err());
    }

    #[test]
    fn test_payload_serialization_tags_step() {
        let payload = StepPayload::Deactivation(DeactivationPayload::immediate());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["step"], "deactivation");
    }
}
