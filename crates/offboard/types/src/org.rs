//! Org nodes: positions in the organization tree
//!
//! The parent graph is a forest. Traversal code must still defend against
//! cycles; a malformed directory import can produce them.

use crate::OrgNodeId;
use serde::{Deserialize, Serialize};

/// A position in the organization tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgNode {
    /// Directory identifier
    pub id: OrgNodeId,
    /// Display name, carried into audit records
    pub name: String,
    /// Integer rank, monotonically increasing with authority
    pub permission_level: u8,
    /// Maximum amount this node may approve unilaterally; absent = unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<u64>,
    /// Single parent reference; absent at the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<OrgNodeId>,
    /// Direct child references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OrgNodeId>,
}

impl OrgNode {
    /// Create a node with no parent, no children, and an unlimited budget
    pub fn new(
        id: impl Into<OrgNodeId>,
        name: impl Into<String>,
        permission_level: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permission_level,
            budget_limit: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<OrgNodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_budget_limit(mut self, limit: u64) -> Self {
        self.budget_limit = Some(limit);
        self
    }

    pub fn with_children(mut self, children: Vec<OrgNodeId>) -> Self {
        self.children = children;
        self
    }

    /// Check if this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True iff the budget limit is absent (unconstrained) or covers `amount`
    pub fn can_approve(&self, amount: u64) -> bool {
        match self.budget_limit {
            Some(limit) => amount <= limit,
            None => true,
        }
    }
}
