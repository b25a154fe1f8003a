//! Budget approval escalation
//!
//! Resolves whether an actor can approve an amount and, if not, finds the
//! nearest ancestor who can. The resolver returns decisions, not actions;
//! acting on an escalation is the caller's job.

use crate::HierarchyResolver;
use offboard_types::{HierarchyResult, OrgNode, OrgNodeId};
use std::collections::HashSet;

/// Outcome of an approval escalation request
#[derive(Clone, Debug, PartialEq)]
pub enum ApprovalResolution {
    /// The actor can approve the amount; no escalation is needed
    AlreadyAuthorized,
    /// The nearest ancestor who can approve the amount
    Escalated(OrgNode),
    /// The chain is exhausted and nobody can approve. A normal, expected
    /// outcome: surface it as "no approver available", never swallow it.
    Exhausted,
}

impl ApprovalResolution {
    /// The escalation target, if one was found
    pub fn approver(self) -> Option<OrgNode> {
        match self {
            ApprovalResolution::Escalated(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        *self == ApprovalResolution::Exhausted
    }
}

/// Resolves approval authority through the management chain
#[derive(Clone)]
pub struct ApprovalEscalationResolver {
    hierarchy: HierarchyResolver,
}

impl ApprovalEscalationResolver {
    pub fn new(hierarchy: HierarchyResolver) -> Self {
        Self { hierarchy }
    }

    /// True iff the actor's budget limit is absent or covers `amount`
    pub fn can_approve(&self, actor_id: &OrgNodeId, amount: u64) -> HierarchyResult<bool> {
        Ok(self.hierarchy.require(actor_id)?.can_approve(amount))
    }

    /// Resolve the approval question for `actor_id` and `amount`.
    ///
    /// Walks the management chain one ancestor at a time and stops at the
    /// first (nearest) qualifying ancestor. The walk is cycle-guarded.
    pub fn resolve(
        &self,
        actor_id: &OrgNodeId,
        amount: u64,
    ) -> HierarchyResult<ApprovalResolution> {
        let actor = self.hierarchy.require(actor_id)?;
        if actor.can_approve(amount) {
            return Ok(ApprovalResolution::AlreadyAuthorized);
        }

        let mut visited: HashSet<OrgNodeId> = HashSet::new();
        visited.insert(actor.id.clone());

        let mut current = actor;
        loop {
            let ancestor = match self.hierarchy.manager(&current.id)? {
                Some(node) => node,
                None => break,
            };
            if !visited.insert(ancestor.id.clone()) {
                tracing::warn!(node = %ancestor.id, "cycle in management chain, stopping escalation");
                break;
            }
            if ancestor.can_approve(amount) {
                return Ok(ApprovalResolution::Escalated(ancestor));
            }
            current = ancestor;
        }

        tracing::info!(
            actor = %actor_id,
            amount,
            "approval chain exhausted, no approver available"
        );
        Ok(ApprovalResolution::Exhausted)
    }

    /// Caller-facing shape: the escalation target or `None`.
    ///
    /// Both "already authorized" and "exhausted" collapse to `None` here;
    /// callers who need the distinction branch on [`Self::can_approve`]
    /// first or use [`Self::resolve`].
    pub fn next_approver(
        &self,
        actor_id: &OrgNodeId,
        amount: u64,
    ) -> HierarchyResult<Option<OrgNode>> {
        Ok(self.resolve(actor_id, amount)?.approver())
    }
}
