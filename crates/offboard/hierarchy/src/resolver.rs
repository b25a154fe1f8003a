//! Hierarchy resolver: ancestor and subtree queries
//!
//! Every traversal keeps a visited set keyed by node id. The model forbids
//! cycles, but a malformed directory import can still contain them and a
//! resolution call must terminate anyway.

use crate::OrgDirectory;
use offboard_types::{HierarchyError, HierarchyResult, OrgNode, OrgNodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Aggregate figures for the subtree rooted at a node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgStats {
    /// Nodes whose parent is the queried node
    pub direct_reports: usize,
    /// All nodes below the queried node, at any distance
    pub total_subordinates: usize,
    /// Longest ancestor-chain distance from the queried node to any
    /// subordinate
    pub depth: usize,
}

/// Read-only traversal over an injected directory snapshot
#[derive(Clone)]
pub struct HierarchyResolver {
    directory: Arc<dyn OrgDirectory>,
}

impl HierarchyResolver {
    pub fn new(directory: Arc<dyn OrgDirectory>) -> Self {
        Self { directory }
    }

    /// The node itself, or `NodeNotFound`
    pub fn require(&self, id: &OrgNodeId) -> HierarchyResult<OrgNode> {
        self.directory
            .node(id)
            .ok_or_else(|| HierarchyError::NodeNotFound(id.clone()))
    }

    /// The node referenced by `id`'s parent field; `None` at the root.
    ///
    /// A dangling parent reference is treated as the end of the chain.
    pub fn manager(&self, id: &OrgNodeId) -> HierarchyResult<Option<OrgNode>> {
        let node = self.require(id)?;
        Ok(node.parent.and_then(|parent| self.directory.node(&parent)))
    }

    /// All nodes whose parent is `id`
    pub fn direct_reports(&self, id: &OrgNodeId) -> HierarchyResult<Vec<OrgNode>> {
        let node = self.require(id)?;
        Ok(node
            .children
            .iter()
            .filter_map(|child| self.directory.node(child))
            .collect())
    }

    /// Breadth-first traversal of the subtree below `id`, in discovery
    /// order. Terminates on cyclic input: a node is enqueued at most once.
    pub fn all_subordinates(&self, id: &OrgNodeId) -> HierarchyResult<Vec<OrgNode>> {
        Ok(self.walk_subtree(id)?.into_iter().map(|(n, _)| n).collect())
    }

    /// Walk `employee_id`'s ancestor chain until `manager_id` is found or
    /// the chain is exhausted. A node is never in its own chain.
    pub fn is_in_management_chain(
        &self,
        manager_id: &OrgNodeId,
        employee_id: &OrgNodeId,
    ) -> HierarchyResult<bool> {
        self.require(manager_id)?;
        let employee = self.require(employee_id)?;
        if manager_id == employee_id {
            return Ok(false);
        }

        let mut visited: HashSet<OrgNodeId> = HashSet::new();
        visited.insert(employee.id.clone());

        let mut current = employee;
        while let Some(parent_id) = current.parent.clone() {
            if parent_id == *manager_id {
                return Ok(true);
            }
            if !visited.insert(parent_id.clone()) {
                tracing::warn!(node = %parent_id, "cycle in ancestor chain, stopping walk");
                return Ok(false);
            }
            current = match self.directory.node(&parent_id) {
                Some(node) => node,
                None => return Ok(false),
            };
        }
        Ok(false)
    }

    /// Subtree figures for `id`. Depth comes from the traversal's level
    /// tracking: each discovered node carries its ancestor-chain distance
    /// from `id`, so no per-subordinate re-walk happens.
    pub fn organization_stats(&self, id: &OrgNodeId) -> HierarchyResult<OrgStats> {
        let node = self.require(id)?;
        let subtree = self.walk_subtree(id)?;

        let direct_reports = node
            .children
            .iter()
            .filter(|child| self.directory.contains(child))
            .count();
        let depth = subtree.iter().map(|(_, level)| *level).max().unwrap_or(0);

        Ok(OrgStats {
            direct_reports,
            total_subordinates: subtree.len(),
            depth,
        })
    }

    /// BFS below `id`, yielding each subordinate with its distance from
    /// `id`. The visited set includes `id` itself so a cycle back to the
    /// root cannot re-enqueue it.
    fn walk_subtree(&self, id: &OrgNodeId) -> HierarchyResult<Vec<(OrgNode, usize)>> {
        let root = self.require(id)?;

        let mut visited: HashSet<OrgNodeId> = HashSet::new();
        visited.insert(root.id.clone());

        let mut queue: VecDeque<(OrgNodeId, usize)> = root
            .children
            .iter()
            .map(|child| (child.clone(), 1))
            .collect();
        let mut discovered = Vec::new();

        while let Some((current_id, level)) = queue.pop_front() {
            if !visited.insert(current_id.clone()) {
                continue;
            }
            let current = match self.directory.node(&current_id) {
                Some(node) => node,
                None => continue,
            };
            for child in &current.children {
                if !visited.contains(child) {
                    queue.push_back((child.clone(), level + 1));
                }
            }
            discovered.push((current, level));
        }

        Ok(discovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryDirectory;
    use offboard_types::OrgNode;

    fn id(s: &str) -> OrgNodeId {
        OrgNodeId::new(s)
    }

    /// ceo ── vp ── mgr ── {emp, intern}
    ///     └─ cfo
    fn make_resolver() -> HierarchyResolver {
        let directory = InMemoryDirectory::new([
            OrgNode::new("ceo", "Chief Executive", 10),
            OrgNode::new("vp", "VP Engineering", 8).with_parent("ceo"),
            OrgNode::new("cfo", "CFO", 8).with_parent("ceo"),
            OrgNode::new("mgr", "Manager", 6).with_parent("vp"),
            OrgNode::new("emp", "Employee", 3).with_parent("mgr"),
            OrgNode::new("intern", "Intern", 1).with_parent("mgr"),
        ]);
        HierarchyResolver::new(Arc::new(directory))
    }

    #[test]
    fn test_manager() {
        let resolver = make_resolver();
        let manager = resolver.manager(&id("emp")).unwrap().unwrap();
        assert_eq!(manager.id, id("mgr"));

        assert!(resolver.manager(&id("ceo")).unwrap().is_none());
        assert!(matches!(
            resolver.manager(&id("ghost")),
            Err(HierarchyError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_direct_reports() {
        let resolver = make_resolver();
        let mut reports: Vec<String> = resolver
            .direct_reports(&id("mgr"))
            .unwrap()
            .into_iter()
            .map(|n| n.id.as_str().to_string())
            .collect();
        reports.sort();
        assert_eq!(reports, vec!["emp", "intern"]);

        assert!(resolver.direct_reports(&id("intern")).unwrap().is_empty());
    }

    #[test]
    fn test_all_subordinates() {
        let resolver = make_resolver();
        let subordinates = resolver.all_subordinates(&id("ceo")).unwrap();
        assert_eq!(subordinates.len(), 5);

        let subordinates = resolver.all_subordinates(&id("vp")).unwrap();
        let ids: Vec<&str> = subordinates.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"mgr"));
        assert!(ids.contains(&"emp"));
        assert!(ids.contains(&"intern"));
    }

    #[test]
    fn test_management_chain() {
        let resolver = make_resolver();
        assert!(resolver.is_in_management_chain(&id("ceo"), &id("emp")).unwrap());
        assert!(resolver.is_in_management_chain(&id("mgr"), &id("emp")).unwrap());
        // Sibling branch is not in the chain.
        assert!(!resolver.is_in_management_chain(&id("cfo"), &id("emp")).unwrap());
        // A node is not its own manager.
        assert!(!resolver.is_in_management_chain(&id("emp"), &id("emp")).unwrap());
        // Chain exhaustion at the root.
        assert!(!resolver.is_in_management_chain(&id("emp"), &id("ceo")).unwrap());
    }

    #[test]
    fn test_organization_stats() {
        let resolver = make_resolver();

        let stats = resolver.organization_stats(&id("ceo")).unwrap();
        assert_eq!(stats.direct_reports, 2);
        assert_eq!(stats.total_subordinates, 5);
        assert_eq!(stats.depth, 3);

        let stats = resolver.organization_stats(&id("mgr")).unwrap();
        assert_eq!(stats.direct_reports, 2);
        assert_eq!(stats.total_subordinates, 2);
        assert_eq!(stats.depth, 1);

        let stats = resolver.organization_stats(&id("intern")).unwrap();
        assert_eq!(stats, OrgStats {
            direct_reports: 0,
            total_subordinates: 0,
            depth: 0,
        });
    }

    #[test]
    fn test_cyclic_directory_terminates() {
        // a -> b -> c -> a, deliberately malformed
        let directory = InMemoryDirectory::new([
            OrgNode::new("a", "A", 5).with_parent("c"),
            OrgNode::new("b", "B", 5).with_parent("a"),
            OrgNode::new("c", "C", 5).with_parent("b"),
        ]);
        let resolver = HierarchyResolver::new(Arc::new(directory));

        let subordinates = resolver.all_subordinates(&id("a")).unwrap();
        assert_eq!(subordinates.len(), 2);

        // Ancestor walk also terminates without finding a non-member.
        let directory = InMemoryDirectory::new([
            OrgNode::new("a", "A", 5).with_parent("c"),
            OrgNode::new("b", "B", 5).with_parent("a"),
            OrgNode::new("c", "C", 5).with_parent("b"),
            OrgNode::new("outsider", "Outsider", 5),
        ]);
        let resolver = HierarchyResolver::new(Arc::new(directory));
        assert!(!resolver
            .is_in_management_chain(&id("outsider"), &id("a"))
            .unwrap());
    }

    #[test]
    fn test_stats_unknown_node() {
        let resolver = make_resolver();
        assert!(matches!(
            resolver.organization_stats(&id("ghost")),
            Err(HierarchyError::NodeNotFound(_))
        ));
    }
}
