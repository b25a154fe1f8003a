//! Org directory: the read-only source of org nodes
//!
//! How the directory is populated or kept current is an embedder concern.
//! The in-memory implementation here is built once from a node list and
//! normalizes child references from parent pointers, so fixtures only have
//! to declare parents.

use offboard_types::{OrgNode, OrgNodeId};
use std::collections::HashMap;

/// Read-only source of org node records
pub trait OrgDirectory: Send + Sync {
    /// Look up a single node
    fn node(&self, id: &OrgNodeId) -> Option<OrgNode>;

    /// Every node in the snapshot
    fn all(&self) -> Vec<OrgNode>;

    /// Check if a node exists
    fn contains(&self, id: &OrgNodeId) -> bool {
        self.node(id).is_some()
    }
}

/// Immutable in-memory directory snapshot
#[derive(Clone, Debug, Default)]
pub struct InMemoryDirectory {
    nodes: HashMap<OrgNodeId, OrgNode>,
}

impl InMemoryDirectory {
    /// Build a snapshot from a node list, deriving child references from
    /// parent pointers. A child declared under a missing parent is kept as
    /// a root-less orphan rather than rejected.
    pub fn new(nodes: impl IntoIterator<Item = OrgNode>) -> Self {
        let mut indexed: HashMap<OrgNodeId, OrgNode> =
            nodes.into_iter().map(|n| (n.id.clone(), n)).collect();

        let links: Vec<(OrgNodeId, OrgNodeId)> = indexed
            .values()
            .filter_map(|n| n.parent.clone().map(|p| (p, n.id.clone())))
            .collect();

        for (parent, child) in links {
            if let Some(parent_node) = indexed.get_mut(&parent) {
                if !parent_node.children.contains(&child) {
                    parent_node.children.push(child);
                }
            }
        }

        Self { nodes: indexed }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl OrgDirectory for InMemoryDirectory {
    fn node(&self, id: &OrgNodeId) -> Option<OrgNode> {
        self.nodes.get(id).cloned()
    }

    fn all(&self) -> Vec<OrgNode> {
        self.nodes.values().cloned().collect()
    }
}
