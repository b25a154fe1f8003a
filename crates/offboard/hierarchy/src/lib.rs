//! Org Hierarchy Resolution
//!
//! Read-only traversal over the organization tree. Nodes link upward via a
//! single parent reference; the resolver answers ancestor, subtree, and
//! budget-approval-escalation questions against an immutable directory
//! snapshot.
//!
//! # Key Principle
//!
//! **Resolution never mutates.** The directory consumed here is treated as
//! an immutable snapshot for the duration of any single call, and every
//! traversal carries a visited set so a malformed (cyclic) directory cannot
//! hang a walk.

#![deny(unsafe_code)]

mod directory;
mod escalation;
mod resolver;

pub use directory::{InMemoryDirectory, OrgDirectory};
pub use escalation::{ApprovalEscalationResolver, ApprovalResolution};
pub use resolver::{HierarchyResolver, OrgStats};
