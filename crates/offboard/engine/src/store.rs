//! Process storage abstraction
//!
//! The state machine and registry depend only on this trait. The shipped
//! in-memory implementation backs tests and single-node deployments; a
//! durable implementation is an embedder concern.
//!
//! Entries hand out [`ProcessHandle`]s: the per-process mutex is part of
//! the storage contract, because the engine's guard-check-then-mutate
//! sequence must run as one critical section per process.

use async_trait::async_trait;
use dashmap::DashMap;
use offboard_types::{OrgNodeId, Process, ProcessId};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, lockable handle to one live process
pub type ProcessHandle = Arc<Mutex<Process>>;

/// Storage for in-flight and completed processes
#[async_trait]
pub trait ProcessStore: Send + Sync {
    /// Insert a newly created process. Processes are never removed during
    /// their active lifetime; archival policy lives outside the engine.
    async fn insert(&self, process: Process);

    /// Live handle for mutation under the per-process lock
    async fn get(&self, id: &ProcessId) -> Option<ProcessHandle>;

    /// Point-in-time snapshots of every process
    async fn list(&self) -> Vec<Process>;

    /// Point-in-time snapshots of the subject's processes
    async fn list_by_subject(&self, subject: &OrgNodeId) -> Vec<Process>;
}

/// In-memory process store over a concurrent map
#[derive(Default)]
pub struct InMemoryProcessStore {
    /// All processes indexed by id
    processes: DashMap<ProcessId, ProcessHandle>,
    /// Process ids indexed by subject
    by_subject: DashMap<OrgNodeId, Vec<ProcessId>>,
}

impl InMemoryProcessStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Collect handles first so no map guard is held across an await
    fn handles(&self) -> Vec<ProcessHandle> {
        self.processes.iter().map(|e| e.value().clone()).collect()
    }

    fn handles_for(&self, subject: &OrgNodeId) -> Vec<ProcessHandle> {
        let ids = match self.by_subject.get(subject) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };
        ids.iter()
            .filter_map(|id| self.processes.get(id).map(|e| e.value().clone()))
            .collect()
    }
}

#[async_trait]
impl ProcessStore for InMemoryProcessStore {
    async fn insert(&self, process: Process) {
        let id = process.id.clone();
        self.by_subject
            .entry(process.subject.clone())
            .or_default()
            .push(id.clone());
        self.processes.insert(id, Arc::new(Mutex::new(process)));
    }

    async fn get(&self, id: &ProcessId) -> Option<ProcessHandle> {
        self.processes.get(id).map(|e| e.value().clone())
    }

    async fn list(&self) -> Vec<Process> {
        let mut snapshots = Vec::new();
        for handle in self.handles() {
            snapshots.push(handle.lock().await.clone());
        }
        snapshots
    }

    async fn list_by_subject(&self, subject: &OrgNodeId) -> Vec<Process> {
        let mut snapshots = Vec::new();
        for handle in self.handles_for(subject) {
            snapshots.push(handle.lock().await.clone());
        }
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_process(subject: &str) -> Process {
        Process::new(OrgNodeId::new(subject), OrgNodeId::new("initiator"))
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryProcessStore::new();
        let process = make_process("emp");
        let id = process.id.clone();

        store.insert(process).await;
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());

        let handle = store.get(&id).await.unwrap();
        assert_eq!(handle.lock().await.id, id);
        assert!(store.get(&ProcessId::generate()).await.is_none());
    }

    #[tokio::test]
    async fn test_list() {
        let store = InMemoryProcessStore::new();
        store.insert(make_process("a")).await;
        store.insert(make_process("b")).await;

        assert_eq!(store.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_subject() {
        let store = InMemoryProcessStore::new();
        store.insert(make_process("emp")).await;
        store.insert(make_process("emp")).await;
        store.insert(make_process("other")).await;

        assert_eq!(store.list_by_subject(&OrgNodeId::new("emp")).await.len(), 2);
        assert_eq!(store.list_by_subject(&OrgNodeId::new("other")).await.len(), 1);
        assert!(store.list_by_subject(&OrgNodeId::new("none")).await.is_empty());
    }

    #[tokio::test]
    async fn test_mutation_through_handle_is_visible() {
        let store = InMemoryProcessStore::new();
        let process = make_process("emp");
        let id = process.id.clone();
        store.insert(process).await;

        {
            let handle = store.get(&id).await.unwrap();
            let mut process = handle.lock().await;
            process.begin_step(offboard_types::StepNumber::Deactivation);
        }

        let snapshot = store
            .list_by_subject(&OrgNodeId::new("emp"))
            .await
            .pop()
            .unwrap();
        assert_eq!(
            snapshot.in_progress_step(),
            Some(offboard_types::StepNumber::Deactivation)
        );
    }
}
