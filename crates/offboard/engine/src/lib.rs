//! Offboard Process Engine
//!
//! The engine drives the four-step offboarding program. It:
//! 1. Creates processes behind a permission gate
//! 2. Validates guards and typed payloads before any mutation
//! 3. Delegates side effects to pluggable step handlers
//! 4. Records every outcome to the audit sink
//! 5. Notifies the initiator as steps complete
//!
//! **CRITICAL**: the state machine coordinates; it performs no side effect
//! itself. Account deactivation, permission revocation, and content
//! anonymization live in [`StepHandler`] command objects injected per step,
//! which is also where timeout and retry wrapping happens.
//!
//! # Concurrency
//!
//! The registry's process map is shared across callers; each process
//! carries its own async mutex so guard-check-then-mutate runs as a single
//! critical section per process. Different processes execute fully in
//! parallel. There is no cancellation: once a step is `InProgress` the only
//! exits are `Completed` or `Error`.
//!
//! # Example
//!
//! ```rust
//! use offboard_engine::{EngineConfig, HandlerRegistry, InMemoryProcessStore, OffboardingService};
//! use offboard_hierarchy::InMemoryDirectory;
//! use offboard_observe::{MemoryAuditSink, MemoryNotificationSink};
//! use offboard_types::{DeactivationPayload, OrgNode, StepNumber, StepPayload};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let directory = Arc::new(InMemoryDirectory::new([
//!     OrgNode::new("admin", "Alex Admin", 8),
//!     OrgNode::new("emp", "Erin Employee", 2).with_parent("admin"),
//! ]));
//! let service = OffboardingService::new(
//!     directory,
//!     Arc::new(InMemoryProcessStore::new()),
//!     Arc::new(MemoryAuditSink::new()),
//!     Arc::new(MemoryNotificationSink::new()),
//!     HandlerRegistry::noop(),
//!     EngineConfig::default(),
//! );
//!
//! let process_id = service
//!     .start_process("emp".into(), "admin".into())
//!     .await
//!     .unwrap();
//! service
//!     .execute_step(
//!         &process_id,
//!         StepNumber::Deactivation,
//!         &"admin".into(),
//!         StepPayload::Deactivation(DeactivationPayload::immediate()),
//!     )
//!     .await
//!     .unwrap();
//! # }
//! ```

#![deny(unsafe_code)]

mod config;
mod handler;
mod registry;
mod service;
mod state_machine;
mod store;

pub use config::EngineConfig;
pub use handler::{HandlerRegistry, NoopStepHandler, StepHandler};
pub use registry::ProcessRegistry;
pub use service::OffboardingService;
pub use state_machine::ProcessStateMachine;
pub use store::{InMemoryProcessStore, ProcessHandle, ProcessStore};
