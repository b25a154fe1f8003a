//! Audit and Notification Sinks
//!
//! The engine treats both sinks as fire-and-forget collaborators: audit
//! writes are awaited only for call completion, and a failed notification
//! dispatch never fails the operation that triggered it.
//!
//! Shipped implementations:
//!
//! - [`MemoryAuditSink`] / [`MemoryNotificationSink`]: for tests and
//!   embedders that drain records themselves
//! - [`JsonlAuditSink`]: append-only JSON-lines file
//! - [`TracingNotificationSink`]: emits notifications to the tracing
//!   subscriber

#![deny(unsafe_code)]

mod audit;
mod error;
mod notify;

pub use audit::{AuditSink, JsonlAuditSink, MemoryAuditSink};
pub use error::{ObserveError, ObserveResult};
pub use notify::{MemoryNotificationSink, NotificationSink, TracingNotificationSink};
