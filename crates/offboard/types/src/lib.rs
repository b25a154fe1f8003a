//! Offboard Domain Types
//!
//! The offboarding process is a **guarded four-step program**: an ordered
//! sequence of irreversible administrative actions applied to a single
//! subject, where every step is gated on the completion of the previous one
//! and on the acting party's position in the org hierarchy.
//!
//! # Key Concepts
//!
//! - **OrgNode**: A position in the organization tree, carrying a
//!   permission level, budget approval limit, and single parent reference.
//! - **Process**: A running offboarding applied to one subject, tracking a
//!   step cursor and per-step state.
//! - **StepState**: The status, outcome, and typed payload of one step.
//! - **StepPayload**: A tagged union keyed by step number, so a payload of
//!   the wrong shape is rejected before any side effect runs.
//! - **AuditRecord**: An immutable record of an attempted or completed
//!   privileged operation.
//!
//! # Design Principles
//!
//! 1. The step cursor only advances, never regresses.
//! 2. A step leaves `Blocked` only after its predecessor completes.
//! 3. Every rejected operation is a typed error. No silent failure.

#![deny(unsafe_code)]

mod audit;
mod errors;
mod ids;
mod notification;
mod org;
mod payload;
mod process;
mod step;

pub use audit::*;
pub use errors::*;
pub use ids::*;
pub use notification::*;
pub use org::*;
pub use payload::*;
pub use process::*;
pub use step::*;
