//! Saga orchestration with reverse-order compensation.
//!
//! A saga replaces one atomic transaction with a sequence of local steps,
//! each paired with a compensating action that semantically undoes it. All
//! steps of one run share a mutable [`ExecutionContext`]; when a step fails,
//! the orchestrator undoes the previously completed steps in reverse order
//! and reports the failure through the context rather than an error return.

mod audit;
mod builder;
mod cancel;
mod context;
mod saga;
mod step;

pub use audit::{SagaAuditLog, StepRecord, StepStatus};
pub use builder::SagaBuilder;
pub use cancel::CancelToken;
pub use context::{ContextKey, ExecutionContext, Lookup, SagaState};
pub use saga::Saga;
pub use step::{SagaStep, StepOutcome};
