use crate::context::ExecutionContext;

/// Outcome of a forward step.
///
/// Expected business failures and unexpected faults travel as data, so the
/// orchestrator's control flow never rides on unwinding.
#[derive(Debug)]
pub enum StepOutcome<E> {
    /// The forward work finished.
    Completed,
    /// The step declined to complete: an expected business failure with a
    /// human-readable reason. Triggers rollback of earlier steps.
    Rejected(String),
    /// The step hit an unexpected error. Triggers rollback and leaves the
    /// error on the context for the caller.
    Fault(E),
}

impl<E> StepOutcome<E> {
    /// Shorthand for [`StepOutcome::Rejected`].
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// A unit of forward work paired with its own undo logic.
///
/// Steps are stateless, reusable template objects: dependencies are injected
/// at construction, and every piece of per-run state lives in the
/// [`ExecutionContext`]. A step may read values earlier steps wrote and
/// leave values for later steps (and for its own compensation).
pub trait SagaStep: Send + Sync {
    /// Error type for unexpected step faults.
    type Error;

    /// Stable identifier used for logging and the context's audit trail.
    fn name(&self) -> &'static str;

    /// Perform the forward work.
    fn execute(&self, ctx: &mut ExecutionContext<Self::Error>) -> StepOutcome<Self::Error>;

    /// Undo the effect of a previously completed `execute`.
    ///
    /// Called during rollback when a later step fails. Must be safe to call
    /// when only partial state exists in the context. The default
    /// implementation is a no-op, suitable for read-only steps.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails. The orchestrator logs it and
    /// keeps compensating the remaining steps.
    fn compensate(&self, ctx: &mut ExecutionContext<Self::Error>) -> Result<(), Self::Error> {
        let _ = ctx;
        Ok(())
    }

    /// Human-readable description of what compensation will do.
    fn compensation_description(&self) -> String {
        format!("undo {}", self.name())
    }
}
