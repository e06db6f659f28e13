use std::fmt::Display;

use tracing::{debug, error, info, warn};

use crate::audit::SagaAuditLog;
use crate::context::ExecutionContext;
use crate::step::{SagaStep, StepOutcome};

/// A sequence of steps that either all complete or are undone together.
///
/// Steps run strictly in order on the caller's thread; a step may block on
/// I/O internally, but the next step never starts before the previous one
/// finished. On the first failure, previously completed steps are
/// compensated in reverse order (LIFO): later steps may depend on the side
/// effects of earlier ones, so undoing walks the dependency order backwards.
///
/// A `Saga` is an immutable step list and can drive any number of runs,
/// each against its own [`ExecutionContext`].
pub struct Saga<E> {
    steps: Vec<Box<dyn SagaStep<Error = E>>>,
}

impl<E: Display> Saga<E> {
    pub(crate) fn from_steps(steps: Vec<Box<dyn SagaStep<Error = E>>>) -> Self {
        Self { steps }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the saga has no steps. Running an empty saga is a vacuous
    /// success.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Drive one run to completion or full compensation.
    ///
    /// Returns `true` when every step completed. Returns `false` when a
    /// step was rejected or faulted, or the run was cancelled; by then every
    /// previously completed step has had exactly one compensation attempt.
    /// Nothing escapes as an error: failure detail stays on the context in
    /// [`ExecutionContext::failure_reason`], [`ExecutionContext::last_error`]
    /// and the executed/compensated step lists.
    ///
    /// The context must be freshly created for this run.
    #[must_use]
    pub fn run(&self, ctx: &mut ExecutionContext<E>) -> bool {
        let (succeeded, _audit_log) = self.run_internal(ctx);
        succeeded
    }

    /// Like [`Saga::run`], also returning the per-step audit log.
    #[must_use]
    pub fn run_with_audit(&self, ctx: &mut ExecutionContext<E>) -> (bool, SagaAuditLog) {
        self.run_internal(ctx)
    }

    fn run_internal(&self, ctx: &mut ExecutionContext<E>) -> (bool, SagaAuditLog) {
        let mut audit_log = SagaAuditLog::new();
        let mut completed: Vec<usize> = Vec::new();

        ctx.begin();
        info!(saga = %ctx.id(), steps = self.steps.len(), "starting saga run");

        for (index, step) in self.steps.iter().enumerate() {
            if ctx.is_cancelled() {
                warn!(saga = %ctx.id(), next_step = step.name(), "run cancelled, rolling back");
                ctx.record_failure(format!("cancelled before step '{}'", step.name()), None);
                self.compensate(ctx, &completed, &mut audit_log);
                return (false, audit_log);
            }

            debug!(saga = %ctx.id(), step = step.name(), "executing step");
            audit_log.record_start(step.name());

            match step.execute(ctx) {
                StepOutcome::Completed => {
                    debug!(saga = %ctx.id(), step = step.name(), "step completed");
                    audit_log.record_success(step.compensation_description());
                    ctx.mark_executed(step.name());
                    completed.push(index);
                }
                StepOutcome::Rejected(reason) => {
                    warn!(saga = %ctx.id(), step = step.name(), %reason, "step rejected, rolling back");
                    audit_log.record_rejection(&reason);
                    ctx.record_failure(reason, None);
                    self.compensate(ctx, &completed, &mut audit_log);
                    return (false, audit_log);
                }
                StepOutcome::Fault(err) => {
                    error!(saga = %ctx.id(), step = step.name(), error = %err, "step faulted, rolling back");
                    let message = err.to_string();
                    audit_log.record_fault(&message);
                    ctx.record_failure(message, Some(err));
                    self.compensate(ctx, &completed, &mut audit_log);
                    return (false, audit_log);
                }
            }
        }

        ctx.complete();
        info!(saga = %ctx.id(), "saga run completed");
        (true, audit_log)
    }

    /// Undo completed steps, most recent first.
    ///
    /// Best-effort: a failed undo is logged and the loop keeps going, so
    /// every completed step gets its compensation attempt. Nothing is
    /// retried and nothing is re-raised.
    fn compensate(
        &self,
        ctx: &mut ExecutionContext<E>,
        completed: &[usize],
        audit_log: &mut SagaAuditLog,
    ) {
        ctx.begin_compensation();
        info!(saga = %ctx.id(), steps = completed.len(), "compensating completed steps");

        for &index in completed.iter().rev() {
            let step = &self.steps[index];
            debug!(saga = %ctx.id(), step = step.name(), "compensating step");

            match step.compensate(ctx) {
                Ok(()) => {
                    audit_log.record_compensated(index);
                    ctx.mark_compensated(step.name());
                }
                Err(err) => {
                    warn!(
                        saga = %ctx.id(),
                        step = step.name(),
                        error = %err,
                        "compensation failed, continuing with remaining steps"
                    );
                    audit_log.record_compensation_failed(index);
                }
            }
        }

        ctx.finish_compensation();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::builder::SagaBuilder;
    use crate::context::SagaState;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct TestError(String);

    type Trace = Arc<Mutex<Vec<String>>>;

    /// Completes after appending to the shared trace; compensation appends
    /// too, so tests can assert exact ordering.
    struct TracedStep {
        name: &'static str,
        trace: Trace,
    }

    impl SagaStep for TracedStep {
        type Error = TestError;

        fn name(&self) -> &'static str {
            self.name
        }

        fn execute(&self, _ctx: &mut ExecutionContext<Self::Error>) -> StepOutcome<Self::Error> {
            self.trace
                .lock()
                .expect("trace lock")
                .push(format!("execute {}", self.name));
            StepOutcome::Completed
        }

        fn compensate(&self, _ctx: &mut ExecutionContext<Self::Error>) -> Result<(), Self::Error> {
            self.trace
                .lock()
                .expect("trace lock")
                .push(format!("compensate {}", self.name));
            Ok(())
        }
    }

    struct RejectingStep;

    impl SagaStep for RejectingStep {
        type Error = TestError;

        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn execute(&self, _ctx: &mut ExecutionContext<Self::Error>) -> StepOutcome<Self::Error> {
            StepOutcome::rejected("not enough stock")
        }
    }

    struct FaultingStep {
        message: &'static str,
    }

    impl SagaStep for FaultingStep {
        type Error = TestError;

        fn name(&self) -> &'static str {
            "faulting"
        }

        fn execute(&self, _ctx: &mut ExecutionContext<Self::Error>) -> StepOutcome<Self::Error> {
            StepOutcome::Fault(TestError(self.message.to_string()))
        }
    }

    fn traced(name: &'static str, trace: &Trace) -> TracedStep {
        TracedStep {
            name,
            trace: Arc::clone(trace),
        }
    }

    #[test]
    fn all_steps_succeeding_completes_without_compensation() {
        let trace: Trace = Trace::default();
        let saga = SagaBuilder::new()
            .step(traced("a", &trace))
            .step(traced("b", &trace))
            .step(traced("c", &trace))
            .build();
        let mut ctx = ExecutionContext::new();

        assert!(saga.run(&mut ctx));
        assert_eq!(ctx.state(), SagaState::Completed);
        assert_eq!(ctx.executed_steps(), ["a", "b", "c"]);
        assert!(ctx.compensated_steps().is_empty());
        assert!(ctx.failure_reason().is_none());
    }

    #[test]
    fn rejection_stops_forward_progress() {
        let trace: Trace = Trace::default();
        let saga = SagaBuilder::new()
            .step(traced("a", &trace))
            .step(RejectingStep)
            .step(traced("never_runs", &trace))
            .build();
        let mut ctx = ExecutionContext::new();

        assert!(!saga.run(&mut ctx));
        assert_eq!(ctx.executed_steps(), ["a"]);
        assert_eq!(ctx.failure_reason(), Some("not enough stock"));
        assert!(ctx.last_error().is_none());

        let log = trace.lock().expect("trace lock");
        assert!(!log.iter().any(|entry| entry.contains("never_runs")));
    }

    #[test]
    fn compensation_runs_in_reverse_order() {
        let trace: Trace = Trace::default();
        let saga = SagaBuilder::new()
            .step(traced("a", &trace))
            .step(traced("b", &trace))
            .step(FaultingStep { message: "boom" })
            .build();
        let mut ctx = ExecutionContext::new();

        assert!(!saga.run(&mut ctx));

        let log = trace.lock().expect("trace lock");
        assert_eq!(
            *log,
            [
                "execute a",
                "execute b",
                "compensate b",
                "compensate a",
            ]
        );
        assert_eq!(ctx.compensated_steps(), ["b", "a"]);
        assert_eq!(ctx.state(), SagaState::Compensated);
    }

    #[test]
    fn fault_message_becomes_the_failure_reason() {
        let saga: Saga<TestError> = SagaBuilder::new()
            .step(FaultingStep { message: "boom" })
            .build();
        let mut ctx = ExecutionContext::new();

        assert!(!saga.run(&mut ctx));
        assert_eq!(ctx.failure_reason(), Some("boom"));
        assert_eq!(ctx.take_last_error().map(|e| e.0), Some("boom".to_string()));
    }

    #[test]
    fn empty_saga_is_a_vacuous_success() {
        let saga: Saga<TestError> = SagaBuilder::new().build();
        let mut ctx = ExecutionContext::new();

        assert!(saga.run(&mut ctx));
        assert_eq!(ctx.state(), SagaState::Completed);
        assert!(ctx.executed_steps().is_empty());
    }

    #[test]
    fn same_saga_serves_independent_runs() {
        let trace: Trace = Trace::default();
        let saga = SagaBuilder::new().step(traced("only", &trace)).build();

        let mut first = ExecutionContext::new();
        let mut second = ExecutionContext::new();

        assert!(saga.run(&mut first));
        assert!(saga.run(&mut second));
        assert_ne!(first.id(), second.id());
        assert_eq!(first.executed_steps(), ["only"]);
        assert_eq!(second.executed_steps(), ["only"]);
    }
}
