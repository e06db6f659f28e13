//! Integration tests for rollback ordering and scope.

use std::sync::{Arc, Mutex};

use orderflow_saga::{ExecutionContext, SagaBuilder, SagaStep, StepOutcome};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

type Ctx = ExecutionContext<TestError>;
type Trace = Arc<Mutex<Vec<String>>>;

struct TrackedStep {
    name: &'static str,
    trace: Trace,
}

impl TrackedStep {
    fn new(name: &'static str, trace: &Trace) -> Self {
        Self {
            name,
            trace: Arc::clone(trace),
        }
    }
}

impl SagaStep for TrackedStep {
    type Error = TestError;

    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, _ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        StepOutcome::Completed
    }

    fn compensate(&self, _ctx: &mut Ctx) -> Result<(), Self::Error> {
        self.trace
            .lock()
            .expect("trace lock")
            .push(format!("compensate {}", self.name));
        Ok(())
    }
}

struct FailingStep {
    error_message: String,
}

impl SagaStep for FailingStep {
    type Error = TestError;

    fn name(&self) -> &'static str {
        "failing"
    }

    fn execute(&self, _ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        StepOutcome::Fault(TestError(self.error_message.clone()))
    }
}

struct ReadOnlyStep;

impl SagaStep for ReadOnlyStep {
    type Error = TestError;

    fn name(&self) -> &'static str {
        "read_only"
    }

    fn execute(&self, _ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        StepOutcome::Completed
    }
}

#[test]
fn compensation_happens_in_lifo_order() {
    let trace: Trace = Trace::default();

    let saga = SagaBuilder::new()
        .step(TrackedStep::new("step_a", &trace))
        .step(TrackedStep::new("step_b", &trace))
        .step(TrackedStep::new("step_c", &trace))
        .step(FailingStep {
            error_message: "boom".to_string(),
        })
        .build();
    let mut ctx = Ctx::new();

    assert!(!saga.run(&mut ctx));

    let log = trace.lock().expect("trace lock");
    assert_eq!(
        *log,
        ["compensate step_c", "compensate step_b", "compensate step_a"]
    );
    assert_eq!(ctx.compensated_steps(), ["step_c", "step_b", "step_a"]);
}

#[test]
fn only_completed_steps_are_compensated() {
    let trace: Trace = Trace::default();

    let saga = SagaBuilder::new()
        .step(TrackedStep::new("completed", &trace))
        .step(FailingStep {
            error_message: "halt".to_string(),
        })
        .step(TrackedStep::new("never_ran", &trace))
        .build();
    let mut ctx = Ctx::new();

    assert!(!saga.run(&mut ctx));

    let log = trace.lock().expect("trace lock");
    assert_eq!(*log, ["compensate completed"]);
    assert_eq!(ctx.executed_steps(), ["completed"]);
}

#[test]
fn first_step_failure_requires_no_compensation() {
    let saga = SagaBuilder::new()
        .step(FailingStep {
            error_message: "immediate failure".to_string(),
        })
        .build();
    let mut ctx = Ctx::new();

    assert!(!saga.run(&mut ctx));
    assert!(ctx.executed_steps().is_empty());
    assert!(ctx.compensated_steps().is_empty());
    assert_eq!(ctx.failure_reason(), Some("immediate failure"));
}

#[test]
fn read_only_step_compensates_as_a_no_op() {
    let saga = SagaBuilder::new()
        .step(ReadOnlyStep)
        .step(FailingStep {
            error_message: "boom".to_string(),
        })
        .build();
    let mut ctx = Ctx::new();

    assert!(!saga.run(&mut ctx));

    // The no-op compensation still counts as a successful undo.
    assert_eq!(ctx.compensated_steps(), ["read_only"]);
}
