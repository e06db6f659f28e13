//! Integration tests for the per-run audit log.

use orderflow_saga::{ExecutionContext, SagaBuilder, SagaStep, StepOutcome, StepStatus};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

type Ctx = ExecutionContext<TestError>;

struct SimpleStep {
    name: &'static str,
}

impl SagaStep for SimpleStep {
    type Error = TestError;

    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, _ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        StepOutcome::Completed
    }

    fn compensation_description(&self) -> String {
        format!("put back what {} did", self.name)
    }
}

struct RejectingStep;

impl SagaStep for RejectingStep {
    type Error = TestError;

    fn name(&self) -> &'static str {
        "rejecting"
    }

    fn execute(&self, _ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        StepOutcome::rejected("quota exhausted")
    }
}

struct FaultingStep;

impl SagaStep for FaultingStep {
    type Error = TestError;

    fn name(&self) -> &'static str {
        "faulting"
    }

    fn execute(&self, _ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        StepOutcome::Fault(TestError("wire snapped".to_string()))
    }
}

#[test]
fn successful_run_logs_every_step_as_executed() {
    let saga = SagaBuilder::new()
        .step(SimpleStep { name: "step_a" })
        .step(SimpleStep { name: "step_b" })
        .build();
    let mut ctx = Ctx::new();

    let (succeeded, audit_log) = saga.run_with_audit(&mut ctx);

    assert!(succeeded);
    let records = audit_log.records();
    assert_eq!(records.len(), 2);
    for (record, expected) in records.iter().zip(["step_a", "step_b"]) {
        assert_eq!(record.name, expected);
        assert_eq!(record.status, StepStatus::Executed);
        assert!(record.duration().is_some());
        assert!(record.failure.is_none());
    }
}

#[test]
fn completed_records_carry_the_compensation_description() {
    let saga = SagaBuilder::new().step(SimpleStep { name: "step_a" }).build();
    let mut ctx = Ctx::new();

    let (_, audit_log) = saga.run_with_audit(&mut ctx);

    assert_eq!(
        audit_log.records()[0].compensation_description.as_deref(),
        Some("put back what step_a did")
    );
}

#[test]
fn rejection_and_compensation_show_up_with_their_statuses() {
    let saga = SagaBuilder::new()
        .step(SimpleStep { name: "step_a" })
        .step(RejectingStep)
        .build();
    let mut ctx = Ctx::new();

    let (succeeded, audit_log) = saga.run_with_audit(&mut ctx);

    assert!(!succeeded);
    let records = audit_log.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, StepStatus::Compensated);
    assert_eq!(records[1].status, StepStatus::Rejected);
    assert_eq!(records[1].failure.as_deref(), Some("quota exhausted"));
}

#[test]
fn faults_are_distinguished_from_rejections() {
    let saga = SagaBuilder::new().step(FaultingStep).build();
    let mut ctx = Ctx::new();

    let (_, audit_log) = saga.run_with_audit(&mut ctx);

    let record = &audit_log.records()[0];
    assert_eq!(record.status, StepStatus::Faulted);
    assert_eq!(record.failure.as_deref(), Some("wire snapped"));
}

#[test]
fn summary_reads_like_a_checklist() {
    let saga = SagaBuilder::new()
        .step(SimpleStep { name: "step_a" })
        .step(RejectingStep)
        .build();
    let mut ctx = Ctx::new();

    let (_, audit_log) = saga.run_with_audit(&mut ctx);
    let summary = audit_log.summary();

    assert!(summary.contains("↩ step_a"));
    assert!(summary.contains("✗ rejecting: quota exhausted"));
}

#[test]
fn steps_that_never_ran_have_no_record() {
    let saga = SagaBuilder::new()
        .step(RejectingStep)
        .step(SimpleStep { name: "unreached" })
        .build();
    let mut ctx = Ctx::new();

    let (_, audit_log) = saga.run_with_audit(&mut ctx);

    assert_eq!(audit_log.records().len(), 1);
}
