use std::time::{Duration, Instant};

/// Status of a step in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Forward work completed.
    Executed,
    /// The step declined with a business reason.
    Rejected,
    /// The step hit an unexpected error.
    Faulted,
    /// The step's undo ran after a later failure.
    Compensated,
    /// The step's undo was attempted and failed.
    CompensationFailed,
}

/// Record of one step's part in a saga run.
#[derive(Debug)]
pub struct StepRecord {
    /// Name of the step.
    pub name: String,
    /// Current status.
    pub status: StepStatus,
    /// When the step started executing.
    pub started_at: Instant,
    /// When the step last changed status (execution or compensation).
    pub completed_at: Option<Instant>,
    /// Rejection reason or fault message, when the step failed.
    pub failure: Option<String>,
    /// What compensating this step would do (set once it completed).
    pub compensation_description: Option<String>,
}

impl StepRecord {
    /// Wall-clock time from start to the last status change.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.completed_at
            .map(|end| end.duration_since(self.started_at))
    }
}

/// Per-step audit trail of one saga run.
///
/// Records are appended in execution order, so the record at position `i`
/// belongs to the step at position `i` of the saga.
#[derive(Debug, Default)]
pub struct SagaAuditLog {
    records: Vec<StepRecord>,
}

impl SagaAuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, name: &str) {
        self.records.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            failure: None,
            compensation_description: None,
        });
    }

    pub(crate) fn record_success(&mut self, compensation_description: String) {
        if let Some(record) = self.records.last_mut() {
            record.completed_at = Some(Instant::now());
            record.compensation_description = Some(compensation_description);
        }
    }

    pub(crate) fn record_rejection(&mut self, reason: &str) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Rejected;
            record.completed_at = Some(Instant::now());
            record.failure = Some(reason.to_string());
        }
    }

    pub(crate) fn record_fault(&mut self, message: &str) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Faulted;
            record.completed_at = Some(Instant::now());
            record.failure = Some(message.to_string());
        }
    }

    pub(crate) fn record_compensated(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = StepStatus::Compensated;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_compensation_failed(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = StepStatus::CompensationFailed;
            record.completed_at = Some(Instant::now());
        }
    }

    /// All records, in execution order.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// One-line-per-step rendering for diagnostics.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                StepStatus::Executed => "✓",
                StepStatus::Rejected => "✗",
                StepStatus::Faulted => "‼",
                StepStatus::Compensated => "↩",
                StepStatus::CompensationFailed => "⚠",
            };
            match &record.failure {
                Some(failure) => lines.push(format!("{status} {}: {failure}", record.name)),
                None => lines.push(format!("{status} {}", record.name)),
            }
        }
        lines.join("\n")
    }
}
