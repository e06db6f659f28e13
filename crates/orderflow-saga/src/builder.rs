use std::collections::HashSet;
use std::fmt::Display;

use tracing::warn;

use crate::saga::Saga;
use crate::step::SagaStep;

/// Collects steps in execution order and assembles a [`Saga`].
///
/// Step names are informational: the orchestrator targets compensation by
/// position, so duplicate names cannot misdirect an undo. The builder still
/// warns on duplicates because they make logs ambiguous.
pub struct SagaBuilder<E> {
    steps: Vec<Box<dyn SagaStep<Error = E>>>,
}

impl<E: Display> SagaBuilder<E> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step to the end of the saga.
    #[must_use]
    pub fn step<S>(mut self, step: S) -> Self
    where
        S: SagaStep<Error = E> + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Append an already boxed step, for step lists built dynamically.
    #[must_use]
    pub fn boxed_step(mut self, step: Box<dyn SagaStep<Error = E>>) -> Self {
        self.steps.push(step);
        self
    }

    /// Build the saga from the accumulated steps.
    #[must_use]
    pub fn build(self) -> Saga<E> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name()) {
                warn!(step = step.name(), "duplicate step name in saga");
            }
        }
        Saga::from_steps(self.steps)
    }
}

impl<E: Display> Default for SagaBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
