use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::cancel::CancelToken;

/// Lifecycle of a single saga run.
///
/// `Running` is the only state in which forward steps execute. A run enters
/// `Compensating` at most once, on the first failure, and never returns to
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SagaState {
    /// The context has been created but not handed to an orchestrator yet.
    NotStarted,
    /// Forward steps are executing.
    Running,
    /// Every step completed; no compensation occurred.
    Completed,
    /// A step failed and completed steps are being undone.
    Compensating,
    /// The reverse loop finished. Terminal.
    Compensated,
}

/// A typed name for a context value.
///
/// Declaring the key once pairs the string with the value type, so readers
/// and writers of the same slot stay in agreement without repeating
/// turbofish annotations at every call site.
///
/// ```
/// use orderflow_saga::{ContextKey, ExecutionContext};
///
/// static RETRY_BUDGET: ContextKey<u32> = ContextKey::new("retry.budget");
///
/// let mut ctx = ExecutionContext::<std::io::Error>::new();
/// ctx.set_keyed(&RETRY_BUDGET, 3);
/// assert_eq!(ctx.get_keyed(&RETRY_BUDGET), Some(&3));
/// ```
pub struct ContextKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Create a key with the given name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The underlying string name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

/// Result of [`ExecutionContext::lookup`], separating the two ways a read
/// can come back empty.
#[derive(Debug)]
pub enum Lookup<'a, T> {
    /// The key is present and holds a `T`.
    Value(&'a T),
    /// The key was never set.
    Missing,
    /// The key is present but holds a value of a different type.
    TypeMismatch,
}

impl<'a, T> Lookup<'a, T> {
    /// The stored value, if present with the requested type.
    #[must_use]
    pub fn value(self) -> Option<&'a T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::TypeMismatch => None,
        }
    }
}

/// Per-run scratch storage and audit trail, shared by every step of one
/// saga run.
///
/// The context is exclusively owned by one orchestrator run: steps mutate it
/// through `&mut`, so step-to-step ordering is structural and no locking is
/// involved. Distinct runs use distinct contexts and never coordinate.
pub struct ExecutionContext<E> {
    id: Uuid,
    started_at: DateTime<Utc>,
    data: IndexMap<String, Box<dyn Any + Send>>,
    executed_steps: Vec<String>,
    compensated_steps: Vec<String>,
    failure_reason: Option<String>,
    last_error: Option<E>,
    state: SagaState,
    cancel_token: Option<CancelToken>,
}

impl<E> ExecutionContext<E> {
    /// Create a fresh context with a new correlation id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            data: IndexMap::new(),
            executed_steps: Vec::new(),
            compensated_steps: Vec::new(),
            failure_reason: None,
            last_error: None,
            state: SagaState::NotStarted,
            cancel_token: None,
        }
    }

    /// Attach a cancellation token checked between steps.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Correlation id of this run.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the context was created.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current position in the run lifecycle.
    #[must_use]
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Names of steps whose forward work completed, in execution order.
    #[must_use]
    pub fn executed_steps(&self) -> &[String] {
        &self.executed_steps
    }

    /// Names of steps whose compensation ran successfully, in compensation
    /// order. Best-effort log: comparing its length against
    /// [`ExecutionContext::executed_steps`] reveals partial rollback.
    #[must_use]
    pub fn compensated_steps(&self) -> &[String] {
        &self.compensated_steps
    }

    /// Why the run failed, if it did. Set once, on the first failure.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// The error behind the first fault, if the failure was one.
    #[must_use]
    pub fn last_error(&self) -> Option<&E> {
        self.last_error.as_ref()
    }

    /// Take ownership of the fault error, leaving `None` behind.
    pub fn take_last_error(&mut self) -> Option<E> {
        self.last_error.take()
    }

    /// Store a value under `key`, replacing any previous value. Last writer
    /// wins.
    pub fn set<T: Send + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Read a value by key. Returns `None` when the key is absent or holds
    /// a different type; absence is an expected signal, not an error.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|value| value.downcast_ref())
    }

    /// Read a value by key, distinguishing an absent key from one that holds
    /// a value of the wrong type.
    #[must_use]
    pub fn lookup<T: 'static>(&self, key: &str) -> Lookup<'_, T> {
        match self.data.get(key) {
            None => Lookup::Missing,
            Some(value) => value
                .downcast_ref()
                .map_or(Lookup::TypeMismatch, Lookup::Value),
        }
    }

    /// [`ExecutionContext::set`] through a typed key.
    pub fn set_keyed<T: Send + 'static>(&mut self, key: &ContextKey<T>, value: T) {
        self.set(key.name(), value);
    }

    /// [`ExecutionContext::get`] through a typed key.
    #[must_use]
    pub fn get_keyed<T: 'static>(&self, key: &ContextKey<T>) -> Option<&T> {
        self.get(key.name())
    }

    pub(crate) fn begin(&mut self) {
        self.state = SagaState::Running;
    }

    pub(crate) fn complete(&mut self) {
        self.state = SagaState::Completed;
    }

    pub(crate) fn begin_compensation(&mut self) {
        self.state = SagaState::Compensating;
    }

    pub(crate) fn finish_compensation(&mut self) {
        self.state = SagaState::Compensated;
    }

    pub(crate) fn mark_executed(&mut self, name: &str) {
        self.executed_steps.push(name.to_string());
    }

    pub(crate) fn mark_compensated(&mut self, name: &str) {
        self.compensated_steps.push(name.to_string());
    }

    /// Record the first failure of the run. Later calls are ignored so the
    /// original cause is never overwritten.
    pub(crate) fn record_failure(&mut self, reason: String, error: Option<E>) {
        if self.failure_reason.is_none() {
            self.failure_reason = Some(reason);
            self.last_error = error;
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
    }
}

impl<E> Default for ExecutionContext<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for ExecutionContext<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("data_keys", &self.data.keys().collect::<Vec<_>>())
            .field("executed_steps", &self.executed_steps)
            .field("compensated_steps", &self.compensated_steps)
            .field("failure_reason", &self.failure_reason)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
