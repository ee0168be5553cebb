//! Conditions and the subject capability they evaluate against

use std::fmt;
use std::sync::Arc;

use crate::error::{ProtectError, ProtectResult};

/// An object whose attributes can be protected.
///
/// Named-predicate conditions are resolved through `predicate` at evaluation
/// time, so a predicate may be introduced after the rules naming it were
/// registered.
pub trait Protectable {
    /// Evaluate the zero-argument predicate `name`, or `None` if the subject
    /// does not know it.
    fn predicate(&self, name: &str) -> Option<bool>;
}

/// A condition implemented as a function of the subject.
pub type Callable<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// A single predicate evaluated against a subject.
pub enum Condition<S> {
    Always(bool),
    Predicate(String),
    Callable(Callable<S>),
}

impl<S> Condition<S> {
    pub fn predicate(name: impl Into<String>) -> Self {
        Condition::Predicate(name.into())
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Condition::Callable(Arc::new(f))
    }
}

impl<S: Protectable> Condition<S> {
    /// Evaluate against `subject`. A predicate the subject does not know is an
    /// error, never a silent `false`.
    pub fn evaluate(&self, subject: &S) -> ProtectResult<bool> {
        match self {
            Condition::Always(value) => Ok(*value),
            Condition::Predicate(name) => {
                subject
                    .predicate(name)
                    .ok_or_else(|| ProtectError::UnknownPredicate {
                        name: name.clone(),
                    })
            }
            Condition::Callable(f) => Ok(f(subject)),
        }
    }
}

impl<S> Clone for Condition<S> {
    fn clone(&self) -> Self {
        match self {
            Condition::Always(value) => Condition::Always(*value),
            Condition::Predicate(name) => Condition::Predicate(name.clone()),
            Condition::Callable(f) => Condition::Callable(Arc::clone(f)),
        }
    }
}

impl<S> fmt::Debug for Condition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always(value) => f.debug_tuple("Always").field(value).finish(),
            Condition::Predicate(name) => f.debug_tuple("Predicate").field(name).finish(),
            Condition::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}
