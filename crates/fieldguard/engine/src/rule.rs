//! Validated guards and the rules built from them

use std::fmt;

use fieldguard_types::{Condition, ProtectResult, Protectable};

/// A guard that has passed validation.
pub enum Guard<S> {
    /// No guard given: the rule always holds.
    Unconditional,
    Always(bool),
    If(Condition<S>),
    Unless(Condition<S>),
}

impl<S> Guard<S> {
    /// The guard a `deny` registration stores.
    ///
    /// An unconditional guard inverts to `Always(false)`: `deny` without a
    /// guard denies outright.
    pub fn inverted(self) -> Self {
        match self {
            Guard::Unconditional => Guard::Always(false),
            Guard::Always(value) => Guard::Always(!value),
            Guard::If(condition) => Guard::Unless(condition),
            Guard::Unless(condition) => Guard::If(condition),
        }
    }
}

impl<S> Clone for Guard<S> {
    fn clone(&self) -> Self {
        match self {
            Guard::Unconditional => Guard::Unconditional,
            Guard::Always(value) => Guard::Always(*value),
            Guard::If(condition) => Guard::If(condition.clone()),
            Guard::Unless(condition) => Guard::Unless(condition.clone()),
        }
    }
}

impl<S> fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Unconditional => f.write_str("Unconditional"),
            Guard::Always(value) => f.debug_tuple("Always").field(value).finish(),
            Guard::If(condition) => f.debug_tuple("If").field(condition).finish(),
            Guard::Unless(condition) => f.debug_tuple("Unless").field(condition).finish(),
        }
    }
}

/// An `{if, unless}` pair. Satisfied when `if` (if any) holds and
/// `unless` (if any) does not.
pub struct Rule<S> {
    pub if_condition: Option<Condition<S>>,
    pub unless_condition: Option<Condition<S>>,
}

impl<S: Protectable> Rule<S> {
    pub fn is_satisfied(&self, subject: &S) -> ProtectResult<bool> {
        if let Some(condition) = &self.if_condition {
            if !condition.evaluate(subject)? {
                return Ok(false);
            }
        }
        if let Some(condition) = &self.unless_condition {
            if condition.evaluate(subject)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<S> From<Guard<S>> for Rule<S> {
    fn from(guard: Guard<S>) -> Self {
        match guard {
            Guard::Unconditional => Rule {
                if_condition: None,
                unless_condition: None,
            },
            Guard::Always(value) => Rule {
                if_condition: Some(Condition::Always(value)),
                unless_condition: None,
            },
            Guard::If(condition) => Rule {
                if_condition: Some(condition),
                unless_condition: None,
            },
            Guard::Unless(condition) => Rule {
                if_condition: None,
                unless_condition: Some(condition),
            },
        }
    }
}

impl<S> Clone for Rule<S> {
    fn clone(&self) -> Self {
        Self {
            if_condition: self.if_condition.clone(),
            unless_condition: self.unless_condition.clone(),
        }
    }
}

impl<S> fmt::Debug for Rule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("if", &self.if_condition)
            .field("unless", &self.unless_condition)
            .finish()
    }
}
