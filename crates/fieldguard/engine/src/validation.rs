//! Registration validation
//!
//! Every `permit`/`deny` call passes through `validate_registration` before
//! the permission table is touched. A call that fails here leaves the table
//! exactly as it was.

use std::collections::BTreeSet;
use std::fmt;

use fieldguard_types::{
    AccessKind, AttributeKey, Attributes, Condition, ConditionSpec, GuardSpec, IntoPermission,
    ProtectError, ProtectResult, GUARD_CONDITIONS,
};

use crate::rule::Guard;

/// A registration that passed validation, ready to be applied.
pub struct Registration<S> {
    pub kinds: &'static [AccessKind],
    pub keys: Vec<AttributeKey>,
    pub guard: Guard<S>,
}

impl<S> fmt::Debug for Registration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("kinds", &self.kinds)
            .field("keys", &self.keys)
            .field("guard", &self.guard)
            .finish()
    }
}

/// Validate the permission, attributes and guard of a registration call.
pub fn validate_registration<S>(
    model: &str,
    known_attributes: &BTreeSet<String>,
    permission: impl IntoPermission,
    attributes: &Attributes,
    guard: GuardSpec<S>,
) -> ProtectResult<Registration<S>> {
    let permission = permission.into_permission()?;
    let keys = validate_attributes(model, known_attributes, attributes)?;
    let guard = validate_guard(guard)?;
    Ok(Registration {
        kinds: permission.expand(),
        keys,
        guard,
    })
}

/// Check every named attribute exists on the model and return the table keys.
pub fn validate_attributes(
    model: &str,
    known_attributes: &BTreeSet<String>,
    attributes: &Attributes,
) -> ProtectResult<Vec<AttributeKey>> {
    if let Some(unknown) = attributes
        .names()
        .iter()
        .find(|name| !known_attributes.contains(name.as_str()))
    {
        return Err(ProtectError::UnknownAttribute {
            model: model.to_string(),
            attribute: unknown.clone(),
        });
    }
    Ok(attributes.keys())
}

/// Turn a guard as supplied by the caller into a validated `Guard`.
pub fn validate_guard<S>(guard: GuardSpec<S>) -> ProtectResult<Guard<S>> {
    match guard {
        GuardSpec::Absent => Ok(Guard::Unconditional),
        GuardSpec::Bool(value) => Ok(Guard::Always(value)),
        GuardSpec::Unsupported(type_name) => Err(ProtectError::InvalidGuard(format!(
            "guard must be a boolean or one of {:?}, got {}",
            GUARD_CONDITIONS, type_name
        ))),
        GuardSpec::Map(mut entries) => {
            if entries.len() > 1 {
                let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
                return Err(ProtectError::InvalidGuard(format!(
                    "guard must have exactly one of {:?}, got {:?}",
                    GUARD_CONDITIONS, keys
                )));
            }
            let Some((key, value)) = entries.pop() else {
                return Ok(Guard::Unconditional);
            };
            let condition = validate_condition(&key, value)?;
            match key.as_str() {
                "if" => Ok(Guard::If(condition)),
                "unless" => Ok(Guard::Unless(condition)),
                _ => Err(foreign_key(&key)),
            }
        }
    }
}

fn validate_condition<S>(key: &str, value: ConditionSpec<S>) -> ProtectResult<Condition<S>> {
    if !GUARD_CONDITIONS.contains(&key) {
        return Err(foreign_key(key));
    }
    match value {
        // A present key with no value never holds.
        ConditionSpec::Absent => Ok(Condition::Always(false)),
        ConditionSpec::Bool(value) => Ok(Condition::Always(value)),
        ConditionSpec::Predicate(name) => Ok(Condition::Predicate(name)),
        ConditionSpec::Callable(f) => Ok(Condition::Callable(f)),
        ConditionSpec::Unsupported(type_name) => Err(ProtectError::InvalidGuard(format!(
            "'{}' condition must be bool, null, predicate name or callable, got {}",
            key, type_name
        ))),
    }
}

fn foreign_key(key: &str) -> ProtectError {
    ProtectError::InvalidGuardCondition(format!(
        "'{}', guard condition must be one of {:?}",
        key, GUARD_CONDITIONS
    ))
}
