//! Guard shapes as supplied at registration
//!
//! A guard is either absent, a literal boolean, or a single-entry mapping
//! `{if: condition}` / `{unless: condition}`. `GuardSpec` keeps whatever the
//! caller handed in, unvalidated; the engine validates it before anything is
//! registered.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::condition::{Callable, Condition};

/// Keys recognized in a guard mapping.
pub const GUARD_CONDITIONS: [&str; 2] = ["if", "unless"];

/// An unvalidated guard.
pub enum GuardSpec<S> {
    Absent,
    Bool(bool),
    Map(Vec<(String, ConditionSpec<S>)>),
    /// A value that is neither a boolean nor a mapping.
    Unsupported(String),
}

/// An unvalidated condition value inside a guard mapping.
pub enum ConditionSpec<S> {
    Absent,
    Bool(bool),
    Predicate(String),
    Callable(Callable<S>),
    /// A value of a type that cannot act as a condition.
    Unsupported(String),
}

impl<S> GuardSpec<S> {
    /// `{if: condition}`
    pub fn when(condition: impl Into<ConditionSpec<S>>) -> Self {
        GuardSpec::Map(vec![("if".to_string(), condition.into())])
    }

    /// `{unless: condition}`
    pub fn unless(condition: impl Into<ConditionSpec<S>>) -> Self {
        GuardSpec::Map(vec![("unless".to_string(), condition.into())])
    }

    /// `{if: f}`
    pub fn when_fn<F>(f: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self::when(ConditionSpec::Callable(Arc::new(f)))
    }

    /// `{unless: f}`
    pub fn unless_fn<F>(f: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self::unless(ConditionSpec::Callable(Arc::new(f)))
    }

    /// Add an entry to a mapping guard, turning an absent guard into a mapping.
    ///
    /// A boolean guard cannot also be a mapping; the result is `Unsupported`
    /// so validation rejects it.
    pub fn entry(self, key: impl Into<String>, condition: impl Into<ConditionSpec<S>>) -> Self {
        let mut entries = match self {
            GuardSpec::Absent => Vec::new(),
            GuardSpec::Map(entries) => entries,
            GuardSpec::Bool(_) => return GuardSpec::Unsupported("bool with entries".to_string()),
            unsupported @ GuardSpec::Unsupported(_) => return unsupported,
        };
        entries.push((key.into(), condition.into()));
        GuardSpec::Map(entries)
    }

    /// Read a guard declared in JSON: `true`, `null`, `{}`, `{"if": "name"}`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => GuardSpec::Absent,
            Value::Bool(b) => GuardSpec::Bool(*b),
            Value::Object(map) => GuardSpec::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), ConditionSpec::from_json(value)))
                    .collect(),
            ),
            other => GuardSpec::Unsupported(json_type_name(other).to_string()),
        }
    }

    /// True for an absent guard or an empty mapping.
    pub fn is_empty(&self) -> bool {
        match self {
            GuardSpec::Absent => true,
            GuardSpec::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }
}

impl<S> ConditionSpec<S> {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ConditionSpec::Absent,
            Value::Bool(b) => ConditionSpec::Bool(*b),
            Value::String(name) => ConditionSpec::Predicate(name.clone()),
            other => ConditionSpec::Unsupported(json_type_name(other).to_string()),
        }
    }

    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            ConditionSpec::Absent => "null",
            ConditionSpec::Bool(_) => "bool",
            ConditionSpec::Predicate(_) => "predicate",
            ConditionSpec::Callable(_) => "callable",
            ConditionSpec::Unsupported(type_name) => type_name,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<S> Default for GuardSpec<S> {
    fn default() -> Self {
        GuardSpec::Absent
    }
}

impl<S> From<bool> for GuardSpec<S> {
    fn from(value: bool) -> Self {
        GuardSpec::Bool(value)
    }
}

impl<S> From<()> for GuardSpec<S> {
    fn from(_: ()) -> Self {
        GuardSpec::Absent
    }
}

impl<S> From<&Value> for GuardSpec<S> {
    fn from(value: &Value) -> Self {
        GuardSpec::from_json(value)
    }
}

impl<S> From<bool> for ConditionSpec<S> {
    fn from(value: bool) -> Self {
        ConditionSpec::Bool(value)
    }
}

impl<S> From<&str> for ConditionSpec<S> {
    fn from(name: &str) -> Self {
        ConditionSpec::Predicate(name.to_string())
    }
}

impl<S> From<String> for ConditionSpec<S> {
    fn from(name: String) -> Self {
        ConditionSpec::Predicate(name)
    }
}

impl<S> From<Option<&str>> for ConditionSpec<S> {
    fn from(name: Option<&str>) -> Self {
        match name {
            Some(name) => ConditionSpec::Predicate(name.to_string()),
            None => ConditionSpec::Absent,
        }
    }
}

impl<S> From<Condition<S>> for ConditionSpec<S> {
    fn from(condition: Condition<S>) -> Self {
        match condition {
            Condition::Always(value) => ConditionSpec::Bool(value),
            Condition::Predicate(name) => ConditionSpec::Predicate(name),
            Condition::Callable(f) => ConditionSpec::Callable(f),
        }
    }
}

impl<S> Clone for ConditionSpec<S> {
    fn clone(&self) -> Self {
        match self {
            ConditionSpec::Absent => ConditionSpec::Absent,
            ConditionSpec::Bool(value) => ConditionSpec::Bool(*value),
            ConditionSpec::Predicate(name) => ConditionSpec::Predicate(name.clone()),
            ConditionSpec::Callable(f) => ConditionSpec::Callable(Arc::clone(f)),
            ConditionSpec::Unsupported(type_name) => {
                ConditionSpec::Unsupported(type_name.clone())
            }
        }
    }
}

impl<S> Clone for GuardSpec<S> {
    fn clone(&self) -> Self {
        match self {
            GuardSpec::Absent => GuardSpec::Absent,
            GuardSpec::Bool(value) => GuardSpec::Bool(*value),
            GuardSpec::Map(entries) => GuardSpec::Map(entries.clone()),
            GuardSpec::Unsupported(type_name) => GuardSpec::Unsupported(type_name.clone()),
        }
    }
}

impl<S> fmt::Debug for ConditionSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionSpec::Absent => f.write_str("Absent"),
            ConditionSpec::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            ConditionSpec::Predicate(name) => f.debug_tuple("Predicate").field(name).finish(),
            ConditionSpec::Callable(_) => f.write_str("Callable(..)"),
            ConditionSpec::Unsupported(type_name) => {
                f.debug_tuple("Unsupported").field(type_name).finish()
            }
        }
    }
}

impl<S> fmt::Debug for GuardSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardSpec::Absent => f.write_str("Absent"),
            GuardSpec::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            GuardSpec::Map(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            GuardSpec::Unsupported(type_name) => {
                f.debug_tuple("Unsupported").field(type_name).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Subject;

    #[test]
    fn json_guards_map_onto_specs() {
        let guard: GuardSpec<Subject> = GuardSpec::from_json(&json!({"if": "funny"}));
        match guard {
            GuardSpec::Map(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].0, "if");
                assert!(matches!(entries[0].1, ConditionSpec::Predicate(ref n) if n == "funny"));
            }
            other => panic!("expected map, got {:?}", other),
        }

        assert!(matches!(
            GuardSpec::<Subject>::from_json(&json!(false)),
            GuardSpec::Bool(false)
        ));
        assert!(GuardSpec::<Subject>::from_json(&json!(null)).is_empty());
        assert!(GuardSpec::<Subject>::from_json(&json!({})).is_empty());
    }

    #[test]
    fn entries_never_replace_a_non_mapping_guard() {
        assert!(matches!(
            GuardSpec::<Subject>::Bool(true).entry("if", "funny"),
            GuardSpec::Unsupported(_)
        ));
        assert!(matches!(
            GuardSpec::<Subject>::from_json(&json!(3)).entry("unless", "serious"),
            GuardSpec::Unsupported(ref t) if t == "number"
        ));
        assert!(matches!(
            GuardSpec::<Subject>::Absent.entry("if", true),
            GuardSpec::Map(ref entries) if entries.len() == 1
        ));
    }

    #[test]
    fn json_values_that_cannot_be_guards_are_kept_as_unsupported() {
        assert!(matches!(
            GuardSpec::<Subject>::from_json(&json!("funny")),
            GuardSpec::Unsupported(ref t) if t == "string"
        ));
        let cond = ConditionSpec::<Subject>::from_json(&json!([1, 2]));
        assert_eq!(cond.type_name(), "array");
    }

    #[test]
    fn entry_builds_multi_key_mappings() {
        let guard: GuardSpec<Subject> = GuardSpec::when("funny").entry("unless", "serious");
        match guard {
            GuardSpec::Map(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected map, got {:?}", other),
        }
    }
}
