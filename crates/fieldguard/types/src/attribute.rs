//! Attribute keys and registration targets

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which rules are stored in a permission table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeKey {
    /// Applies to every attribute of the model. Evaluated first.
    All,
    Named(String),
}

impl AttributeKey {
    pub fn named(name: impl Into<String>) -> Self {
        AttributeKey::Named(name.into())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, AttributeKey::All)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::All => f.write_str("*"),
            AttributeKey::Named(name) => f.write_str(name),
        }
    }
}

/// The attributes a registration applies to.
///
/// An empty list is the same as `All`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Attributes {
    #[default]
    All,
    Named(Vec<String>),
}

impl Attributes {
    pub fn named<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Attributes::All
        } else {
            Attributes::Named(names)
        }
    }

    /// The table keys this registration targets.
    pub fn keys(&self) -> Vec<AttributeKey> {
        match self {
            Attributes::All => vec![AttributeKey::All],
            Attributes::Named(names) if names.is_empty() => vec![AttributeKey::All],
            Attributes::Named(names) => names.iter().cloned().map(AttributeKey::Named).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            Attributes::All => &[],
            Attributes::Named(names) => names,
        }
    }
}

impl From<&str> for Attributes {
    fn from(name: &str) -> Self {
        Attributes::Named(vec![name.to_string()])
    }
}

impl From<String> for Attributes {
    fn from(name: String) -> Self {
        Attributes::Named(vec![name])
    }
}

impl From<&[&str]> for Attributes {
    fn from(names: &[&str]) -> Self {
        Attributes::named(names.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Attributes {
    fn from(names: [&str; N]) -> Self {
        Attributes::named(names)
    }
}

impl From<Vec<&str>> for Attributes {
    fn from(names: Vec<&str>) -> Self {
        Attributes::named(names)
    }
}

impl From<Vec<String>> for Attributes {
    fn from(names: Vec<String>) -> Self {
        Attributes::named(names)
    }
}

impl From<Option<&str>> for Attributes {
    fn from(name: Option<&str>) -> Self {
        name.map(Attributes::from).unwrap_or(Attributes::All)
    }
}
