//! Permission table
//!
//! One table per protected model. Rules are stored per access kind, split
//! into a wildcard tier and a per-attribute tier, each in registration order.
//!
//! The rule set lives behind `RwLock<Arc<..>>`: registration takes the write
//! lock and updates the set copy-on-write, evaluation clones the `Arc` under
//! a short read lock and runs the rules without holding any lock. Conditions
//! are therefore free to query the same table again.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use fieldguard_types::{
    AccessKind, AttributeKey, Attributes, GuardSpec, IntoPermission, ProtectError, ProtectResult,
    Protectable,
};
use tracing::{debug, trace};

use crate::context::{Flag, FlagScope};
use crate::rule::Rule;
use crate::validation::{validate_registration, Registration};

/// Rules for a single access kind.
struct KindRules<S> {
    wildcard: Vec<Rule<S>>,
    named: HashMap<String, Vec<Rule<S>>>,
}

impl<S> Default for KindRules<S> {
    fn default() -> Self {
        Self {
            wildcard: Vec::new(),
            named: HashMap::new(),
        }
    }
}

impl<S> Clone for KindRules<S> {
    fn clone(&self) -> Self {
        Self {
            wildcard: self.wildcard.clone(),
            named: self.named.clone(),
        }
    }
}

struct RuleSet<S> {
    kinds: HashMap<AccessKind, KindRules<S>>,
}

impl<S> Clone for RuleSet<S> {
    fn clone(&self) -> Self {
        Self {
            kinds: self.kinds.clone(),
        }
    }
}

impl<S> RuleSet<S> {
    fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    fn rules(&self, kind: AccessKind, key: &AttributeKey) -> &[Rule<S>] {
        let Some(kind_rules) = self.kinds.get(&kind) else {
            return &[];
        };
        match key {
            AttributeKey::All => &kind_rules.wildcard,
            AttributeKey::Named(name) => kind_rules
                .named
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    fn push(&mut self, kind: AccessKind, key: &AttributeKey, rule: Rule<S>) {
        let kind_rules = self.kinds.entry(kind).or_default();
        match key {
            AttributeKey::All => kind_rules.wildcard.push(rule),
            AttributeKey::Named(name) => {
                kind_rules.named.entry(name.clone()).or_default().push(rule)
            }
        }
    }
}

/// Grant/deny rules of one protected model.
pub struct PermissionTable<S> {
    model: String,
    attributes: BTreeSet<String>,
    rules: RwLock<Arc<RuleSet<S>>>,
}

impl<S> PermissionTable<S> {
    /// An empty table for `model`, whose declared attributes are `attributes`.
    pub fn new<I, T>(model: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            model: model.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            rules: RwLock::new(Arc::new(RuleSet::empty())),
        }
    }

    /// A table for a subtype of this model.
    ///
    /// The subtype starts from a copy of the rules registered so far and
    /// declares this model's attributes plus `extra_attributes`. Rules added
    /// to either table afterwards do not affect the other.
    pub fn derive<I, T>(
        &self,
        model: impl Into<String>,
        extra_attributes: I,
    ) -> ProtectResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let rules = self.snapshot()?;
        let mut attributes = self.attributes.clone();
        attributes.extend(extra_attributes.into_iter().map(Into::into));
        let model = model.into();
        debug!(parent = %self.model, model = %model, "Derived permission table");
        Ok(Self {
            model,
            attributes,
            rules: RwLock::new(Arc::new((*rules).clone())),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    /// Register a grant.
    ///
    /// `Access` registers the same guard under `Read` and `Write`; no
    /// attributes means every attribute. Nothing is registered unless the
    /// whole call is valid.
    pub fn permit(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
        guard: impl Into<GuardSpec<S>>,
    ) -> ProtectResult<()> {
        let registration = validate_registration(
            &self.model,
            &self.attributes,
            permission,
            &attributes.into(),
            guard.into(),
        )?;
        self.register(registration)
    }

    /// Register a denial: the inverse of `guard`, stored as a grant.
    ///
    /// Without a guard the denial is unconditional.
    pub fn deny(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
        guard: impl Into<GuardSpec<S>>,
    ) -> ProtectResult<()> {
        let mut registration = validate_registration(
            &self.model,
            &self.attributes,
            permission,
            &attributes.into(),
            guard.into(),
        )?;
        registration.guard = registration.guard.inverted();
        self.register(registration)
    }

    fn register(&self, registration: Registration<S>) -> ProtectResult<()> {
        let mut current = self.rules.write().map_err(|_| ProtectError::LockPoisoned)?;
        let rules = Arc::make_mut(&mut *current);
        for &kind in registration.kinds {
            for key in &registration.keys {
                rules.push(kind, key, Rule::from(registration.guard.clone()));
            }
        }
        debug!(
            model = %self.model,
            kinds = ?registration.kinds,
            attributes = ?registration.keys,
            guard = ?registration.guard,
            "Registered permission rule"
        );
        Ok(())
    }

    /// Number of rules stored under `kind` for `key`.
    pub fn rule_count(&self, kind: AccessKind, key: &AttributeKey) -> ProtectResult<usize> {
        Ok(self.snapshot()?.rules(kind, key).len())
    }

    fn snapshot(&self) -> ProtectResult<Arc<RuleSet<S>>> {
        let rules = self.rules.read().map_err(|_| ProtectError::LockPoisoned)?;
        Ok(Arc::clone(&*rules))
    }
}

impl<S: Protectable> PermissionTable<S> {
    /// Whether `subject` may access `attribute` in the given way.
    ///
    /// Wildcard rules run first, then the attribute's own rules, each in
    /// registration order; the first rule that fails ends evaluation with
    /// `false`. With no failing rule (or no rules at all) access is granted.
    pub fn is_allowed(
        &self,
        kind: AccessKind,
        attribute: &str,
        subject: &S,
    ) -> ProtectResult<bool> {
        let rules = self.snapshot()?;
        let _checking = FlagScope::enter(Flag::CheckingPermissions);

        let Some(kind_rules) = rules.kinds.get(&kind) else {
            return Ok(true);
        };
        let tiers = [
            ("wildcard", kind_rules.wildcard.as_slice()),
            (
                "attribute",
                kind_rules
                    .named
                    .get(attribute)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
            ),
        ];
        for (tier, tier_rules) in tiers {
            for (position, rule) in tier_rules.iter().enumerate() {
                if !rule.is_satisfied(subject)? {
                    trace!(
                        model = %self.model,
                        attribute,
                        kind = %kind,
                        tier,
                        position,
                        "Permission rule failed"
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    pub fn readable(&self, attribute: &str, subject: &S) -> ProtectResult<bool> {
        self.is_allowed(AccessKind::Read, attribute, subject)
    }

    pub fn writable(&self, attribute: &str, subject: &S) -> ProtectResult<bool> {
        self.is_allowed(AccessKind::Write, attribute, subject)
    }

    /// Display query for presentation logic. A denial is `Ok(false)`, never
    /// an error.
    pub fn displayable(&self, attribute: &str, subject: &S) -> ProtectResult<bool> {
        self.is_allowed(AccessKind::Display, attribute, subject)
    }
}

impl<S> fmt::Debug for PermissionTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionTable")
            .field("model", &self.model)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
