//! Protection setup
//!
//! `Protection` is what a model gets when it opts in: its permission table,
//! the configuration it was protected with and the default policy installed
//! according to that configuration.

use std::fmt;

use fieldguard_types::{
    Attributes, GuardSpec, IntoPermission, Permission, ProtectResult, Protectable,
};
use tracing::{debug, info};

use crate::config::{DefaultPolicy, ProtectionConfig};
use crate::interceptor::AccessInterceptor;
use crate::table::PermissionTable;

/// A protected model.
pub struct Protection<S> {
    table: PermissionTable<S>,
    config: ProtectionConfig,
}

impl<S> Protection<S> {
    /// Protect `model`, declaring `attributes`, and install the default
    /// policy unless `config.defaults` is off.
    pub fn new<I, T>(
        model: impl Into<String>,
        attributes: I,
        config: ProtectionConfig,
    ) -> ProtectResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let table = PermissionTable::new(model, attributes);
        if config.defaults {
            install_default_policy(&table, &config.default_policy)?;
        }
        info!(
            model = %table.model(),
            defaults = config.defaults,
            extended = config.extended,
            "Model protected"
        );
        Ok(Self { table, config })
    }

    /// Protection for a subtype, starting from a copy of this model's rules.
    ///
    /// The default policy is not installed again; the subtype inherits it
    /// with the rest of the rules.
    pub fn derive<I, T>(
        &self,
        model: impl Into<String>,
        extra_attributes: I,
    ) -> ProtectResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Ok(Self {
            table: self.table.derive(model, extra_attributes)?,
            config: self.config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        self.table.model()
    }

    pub fn table(&self) -> &PermissionTable<S> {
        &self.table
    }

    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    pub fn permit(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
        guard: impl Into<GuardSpec<S>>,
    ) -> ProtectResult<()> {
        self.table.permit(permission, attributes, guard)
    }

    pub fn deny(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
        guard: impl Into<GuardSpec<S>>,
    ) -> ProtectResult<()> {
        self.table.deny(permission, attributes, guard)
    }

    /// The extended registration forms, when the model was protected with
    /// `extended` on.
    pub fn extended(&self) -> Option<Extended<'_, S>> {
        self.config.extended.then_some(Extended { table: &self.table })
    }
}

impl<S: Protectable> Protection<S> {
    pub fn interceptor(&self) -> AccessInterceptor<'_, S> {
        AccessInterceptor::new(&self.table)
    }

    pub fn readable(&self, attribute: &str, subject: &S) -> ProtectResult<bool> {
        self.table.readable(attribute, subject)
    }

    pub fn writable(&self, attribute: &str, subject: &S) -> ProtectResult<bool> {
        self.table.writable(attribute, subject)
    }

    pub fn displayable(&self, attribute: &str, subject: &S) -> ProtectResult<bool> {
        self.table.displayable(attribute, subject)
    }
}

fn install_default_policy<S>(
    table: &PermissionTable<S>,
    policy: &DefaultPolicy,
) -> ProtectResult<()> {
    let declared = |name: &String| {
        let present = table.has_attribute(name);
        if !present {
            debug!(
                model = %table.model(),
                attribute = %name,
                "Default policy attribute not declared, skipped"
            );
        }
        present
    };

    if declared(&policy.identity) {
        table.permit(Permission::Read, policy.identity.as_str(), ())?;
    }
    let write_once: Vec<String> = [&policy.identity, &policy.created_at]
        .into_iter()
        .filter(|name| declared(*name))
        .cloned()
        .collect();
    if !write_once.is_empty() {
        table.permit(
            Permission::Write,
            write_once,
            GuardSpec::when(policy.new_record_predicate.as_str()),
        )?;
    }
    if declared(&policy.updated_at) {
        table.permit(Permission::Write, policy.updated_at.as_str(), ())?;
    }
    Ok(())
}

impl<S> fmt::Debug for Protection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protection")
            .field("table", &self.table)
            .field("config", &self.config)
            .finish()
    }
}

/// Registration forms with a fixed outcome.
///
/// `never_permit` is `always_deny` and `never_deny` is `always_permit`.
pub struct Extended<'a, S> {
    table: &'a PermissionTable<S>,
}

impl<'a, S> Extended<'a, S> {
    pub fn always_permit(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
    ) -> ProtectResult<()> {
        self.table.permit(permission, attributes, true)
    }

    pub fn always_deny(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
    ) -> ProtectResult<()> {
        self.table.deny(permission, attributes, true)
    }

    pub fn never_permit(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
    ) -> ProtectResult<()> {
        self.always_deny(permission, attributes)
    }

    pub fn never_deny(
        &self,
        permission: impl IntoPermission,
        attributes: impl Into<Attributes>,
    ) -> ProtectResult<()> {
        self.always_permit(permission, attributes)
    }
}

/// A subject that knows its model's protection.
pub trait Protected: Protectable + Sized {
    fn protection(&self) -> &Protection<Self>;

    fn readable(&self, attribute: &str) -> ProtectResult<bool> {
        self.protection().readable(attribute, self)
    }

    fn writable(&self, attribute: &str) -> ProtectResult<bool> {
        self.protection().writable(attribute, self)
    }

    fn displayable(&self, attribute: &str) -> ProtectResult<bool> {
        self.protection().displayable(attribute, self)
    }
}
