//! Access interception
//!
//! The host attribute store calls these hooks from its own get/set paths:
//!
//! ```text
//! get:  before_read -> underlying read -> after_read
//! set:  before_write -> underlying write
//! default value:  before_default_computation -> compute -> after_default_computation
//! ```
//!
//! A denial is always an error naming the attribute; the underlying
//! operation never runs. `read`, `write` and `compute_default` wrap an
//! operation in the matching hooks.

use std::fmt;

use fieldguard_types::{AccessKind, ProtectError, ProtectResult, Protectable};
use tracing::{trace, warn};

use crate::context::{self, Flag, FlagScope};
use crate::table::PermissionTable;

/// Open while a permitted read runs. Writes made during the read are not
/// checked. Dropping the scope ends the read.
#[must_use = "dropping the scope ends the read"]
#[derive(Debug)]
pub struct ReadScope {
    _performing_read: FlagScope,
}

/// Open while a default value is computed. Writes made by the computation
/// are not checked.
#[must_use = "dropping the scope ends default initialization"]
#[derive(Debug)]
pub struct DefaultScope {
    attribute: String,
    _initializing_defaults: FlagScope,
}

impl DefaultScope {
    /// The attribute whose default is being computed.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

/// Enforcement hooks for one protected model.
pub struct AccessInterceptor<'a, S> {
    table: &'a PermissionTable<S>,
}

impl<'a, S> fmt::Debug for AccessInterceptor<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessInterceptor")
            .field("model", &self.table.model())
            .finish()
    }
}

impl<'a, S> Clone for AccessInterceptor<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S> Copy for AccessInterceptor<'a, S> {}

impl<'a, S: Protectable> AccessInterceptor<'a, S> {
    pub fn new(table: &'a PermissionTable<S>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a PermissionTable<S> {
        self.table
    }

    /// Check a read of `attribute`. Skipped while a permission check is in
    /// progress.
    pub fn before_read(&self, subject: &S, attribute: &str) -> ProtectResult<ReadScope> {
        if context::read_check_suppressed() {
            trace!(model = %self.table.model(), attribute, "Read check bypassed");
        } else {
            self.enforce(AccessKind::Read, subject, attribute)?;
        }
        Ok(ReadScope {
            _performing_read: FlagScope::enter(Flag::PerformingRead),
        })
    }

    pub fn after_read(&self, scope: ReadScope) {
        drop(scope);
    }

    /// Check a write of `attribute`. Skipped during permission checks,
    /// permitted reads and default value computation.
    ///
    /// The value being written is not taken: rules depend only on the
    /// subject and the attribute.
    pub fn before_write(&self, subject: &S, attribute: &str) -> ProtectResult<()> {
        if context::write_check_suppressed() {
            trace!(
                model = %self.table.model(),
                attribute,
                context = ?context::snapshot(),
                "Write check bypassed"
            );
            return Ok(());
        }
        self.enforce(AccessKind::Write, subject, attribute)
    }

    /// Enter default value computation for a never-set `attribute`.
    pub fn before_default_computation(&self, _subject: &S, attribute: &str) -> DefaultScope {
        trace!(model = %self.table.model(), attribute, "Computing default value");
        DefaultScope {
            attribute: attribute.to_string(),
            _initializing_defaults: FlagScope::enter(Flag::InitializingDefaults),
        }
    }

    /// Leave default value computation. The scope returned by
    /// `before_default_computation` stands in for the subject and attribute.
    pub fn after_default_computation(&self, scope: DefaultScope) {
        trace!(
            model = %self.table.model(),
            attribute = scope.attribute(),
            "Default value computed"
        );
        drop(scope);
    }

    /// Run `read` as a checked read of `attribute`.
    pub fn read<T>(
        &self,
        subject: &S,
        attribute: &str,
        read: impl FnOnce() -> T,
    ) -> ProtectResult<T> {
        let scope = self.before_read(subject, attribute)?;
        let value = read();
        self.after_read(scope);
        Ok(value)
    }

    /// Run `write` as a checked write of `attribute`.
    pub fn write<T>(
        &self,
        subject: &S,
        attribute: &str,
        write: impl FnOnce() -> T,
    ) -> ProtectResult<T> {
        self.before_write(subject, attribute)?;
        Ok(write())
    }

    /// Run `compute` as the default value computation for `attribute`.
    pub fn compute_default<T>(
        &self,
        subject: &S,
        attribute: &str,
        compute: impl FnOnce() -> T,
    ) -> T {
        let scope = self.before_default_computation(subject, attribute);
        let value = compute();
        self.after_default_computation(scope);
        value
    }

    /// Raise `IllegalDisplayAccess` unless `attribute` may be displayed.
    pub fn ensure_displayable(&self, subject: &S, attribute: &str) -> ProtectResult<()> {
        self.enforce(AccessKind::Display, subject, attribute)
    }

    fn enforce(&self, kind: AccessKind, subject: &S, attribute: &str) -> ProtectResult<()> {
        if self.table.is_allowed(kind, attribute, subject)? {
            return Ok(());
        }
        warn!(
            model = %self.table.model(),
            attribute,
            kind = %kind,
            "Attribute access denied"
        );
        Err(ProtectError::access_denied(kind, attribute))
    }
}
