//! fieldguard engine - field-level access control for attribute-based models
//!
//! A protected model owns a `PermissionTable` of grant rules, keyed by access
//! kind and attribute. Denials are stored as inverted grants, so a query is
//! a conjunction: every wildcard rule and every rule of the attribute must
//! hold. A model with no rules is fully open.
//!
//! ```text
//! ProtectionRegistry ── Protection ── PermissionTable ── Rule (if ∧ ¬unless)
//!                          │
//!                          └── AccessInterceptor  (before_read / before_write / ...)
//! ```
//!
//! The host storage layer calls the interceptor hooks from its attribute
//! get/set paths. Reentrancy flags (see `context`) keep conditions, permitted
//! reads and default value computation from tripping checks of their own.

#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod interceptor;
pub mod protection;
pub mod registry;
pub mod rule;
pub mod table;
pub mod validation;

pub use config::{DefaultPolicy, ProtectionConfig};
pub use context::{ContextSnapshot, Flag, FlagScope};
pub use interceptor::{AccessInterceptor, DefaultScope, ReadScope};
pub use protection::{Extended, Protected, Protection};
pub use registry::ProtectionRegistry;
pub use rule::{Guard, Rule};
pub use table::PermissionTable;

pub use fieldguard_types::{
    AccessKind, AttributeKey, Attributes, Callable, Condition, ConditionSpec, GuardSpec,
    IntoPermission, Permission, ProtectError, ProtectResult, Protectable, GUARD_CONDITIONS,
};
