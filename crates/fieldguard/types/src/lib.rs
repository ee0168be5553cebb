//! fieldguard types - the vocabulary of field-level access control
//!
//! Permissions, attribute keys, guard shapes, conditions and the error
//! taxonomy shared by the engine and by host storage layers.

#![deny(unsafe_code)]

pub mod attribute;
pub mod condition;
pub mod error;
pub mod guard;
pub mod permission;

pub use attribute::{AttributeKey, Attributes};
pub use condition::{Callable, Condition, Protectable};
pub use error::{ProtectError, ProtectResult};
pub use guard::{ConditionSpec, GuardSpec, GUARD_CONDITIONS};
pub use permission::{AccessKind, IntoPermission, Permission};
