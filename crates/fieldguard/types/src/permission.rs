//! Permission kinds
//!
//! `Permission` is what callers register rules with. `AccessKind` is what the
//! permission table actually stores and what access checks are made for:
//! the `Access` composite never reaches the table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProtectError, ProtectResult};

/// Permission named in a `permit`/`deny` registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    /// Shorthand for `Read` and `Write` together.
    Access,
    Display,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Read,
        Permission::Write,
        Permission::Access,
        Permission::Display,
    ];

    /// The stored kinds a registration under this permission populates.
    pub fn expand(self) -> &'static [AccessKind] {
        match self {
            Permission::Read => &[AccessKind::Read],
            Permission::Write => &[AccessKind::Write],
            Permission::Access => &[AccessKind::Read, AccessKind::Write],
            Permission::Display => &[AccessKind::Display],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Access => "access",
            Permission::Display => "display",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Permission {
    type Err = ProtectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "access" => Ok(Permission::Access),
            "display" => Ok(Permission::Display),
            _ => Err(ProtectError::InvalidPermission(format!(
                "'{}', permission must be one of [read, write, access, display]",
                s
            ))),
        }
    }
}

impl From<AccessKind> for Permission {
    fn from(kind: AccessKind) -> Self {
        match kind {
            AccessKind::Read => Permission::Read,
            AccessKind::Write => Permission::Write,
            AccessKind::Display => Permission::Display,
        }
    }
}

/// A kind of access that is checked and stored in a permission table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Read,
    Write,
    Display,
}

impl AccessKind {
    pub fn name(self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
            AccessKind::Display => "display",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything a registration call accepts as its permission argument.
///
/// Strings are parsed at registration time so that rules declared from
/// configuration fail with `InvalidPermission` instead of being ignored.
pub trait IntoPermission {
    fn into_permission(self) -> ProtectResult<Permission>;
}

impl IntoPermission for Permission {
    fn into_permission(self) -> ProtectResult<Permission> {
        Ok(self)
    }
}

impl IntoPermission for AccessKind {
    fn into_permission(self) -> ProtectResult<Permission> {
        Ok(self.into())
    }
}

impl IntoPermission for &str {
    fn into_permission(self) -> ProtectResult<Permission> {
        self.parse()
    }
}

impl IntoPermission for String {
    fn into_permission(self) -> ProtectResult<Permission> {
        self.parse()
    }
}

impl IntoPermission for &String {
    fn into_permission(self) -> ProtectResult<Permission> {
        self.parse()
    }
}
