//! Protection configuration
//!
//! Controls what a model gets when it opts into protection: whether the
//! default policy is installed, which attribute names it covers, and whether
//! the extended registration forms are available.

use fieldguard_types::{ProtectError, ProtectResult};
use serde::{Deserialize, Serialize};

/// Options applied when a model opts into protection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
    /// Install the default policy on opt-in
    pub defaults: bool,

    /// Enable `always_permit`/`always_deny`/`never_permit`/`never_deny`
    pub extended: bool,

    /// Attribute and predicate names the default policy refers to
    pub default_policy: DefaultPolicy,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            defaults: true,
            extended: false,
            default_policy: DefaultPolicy::default(),
        }
    }
}

impl ProtectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: bool) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    pub fn with_default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Parse a configuration document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> ProtectResult<Self> {
        serde_json::from_str(json).map_err(|e| ProtectError::InvalidConfiguration(e.to_string()))
    }
}

/// Names used by the default policy.
///
/// The policy grants reading the identity, writing the identity and creation
/// timestamp only while the new-record predicate holds, and writing the
/// update timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPolicy {
    pub identity: String,
    pub created_at: String,
    pub updated_at: String,
    pub new_record_predicate: String,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self {
            identity: "id".to_string(),
            created_at: "created_at".to_string(),
            updated_at: "updated_at".to_string(),
            new_record_predicate: "new_record".to_string(),
        }
    }
}
