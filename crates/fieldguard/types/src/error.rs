//! Error types for registration and enforcement

use thiserror::Error;

use crate::permission::AccessKind;

/// Errors raised by permission registration, evaluation and enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtectError {
    /// Permission kind not recognized
    #[error("Invalid permission {0}")]
    InvalidPermission(String),

    /// Attribute not declared on the model
    #[error("Unknown attribute '{attribute}' on {model}")]
    UnknownAttribute { model: String, attribute: String },

    /// Guard mapping key other than `if`/`unless`
    #[error("Invalid guard condition: {0}")]
    InvalidGuardCondition(String),

    /// Guard shape or value otherwise malformed
    #[error("Invalid guard: {0}")]
    InvalidGuard(String),

    #[error("READ '{attribute}' is NOT ALLOWED")]
    IllegalReadAccess { attribute: String },

    #[error("WRITE '{attribute}' is NOT ALLOWED")]
    IllegalWriteAccess { attribute: String },

    #[error("DISPLAY '{attribute}' is NOT ALLOWED")]
    IllegalDisplayAccess { attribute: String },

    /// Named predicate the subject does not implement
    #[error("Unknown predicate '{name}'")]
    UnknownPredicate { name: String },

    /// Model has not been opted into protection
    #[error("Model not protected: {model}")]
    NotProtected { model: String },

    #[error("Invalid protection configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Permission table lock poisoned")]
    LockPoisoned,
}

impl ProtectError {
    /// The enforcement error for a denied `kind` access to `attribute`.
    pub fn access_denied(kind: AccessKind, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        match kind {
            AccessKind::Read => ProtectError::IllegalReadAccess { attribute },
            AccessKind::Write => ProtectError::IllegalWriteAccess { attribute },
            AccessKind::Display => ProtectError::IllegalDisplayAccess { attribute },
        }
    }

    /// The kind of access that was denied, for enforcement errors.
    pub fn denied_kind(&self) -> Option<AccessKind> {
        match self {
            ProtectError::IllegalReadAccess { .. } => Some(AccessKind::Read),
            ProtectError::IllegalWriteAccess { .. } => Some(AccessKind::Write),
            ProtectError::IllegalDisplayAccess { .. } => Some(AccessKind::Display),
            _ => None,
        }
    }

    pub fn is_access_violation(&self) -> bool {
        self.denied_kind().is_some()
    }

    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            ProtectError::InvalidPermission(_)
                | ProtectError::UnknownAttribute { .. }
                | ProtectError::InvalidGuardCondition(_)
                | ProtectError::InvalidGuard(_)
        )
    }
}

/// Result type for fieldguard operations
pub type ProtectResult<T> = std::result::Result<T, ProtectError>;
