//! Reentrancy context
//!
//! Three per-thread flags that suppress permission checks:
//!
//! - `CheckingPermissions`: a permission evaluation is running, so conditions
//!   may read (and write) protected attributes without being checked.
//! - `PerformingRead`: a permitted read is running, so writes it causes
//!   internally (lazy loading, memoization) are not checked.
//! - `InitializingDefaults`: a default value is being computed, so writes it
//!   performs are not checked.
//!
//! Flags are only set through `FlagScope`, which restores the value it found
//! when dropped. Entering an already-set flag is a no-op and leaving it keeps
//! it set, so scopes nest. Scopes are tied to the thread that opened them.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static CHECKING_PERMISSIONS: Cell<bool> = const { Cell::new(false) };
    static PERFORMING_READ: Cell<bool> = const { Cell::new(false) };
    static INITIALIZING_DEFAULTS: Cell<bool> = const { Cell::new(false) };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flag {
    CheckingPermissions,
    PerformingRead,
    InitializingDefaults,
}

impl Flag {
    fn with<R>(self, f: impl FnOnce(&Cell<bool>) -> R) -> R {
        match self {
            Flag::CheckingPermissions => CHECKING_PERMISSIONS.with(f),
            Flag::PerformingRead => PERFORMING_READ.with(f),
            Flag::InitializingDefaults => INITIALIZING_DEFAULTS.with(f),
        }
    }

    pub fn is_set(self) -> bool {
        self.with(Cell::get)
    }
}

/// Holds a flag set for as long as it lives.
#[must_use = "the flag is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct FlagScope {
    flag: Flag,
    prior: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl FlagScope {
    pub fn enter(flag: Flag) -> Self {
        let prior = flag.with(|cell| cell.replace(true));
        Self {
            flag,
            prior,
            _thread_bound: PhantomData,
        }
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }
}

impl Drop for FlagScope {
    fn drop(&mut self) {
        let prior = self.prior;
        self.flag.with(|cell| cell.set(prior));
    }
}

/// The flags of the current thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContextSnapshot {
    pub checking_permissions: bool,
    pub performing_read: bool,
    pub initializing_defaults: bool,
}

impl ContextSnapshot {
    pub fn is_clear(&self) -> bool {
        *self == ContextSnapshot::default()
    }
}

pub fn snapshot() -> ContextSnapshot {
    ContextSnapshot {
        checking_permissions: Flag::CheckingPermissions.is_set(),
        performing_read: Flag::PerformingRead.is_set(),
        initializing_defaults: Flag::InitializingDefaults.is_set(),
    }
}

/// Reads are only exempt while a permission check is running.
pub fn read_check_suppressed() -> bool {
    Flag::CheckingPermissions.is_set()
}

/// Writes are exempt during permission checks, permitted reads and default
/// value computation.
pub fn write_check_suppressed() -> bool {
    Flag::CheckingPermissions.is_set()
        || Flag::PerformingRead.is_set()
        || Flag::InitializingDefaults.is_set()
}
