//! A small attribute-backed model wired through the interceptor hooks, the
//! way a storage layer would.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::sync::{Arc, Once};

use chrono::Utc;
use fieldguard_engine::{Protectable, Protected, ProtectResult, Protection, ProtectionConfig};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub const PERSON_ATTRIBUTES: [&str; 8] = [
    "id",
    "firstname",
    "lastname",
    "created_at",
    "updated_at",
    "pm",
    "phone",
    "email",
];

static TRACING: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG` controls the output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn person_protection(config: ProtectionConfig) -> Arc<Protection<Person>> {
    init_tracing();
    Arc::new(Protection::new("Person", PERSON_ATTRIBUTES, config).expect("person protection"))
}

pub struct Person {
    protection: Arc<Protection<Person>>,
    values: RefCell<BTreeMap<String, Value>>,
    persisted: Cell<bool>,
    pub funny: Cell<bool>,
    pub serious: Cell<bool>,
    pub defaults_computed: Cell<usize>,
}

impl Protectable for Person {
    fn predicate(&self, name: &str) -> Option<bool> {
        match name {
            "new_record" => Some(!self.persisted.get()),
            "funny" => Some(self.funny.get()),
            "serious" => Some(self.serious.get()),
            _ => None,
        }
    }
}

impl Protected for Person {
    fn protection(&self) -> &Protection<Self> {
        &self.protection
    }
}

impl Person {
    pub fn new(protection: &Arc<Protection<Person>>) -> Self {
        Self {
            protection: Arc::clone(protection),
            values: RefCell::new(BTreeMap::new()),
            persisted: Cell::new(false),
            funny: Cell::new(false),
            serious: Cell::new(false),
            defaults_computed: Cell::new(0),
        }
    }

    pub fn get(&self, attribute: &str) -> ProtectResult<Value> {
        let interceptor = self.protection.interceptor();
        let scope = interceptor.before_read(self, attribute)?;
        let stored = self.values.borrow().get(attribute).cloned();
        let value = match stored {
            Some(value) => value,
            None => self.initialize_default(attribute)?,
        };
        interceptor.after_read(scope);
        Ok(value)
    }

    pub fn set(&self, attribute: &str, value: impl Into<Value>) -> ProtectResult<()> {
        let value = value.into();
        self.protection.interceptor().write(self, attribute, || {
            self.values.borrow_mut().insert(attribute.to_string(), value);
        })
    }

    /// Compute and store the default of a never-set attribute.
    ///
    /// The contact default fills in a placeholder email as a side effect.
    pub fn initialize_default(&self, attribute: &str) -> ProtectResult<Value> {
        self.protection
            .interceptor()
            .compute_default(self, attribute, || -> ProtectResult<Value> {
                self.defaults_computed.set(self.defaults_computed.get() + 1);
                let value = match attribute {
                    "created_at" => json!(Utc::now().to_rfc3339()),
                    "pm" => {
                        self.set("email", "unknown@example.org")?;
                        json!("email")
                    }
                    _ => Value::Null,
                };
                self.set(attribute, value.clone())?;
                Ok(value)
            })
    }

    /// Mark the record as stored and stamp `updated_at`.
    pub fn persist(&self) -> ProtectResult<()> {
        self.persisted.set(true);
        self.set("updated_at", Utc::now().to_rfc3339())
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted.get()
    }

    pub fn raw(&self, attribute: &str) -> Option<Value> {
        self.values.borrow().get(attribute).cloned()
    }
}
