//! Protected model registry

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fieldguard_types::{ProtectError, ProtectResult};
use tracing::debug;

use crate::config::ProtectionConfig;
use crate::protection::Protection;

/// Protections keyed by model name.
pub struct ProtectionRegistry<S> {
    models: DashMap<String, Arc<Protection<S>>>,
}

impl<S> ProtectionRegistry<S> {
    pub fn new() -> Self {
        Self {
            models: DashMap::new(),
        }
    }

    /// Protect `model`. Protecting an already protected model returns the
    /// existing protection unchanged.
    pub fn protect<I, T>(
        &self,
        model: &str,
        attributes: I,
        config: ProtectionConfig,
    ) -> ProtectResult<Arc<Protection<S>>>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match self.models.entry(model.to_string()) {
            Entry::Occupied(existing) => {
                debug!(model, "Model already protected");
                Ok(Arc::clone(existing.get()))
            }
            Entry::Vacant(slot) => {
                let protection = Arc::new(Protection::new(model, attributes, config)?);
                slot.insert(Arc::clone(&protection));
                Ok(protection)
            }
        }
    }

    /// Protect `child` as a subtype of the protected model `parent`, starting
    /// from a copy of the parent's current rules.
    pub fn derive<I, T>(
        &self,
        parent: &str,
        child: &str,
        extra_attributes: I,
    ) -> ProtectResult<Arc<Protection<S>>>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let parent = self.get(parent).ok_or_else(|| ProtectError::NotProtected {
            model: parent.to_string(),
        })?;
        match self.models.entry(child.to_string()) {
            Entry::Occupied(existing) => {
                debug!(model = child, "Model already protected");
                Ok(Arc::clone(existing.get()))
            }
            Entry::Vacant(slot) => {
                let protection = Arc::new(parent.derive(child, extra_attributes)?);
                slot.insert(Arc::clone(&protection));
                Ok(protection)
            }
        }
    }

    pub fn is_protected(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn get(&self, model: &str) -> Option<Arc<Protection<S>>> {
        self.models.get(model).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of all protected models, sorted.
    pub fn models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<S> Default for ProtectionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
