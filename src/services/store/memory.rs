use std::collections::{HashMap, HashSet};

use mongodb::bson::oid::ObjectId;

use super::interface::{InstanceStore, ModifierStore, StoreError};
use crate::models::{
    booking::BookableInstance,
    price_modifier::{PriceModifier, ScopeRef},
};

/// In-process store, used for seeding local runs and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    modifiers: HashMap<ScopeRef, Vec<PriceModifier>>,
    instances: HashMap<ObjectId, BookableInstance>,
    failing_scopes: HashSet<ScopeRef>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(mut self, instance: BookableInstance) -> Self {
        self.instances.insert(instance.id, instance);
        self
    }

    /// Attach a modifier under its own scope.
    pub fn with_modifier(mut self, modifier: PriceModifier) -> Self {
        self.modifiers.entry(modifier.scope).or_default().push(modifier);
        self
    }

    /// Make lookups for one scope fail without taking the whole store down.
    pub fn with_failing_scope(mut self, scope: ScopeRef) -> Self {
        self.failing_scopes.insert(scope);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl ModifierStore for MemoryStore {
    async fn modifiers_for_scope(&self, scope: &ScopeRef) -> Result<Vec<PriceModifier>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        if self.failing_scopes.contains(scope) {
            return Err(StoreError::Lookup(format!(
                "{} {} could not be read",
                scope.scope_type(),
                scope.scope_id()
            )));
        }

        Ok(self.modifiers.get(scope).cloned().unwrap_or_default())
    }
}

impl InstanceStore for MemoryStore {
    async fn instance(&self, id: &ObjectId) -> Result<BookableInstance, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }

        self.instances.get(id).cloned().ok_or(StoreError::NotFound)
    }
}
