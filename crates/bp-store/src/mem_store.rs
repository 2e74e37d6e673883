use crate::{BlueprintEntity, BlueprintStore, StoreError, StoreResult, ensure_storable_name};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

#[derive(Clone, Default)]
pub struct MemStore {
    entities: Arc<RwLock<HashMap<String, BlueprintEntity>>>,
}

impl std::fmt::Debug for MemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.entities.read().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("MemStore").field("entities", &len).finish()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlueprintStore for MemStore {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<BlueprintEntity>> {
        let guard = self.entities.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.get(name).cloned())
    }

    fn put(&self, entity: BlueprintEntity) -> StoreResult<()> {
        ensure_storable_name(&entity.blueprint_name)?;
        let mut guard = self.entities.write().map_err(|_| StoreError::Poisoned)?;
        guard.insert(entity.blueprint_name.clone(), entity);
        Ok(())
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        let mut guard = self.entities.write().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.remove(name).is_some())
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        let guard = self.entities.read().map_err(|_| StoreError::Poisoned)?;
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
