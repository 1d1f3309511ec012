use super::Backend;
use crate::{error::StoreError, value::PrefValue};
use parking_lot::RwLock;
use std::collections::BTreeMap;

///
/// MemoryBackend
///
/// Process-local map. Contents are lost when the last store handle drops.
///

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, PrefValue>>,
}

impl Backend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<PrefValue>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: PrefValue) -> Result<Option<PrefValue>, StoreError> {
        Ok(self.entries.write().insert(key.to_string(), value))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().contains_key(key))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().clear();

        Ok(())
    }

    fn snapshot(&self) -> Result<BTreeMap<String, PrefValue>, StoreError> {
        Ok(self.entries.read().clone())
    }
}
