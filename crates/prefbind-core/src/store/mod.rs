mod file;
mod memory;

pub use file::JsonFileBackend;
pub use memory::MemoryBackend;

use crate::{
    error::StoreError,
    listener::{ChangeListener, ListenerId, Listeners},
    value::{PrefValue, StoreValue},
};
use parking_lot::RwLock;
use std::{collections::BTreeMap, fmt, path::Path, sync::Arc};

///
/// Backend
///
/// Raw key-value persistence behind a `PreferenceStore`. Backends serialize
/// their own writes; they never call listeners.
///

pub trait Backend: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<PrefValue>, StoreError>;

    /// Store `value`, returning the previous value under `key`.
    fn save(&self, key: &str, value: PrefValue) -> Result<Option<PrefValue>, StoreError>;

    /// Remove `key`, returning whether it was present.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    fn snapshot(&self) -> Result<BTreeMap<String, PrefValue>, StoreError>;
}

///
/// PreferenceStore
///
/// Cheaply cloneable handle to a backend plus its change listeners. Every
/// clone observes the same data and the same listener set.
///

#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn Backend>,
    listeners: Arc<RwLock<Listeners>>,
}

impl PreferenceStore {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            listeners: Arc::default(),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    /// Open (or create on first write) a JSON preference file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(JsonFileBackend::open(path)?))
    }

    /// Read `key`, falling back to `default` when the key is absent.
    pub fn get<T: StoreValue>(&self, key: &str, default: T) -> Result<T, StoreError> {
        match self.backend.load(key)? {
            None => Ok(default),
            Some(value) => T::from_value(value).map_err(|found| StoreError::KindMismatch {
                key: key.to_string(),
                expected: T::KIND,
                found: found.kind(),
            }),
        }
    }

    pub fn get_value(&self, key: &str) -> Result<Option<PrefValue>, StoreError> {
        self.backend.load(key)
    }

    pub fn put<T: StoreValue>(&self, key: &str, value: T) -> Result<(), StoreError> {
        self.put_value(key, value.into_value())
    }

    /// Write `value` and notify listeners if the stored value changed.
    pub fn put_value(&self, key: &str, value: PrefValue) -> Result<(), StoreError> {
        tracing::trace!(key, kind = %value.kind(), "preference write");

        let previous = self.backend.save(key, value.clone())?;
        if previous.as_ref() == Some(&value) {
            return Ok(());
        }

        self.notify(key)
    }

    /// Write `Some(value)`, or remove `key` when there is no value to store.
    pub fn put_or_remove<T: StoreValue>(
        &self,
        key: &str,
        value: Option<T>,
    ) -> Result<(), StoreError> {
        match value {
            Some(value) => self.put(key, value),
            None => self.remove(key).map(|_| ()),
        }
    }

    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let removed = self.backend.delete(key)?;
        if removed {
            tracing::trace!(key, "preference removed");
            self.notify(key)?;
        }

        Ok(removed)
    }

    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        self.backend.contains(key)
    }

    /// Remove every entry. Listeners are not notified.
    pub fn clear(&self) -> Result<(), StoreError> {
        tracing::debug!("preferences cleared");

        self.backend.clear()
    }

    pub fn get_all(&self) -> Result<BTreeMap<String, PrefValue>, StoreError> {
        self.backend.snapshot()
    }

    pub fn register_listener(&self, listener: Arc<dyn ChangeListener>) -> ListenerId {
        let id = self.listeners.write().insert(listener);
        tracing::debug!(%id, "change listener registered");

        id
    }

    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        let removed = self.listeners.write().remove(id);
        if removed {
            tracing::debug!(%id, "change listener unregistered");
        }

        removed
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Run every listener for `key`. All listeners run; the first failure is
    /// returned to the writer.
    fn notify(&self, key: &str) -> Result<(), StoreError> {
        let listeners = self.listeners.read().snapshot();
        let mut first_err = None;

        for listener in listeners {
            if let Err(err) = listener.on_change(self, key) {
                tracing::warn!(key, error = %err, "change listener failed");
                first_err.get_or_insert(err);
            }
        }

        first_err.map_or(Ok(()), Err)
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///
