use crate::{error::StoreError, store::PreferenceStore};
use derive_more::Display;
use std::sync::Arc;

///
/// ListenerId
///
/// Handle returned by `PreferenceStore::register_listener`.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListenerId(pub(crate) u64);

///
/// ChangeListener
///
/// Notified after a key has been written or removed. Runs on the writer's
/// thread once the store has released its own lock, so implementations may
/// read from the store they are handed.
///

pub trait ChangeListener: Send + Sync {
    fn on_change(&self, store: &PreferenceStore, key: &str) -> Result<(), StoreError>;
}

impl<F> ChangeListener for F
where
    F: Fn(&PreferenceStore, &str) -> Result<(), StoreError> + Send + Sync,
{
    fn on_change(&self, store: &PreferenceStore, key: &str) -> Result<(), StoreError> {
        self(store, key)
    }
}

///
/// Listeners
///

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn ChangeListener>)>,
}

impl Listeners {
    pub(crate) fn insert(&mut self, listener: Arc<dyn ChangeListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));

        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);

        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clone the current listener set so notification can run unlocked.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn ChangeListener>> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}
