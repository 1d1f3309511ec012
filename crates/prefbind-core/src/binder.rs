use crate::{
    error::BindError,
    listener::{ChangeListener, ListenerId},
    store::PreferenceStore,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

///
/// Shared
///
/// The handle a binder is bound to. Change listeners hold only a `Weak`
/// reference, so a dropped target quietly stops receiving updates.
///

pub type Shared<T> = Arc<Mutex<T>>;

/// Non-owning form of `Shared`, held by change listeners.
pub type WeakShared<T> = Weak<Mutex<T>>;

/// Wrap `value` for binding.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

///
/// PreferenceBinder
///
/// Surface shared by every generated binder.
///

pub trait PreferenceBinder {
    type Target;

    /// Load every field from the store into the target.
    fn read_all(&self) -> Result<(), BindError>;

    /// Save every field of the target into the store.
    fn write_all(&self) -> Result<(), BindError>;

    /// Start applying external store changes to observed fields. Calling it
    /// again while observing has no effect.
    fn observe_changes(&mut self) -> Result<(), BindError>;

    fn stop_observe_changes(&mut self) -> Result<(), BindError>;

    /// Reset every field to its type's zero value, ignoring configured
    /// preference defaults.
    fn set_type_defaults(&self) -> Result<(), BindError>;

    fn store(&self) -> Result<&PreferenceStore, BindError>;

    /// Stop observing and release the target and store. Every later call
    /// fails with `BindError::Unbound`.
    fn unbind(&mut self);
}

///
/// Binding
///
/// Bound/unbound state carried by a generated binder.
///

pub struct Binding<T> {
    state: BindingState<T>,
}

enum BindingState<T> {
    Bound {
        target: Shared<T>,
        store: PreferenceStore,
        listener: Option<ListenerId>,
    },
    Unbound,
}

impl<T> Binding<T> {
    #[must_use]
    pub fn new(target: &Shared<T>, store: &PreferenceStore) -> Self {
        Self {
            state: BindingState::Bound {
                target: Arc::clone(target),
                store: store.clone(),
                listener: None,
            },
        }
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound { .. })
    }

    #[must_use]
    pub const fn is_observing(&self) -> bool {
        matches!(
            self.state,
            BindingState::Bound {
                listener: Some(_),
                ..
            }
        )
    }

    pub fn target(&self) -> Result<&Shared<T>, BindError> {
        self.parts().map(|(target, _)| target)
    }

    pub fn store(&self) -> Result<&PreferenceStore, BindError> {
        self.parts().map(|(_, store)| store)
    }

    pub fn parts(&self) -> Result<(&Shared<T>, &PreferenceStore), BindError> {
        match &self.state {
            BindingState::Bound { target, store, .. } => Ok((target, store)),
            BindingState::Unbound => Err(BindError::Unbound),
        }
    }

    /// Register the listener built by `make` unless one is already active.
    pub fn observe<L, F>(&mut self, make: F) -> Result<(), BindError>
    where
        L: ChangeListener + 'static,
        F: FnOnce(WeakShared<T>) -> L,
    {
        let BindingState::Bound {
            target,
            store,
            listener,
        } = &mut self.state
        else {
            return Err(BindError::Unbound);
        };

        if listener.is_none() {
            let id = store.register_listener(Arc::new(make(Arc::downgrade(target))));
            *listener = Some(id);
        }

        Ok(())
    }

    pub fn stop_observing(&mut self) -> Result<(), BindError> {
        let BindingState::Bound {
            store, listener, ..
        } = &mut self.state
        else {
            return Err(BindError::Unbound);
        };

        if let Some(id) = listener.take() {
            store.unregister_listener(id);
        }

        Ok(())
    }

    pub fn unbind(&mut self) {
        if let BindingState::Bound {
            store,
            listener: Some(id),
            ..
        } = &self.state
        {
            store.unregister_listener(*id);
        }

        self.state = BindingState::Unbound;
    }
}

impl<T> Drop for Binding<T> {
    fn drop(&mut self) {
        self.unbind();
    }
}

///
/// TESTS
///
