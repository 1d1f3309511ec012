//! Runtime for prefbind: the preference store, its backends, change
//! listeners, value conversions, and the binding state used by generated
//! binders.

pub mod binder;
pub mod error;
pub mod kind;
pub mod listener;
pub mod store;
pub mod transform;
pub mod value;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        binder::{PreferenceBinder, Shared, shared},
        error::{BindError, StoreError, TransformError},
        store::PreferenceStore,
        transform::{JsonTransformer, Transformer},
    };
}
