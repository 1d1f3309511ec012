//! ## Crate layout
//! - `binder`: shared target handles and the `PreferenceBinder` surface.
//! - `store`: the preference store with in-memory and JSON file backends.
//! - `listener`: change listeners registered on a store.
//! - `transform`: converters between field types and stored kinds.
//! - `value`, `kind`, `error`: stored values, their kinds, and failures.
//!
//! `#[preferences]` is applied to an inline module. Every struct in it with
//! storage-tagged fields gets a generated `<Owner>Preferences` binder in the
//! same module:
//!
//! ```ignore
//! #[prefbind::preferences]
//! mod settings {
//!     pub struct Settings {
//!         #[int_pref(key = "score", default = 10)]
//!         pub score: i32,
//!     }
//! }
//!
//! let store = prefbind::store::PreferenceStore::in_memory();
//! let target = prefbind::binder::shared(settings::Settings { score: 0 });
//! settings::SettingsPreferences::read(&target, &store)?;
//! ```

pub use prefbind_core::{binder, error, kind, listener, store, transform, value};
pub use prefbind_macros::preferences;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::preferences;
    pub use prefbind_core::prelude::*;
    pub use prefbind_core::{listener::ChangeListener as _, value::PrefValue};
}
