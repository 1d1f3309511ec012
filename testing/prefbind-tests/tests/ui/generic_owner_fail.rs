use prefbind::preferences;

#[preferences]
mod prefs {
    /// Compile-fail fixture for owner types.
    /// Binders are only generated for concrete structs.
    pub struct Slot<T> {
        #[int_pref]
        pub value: i32,
        pub extra: T,
    }
}

fn main() {}
