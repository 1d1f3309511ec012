use prefbind::preferences;

#[preferences]
mod prefs {
    /// Compile-fail fixture for storage kinds.
    /// `u8` is not an int preference without a converter.
    pub struct Counter {
        #[int_pref]
        pub count: u8,
    }
}

fn main() {}
