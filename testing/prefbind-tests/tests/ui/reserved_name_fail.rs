use prefbind::preferences;

#[preferences]
mod prefs {
    /// Compile-fail fixture for generated names.
    /// `all` would generate `read_all` and `write_all`.
    pub struct Totals {
        #[int_pref]
        pub all: i32,
    }
}

fn main() {}
