use prefbind::preferences;

#[preferences]
mod prefs {
    /// Compile-fail fixture for private fields.
    /// A getter is declared but the setter is missing.
    pub struct Audio {
        #[int_pref]
        volume: i32,
    }

    impl Audio {
        pub fn get_volume(&self) -> i32 {
            self.volume
        }
    }
}

fn main() {}
