use prefbind::preferences;

#[preferences]
mod prefs {
    pub struct Profile {
        #[observe]
        #[int_pref]
        pub score: i32,
    }

    /// Compile-fail fixture for callback signatures.
    /// The parameter type is not the field's declared type.
    impl Profile {
        #[subscribe(tag = "score")]
        pub fn on_score(&mut self, old: i64) {}
    }
}

fn main() {}
