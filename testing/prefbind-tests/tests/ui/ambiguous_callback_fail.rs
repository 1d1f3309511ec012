use prefbind::preferences;

#[preferences]
mod prefs {
    pub struct Profile {
        #[observe(tag = "name")]
        #[string_pref(key = "userName")]
        pub name: String,
    }

    /// Compile-fail fixture for callback cardinality.
    /// Two methods subscribe to the same tag.
    impl Profile {
        #[subscribe(tag = "name")]
        pub fn first(&mut self, old: String) {}

        #[subscribe(tag = "name")]
        pub fn second(&mut self, old: String) {}
    }
}

fn main() {}
