use prefbind::preferences;

#[preferences]
mod prefs {
    /// Compile-fail fixture for immutable declarations.
    #[string_pref]
    pub const GREETING: &str = "hi";

    pub struct Profile {
        #[string_pref]
        pub name: &'static str,
    }
}

fn main() {}
