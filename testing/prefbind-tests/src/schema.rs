use prefbind::preferences;

#[preferences]
pub mod profile {

    ///
    /// Profile
    ///

    #[derive(Debug, Default)]
    pub struct Profile {
        #[int_pref(key = "score", default = 10)]
        pub score: i32,

        #[observe(tag = "name")]
        #[string_pref(key = "userName")]
        pub name: String,

        #[long_pref(default = -1)]
        pub last_seen: i64,

        #[float_pref(default = 0.5)]
        pub ratio: f32,

        #[bool_pref(key = "darkMode", default = true)]
        pub dark_mode: bool,

        #[string_pref]
        pub nickname: Option<String>,

        pub name_changes: Vec<String>,
    }

    impl Profile {
        #[subscribe(tag = "name")]
        pub fn on_name_changed(&mut self, old: String) {
            self.name_changes.push(old);
        }
    }
}

#[preferences]
pub mod audio {

    ///
    /// Audio
    ///
    /// Private fields go through accessors. `balance` is observed without a
    /// callback; `volume` reports the value it replaced.
    ///

    #[derive(Debug, Default)]
    pub struct Audio {
        #[observe]
        #[int_pref(default = 50)]
        volume: i32,

        #[observe]
        #[float_pref]
        pub balance: f32,

        replaced: Vec<i32>,
    }

    impl Audio {
        #[must_use]
        pub fn get_volume(&self) -> i32 {
            self.volume
        }

        pub fn set_volume(&mut self, volume: i32) {
            self.volume = volume;
        }

        #[must_use]
        pub fn replaced(&self) -> &[i32] {
            &self.replaced
        }

        #[subscribe(tag = "volume")]
        pub fn on_volume(&mut self, old: i32) {
            self.replaced.push(old);
        }
    }
}

#[preferences]
pub mod layout {
    use prefbind::{error::TransformError, transform::Transformer};
    use serde::{Deserialize, Serialize};

    ///
    /// Window
    ///

    #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    pub struct Window {
        pub width: u32,
        pub height: u32,
    }

    ///
    /// Theme
    ///

    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Theme {
        #[default]
        Light,
        Dark,
    }

    ///
    /// ThemeCodec
    ///
    /// Stores a `Theme` as an int; constructed through `new`.
    ///

    pub struct ThemeCodec;

    impl ThemeCodec {
        #[must_use]
        pub const fn new() -> Self {
            Self
        }
    }

    impl Transformer for ThemeCodec {
        type Stored = i32;
        type Value = Theme;

        fn convert_read(&self, stored: i32) -> Result<Theme, TransformError> {
            match stored {
                0 => Ok(Theme::Light),
                1 => Ok(Theme::Dark),
                other => Err(TransformError::new(format!("unknown theme {other}"))),
            }
        }

        fn convert_write(&self, value: &Theme) -> Result<i32, TransformError> {
            Ok(match value {
                Theme::Light => 0,
                Theme::Dark => 1,
            })
        }
    }

    ///
    /// Layout
    ///

    #[derive(Debug, Default)]
    pub struct Layout {
        #[transform(using = prefbind::transform::JsonTransformer, type_param1 = Window)]
        #[string_pref(default = r#"{"width":640,"height":480}"#)]
        pub window: Window,

        #[observe]
        #[transform(using = ThemeCodec)]
        #[int_pref(default = 1)]
        pub theme: Theme,
    }
}
