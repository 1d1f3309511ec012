use prefbind::{error::TransformError, preferences, transform::Transformer};

#[preferences]
mod prefs {
    use super::*;

    /// Compile-fail fixture for converter construction.
    /// The converter has neither `Default` nor `new()`.
    pub struct Codec {
        scale: i32,
    }

    impl Transformer for Codec {
        type Stored = i32;
        type Value = u8;

        fn convert_read(&self, stored: i32) -> Result<u8, TransformError> {
            u8::try_from(stored / self.scale).map_err(|err| TransformError::new(err.to_string()))
        }

        fn convert_write(&self, value: &u8) -> Result<i32, TransformError> {
            Ok(i32::from(*value) * self.scale)
        }
    }

    pub struct Counter {
        #[transform(using = Codec)]
        #[int_pref]
        pub count: u8,
    }
}

fn main() {}
