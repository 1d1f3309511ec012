use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// StorageKind
///
/// The closed set of value kinds a preference store can hold natively.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum StorageKind {
    Integer,
    Long,
    Float,
    Boolean,
    String,
}

impl StorageKind {
    pub const ALL: [Self; 5] = [
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Boolean,
        Self::String,
    ];

    /// Name of the Rust type that holds this kind natively.
    #[must_use]
    pub const fn native_type(self) -> &'static str {
        match self {
            Self::Integer => "i32",
            Self::Long => "i64",
            Self::Float => "f32",
            Self::Boolean => "bool",
            Self::String => "String",
        }
    }
}

///
/// TESTS
///
