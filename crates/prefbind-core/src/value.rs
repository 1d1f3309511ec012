use crate::kind::StorageKind;
use serde::{Deserialize, Serialize};

///
/// PrefValue
///
/// A single stored preference. Serialized as `{"type": <kind>, "value": ..}`
/// so integer and long entries keep their kind across a file round trip.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum PrefValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Boolean(bool),
    String(String),
}

impl PrefValue {
    #[must_use]
    pub const fn kind(&self) -> StorageKind {
        match self {
            Self::Integer(_) => StorageKind::Integer,
            Self::Long(_) => StorageKind::Long,
            Self::Float(_) => StorageKind::Float,
            Self::Boolean(_) => StorageKind::Boolean,
            Self::String(_) => StorageKind::String,
        }
    }
}

///
/// StoreValue
///
/// Implemented by the five native types a store holds. Conversion back from
/// a `PrefValue` hands the value back untouched when the kinds differ.
///

pub trait StoreValue: Sized {
    const KIND: StorageKind;

    fn into_value(self) -> PrefValue;

    fn from_value(value: PrefValue) -> Result<Self, PrefValue>;
}

macro_rules! impl_store_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl StoreValue for $ty {
                const KIND: StorageKind = StorageKind::$variant;

                fn into_value(self) -> PrefValue {
                    PrefValue::$variant(self)
                }

                fn from_value(value: PrefValue) -> Result<Self, PrefValue> {
                    match value {
                        PrefValue::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }

            impl From<$ty> for PrefValue {
                fn from(v: $ty) -> Self {
                    v.into_value()
                }
            }
        )*
    };
}

impl_store_value!(
    i32 => Integer,
    i64 => Long,
    f32 => Float,
    bool => Boolean,
    String => String,
);

///
/// FieldValue
///
/// A field type that holds a store kind directly: the native type itself, or
/// its optional form. `to_native` is `None` for an absent optional value.
///

pub trait FieldValue {
    type Native: StoreValue;

    fn from_native(native: Self::Native) -> Self;

    fn to_native(&self) -> Option<Self::Native>;
}

macro_rules! impl_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                type Native = $ty;

                fn from_native(native: Self::Native) -> Self {
                    native
                }

                fn to_native(&self) -> Option<Self::Native> {
                    Some(self.clone())
                }
            }

            impl FieldValue for Option<$ty> {
                type Native = $ty;

                fn from_native(native: Self::Native) -> Self {
                    Some(native)
                }

                fn to_native(&self) -> Option<Self::Native> {
                    self.clone()
                }
            }
        )*
    };
}

impl_field_value!(i32, i64, f32, bool, String);

///
/// TESTS
///
