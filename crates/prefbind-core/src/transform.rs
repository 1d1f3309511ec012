use crate::{
    error::{StoreError, TransformError},
    value::StoreValue,
};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

///
/// Transformer
///
/// Bridges a field of type `Value` and the native kind it is stored as.
/// Generated binders construct converters through `Default`, or through an
/// inherent zero-argument `new` when one is declared alongside the owner.
///

pub trait Transformer {
    type Stored: StoreValue;
    type Value;

    fn convert_read(&self, stored: Self::Stored) -> Result<Self::Value, TransformError>;

    fn convert_write(&self, value: &Self::Value) -> Result<Self::Stored, TransformError>;
}

/// Run a read conversion, attributing failures to `key`.
pub fn read<C: Transformer>(
    converter: &C,
    key: &str,
    stored: C::Stored,
) -> Result<C::Value, StoreError> {
    converter
        .convert_read(stored)
        .map_err(|source| StoreError::Transform {
            key: key.to_string(),
            source,
        })
}

/// Run a write conversion, attributing failures to `key`.
pub fn write<C: Transformer>(
    converter: &C,
    key: &str,
    value: &C::Value,
) -> Result<C::Stored, StoreError> {
    converter
        .convert_write(value)
        .map_err(|source| StoreError::Transform {
            key: key.to_string(),
            source,
        })
}

///
/// JsonTransformer
///
/// Stores any serde type as a JSON string preference.
///

pub struct JsonTransformer<T>(PhantomData<fn() -> T>);

impl<T> Default for JsonTransformer<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> Transformer for JsonTransformer<T>
where
    T: Serialize + DeserializeOwned,
{
    type Stored = String;
    type Value = T;

    fn convert_read(&self, stored: String) -> Result<T, TransformError> {
        serde_json::from_str(&stored).map_err(|err| TransformError::new(err.to_string()))
    }

    fn convert_write(&self, value: &T) -> Result<String, TransformError> {
        serde_json::to_string(value).map_err(|err| TransformError::new(err.to_string()))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Window {
        width: u32,
        height: u32,
    }

    #[test]
    fn json_transformer_round_trips_structs() {
        let converter = JsonTransformer::<Window>::default();
        let window = Window {
            width: 800,
            height: 600,
        };

        let stored = write(&converter, "window", &window).unwrap();
        assert_eq!(stored, r#"{"width":800,"height":600}"#);
        assert_eq!(read(&converter, "window", stored).unwrap(), window);
    }

    #[test]
    fn conversion_failures_name_the_key() {
        let converter = JsonTransformer::<Window>::default();
        let err = read(&converter, "window", "{".to_string()).unwrap_err();

        assert!(matches!(err, StoreError::Transform { ref key, .. } if key == "window"));
    }
}
