use crate::kind::StorageKind;
use std::io;
use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failures raised by the preference store and the conversions that feed it.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum StoreError {
    #[error("io error on preference file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("preference '{key}' holds a {found} value, expected {expected}")]
    KindMismatch {
        key: String,
        expected: StorageKind,
        found: StorageKind,
    },

    #[error("preference file '{path}' could not be encoded or decoded: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("preference '{key}' could not be converted: {source}")]
    Transform {
        key: String,
        #[source]
        source: TransformError,
    },

    #[error("preference '{key}' has unsupported kind: {found}")]
    UnsupportedKind { key: String, found: String },
}

impl StoreError {
    pub(crate) fn unsupported(key: &str, found: impl Into<String>) -> Self {
        Self::UnsupportedKind {
            key: key.to_string(),
            found: found.into(),
        }
    }
}

///
/// TransformError
///
/// Raised by a `Transformer` when a value cannot cross between its field
/// form and its stored form.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// BindError
///
/// Errors surfaced by generated binders.
///

#[derive(Debug, ThisError)]
pub enum BindError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("binder has been unbound")]
    Unbound,
}
