use super::Backend;
use crate::{error::StoreError, kind::StorageKind, value::PrefValue};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

///
/// JsonFileBackend
///
/// Keeps the whole preference file in memory and rewrites it atomically on
/// every mutation. Entries are held raw so a file edited by hand can still be
/// opened; a malformed entry only fails when its key is read.
///

#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, JsonValue>>,
}

impl JsonFileBackend {
    /// Load the file at `path`, or start empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let data = fs::read(&path).map_err(|source| io_error(&path, source))?;
            serde_json::from_slice(&data).map_err(|source| StoreError::Serialize {
                path: path.display().to_string(),
                source,
            })?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), "preference file opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(key: &str, raw: &JsonValue) -> Result<PrefValue, StoreError> {
        serde_json::from_value(raw.clone()).map_err(|_| StoreError::unsupported(key, describe(raw)))
    }

    fn encode(&self, key: &str, value: &PrefValue) -> Result<JsonValue, StoreError> {
        // JSON has no encoding for these; they would be written as null
        if let PrefValue::Float(v) = value
            && !v.is_finite()
        {
            return Err(StoreError::unsupported(key, format!("non-finite float {v}")));
        }

        serde_json::to_value(value).map_err(|source| StoreError::Serialize {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn persist(&self, entries: &BTreeMap<String, JsonValue>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;

        let data = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Serialize {
            path: self.path.display().to_string(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| io_error(&dir, source))?;
        tmp.write_all(&data)
            .map_err(|source| io_error(&self.path, source))?;
        tmp.persist(&self.path)
            .map_err(|err| io_error(&self.path, err.error))?;

        tracing::trace!(path = %self.path.display(), entries = entries.len(), "preference file written");

        Ok(())
    }
}

impl Backend for JsonFileBackend {
    fn load(&self, key: &str) -> Result<Option<PrefValue>, StoreError> {
        let entries = self.entries.lock();

        entries
            .get(key)
            .map(|raw| Self::decode(key, raw))
            .transpose()
    }

    fn save(&self, key: &str, value: PrefValue) -> Result<Option<PrefValue>, StoreError> {
        let raw = self.encode(key, &value)?;
        let mut entries = self.entries.lock();

        let previous = entries.insert(key.to_string(), raw);
        if let Err(err) = self.persist(&entries) {
            match &previous {
                Some(old) => entries.insert(key.to_string(), old.clone()),
                None => entries.remove(key),
            };
            return Err(err);
        }

        // a malformed previous entry counts as a change
        Ok(previous.and_then(|old| Self::decode(key, &old).ok()))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock();

        let Some(previous) = entries.remove(key) else {
            return Ok(false);
        };
        if let Err(err) = self.persist(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(err);
        }

        Ok(true)
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.lock().contains_key(key))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();

        let previous = std::mem::take(&mut *entries);
        if let Err(err) = self.persist(&entries) {
            *entries = previous;
            return Err(err);
        }

        Ok(())
    }

    fn snapshot(&self) -> Result<BTreeMap<String, PrefValue>, StoreError> {
        let entries = self.entries.lock();

        entries
            .iter()
            .map(|(key, raw)| Ok((key.clone(), Self::decode(key, raw)?)))
            .collect()
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn describe(raw: &JsonValue) -> String {
    match raw {
        JsonValue::Object(map) => match map.get("type") {
            Some(JsonValue::String(kind)) if kind.parse::<StorageKind>().is_ok() => {
                format!("malformed {kind} value")
            }
            Some(JsonValue::String(kind)) => kind.clone(),
            _ => "object".to_string(),
        },
        JsonValue::Array(_) => "array".to_string(),
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(_) => "untagged boolean".to_string(),
        JsonValue::Number(_) => "untagged number".to_string(),
        JsonValue::String(_) => "untagged string".to_string(),
    }
}

///
/// TESTS
///
