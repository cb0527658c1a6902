//! Immutable snapshot of the named parameters a run was started with

use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{AppRunError, Result};

/// Ordered, read-only mapping from parameter name to value.
///
/// Built once when a run starts and shared by reference with every hook.
/// There are no mutating methods; a new snapshot is the only way to change it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunParameters {
    entries: Vec<(String, Value)>,
}

impl RunParameters {
    /// An empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter by name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a parameter and deserialize it into `T`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Parameter names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Name/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `KEY=VALUE` assignment.
    ///
    /// The value is read as JSON when it parses as JSON, otherwise it is kept as
    /// a plain string, so `level=1` yields a number and `mode=x` a string.
    pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| AppRunError::InvalidParameter(format!("missing '=' in {:?}", raw)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppRunError::InvalidParameter(format!("empty name in {:?}", raw)));
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        Ok((key.to_string(), value))
    }
}

/// Later duplicates replace the earlier value but keep its position.
impl<K, V> FromIterator<(K, V)> for RunParameters
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(String, Value)> = Vec::new();
        for (key, value) in iter {
            let key = key.into();
            let value = value.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Self { entries }
    }
}

impl Serialize for RunParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
