//! Ordered key → value map carried as a structured payload

use crate::{CodecError, WireField, WireValue};
use serde::{Deserialize, Deserializer, Serialize};

/// Frame header identifying the byte form of a [`DataMap`]
pub(crate) const MAGIC: &[u8; 4] = b"CDM1";

/// An ordered map of named wire values
///
/// Keys are unique. Insertion order is kept so that encoding is
/// deterministic, but lookups are always by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataMap {
    entries: Vec<(String, WireValue)>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing entry in place
    pub fn put(&mut self, key: impl Into<String>, value: WireValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Typed lookup; `None` when the key is missing or holds another wire type
    pub fn get_as<F: WireField>(&self, key: &str) -> Option<F> {
        self.get(key).and_then(F::from_wire)
    }

    pub fn remove(&mut self, key: &str) -> Option<WireValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode to the framed byte form: `CDM1` followed by JSON entries
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut bytes = MAGIC.to_vec();
        serde_json::to_writer(&mut bytes, self)?;
        Ok(bytes)
    }

    /// Decode the framed byte form
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let body = data
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| CodecError::InvalidFormat("missing data map header".to_string()))?;
        Ok(serde_json::from_slice(body)?)
    }

    /// Whether the bytes carry the data map frame header
    pub fn is_framed(data: &[u8]) -> bool {
        data.starts_with(MAGIC)
    }
}

impl FromIterator<(String, WireValue)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (String, WireValue)>>(iter: I) -> Self {
        let mut map = DataMap::new();
        for (key, value) in iter {
            map.put(key, value);
        }
        map
    }
}

/// Entries go through [`DataMap::put`]; a repeated key keeps its first
/// position and its last value.
impl<'de> Deserialize<'de> for DataMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<(String, WireValue)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "data_map/data_map_tests.rs"]
mod data_map_tests;
