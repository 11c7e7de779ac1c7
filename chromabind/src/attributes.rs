//! Managed-object attribute storage
//!
//! The host runtime's per-object attribute mechanism is abstracted as
//! [`AttributeStore`]. [`AttributeMap`] is the in-crate implementation and
//! serializes to a JSON object for hand-off to a managed runtime.
//!
//! The canonical algorithm is written as its lowercase name. Deserializing
//! restores that name under `algorithm` as an [`Algorithm`] selector, so a
//! map survives a JSON round trip unchanged.

use crate::algorithm::Algorithm;
use crate::resolver::ALGORITHM_KEY;
use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Names starting with this prefix are reserved for the binding
pub const RESERVED_PREFIX: char = '_';

/// Per-object attribute mapping owned by a single managed object
pub trait AttributeStore {
    fn get(&self, name: &str) -> Option<&Value>;

    /// Store `value`, returning the value it overwrote
    fn set(&mut self, name: &str, value: Value) -> Option<Value>;

    fn remove(&mut self, name: &str) -> Option<Value>;

    fn names(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attributes meant for user enumeration (reserved names filtered out)
    fn visible(&self) -> Vec<(String, Value)> {
        self.names()
            .into_iter()
            .filter(|name| !name.starts_with(RESERVED_PREFIX))
            .filter_map(|name| self.get(&name).cloned().map(|value| (name, value)))
            .collect()
    }
}

/// Ordered attribute mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeMap {
    entries: BTreeMap<String, Value>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// JSON object view of every attribute, reserved ones included
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl<'de> Deserialize<'de> for AttributeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = BTreeMap::<String, Value>::deserialize(deserializer)?;

        let restored = match entries.get(ALGORITHM_KEY) {
            Some(Value::Text(name)) => Algorithm::from_canonical_name(name),
            _ => None,
        };
        if let Some(algorithm) = restored {
            entries.insert(ALGORITHM_KEY.to_string(), Value::Algorithm(algorithm));
        }

        Ok(Self { entries })
    }
}

impl AttributeStore for AttributeMap {
    fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.entries.insert(name.to_string(), value)
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
