//! Case-insensitive variable store
//!
//! Backs the `persistent` and `temporary` scopes. Keys compare ignoring ASCII
//! case but keep the spelling they were first written with, and iteration
//! follows insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct VariableStore {
    /// Folded key -> (original key, value)
    entries: IndexMap<String, (String, String)>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&fold(name)).map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&fold(name))
    }

    /// Set a value, returning the previous one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.entries.get_mut(&fold(name)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.insert(fold(name), (name.to_string(), value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .shift_remove(&fold(name))
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl From<IndexMap<String, String>> for VariableStore {
    fn from(map: IndexMap<String, String>) -> Self {
        let mut store = Self::new();
        for (name, value) in map {
            store.set(&name, value);
        }
        store
    }
}

impl From<VariableStore> for IndexMap<String, String> {
    fn from(store: VariableStore) -> Self {
        store.entries.into_values().collect()
    }
}
