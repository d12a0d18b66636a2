use crate::document::FieldValue;
use serde_json::{Map, Value};
use std::collections::btree_map::{self, BTreeMap};

/// Partial update proposed by a caller: field name to new value.
///
/// Only the fields named here are permission checked on write, and only
/// these fields change when the write is applied.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    entries: BTreeMap<String, FieldValue>,
}

impl Patch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds or replaces one entry, returning the previous value.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.entries.insert(field.into(), value.into())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(field, value)| (field.as_str(), value))
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries.get(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Patch {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Patch
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut patch = Self::new();
        for (field, value) in iter {
            patch.insert(field, value);
        }
        patch
    }
}

/// Every JSON member becomes a scalar entry.
impl From<Map<String, Value>> for Patch {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}
