//! Index-addressed top-level collections.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::field::Field;

/// An ordered top-level array such as `accessors` or `bufferViews`.
///
/// Both the array itself and each entry keep their presence state, so a
/// single malformed entry never hides its siblings. An absent or malformed
/// collection has length 0 and every reference into it is out of range.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    field: Field<Vec<Field<T>>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            field: Field::Absent,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Collection<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Field::deserialize(deserializer).map(|field| Collection { field })
    }
}

impl<T> Collection<T> {
    /// Builds a collection from well-formed entries.
    pub fn from_entries(entries: Vec<T>) -> Self {
        Self {
            field: Field::Present(entries.into_iter().map(Field::Present).collect()),
        }
    }

    /// Presence state of the array itself.
    pub fn state(&self) -> &Field<Vec<Field<T>>> {
        &self.field
    }

    /// Number of entries; 0 when the array is absent or malformed.
    pub fn len(&self) -> usize {
        self.field.present().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry with its index, malformed ones included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Field<T>)> {
        self.field
            .present()
            .into_iter()
            .flat_map(|entries| entries.iter().enumerate())
    }

    /// Well-formed entries with their index.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &T)> {
        self.iter()
            .filter_map(|(index, entry)| entry.present().map(|value| (index, value)))
    }

    /// True when `index` addresses an existing slot.
    pub fn contains_index(&self, index: i64) -> bool {
        usize::try_from(index).is_ok_and(|i| i < self.len())
    }

    /// Entry at a document index. `None` when out of range.
    pub fn get(&self, index: i64) -> Option<&Field<T>> {
        let index = usize::try_from(index).ok()?;
        self.field.present()?.get(index)
    }

    /// Well-formed entry at a document index.
    pub fn resolve(&self, index: i64) -> Option<&T> {
        self.get(index)?.present()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.field.present_mut()?.get_mut(index)?.present_mut()
    }
}
