use std::fmt;
use std::sync::Arc;

use burn::data::dataset::Dataset;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SequenceError};

/// Flat element arena with a cheap sliceable window.
///
/// Slicing shares the underlying buffer, so views taken from a large store
/// cost O(1). [`ArrayData::cache`] copies a view into its own buffer when the
/// rest of the arena is no longer needed.
pub struct ArrayData<T> {
    buffer: Arc<[T]>,
    offset: usize,
    len: usize,
}

impl<T> ArrayData<T> {
    pub fn new(values: Vec<T>) -> Self {
        let len = values.len();
        Self {
            buffer: values.into(),
            offset: 0,
            len,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buffer[self.offset..self.offset + self.len]
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// View of `len` elements starting at `start`, sharing this arena.
    pub fn slice(&self, start: usize, len: usize) -> Result<Self> {
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.len)
            .ok_or(SequenceError::SliceOutOfRange {
                start,
                len,
                available: self.len,
            })?;
        Ok(Self {
            buffer: Arc::clone(&self.buffer),
            offset: self.offset + start,
            len: end - start,
        })
    }

    pub fn map<U, F>(&self, f: F) -> ArrayData<U>
    where
        F: FnMut(&T) -> U,
    {
        ArrayData::new(self.iter().map(f).collect())
    }

    /// Whether this view spans its whole arena.
    pub fn is_compact(&self) -> bool {
        self.offset == 0 && self.len == self.buffer.len()
    }
}

impl<T: Clone> ArrayData<T> {
    pub fn append(&self, other: &Self) -> Self {
        let mut values = Vec::with_capacity(self.len + other.len);
        values.extend_from_slice(self.as_slice());
        values.extend_from_slice(other.as_slice());
        Self::new(values)
    }

    pub fn cache(&self) -> Self {
        if self.is_compact() {
            self.clone()
        } else {
            Self::new(self.as_slice().to_vec())
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T> Clone for ArrayData<T> {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            offset: self.offset,
            len: self.len,
        }
    }
}

impl<T> Default for ArrayData<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for ArrayData<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for ArrayData<T> {}

impl<T> From<Vec<T>> for ArrayData<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T> FromIterator<T> for ArrayData<T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> AsRef<[T]> for ArrayData<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<'a, T> IntoIterator for &'a ArrayData<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Serialize> Serialize for ArrayData<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ArrayData<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::new)
    }
}

impl<T> Dataset<T> for ArrayData<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).cloned()
    }

    fn len(&self) -> usize {
        self.len
    }
}
