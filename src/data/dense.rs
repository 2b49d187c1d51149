use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SequenceError};

/// Rectangular `[rows, cols]` block of elements stored row-major.
///
/// This is the dense counterpart of a ragged [`SequenceData`](crate::SequenceData):
/// every row is one sequence and every row has the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenseBatch<T> {
    rows: usize,
    cols: usize,
    values: Vec<T>,
}

impl<T> DenseBatch<T> {
    pub fn new(rows: usize, cols: usize, values: Vec<T>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or(SequenceError::ShapeMismatch {
                expected: usize::MAX,
                found: values.len(),
            })?;
        if values.len() != expected {
            return Err(SequenceError::ShapeMismatch {
                expected,
                found: values.len(),
            });
        }
        Ok(Self { rows, cols, values })
    }

    pub(crate) fn from_raw(rows: usize, cols: usize, values: Vec<T>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self { rows, cols, values }
    }

    /// Batch with zero rows of the given width.
    pub fn empty(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            values: Vec::new(),
        }
    }

    /// Stack equal-length rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let count = rows.len();
        let mut values = Vec::with_capacity(count * cols);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(SequenceError::LengthMismatch {
                    index,
                    expected: cols,
                    found: row.len(),
                });
            }
            values.extend(row);
        }
        Ok(Self {
            rows: count,
            cols,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn row(&self, index: usize) -> Option<&[T]> {
        (index < self.rows).then(|| &self.values[index * self.cols..(index + 1) * self.cols])
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if col >= self.cols {
            return None;
        }
        self.row(row).map(|values| &values[col])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |row| &self.values[row * self.cols..(row + 1) * self.cols])
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DenseBatch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<T> {
            rows: usize,
            cols: usize,
            values: Vec<T>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        Self::new(raw.rows, raw.cols, raw.values).map_err(serde::de::Error::custom)
    }
}
