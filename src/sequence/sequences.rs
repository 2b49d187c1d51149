use burn::data::dataset::Dataset;
use tracing::debug;

use super::chunk::ChunkData;
use super::info::SequenceInfo;
use crate::data::{ArrayData, DenseBatch};
use crate::error::{Result, SequenceError};

/// Variable-length trajectories concatenated into one element arena.
///
/// `sequences` holds one [`SequenceInfo`] per trajectory, ordered by
/// `start_idx`, with non-overlapping ranges inside `elements`. Every
/// transformation returns a new value whose offsets are relative to its own
/// element store.
#[derive(Debug, PartialEq)]
pub struct SequenceData<T, I = ()> {
    elements: ArrayData<T>,
    sequences: ArrayData<SequenceInfo<I>>,
}

impl<T, I> Clone for SequenceData<T, I> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            sequences: self.sequences.clone(),
        }
    }
}

impl<T, I> SequenceData<T, I> {
    /// Pair an element store with a sequence table, checking the layout.
    pub fn new(elements: ArrayData<T>, sequences: ArrayData<SequenceInfo<I>>) -> Result<Self> {
        validate_layout(elements.len(), sequences.as_slice())?;
        Ok(Self {
            elements,
            sequences,
        })
    }

    pub fn from_parts(elements: Vec<T>, sequences: Vec<SequenceInfo<I>>) -> Result<Self> {
        Self::new(ArrayData::new(elements), ArrayData::new(sequences))
    }

    pub fn empty() -> Self {
        Self {
            elements: ArrayData::empty(),
            sequences: ArrayData::empty(),
        }
    }

    /// Wrap one trajectory as a single-sequence store.
    pub fn from_trajectory(elements: impl Into<ArrayData<T>>, info: I) -> Self {
        let elements = elements.into();
        let info = SequenceInfo::new(info, 0, elements.len());
        Self {
            elements,
            sequences: ArrayData::new(vec![info]),
        }
    }

    /// Pack ragged trajectories end to end, in iteration order.
    pub fn from_trajectories<It>(trajectories: It) -> Self
    where
        It: IntoIterator<Item = (Vec<T>, I)>,
    {
        let mut elements = Vec::new();
        let mut sequences = Vec::new();
        for (trajectory, info) in trajectories {
            sequences.push(SequenceInfo::new(info, elements.len(), trajectory.len()));
            elements.extend(trajectory);
        }
        Self {
            elements: ArrayData::new(elements),
            sequences: ArrayData::new(sequences),
        }
    }

    /// Treat each row of a dense batch as one sequence of `cols` elements.
    pub fn from_dense(batch: DenseBatch<T>, infos: Vec<I>) -> Result<Self> {
        if infos.len() != batch.rows() {
            return Err(SequenceError::ShapeMismatch {
                expected: batch.rows(),
                found: infos.len(),
            });
        }
        let cols = batch.cols();
        let sequences = infos
            .into_iter()
            .enumerate()
            .map(|(row, info)| SequenceInfo::new(info, row * cols, cols))
            .collect();
        Ok(Self {
            elements: ArrayData::new(batch.into_values()),
            sequences: ArrayData::new(sequences),
        })
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &ArrayData<T> {
        &self.elements
    }

    pub fn sequences(&self) -> &ArrayData<SequenceInfo<I>> {
        &self.sequences
    }

    pub fn info(&self, index: usize) -> Option<&SequenceInfo<I>> {
        self.sequences.get(index)
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.sequences.iter().map(|seq| seq.length).collect()
    }

    /// Elements of sequence `index`.
    pub fn get(&self, index: usize) -> Option<&[T]> {
        let seq = self.sequences.get(index)?;
        Some(&self.elements.as_slice()[seq.range()])
    }

    /// Elements of sequence `index` as a view sharing this store's arena.
    pub fn try_get(&self, index: usize) -> Result<ArrayData<T>> {
        let seq = self
            .sequences
            .get(index)
            .ok_or(SequenceError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        self.elements.slice(seq.start_idx, seq.length)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SequenceInfo<I>, &[T])> + '_ {
        let elements = self.elements.as_slice();
        self.sequences
            .iter()
            .map(move |seq| (seq, &elements[seq.range()]))
    }

    pub fn map_elements<U, F>(&self, f: F) -> SequenceData<U, I>
    where
        F: FnMut(&T) -> U,
    {
        SequenceData {
            elements: self.elements.map(f),
            sequences: self.sequences.clone(),
        }
    }

    pub fn map_infos<J, F>(&self, mut f: F) -> SequenceData<T, J>
    where
        F: FnMut(&I) -> J,
    {
        SequenceData {
            elements: self.elements.clone(),
            sequences: self.sequences.map(|seq| seq.map_info(&mut f)),
        }
    }

    /// Sequences `[idx, idx + len)` with offsets rebased to start at zero.
    ///
    /// The element window runs from the first selected sequence's start to
    /// the last one's end. Gaps between selected sequences are kept; elements
    /// before the first or after the last are not, so slicing a store with
    /// outer gaps does not compare equal to the original.
    pub fn slice(&self, idx: usize, len: usize) -> Result<Self>
    where
        I: Clone,
    {
        let infos = self.sequences.slice(idx, len)?;
        let (Some(first), Some(last)) = (infos.as_slice().first(), infos.as_slice().last())
        else {
            return Ok(Self::empty());
        };
        let start = first.start_idx;
        let elements = self.elements.slice(start, last.end_idx - start)?;
        let sequences = infos.map(|seq| seq.shifted_down(start));
        Ok(Self {
            elements,
            sequences,
        })
    }

    /// Sliding windows of `chunk_length` elements, `chunk_stride` apart,
    /// that never cross a sequence boundary.
    pub fn chunk(&self, chunk_length: usize, chunk_stride: usize) -> Result<ChunkData<T, I>> {
        ChunkData::build(
            self.elements.clone(),
            self.sequences.clone(),
            chunk_length,
            chunk_stride,
        )
    }
}

impl<T: Clone, I: Clone> SequenceData<T, I> {
    /// Concatenate `other` after this store, shifting its offsets past our elements.
    pub fn append(&self, other: &Self) -> Self {
        let shift = self.elements.len();
        let sequences = self
            .sequences
            .iter()
            .cloned()
            .chain(other.sequences.iter().map(|seq| seq.shifted_up(shift)))
            .collect();
        Self {
            elements: self.elements.append(&other.elements),
            sequences,
        }
    }

    /// Copy both tables into their own compact buffers.
    pub fn cache(&self) -> Self {
        Self {
            elements: self.elements.cache(),
            sequences: self.sequences.cache(),
        }
    }

    /// Dense `[N, T]` elements plus the sequence table.
    ///
    /// Fails unless every sequence has the same length.
    pub fn as_dense(&self) -> Result<(DenseBatch<T>, Vec<SequenceInfo<I>>)> {
        let Some(first) = self.sequences.as_slice().first() else {
            return Ok((DenseBatch::empty(0), Vec::new()));
        };
        let expected = first.length;
        let mut values = Vec::with_capacity(self.len() * expected);
        for (index, (seq, elements)) in self.iter().enumerate() {
            if seq.length != expected {
                return Err(SequenceError::LengthMismatch {
                    index,
                    expected,
                    found: seq.length,
                });
            }
            values.extend_from_slice(elements);
        }
        Ok((
            DenseBatch::from_raw(self.len(), expected, values),
            self.sequences.to_vec(),
        ))
    }
}

impl<T: Clone, I> SequenceData<T, I> {
    /// First `length` elements of every sequence at least that long.
    ///
    /// Shorter sequences are dropped, so the result may have zero rows.
    pub fn truncate(&self, length: usize) -> DenseBatch<T> {
        let mut values = Vec::new();
        let mut rows = 0;
        for (seq, elements) in self.iter() {
            if seq.length >= length {
                values.extend_from_slice(&elements[..length]);
                rows += 1;
            }
        }
        let dropped = self.len() - rows;
        if dropped > 0 {
            debug!(
                dropped,
                kept = rows,
                length, "truncate dropped sequences shorter than the target length"
            );
        }
        DenseBatch::from_raw(rows, length, values)
    }

    /// Every sequence resized to `length`: longer ones truncated, shorter ones
    /// padded by repeating their final element.
    pub fn uniform_padded(&self, length: usize) -> Result<DenseBatch<T>> {
        let mut values = Vec::with_capacity(self.len() * length);
        if length > 0 {
            for (index, (seq, elements)) in self.iter().enumerate() {
                let Some(last) = seq.length.checked_sub(1) else {
                    return Err(SequenceError::EmptySequence { index });
                };
                values.extend((0..length).map(|k| elements[k.min(last)].clone()));
            }
        }
        Ok(DenseBatch::from_raw(self.len(), length, values))
    }
}

impl<T, I> Default for SequenceData<T, I> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, I> Dataset<ArrayData<T>> for SequenceData<T, I>
where
    T: Send + Sync,
    I: Send + Sync,
{
    fn get(&self, index: usize) -> Option<ArrayData<T>> {
        self.try_get(index).ok()
    }

    fn len(&self) -> usize {
        self.sequences.len()
    }
}

fn validate_layout<I>(num_elements: usize, sequences: &[SequenceInfo<I>]) -> Result<()> {
    let mut previous_end = 0;
    for (index, seq) in sequences.iter().enumerate() {
        if seq.start_idx.checked_add(seq.length) != Some(seq.end_idx) {
            return Err(SequenceError::layout(
                index,
                format!(
                    "end_idx {} - start_idx {} != length {}",
                    seq.end_idx, seq.start_idx, seq.length
                ),
            ));
        }
        if seq.start_idx < previous_end {
            return Err(SequenceError::layout(
                index,
                format!(
                    "starts at {} before the previous sequence ends at {previous_end}",
                    seq.start_idx
                ),
            ));
        }
        if seq.end_idx > num_elements {
            return Err(SequenceError::layout(
                index,
                format!("ends at {} past {num_elements} elements", seq.end_idx),
            ));
        }
        previous_end = seq.end_idx;
    }
    Ok(())
}
