use std::ops::Range;
use std::sync::Arc;

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use super::info::SequenceInfo;
use crate::data::{ArrayData, DenseBatch};
use crate::error::{Result, SequenceError};

/// Number of `chunk_length` windows, `chunk_stride` apart, that fit in a
/// sequence of `length` elements.
pub fn window_count(length: usize, chunk_length: usize, chunk_stride: usize) -> usize {
    if chunk_stride == 0 || length + chunk_stride < chunk_length {
        return 0;
    }
    (length + chunk_stride - chunk_length) / chunk_stride
}

/// Where a chunk starts in the element arena and which sequence owns it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOffset {
    pub element_offset: usize,
    pub sequence_index: usize,
}

/// One window read out of a [`ChunkData`].
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<T, I> {
    /// Position of the first element within the owning sequence.
    pub seq_offset: usize,
    pub sequence_index: usize,
    pub elements: ArrayData<T>,
    pub info: I,
}

/// Fixed-length sliding windows over a sequence store.
///
/// The window index is built once by [`SequenceData::chunk`](crate::SequenceData::chunk):
/// an exclusive prefix sum over per-sequence window counts places each
/// sequence's windows, then every sequence fills its own slots. Reading a
/// chunk afterwards is O(1) and shares the element arena.
#[derive(Debug)]
pub struct ChunkData<T, I = ()> {
    elements: ArrayData<T>,
    sequences: ArrayData<SequenceInfo<I>>,
    offsets: ArrayData<ChunkOffset>,
    chunk_starts: Arc<[usize]>,
    /// Index of `offsets[0]` in the unsliced chunk index.
    first_chunk: usize,
    chunk_length: usize,
    chunk_stride: usize,
}

impl<T, I> Clone for ChunkData<T, I> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            sequences: self.sequences.clone(),
            offsets: self.offsets.clone(),
            chunk_starts: Arc::clone(&self.chunk_starts),
            first_chunk: self.first_chunk,
            chunk_length: self.chunk_length,
            chunk_stride: self.chunk_stride,
        }
    }
}

impl<T, I> ChunkData<T, I> {
    pub(crate) fn build(
        elements: ArrayData<T>,
        sequences: ArrayData<SequenceInfo<I>>,
        chunk_length: usize,
        chunk_stride: usize,
    ) -> Result<Self> {
        if chunk_length == 0 || chunk_stride == 0 {
            return Err(SequenceError::InvalidChunking {
                chunk_length,
                chunk_stride,
            });
        }

        let counts: Vec<usize> = sequences
            .iter()
            .map(|seq| window_count(seq.length, chunk_length, chunk_stride))
            .collect();

        let mut chunk_starts = Vec::with_capacity(counts.len() + 1);
        chunk_starts.push(0);
        for count in &counts {
            let previous = chunk_starts[chunk_starts.len() - 1];
            chunk_starts.push(previous + count);
        }
        let total = chunk_starts[counts.len()];

        let mut offsets = vec![ChunkOffset::default(); total];
        for (sequence_index, seq) in sequences.iter().enumerate() {
            let slots =
                &mut offsets[chunk_starts[sequence_index]..chunk_starts[sequence_index + 1]];
            for (window, slot) in slots.iter_mut().enumerate() {
                *slot = ChunkOffset {
                    element_offset: seq.start_idx + window * chunk_stride,
                    sequence_index,
                };
            }
        }

        Ok(Self {
            elements,
            sequences,
            offsets: ArrayData::new(offsets),
            chunk_starts: chunk_starts.into(),
            first_chunk: 0,
            chunk_length,
            chunk_stride,
        })
    }

    /// Total number of chunks.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn chunk_length(&self) -> usize {
        self.chunk_length
    }

    pub fn chunk_stride(&self) -> usize {
        self.chunk_stride
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn elements(&self) -> &ArrayData<T> {
        &self.elements
    }

    pub fn sequences(&self) -> &ArrayData<SequenceInfo<I>> {
        &self.sequences
    }

    pub fn offsets(&self) -> &[ChunkOffset] {
        self.offsets.as_slice()
    }

    /// Exclusive prefix sum of per-sequence chunk counts, one entry per
    /// sequence plus the grand total.
    ///
    /// The table always describes the full index built by
    /// [`SequenceData::chunk`](crate::SequenceData::chunk); a slice shares it
    /// with its parent. Use [`ChunkData::chunks_of_sequence`] for ranges
    /// relative to this set.
    pub fn chunk_starts(&self) -> &[usize] {
        &self.chunk_starts
    }

    /// Indices in this set of the chunks owned by sequence `sequence_index`.
    ///
    /// On a slice the range is clipped to the slice and may be empty.
    pub fn chunks_of_sequence(&self, sequence_index: usize) -> Option<Range<usize>> {
        let start = *self.chunk_starts.get(sequence_index)?;
        let end = *self.chunk_starts.get(sequence_index + 1)?;
        let lo = self.first_chunk;
        let hi = lo + self.len();
        Some(start.clamp(lo, hi) - lo..end.clamp(lo, hi) - lo)
    }

    /// Chunks `[start, start + len)`, sharing the element and sequence arenas.
    pub fn slice(&self, start: usize, len: usize) -> Result<Self> {
        Ok(Self {
            elements: self.elements.clone(),
            sequences: self.sequences.clone(),
            offsets: self.offsets.slice(start, len)?,
            chunk_starts: Arc::clone(&self.chunk_starts),
            first_chunk: self.first_chunk + start,
            chunk_length: self.chunk_length,
            chunk_stride: self.chunk_stride,
        })
    }
}

impl<T, I: Clone> ChunkData<T, I> {
    pub fn get(&self, index: usize) -> Option<Chunk<T, I>> {
        let offset = *self.offsets.get(index)?;
        let seq = self.sequences.get(offset.sequence_index)?;
        let elements = self
            .elements
            .slice(offset.element_offset, self.chunk_length)
            .ok()?;
        Some(Chunk {
            seq_offset: offset.element_offset - seq.start_idx,
            sequence_index: offset.sequence_index,
            elements,
            info: seq.info.clone(),
        })
    }

    pub fn try_get(&self, index: usize) -> Result<Chunk<T, I>> {
        self.get(index).ok_or(SequenceError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Chunk<T, I>> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

impl<T: Clone, I> ChunkData<T, I> {
    /// Every chunk stacked into a `[len, chunk_length]` batch.
    pub fn as_dense(&self) -> DenseBatch<T> {
        let elements = self.elements.as_slice();
        let mut values = Vec::with_capacity(self.len() * self.chunk_length);
        for offset in self.offsets.iter() {
            let start = offset.element_offset;
            values.extend_from_slice(&elements[start..start + self.chunk_length]);
        }
        DenseBatch::from_raw(self.len(), self.chunk_length, values)
    }
}

impl<T, I> Dataset<Chunk<T, I>> for ChunkData<T, I>
where
    T: Send + Sync,
    I: Clone + Send + Sync,
{
    fn get(&self, index: usize) -> Option<Chunk<T, I>> {
        ChunkData::get(self, index)
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_count_matches_closed_form() {
        assert_eq!(window_count(5, 3, 2), 2);
        assert_eq!(window_count(5, 3, 1), 3);
        assert_eq!(window_count(4, 3, 2), 1);
        assert_eq!(window_count(2, 3, 1), 0);
        assert_eq!(window_count(2, 3, 5), 0);
        assert_eq!(window_count(0, 1, 1), 0);
        assert_eq!(window_count(3, 3, 7), 1);
    }

    #[test]
    fn prefix_sums_partition_the_index() {
        let sequences = ArrayData::new(vec![
            SequenceInfo::new((), 0, 4),
            SequenceInfo::new((), 4, 1),
            SequenceInfo::new((), 5, 3),
        ]);
        let elements = ArrayData::new((0..8).collect::<Vec<u32>>());
        let chunks = ChunkData::build(elements, sequences, 2, 1).unwrap();

        assert_eq!(chunks.chunk_starts(), &[0, 3, 3, 5]);
        assert_eq!(chunks.chunks_of_sequence(0), Some(0..3));
        assert_eq!(chunks.chunks_of_sequence(1), Some(3..3));
        assert_eq!(chunks.chunks_of_sequence(2), Some(3..5));
        assert_eq!(chunks.chunks_of_sequence(3), None);

        let starts: Vec<usize> = chunks.offsets().iter().map(|o| o.element_offset).collect();
        assert_eq!(starts, vec![0, 1, 2, 5, 6]);
    }

    #[test]
    fn sliced_ranges_are_relative_to_the_slice() {
        let sequences = ArrayData::new(vec![SequenceInfo::new((), 0, 3), SequenceInfo::new((), 3, 3)]);
        let elements = ArrayData::new((0..6).collect::<Vec<u32>>());
        let chunks = ChunkData::build(elements, sequences, 2, 1).unwrap();

        let tail = chunks.slice(2, 2).unwrap();
        assert_eq!(tail.chunks_of_sequence(0), Some(0..0));
        assert_eq!(tail.chunks_of_sequence(1), Some(0..2));

        let straddle = chunks.slice(1, 2).unwrap().slice(1, 1).unwrap();
        assert_eq!(straddle.chunks_of_sequence(0), Some(0..0));
        assert_eq!(straddle.chunks_of_sequence(1), Some(0..1));
    }
}
