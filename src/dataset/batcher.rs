use burn::data::dataloader::batcher::Batcher;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};

use crate::data::DenseBatch;
use crate::error::{Result, SequenceError};
use crate::sequence::Chunk;

/// Element types that flatten into a fixed-width row of `f32` features.
pub trait FeatureRow {
    fn num_features(&self) -> usize;
    fn extend_features(&self, out: &mut Vec<f32>);
}

impl FeatureRow for f32 {
    fn num_features(&self) -> usize {
        1
    }

    fn extend_features(&self, out: &mut Vec<f32>) {
        out.push(*self);
    }
}

impl<const N: usize> FeatureRow for [f32; N] {
    fn num_features(&self) -> usize {
        N
    }

    fn extend_features(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(self);
    }
}

impl FeatureRow for Vec<f32> {
    fn num_features(&self) -> usize {
        self.len()
    }

    fn extend_features(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(self);
    }
}

/// Shared feature width of `values`, or the first element that disagrees.
/// An empty slice has width zero.
pub fn feature_width<T: FeatureRow>(values: &[T]) -> Result<usize> {
    let Some(first) = values.first() else {
        return Ok(0);
    };
    let expected = first.num_features();
    for (index, value) in values.iter().enumerate().skip(1) {
        let found = value.num_features();
        if found != expected {
            return Err(SequenceError::FeatureWidth {
                index,
                expected,
                found,
            });
        }
    }
    Ok(expected)
}

impl<T: FeatureRow> DenseBatch<T> {
    /// `[rows, cols, features]` float tensor.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Result<Tensor<B, 3>> {
        let features = feature_width(self.values())?;
        let mut flat = Vec::with_capacity(self.values().len() * features);
        for value in self.values() {
            value.extend_features(&mut flat);
        }
        Ok(Tensor::<B, 3>::from_data(
            TensorData::new(flat, [self.rows(), self.cols(), features]),
            device,
        ))
    }
}

impl<T: Copy + Into<i64>> DenseBatch<T> {
    /// `[rows, cols]` integer tensor, e.g. for token sequences.
    pub fn to_int_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2, Int> {
        let values: Vec<i64> = self.values().iter().map(|&value| value.into()).collect();
        Tensor::<B, 2, Int>::from_data(TensorData::new(values, [self.rows(), self.cols()]), device)
    }
}

/// A batch of chunks ready for a model step.
#[derive(Clone, Debug)]
pub struct ChunkBatch<B: Backend> {
    /// `[batch, chunk_length, features]`
    pub elements: Tensor<B, 3>,
    /// `[batch]` position of each chunk within its sequence.
    pub seq_offsets: Tensor<B, 1, Int>,
    /// `[batch]` index of the sequence each chunk came from.
    pub sequence_indices: Tensor<B, 1, Int>,
}

/// Stacks [`Chunk`]s into a [`ChunkBatch`].
///
/// Every chunk in a batch must share one length and one feature width;
/// [`ChunkDataLoader`](super::ChunkDataLoader) checks this up front.
///
/// # Panics
///
/// [`Batcher::batch`] panics when the chunks disagree on length or feature
/// width, since the trait has no error channel. Check inputs with
/// [`feature_width`] when batching chunks from more than one source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkBatcher;

impl<B, T, I> Batcher<B, Chunk<T, I>, ChunkBatch<B>> for ChunkBatcher
where
    B: Backend,
    T: FeatureRow,
{
    fn batch(&self, items: Vec<Chunk<T, I>>, device: &B::Device) -> ChunkBatch<B> {
        let batch_size = items.len();
        let chunk_length = items.first().map(|chunk| chunk.elements.len()).unwrap_or(0);
        let features = items
            .first()
            .and_then(|chunk| chunk.elements.get(0))
            .map(FeatureRow::num_features)
            .unwrap_or(0);

        let mut flat = Vec::with_capacity(batch_size * chunk_length * features);
        let mut seq_offsets = Vec::with_capacity(batch_size);
        let mut sequence_indices = Vec::with_capacity(batch_size);
        for chunk in &items {
            assert_eq!(
                chunk.elements.len(),
                chunk_length,
                "chunks in a batch must share one length"
            );
            for element in chunk.elements.iter() {
                element.extend_features(&mut flat);
            }
            seq_offsets.push(chunk.seq_offset as i64);
            sequence_indices.push(chunk.sequence_index as i64);
        }
        assert_eq!(
            flat.len(),
            batch_size * chunk_length * features,
            "chunk elements must share one feature width"
        );

        ChunkBatch {
            elements: Tensor::<B, 3>::from_data(
                TensorData::new(flat, [batch_size, chunk_length, features]),
                device,
            ),
            seq_offsets: Tensor::<B, 1, Int>::from_data(
                TensorData::new(seq_offsets, [batch_size]),
                device,
            ),
            sequence_indices: Tensor::<B, 1, Int>::from_data(
                TensorData::new(sequence_indices, [batch_size]),
                device,
            ),
        }
    }
}
