use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataloader::{DataLoader, DataLoaderIterator, Progress};
use burn::tensor::backend::Backend;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::batcher::{ChunkBatch, ChunkBatcher, FeatureRow, feature_width};
use crate::config::{ChunkSampling, LoaderConfig};
use crate::error::{Result, SequenceError};
use crate::rng::KeySequence;
use crate::sequence::{Chunk, ChunkData};

/// Data loader that batches windows from a [`ChunkData`].
///
/// Each call to [`DataLoader::iter`] is one epoch. The sampling order for an
/// epoch is derived from the seed and the epoch number, so two loaders built
/// with the same settings produce the same batches. Clones share the epoch
/// counter and, when set, the global step budget.
///
/// [`DataLoader::slice`] takes item indices and rounds them down to whole
/// batches. A slice reads its window of the parent's epoch order and keeps its
/// own epoch counter, so slices covering `[0, num_items)` visit every batch of
/// an epoch exactly once between them.
pub struct ChunkDataLoader<B: Backend, T, I> {
    chunks: Arc<ChunkData<T, I>>,
    device: B::Device,
    batch_size: usize,
    step_offset: usize,
    steps_per_epoch: usize,
    sampling: ChunkSampling,
    seed: u64,
    epoch: Arc<AtomicUsize>,
    total_steps: Option<usize>,
    consumed_steps: Option<Arc<AtomicUsize>>,
}

impl<B: Backend, T, I> Clone for ChunkDataLoader<B, T, I> {
    fn clone(&self) -> Self {
        Self {
            chunks: Arc::clone(&self.chunks),
            device: self.device.clone(),
            batch_size: self.batch_size,
            step_offset: self.step_offset,
            steps_per_epoch: self.steps_per_epoch,
            sampling: self.sampling,
            seed: self.seed,
            epoch: Arc::clone(&self.epoch),
            total_steps: self.total_steps,
            consumed_steps: self.consumed_steps.as_ref().map(Arc::clone),
        }
    }
}

impl<B: Backend, T: FeatureRow, I> ChunkDataLoader<B, T, I> {
    pub fn new(
        chunks: Arc<ChunkData<T, I>>,
        device: &B::Device,
        batch_size: usize,
        steps_per_epoch: Option<usize>,
        total_steps: Option<usize>,
        sampling: ChunkSampling,
        seed: u64,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(SequenceError::ZeroBatchSize);
        }
        if chunks.is_empty() {
            return Err(SequenceError::EmptyChunks);
        }
        feature_width(chunks.elements().as_slice())?;

        let steps_per_epoch = steps_per_epoch
            .filter(|steps| *steps > 0)
            .unwrap_or_else(|| chunks.len().div_ceil(batch_size));
        let total_steps = total_steps.filter(|value| *value > 0);
        let consumed_steps = total_steps.as_ref().map(|_| Arc::new(AtomicUsize::new(0)));

        Ok(Self {
            chunks,
            device: device.clone(),
            batch_size,
            step_offset: 0,
            steps_per_epoch,
            sampling,
            seed,
            epoch: Arc::new(AtomicUsize::new(0)),
            total_steps,
            consumed_steps,
        })
    }

    pub fn from_config(
        chunks: Arc<ChunkData<T, I>>,
        device: &B::Device,
        config: &LoaderConfig,
    ) -> Result<Self> {
        Self::new(
            chunks,
            device,
            config.batch_size,
            config.steps_per_epoch,
            config.total_steps,
            config.sampling,
            config.seed,
        )
    }
}

impl<B: Backend, T, I> ChunkDataLoader<B, T, I> {
    pub fn steps_per_epoch(&self) -> usize {
        self.steps_per_epoch
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn chunks(&self) -> &Arc<ChunkData<T, I>> {
        &self.chunks
    }

    fn remaining_steps(&self) -> usize {
        match (self.total_steps, &self.consumed_steps) {
            (Some(limit), Some(consumed)) => {
                let used = consumed.load(Ordering::Relaxed);
                limit.saturating_sub(used).min(self.steps_per_epoch)
            }
            _ => self.steps_per_epoch,
        }
    }

    /// Sampling order for this loader's steps of `epoch`.
    ///
    /// The parent order is drawn from the start, then the steps before
    /// `step_offset` are skipped, so every slice sees the same draw.
    fn epoch_order(&self, epoch: usize, steps: usize) -> Vec<usize> {
        let skipped = self.step_offset * self.batch_size;
        let mut order = self.parent_order(epoch, skipped + steps * self.batch_size);
        order.drain(..skipped);
        order
    }

    fn parent_order(&self, epoch: usize, needed: usize) -> Vec<usize> {
        let num_chunks = self.chunks.len();
        let mut rng: StdRng = KeySequence::new(self.seed).fold_in(epoch as u64).next_rng();

        match self.sampling {
            ChunkSampling::Random => (0..needed).map(|_| rng.gen_range(0..num_chunks)).collect(),
            ChunkSampling::Shuffled => {
                let mut order = Vec::with_capacity(needed);
                while order.len() < needed {
                    let mut permutation: Vec<usize> = (0..num_chunks).collect();
                    permutation.shuffle(&mut rng);
                    order.extend(permutation);
                }
                order.truncate(needed);
                order
            }
            ChunkSampling::Sequential => (0..needed).map(|idx| idx % num_chunks).collect(),
        }
    }
}

impl<B, T, I> DataLoader<B, ChunkBatch<B>> for ChunkDataLoader<B, T, I>
where
    B: Backend + 'static,
    B::Device: Clone,
    T: FeatureRow + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    fn iter<'a>(&'a self) -> Box<dyn DataLoaderIterator<ChunkBatch<B>> + 'a> {
        let steps_total = self.remaining_steps();
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed);
        let order = self.epoch_order(epoch, steps_total);

        Box::new(ChunkIterator {
            chunks: Arc::clone(&self.chunks),
            device: self.device.clone(),
            order,
            batch_size: self.batch_size,
            steps_total,
            step: 0,
            total_steps: self.total_steps,
            consumed_steps: self.consumed_steps.clone(),
        })
    }

    fn num_items(&self) -> usize {
        self.steps_per_epoch * self.batch_size
    }

    fn to_device(&self, device: &B::Device) -> Arc<dyn DataLoader<B, ChunkBatch<B>>> {
        let mut loader = self.clone();
        loader.device = device.clone();
        Arc::new(loader)
    }

    fn slice(&self, start: usize, end: usize) -> Arc<dyn DataLoader<B, ChunkBatch<B>>> {
        let end_step = (end / self.batch_size).min(self.steps_per_epoch);
        let start_step = (start / self.batch_size).min(end_step);

        let mut loader = self.clone();
        loader.step_offset = self.step_offset + start_step;
        loader.steps_per_epoch = end_step - start_step;
        loader.epoch = Arc::new(AtomicUsize::new(self.epoch.load(Ordering::Relaxed)));
        Arc::new(loader)
    }
}

struct ChunkIterator<B: Backend, T, I> {
    chunks: Arc<ChunkData<T, I>>,
    device: B::Device,
    order: Vec<usize>,
    batch_size: usize,
    steps_total: usize,
    step: usize,
    total_steps: Option<usize>,
    consumed_steps: Option<Arc<AtomicUsize>>,
}

impl<B, T, I> Iterator for ChunkIterator<B, T, I>
where
    B: Backend,
    T: FeatureRow,
    I: Clone,
{
    type Item = ChunkBatch<B>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.steps_total {
            return None;
        }

        if let (Some(counter), Some(limit)) = (&self.consumed_steps, self.total_steps) {
            let previous = counter.fetch_add(1, Ordering::Relaxed);
            if previous >= limit {
                return None;
            }
        }

        let start = self.step * self.batch_size;
        self.step += 1;
        let items: Vec<_> = self.order[start..start + self.batch_size]
            .iter()
            .filter_map(|&index| self.chunks.get(index))
            .collect();

        Some(<ChunkBatcher as Batcher<B, Chunk<T, I>, ChunkBatch<B>>>::batch(
            &ChunkBatcher,
            items,
            &self.device,
        ))
    }
}

impl<B, T, I> DataLoaderIterator<ChunkBatch<B>> for ChunkIterator<B, T, I>
where
    B: Backend,
    T: FeatureRow,
    I: Clone,
{
    fn progress(&self) -> Progress {
        Progress::new(
            self.step * self.batch_size,
            self.steps_total * self.batch_size,
        )
    }
}
