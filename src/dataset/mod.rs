mod batcher;
mod factory;
pub mod scheduler;

use crate::error::{Result, SequenceError};
use crate::sequence::{ChunkData, SequenceData};

pub use batcher::{ChunkBatch, ChunkBatcher, FeatureRow, feature_width};
pub use factory::{build_chunk_splits, build_splits};
pub use scheduler::ChunkDataLoader;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetSplit {
    Train,
    Validation,
    Test,
}

impl DatasetSplit {
    pub fn name(self) -> &'static str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Validation => "validation",
            DatasetSplit::Test => "test",
        }
    }
}

/// Train, validation and test partitions of one sequence store.
#[derive(Clone, Debug)]
pub struct SequenceSplits<T, I = ()> {
    pub train: SequenceData<T, I>,
    pub validation: SequenceData<T, I>,
    pub test: SequenceData<T, I>,
}

impl<T, I: Clone> SequenceSplits<T, I> {
    /// Hold out the last `test` sequences for testing and the `validation`
    /// sequences before them for validation; everything earlier trains.
    pub fn from_tail(data: &SequenceData<T, I>, validation: usize, test: usize) -> Result<Self> {
        let holdout = validation + test;
        if data.len() <= holdout {
            return Err(SequenceError::InsufficientSequences {
                required: holdout + 1,
                available: data.len(),
            });
        }
        let train_len = data.len() - holdout;
        Ok(Self {
            train: data.slice(0, train_len)?,
            validation: data.slice(train_len, validation)?,
            test: data.slice(train_len + validation, test)?,
        })
    }
}

impl<T, I> SequenceSplits<T, I> {
    pub fn split(&self, split: DatasetSplit) -> &SequenceData<T, I> {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Validation => &self.validation,
            DatasetSplit::Test => &self.test,
        }
    }
}

/// Chunked view of each split.
#[derive(Clone, Debug)]
pub struct ChunkSplits<T, I = ()> {
    pub train: ChunkData<T, I>,
    pub validation: ChunkData<T, I>,
    pub test: ChunkData<T, I>,
}

impl<T, I> ChunkSplits<T, I> {
    pub fn split(&self, split: DatasetSplit) -> &ChunkData<T, I> {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Validation => &self.validation,
            DatasetSplit::Test => &self.test,
        }
    }
}
