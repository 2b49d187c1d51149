use anyhow::{Context, Result};

use crate::config::{ChunkingConfig, SplitConfig};
use crate::sequence::SequenceData;

use super::{ChunkSplits, DatasetSplit, SequenceSplits};

pub fn build_splits<T, I: Clone>(
    cfg: &SplitConfig,
    data: &SequenceData<T, I>,
) -> Result<(SequenceSplits<T, I>, String)> {
    let splits = SequenceSplits::from_tail(data, cfg.validation, cfg.test).with_context(|| {
        format!(
            "failed to split {} sequences into validation={} and test={}",
            data.len(),
            cfg.validation,
            cfg.test
        )
    })?;

    let description = format!(
        "Split {} sequences into train={}, validation={}, test={}",
        data.len(),
        splits.train.len(),
        splits.validation.len(),
        splits.test.len()
    );

    Ok((splits, description))
}

pub fn build_chunk_splits<T, I>(
    cfg: &ChunkingConfig,
    splits: &SequenceSplits<T, I>,
) -> Result<(ChunkSplits<T, I>, String)> {
    let chunk = |split: DatasetSplit| {
        splits
            .split(split)
            .chunk(cfg.chunk_length, cfg.chunk_stride)
            .with_context(|| format!("failed to chunk {} split", split.name()))
    };
    let chunks = ChunkSplits {
        train: chunk(DatasetSplit::Train)?,
        validation: chunk(DatasetSplit::Validation)?,
        test: chunk(DatasetSplit::Test)?,
    };

    let description = format!(
        "Prepared chunks with chunk_length={}, chunk_stride={}: train={}, validation={}, test={}",
        cfg.chunk_length,
        cfg.chunk_stride,
        chunks.train.len(),
        chunks.validation.len(),
        chunks.test.len()
    );

    Ok((chunks, description))
}
