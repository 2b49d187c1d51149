use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub splits: SplitConfig,
    pub loader: LoaderConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ChunkingConfig {
    pub chunk_length: usize,
    #[serde(default = "default_chunk_stride")]
    pub chunk_stride: usize,
}

/// Sequences held out from the tail of the store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SplitConfig {
    #[serde(default = "default_holdout")]
    pub validation: usize,
    #[serde(default = "default_holdout")]
    pub test: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            validation: default_holdout(),
            test: default_holdout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoaderConfig {
    pub batch_size: usize,
    /// Defaults to enough steps to visit every chunk once.
    #[serde(default)]
    pub steps_per_epoch: Option<usize>,
    #[serde(default)]
    pub total_steps: Option<usize>,
    #[serde(default)]
    pub sampling: ChunkSampling,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChunkSampling {
    /// Uniform draws with replacement.
    Random,
    /// A fresh permutation of all chunks every epoch.
    #[default]
    Shuffled,
    /// Chunk order, wrapping around.
    Sequential,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_length == 0 {
            return Err(anyhow!("chunking.chunk_length must be positive"));
        }
        if self.chunking.chunk_stride == 0 {
            return Err(anyhow!("chunking.chunk_stride must be positive"));
        }
        if self.loader.batch_size == 0 {
            return Err(anyhow!("loader.batch_size must be positive"));
        }
        Ok(())
    }
}

fn default_chunk_stride() -> usize {
    1
}

fn default_holdout() -> usize {
    16
}

fn default_seed() -> u64 {
    42
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/cache")
}
