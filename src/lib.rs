pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod rng;
pub mod sequence;
pub mod store;
#[cfg(feature = "cli")]
pub mod wgpu;

pub use config::{
    ChunkSampling, ChunkingConfig, LoaderConfig, PipelineConfig, SplitConfig, StoreConfig,
    load_pipeline_config,
};
pub use data::{ArrayData, DenseBatch};
pub use dataset::{
    ChunkBatch, ChunkBatcher, ChunkDataLoader, ChunkSplits, DatasetSplit, FeatureRow,
    SequenceSplits, build_chunk_splits, build_splits, feature_width,
};
pub use error::SequenceError;
pub use rng::KeySequence;
pub use sequence::{Chunk, ChunkData, ChunkOffset, SequenceData, SequenceInfo, window_count};
pub use store::{DatasetMeta, load_or_build, load_sequences, save_sequences};
