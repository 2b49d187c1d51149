pub mod core;
pub mod load;

pub use self::core::{
    ChunkSampling, ChunkingConfig, LoaderConfig, PipelineConfig, SplitConfig, StoreConfig,
};
pub use load::load_pipeline_config;
