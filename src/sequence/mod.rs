//! Ragged trajectories packed into a flat arena, and sliding windows over them.

mod chunk;
mod info;
mod sequences;

pub use chunk::{Chunk, ChunkData, ChunkOffset, window_count};
pub use info::SequenceInfo;
pub use sequences::SequenceData;
