//! Error types for sequence storage, chunking and batching.

use thiserror::Error;

/// Invalid-input failures raised by the sequence data model.
///
/// Short sequences are not errors: [`truncate`](crate::SequenceData::truncate)
/// drops them and [`uniform_padded`](crate::SequenceData::uniform_padded) pads
/// them. Shape and index violations are reported here instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// A single index was past the end of a collection.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A `[start, start + len)` window did not fit inside the collection.
    #[error("slice [{start}, {start} + {len}) out of range for length {available}")]
    SliceOutOfRange {
        start: usize,
        len: usize,
        available: usize,
    },

    /// Sequences were expected to share one length.
    #[error("sequence {index} has length {found}, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// A buffer or payload table did not match the declared shape.
    #[error("shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Chunk windows need a positive length and stride.
    #[error("invalid chunking: chunk_length={chunk_length}, chunk_stride={chunk_stride}")]
    InvalidChunking {
        chunk_length: usize,
        chunk_stride: usize,
    },

    /// A zero-length sequence has no final element to pad with.
    #[error("sequence {index} is empty and cannot be padded")]
    EmptySequence { index: usize },

    /// Sequence offsets violate the ordering or bounds invariants.
    #[error("invalid sequence layout at entry {index}: {reason}")]
    InvalidLayout { index: usize, reason: String },

    /// Elements flattened to rows of different feature widths.
    #[error("element {index} has {found} features, expected {expected}")]
    FeatureWidth {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Not enough sequences to carve out the requested splits.
    #[error("need at least {required} sequences to split, found {available}")]
    InsufficientSequences { required: usize, available: usize },

    /// A loader was asked to batch from a chunk set with no windows.
    #[error("chunk set is empty")]
    EmptyChunks,

    /// Batch sizes must be positive.
    #[error("batch size must be positive")]
    ZeroBatchSize,
}

impl SequenceError {
    pub fn layout(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = SequenceError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = SequenceError::SliceOutOfRange {
            start: 3,
            len: 4,
            available: 5,
        };
        assert_eq!(err.to_string(), "slice [3, 3 + 4) out of range for length 5");

        let err = SequenceError::layout(2, "overlaps previous sequence");
        assert!(err.to_string().contains("entry 2"));
    }
}
