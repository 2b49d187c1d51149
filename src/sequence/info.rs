use serde::{Deserialize, Serialize};

/// Location of one sequence inside a flat element arena, plus its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInfo<I = ()> {
    pub info: I,
    pub start_idx: usize,
    pub end_idx: usize,
    pub length: usize,
}

impl<I> SequenceInfo<I> {
    pub fn new(info: I, start_idx: usize, length: usize) -> Self {
        Self {
            info,
            start_idx,
            end_idx: start_idx + length,
            length,
        }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_idx..self.end_idx
    }

    /// Offsets moved forward by `delta`.
    pub(crate) fn shifted_up(&self, delta: usize) -> Self
    where
        I: Clone,
    {
        Self {
            info: self.info.clone(),
            start_idx: self.start_idx + delta,
            end_idx: self.end_idx + delta,
            length: self.length,
        }
    }

    /// Offsets moved back by `delta`.
    pub(crate) fn shifted_down(&self, delta: usize) -> Self
    where
        I: Clone,
    {
        Self {
            info: self.info.clone(),
            start_idx: self.start_idx - delta,
            end_idx: self.end_idx - delta,
            length: self.length,
        }
    }

    pub fn map_info<J, F>(&self, f: F) -> SequenceInfo<J>
    where
        F: FnOnce(&I) -> J,
    {
        SequenceInfo {
            info: f(&self.info),
            start_idx: self.start_idx,
            end_idx: self.end_idx,
            length: self.length,
        }
    }
}
