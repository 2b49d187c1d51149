//! JSON persistence for sequence stores.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::ArrayData;
use crate::sequence::{SequenceData, SequenceInfo};

/// Default metadata stored next to a sequence set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DatasetMeta {
    pub name: String,
    #[serde(default)]
    pub feature_width: usize,
}

#[derive(Serialize)]
struct StoredSequencesRef<'a, T, I, M> {
    meta: &'a M,
    elements: &'a [T],
    sequences: &'a [SequenceInfo<I>],
}

#[derive(Deserialize)]
struct StoredSequences<T, I, M> {
    meta: M,
    elements: Vec<T>,
    sequences: Vec<SequenceInfo<I>>,
}

pub fn save_sequences<T, I, M>(path: &Path, data: &SequenceData<T, I>, meta: &M) -> Result<()>
where
    T: Serialize,
    I: Serialize,
    M: Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let stored = StoredSequencesRef {
        meta,
        elements: data.elements().as_slice(),
        sequences: data.sequences().as_slice(),
    };
    let payload = serde_json::to_string(&stored).context("failed to serialize sequences")?;
    fs::write(path, payload).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load a sequence store, re-checking its offset layout.
pub fn load_sequences<T, I, M>(path: &Path) -> Result<(SequenceData<T, I>, M)>
where
    T: DeserializeOwned,
    I: DeserializeOwned,
    M: DeserializeOwned,
{
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let stored: StoredSequences<T, I, M> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse sequences from {}", path.display()))?;
    let data = SequenceData::new(
        ArrayData::new(stored.elements),
        ArrayData::new(stored.sequences),
    )
    .with_context(|| format!("invalid sequence layout in {}", path.display()))?;
    Ok((data, stored.meta))
}

/// Return the cached store at `path`, building and saving it on first use.
pub fn load_or_build<T, I, M, F>(path: &Path, build: F) -> Result<(SequenceData<T, I>, M)>
where
    T: Serialize + DeserializeOwned,
    I: Serialize + DeserializeOwned,
    M: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<(SequenceData<T, I>, M)>,
{
    if path.is_file() {
        let (data, meta) = load_sequences(path)?;
        info!(
            "Loaded {} sequences ({} elements) from {}",
            data.len(),
            data.num_elements(),
            path.display()
        );
        return Ok((data, meta));
    }

    let (data, meta) = build()?;
    save_sequences(path, &data, &meta)?;
    info!(
        "Built {} sequences ({} elements) and cached them at {}",
        data.len(),
        data.num_elements(),
        path.display()
    );
    Ok((data, meta))
}
