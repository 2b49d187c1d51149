use std::cell::Cell;
use std::fs;

use argon_data::{DatasetMeta, SequenceData, load_or_build, load_sequences, save_sequences};
use serde_json::{Value, json};
use tempfile::tempdir;

fn trajectories() -> SequenceData<Vec<f32>, Value> {
    SequenceData::from_trajectories(vec![
        (vec![vec![0.0, 1.0], vec![0.5, 1.5]], json!({ "id": 0 })),
        (vec![vec![2.0, 3.0]], json!({ "id": 1, "task": "lift" })),
    ])
}

fn meta() -> DatasetMeta {
    DatasetMeta {
        name: "unit".to_string(),
        feature_width: 2,
    }
}

#[test]
fn saved_sequences_load_back_unchanged() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("store.json");
    let data = trajectories();

    save_sequences(&path, &data, &meta()).expect("save");
    let (loaded, loaded_meta): (SequenceData<Vec<f32>, Value>, DatasetMeta) =
        load_sequences(&path).expect("load");

    assert_eq!(loaded, data);
    assert_eq!(loaded_meta, meta());
    assert_eq!(loaded.info(1).expect("second").info["task"], "lift");
}

#[test]
fn slices_are_saved_with_rebased_offsets() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tail.json");
    let tail = trajectories().slice(1, 1).expect("slice");

    save_sequences(&path, &tail, &meta()).expect("save");
    let (loaded, _): (SequenceData<Vec<f32>, Value>, DatasetMeta) =
        load_sequences(&path).expect("load");
    assert_eq!(loaded.num_elements(), 1);
    assert_eq!(loaded.info(0).expect("only").start_idx, 0);
}

#[test]
fn corrupt_layouts_are_rejected_on_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    let payload = json!({
        "meta": { "name": "bad" },
        "elements": [1, 2, 3],
        "sequences": [{ "info": null, "start_idx": 1, "end_idx": 5, "length": 4 }],
    });
    fs::write(&path, payload.to_string()).expect("write");

    let err = load_sequences::<u32, (), DatasetMeta>(&path).expect_err("bad layout");
    assert!(format!("{err:#}").contains("invalid sequence layout"), "{err:#}");
}

#[test]
fn load_or_build_builds_once() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cache").join("built.json");
    let builds = Cell::new(0);
    let build = || {
        builds.set(builds.get() + 1);
        Ok((trajectories(), meta()))
    };

    let (first, _) = load_or_build(&path, build).expect("first");
    let (second, second_meta) = load_or_build(&path, build).expect("second");

    assert_eq!(builds.get(), 1);
    assert_eq!(first, second);
    assert_eq!(second_meta.name, "unit");
}

#[test]
fn build_errors_propagate_without_writing() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("never.json");
    let result = load_or_build::<f32, (), DatasetMeta, _>(&path, || {
        Err(anyhow::anyhow!("source unavailable"))
    });

    assert!(result.is_err());
    assert!(!path.exists());
}
