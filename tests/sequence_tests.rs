use argon_data::{ArrayData, DenseBatch, SequenceData, SequenceError, SequenceInfo};
use burn::data::dataset::Dataset;

fn ragged() -> SequenceData<u32, &'static str> {
    SequenceData::from_trajectories(vec![
        (vec![1, 2, 3], "a"),
        (vec![4, 5], "b"),
        (vec![6, 7, 8, 9], "c"),
    ])
}

#[test]
fn single_trajectory_covers_all_elements() {
    let data = SequenceData::from_trajectory(vec![10u32, 11, 12], 7u8);
    assert_eq!(data.len(), 1);
    let info = data.info(0).expect("info");
    assert_eq!((info.start_idx, info.end_idx, info.length), (0, 3, 3));
    assert_eq!(info.info, 7);
    assert_eq!(data.get(0), Some(&[10, 11, 12][..]));
    assert_eq!(data.slice(0, 1).expect("whole"), data);
}

#[test]
fn from_trajectories_packs_offsets_end_to_end() {
    let data = ragged();
    assert_eq!(data.len(), 3);
    assert_eq!(data.num_elements(), 9);
    assert_eq!(data.lengths(), vec![3, 2, 4]);

    let starts: Vec<usize> = data.sequences().iter().map(|seq| seq.start_idx).collect();
    assert_eq!(starts, vec![0, 3, 5]);
    assert_eq!(data.get(2), Some(&[6, 7, 8, 9][..]));
    assert_eq!(data.get(3), None);
}

#[test]
fn append_then_slice_recovers_both_halves() {
    let left = SequenceData::from_trajectories(vec![(vec![1u32, 2], 'x'), (vec![3], 'y')]);
    let right = SequenceData::from_trajectories(vec![(vec![4u32, 5, 6], 'z')]);

    let joined = left.append(&right);
    assert_eq!(joined.len(), 3);
    assert_eq!(joined.num_elements(), 6);
    assert_eq!(joined.info(2).expect("appended").start_idx, 3);

    assert_eq!(joined.slice(0, left.len()).expect("left"), left);
    assert_eq!(joined.slice(left.len(), right.len()).expect("right"), right);
}

#[test]
fn slice_rebases_offsets_to_zero() {
    let data = ragged();
    let tail = data.slice(1, 2).expect("slice");

    assert_eq!(tail.len(), 2);
    assert_eq!(tail.elements().as_slice(), &[4, 5, 6, 7, 8, 9]);
    let first = tail.info(0).expect("first");
    assert_eq!((first.start_idx, first.end_idx), (0, 2));
    let last = tail.info(1).expect("last");
    assert_eq!((last.start_idx, last.end_idx), (2, 6));
    assert_eq!(last.info, "c");
}

#[test]
fn slice_to_the_last_sequence_keeps_its_elements() {
    let data = ragged();
    let last = data.slice(2, 1).expect("slice");
    assert_eq!(last.get(0), Some(&[6, 7, 8, 9][..]));
}

#[test]
fn empty_slice_is_empty() {
    let data = ragged();
    let none = data.slice(1, 0).expect("slice");
    assert!(none.is_empty());
    assert_eq!(none.num_elements(), 0);
}

#[test]
fn slice_out_of_range_is_an_error() {
    let data = ragged();
    assert_eq!(
        data.slice(2, 2),
        Err(SequenceError::SliceOutOfRange {
            start: 2,
            len: 2,
            available: 3
        })
    );
}

#[test]
fn dense_round_trip_preserves_rows() {
    let batch = DenseBatch::new(2, 3, vec![1u32, 2, 3, 4, 5, 6]).expect("batch");
    let data = SequenceData::from_dense(batch.clone(), vec!["r0", "r1"]).expect("from dense");

    assert_eq!(data.len(), 2);
    assert_eq!(data.get(1), Some(&[4, 5, 6][..]));

    let (dense, infos) = data.as_dense().expect("uniform lengths");
    assert_eq!(dense, batch);
    assert_eq!(infos[1].start_idx, 3);
    assert_eq!(infos[1].info, "r1");
}

#[test]
fn from_dense_requires_one_info_per_row() {
    let batch = DenseBatch::new(2, 1, vec![0u8, 1]).expect("batch");
    assert_eq!(
        SequenceData::from_dense(batch, vec![()]),
        Err(SequenceError::ShapeMismatch {
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn as_dense_rejects_ragged_sequences() {
    let data = ragged();
    assert_eq!(
        data.as_dense().map(|(dense, _)| dense.shape()),
        Err(SequenceError::LengthMismatch {
            index: 1,
            expected: 3,
            found: 2
        })
    );
}

#[test]
fn as_dense_on_empty_store_is_empty() {
    let data: SequenceData<f32> = SequenceData::empty();
    let (dense, infos) = data.as_dense().expect("empty");
    assert!(dense.is_empty());
    assert!(infos.is_empty());
}

#[test]
fn truncate_keeps_prefixes_of_long_enough_sequences() {
    let data = ragged();
    let dense = data.truncate(3);
    assert_eq!(dense.shape(), [2, 3]);
    assert_eq!(dense.row(0), Some(&[1, 2, 3][..]));
    assert_eq!(dense.row(1), Some(&[6, 7, 8][..]));

    assert_eq!(data.truncate(5).rows(), 0);
}

#[test]
fn uniform_padded_repeats_the_last_element() {
    let data = ragged();
    let dense = data.uniform_padded(4).expect("padded");
    assert_eq!(dense.shape(), [3, 4]);
    assert_eq!(dense.row(0), Some(&[1, 2, 3, 3][..]));
    assert_eq!(dense.row(1), Some(&[4, 5, 5, 5][..]));
    assert_eq!(dense.row(2), Some(&[6, 7, 8, 9][..]));

    let short = data.uniform_padded(2).expect("truncated");
    assert_eq!(short.row(2), Some(&[6, 7][..]));
}

#[test]
fn uniform_padded_at_the_shared_length_is_identity() {
    let batch = DenseBatch::new(3, 4, (0..12u32).collect()).expect("batch");
    let data = SequenceData::from_dense(batch.clone(), vec![(); 3]).expect("from dense");
    assert_eq!(data.uniform_padded(4).expect("padded"), batch);
}

#[test]
fn uniform_padded_rejects_empty_sequences() {
    let data = SequenceData::from_trajectories(vec![(vec![1u32], ()), (vec![], ())]);
    assert_eq!(
        data.uniform_padded(2),
        Err(SequenceError::EmptySequence { index: 1 })
    );
    assert_eq!(data.uniform_padded(0).expect("zero width").shape(), [2, 0]);
}

#[test]
fn try_get_shares_the_arena_and_reports_bounds() {
    let data = ragged();
    let view = data.try_get(1).expect("view");
    assert_eq!(view.as_slice(), &[4, 5]);
    assert!(!view.is_compact());
    assert_eq!(
        data.try_get(3),
        Err(SequenceError::IndexOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn cache_compacts_a_slice_without_changing_it() {
    let data = ragged();
    let tail = data.slice(1, 2).expect("slice");
    assert!(!tail.elements().is_compact());

    let cached = tail.cache();
    assert!(cached.elements().is_compact());
    assert_eq!(cached, tail);
}

#[test]
fn map_elements_keeps_the_sequence_table() {
    let data = ragged();
    let scaled = data.map_elements(|value| *value as f32 * 0.5);
    assert_eq!(scaled.sequences(), data.sequences());
    assert_eq!(scaled.get(1), Some(&[2.0, 2.5][..]));
}

#[test]
fn dataset_items_are_whole_sequences() {
    let data = ragged();
    assert_eq!(Dataset::len(&data), 3);
    let item: ArrayData<u32> = Dataset::get(&data, 0).expect("item");
    assert_eq!(item.as_slice(), &[1, 2, 3]);
    assert!(Dataset::get(&data, 3).is_none());
}

#[test]
fn iter_pairs_infos_with_elements() {
    let data = ragged();
    let collected: Vec<(&str, usize)> = data
        .iter()
        .map(|(info, elements)| (info.info, elements.len()))
        .collect();
    assert_eq!(collected, vec![("a", 3), ("b", 2), ("c", 4)]);
}

#[test]
fn new_validates_externally_built_tables() {
    let sequences = ArrayData::new(vec![SequenceInfo::new((), 0, 2), SequenceInfo::new((), 2, 3)]);
    assert!(SequenceData::new(ArrayData::new(vec![0u8; 4]), sequences.clone()).is_err());
    assert!(SequenceData::new(ArrayData::new(vec![0u8; 5]), sequences).is_ok());
}

#[test]
fn slice_keeps_interior_gaps_and_drops_outer_ones() {
    let sequences = vec![SequenceInfo::new('a', 1, 2), SequenceInfo::new('b', 4, 1)];
    let data = SequenceData::from_parts(vec![90u32, 1, 2, 91, 3, 92], sequences).expect("layout");

    let whole = data.slice(0, 2).expect("slice");
    assert_eq!(whole.elements().as_slice(), &[1, 2, 91, 3]);
    assert_eq!(whole.info(1).expect("second").start_idx, 3);
    assert_eq!(whole.get(1), Some(&[3][..]));
    assert_ne!(whole, data);

    let packed = SequenceData::from_trajectories(vec![(vec![1u32, 2], 'a'), (vec![3], 'b')]);
    let extra = SequenceData::from_trajectory(vec![4u32], 'c');
    assert_eq!(packed.append(&extra).slice(0, packed.len()).expect("prefix"), packed);
}
