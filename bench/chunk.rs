use std::sync::Arc;

use argon_data::{ChunkDataLoader, ChunkSampling, SequenceData};
use burn::data::dataloader::DataLoader;
use burn::tensor::backend::Backend as BackendTrait;
use burn_ndarray::NdArray;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy)]
struct ChunkConfig {
    name: &'static str,
    sequences: usize,
    max_length: usize,
    chunk_length: usize,
    chunk_stride: usize,
}

const CHUNK_CONFIGS: &[ChunkConfig] = &[
    ChunkConfig {
        name: "s200_l16",
        sequences: 200,
        max_length: 256,
        chunk_length: 16,
        chunk_stride: 1,
    },
    ChunkConfig {
        name: "s2000_l16",
        sequences: 2_000,
        max_length: 256,
        chunk_length: 16,
        chunk_stride: 1,
    },
    ChunkConfig {
        name: "s2000_l32_s4",
        sequences: 2_000,
        max_length: 512,
        chunk_length: 32,
        chunk_stride: 4,
    },
];

const FEATURES: usize = 8;

fn synthetic(config: &ChunkConfig) -> SequenceData<[f32; FEATURES], usize> {
    let mut rng = StdRng::seed_from_u64(0);
    SequenceData::from_trajectories(
        (0..config.sequences)
            .map(|id| {
                let length = rng.gen_range(1..=config.max_length);
                let steps = (0..length)
                    .map(|_| std::array::from_fn(|_| rng.gen_range(-1.0f32..1.0)))
                    .collect();
                (steps, id)
            })
            .collect::<Vec<_>>(),
    )
}

fn chunk_index_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_index");
    for config in CHUNK_CONFIGS {
        let data = synthetic(config);
        group.throughput(Throughput::Elements(data.num_elements() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(config.name), &data, |b, data| {
            b.iter(|| {
                data.chunk(config.chunk_length, config.chunk_stride)
                    .map(|chunks| chunks.len())
                    .unwrap_or_default()
            });
        });
    }
    group.finish();
}

fn loader_epoch_bench(c: &mut Criterion) {
    type Backend = NdArray<f32>;
    let device = <Backend as BackendTrait>::Device::default();

    let mut group = c.benchmark_group("loader_epoch");
    group.sample_size(10);
    for config in CHUNK_CONFIGS {
        let Ok(chunks) = synthetic(config).chunk(config.chunk_length, config.chunk_stride) else {
            continue;
        };
        let Ok(loader) = ChunkDataLoader::<Backend, _, _>::new(
            Arc::new(chunks),
            &device,
            64,
            Some(16),
            None,
            ChunkSampling::Shuffled,
            0,
        ) else {
            continue;
        };
        group.throughput(Throughput::Elements(loader.num_items() as u64));
        group.bench_function(BenchmarkId::from_parameter(config.name), |b| {
            b.iter(|| loader.iter().count());
        });
    }
    group.finish();
}

criterion_group!(benches, chunk_index_bench, loader_epoch_bench);
criterion_main!(benches);
