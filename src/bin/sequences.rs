use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use burn::data::dataloader::DataLoader;
use burn::tensor::backend::Backend as BackendTrait;
use burn_ndarray::NdArray;
use burn_wgpu::Wgpu;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::Rng;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use argon_data::{
    ChunkData, ChunkDataLoader, DatasetMeta, KeySequence, LoaderConfig, SequenceData,
    build_chunk_splits, build_splits, load_or_build, load_pipeline_config, load_sequences,
    save_sequences, wgpu::init_runtime,
};

type Trajectories = SequenceData<Vec<f32>, Value>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build, inspect and chunk trajectory stores")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate random-walk trajectories and store them.
    ///
    /// Without `--output` the store is cached under `store.cache_dir` and
    /// reused by later runs with the same parameters.
    Synth {
        #[arg(long)]
        output: Option<PathBuf>,
        /// Additional configuration files applied in order (later files override earlier ones).
        #[arg(short = 'c', long = "config", value_name = "PATH")]
        config: Vec<PathBuf>,
        #[command(flatten)]
        params: SynthParams,
    },

    /// Print summary statistics for a stored sequence set.
    Inspect { path: PathBuf },

    /// Split and chunk a stored sequence set, then pull a few training batches.
    Chunk {
        path: PathBuf,
        /// Additional configuration files applied in order (later files override earlier ones).
        #[arg(short = 'c', long = "config", value_name = "PATH")]
        config: Vec<PathBuf>,
        #[arg(long, default_value_t = 2)]
        batches: usize,
        #[arg(long, value_enum, default_value_t = BackendArg::Ndarray)]
        backend: BackendArg,
    },

    /// Pad or truncate every sequence to one length and write the dense batch.
    Pad {
        path: PathBuf,
        #[arg(long)]
        length: usize,
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct SynthParams {
    #[arg(long, default_value_t = 64)]
    sequences: usize,
    #[arg(long, default_value_t = 8)]
    min_length: usize,
    #[arg(long, default_value_t = 64)]
    max_length: usize,
    #[arg(long, default_value_t = 4)]
    features: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BackendArg {
    Ndarray,
    Wgpu,
}

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Synth {
            output,
            config,
            params,
        } => cmd_synth(output, config, &params).map(|_| ()),
        Command::Inspect { path } => cmd_inspect(&path),
        Command::Chunk {
            path,
            config,
            batches,
            backend,
        } => cmd_chunk(&path, config, batches, backend),
        Command::Pad {
            path,
            length,
            output,
        } => cmd_pad(&path, length, &output),
    }
}

fn layered_configs(extra_configs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut config_paths = vec![PathBuf::from("config/base.toml")];
    config_paths.extend(extra_configs);
    config_paths
}

fn cmd_synth(
    output: Option<PathBuf>,
    extra_configs: Vec<PathBuf>,
    params: &SynthParams,
) -> Result<PathBuf> {
    let (min_length, max_length) = (params.min_length, params.max_length);
    if min_length > max_length {
        return Err(anyhow!("min-length {min_length} exceeds max-length {max_length}"));
    }

    let (data, path): (Trajectories, PathBuf) = match output {
        Some(path) => {
            let (data, meta) = synthesize(params);
            save_sequences(&path, &data, &meta)?;
            (data, path)
        }
        None => {
            let config = load_pipeline_config(&layered_configs(extra_configs))?;
            let path = synth_cache_path(&config.store.cache_dir, params);
            let (data, _meta): (Trajectories, DatasetMeta) =
                load_or_build(&path, || Ok(synthesize(params)))?;
            (data, path)
        }
    };

    info!(
        path = %path.display(),
        sequences = data.len(),
        elements = data.num_elements(),
        "Synthetic trajectories ready"
    );
    Ok(path)
}

fn synth_cache_path(cache_dir: &Path, params: &SynthParams) -> PathBuf {
    cache_dir.join(format!(
        "synthetic-n{}-len{}-{}-f{}-seed{}.json",
        params.sequences, params.min_length, params.max_length, params.features, params.seed
    ))
}

fn synthesize(params: &SynthParams) -> (Trajectories, DatasetMeta) {
    let mut rng = KeySequence::new(params.seed).next_rng();
    let trajectories = (0..params.sequences)
        .map(|id| {
            let length = rng.gen_range(params.min_length..=params.max_length);
            let mut state = vec![0.0f32; params.features];
            let steps = (0..length)
                .map(|_| {
                    for value in state.iter_mut() {
                        *value += rng.gen_range(-1.0f32..1.0);
                    }
                    state.clone()
                })
                .collect::<Vec<_>>();
            (steps, json!({ "id": id }))
        })
        .collect::<Vec<_>>();

    let meta = DatasetMeta {
        name: "synthetic".to_string(),
        feature_width: params.features,
    };
    (SequenceData::from_trajectories(trajectories), meta)
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let (data, meta): (Trajectories, DatasetMeta) = load_sequences(path)?;
    let lengths = data.lengths();

    println!("Sequence store: {}", path.display());
    println!("  Name: {}", meta.name);
    println!("  Feature width: {}", meta.feature_width);
    println!("  Sequences: {}", data.len());
    println!("  Elements: {}", data.num_elements());
    if let (Some(min), Some(max)) = (lengths.iter().min(), lengths.iter().max()) {
        let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
        println!("  Length: min={min}, mean={mean:.1}, max={max}");
    }
    Ok(())
}

fn cmd_chunk(
    path: &Path,
    extra_configs: Vec<PathBuf>,
    batches: usize,
    backend: BackendArg,
) -> Result<()> {
    let config = load_pipeline_config(&layered_configs(extra_configs))?;

    let (data, meta): (Trajectories, DatasetMeta) = load_sequences(path)?;
    info!("Loaded `{}` with {} sequences", meta.name, data.len());

    let (splits, split_summary) = build_splits(&config.splits, &data)?;
    info!("{split_summary}");
    let (chunks, chunk_summary) = build_chunk_splits(&config.chunking, &splits)?;
    info!("{chunk_summary}");

    let train = Arc::new(chunks.train);
    match backend {
        BackendArg::Ndarray => {
            pull_batches::<NdArray<f32>, _>(train, &config.loader, batches, "ndarray", |_| {})
        }
        BackendArg::Wgpu => {
            pull_batches::<Wgpu<f32>, _>(train, &config.loader, batches, "wgpu", init_runtime)
        }
    }
}

fn pull_batches<B, Init>(
    chunks: Arc<ChunkData<Vec<f32>, Value>>,
    loader_cfg: &LoaderConfig,
    batches: usize,
    backend_name: &str,
    init_backend: Init,
) -> Result<()>
where
    B: BackendTrait + 'static,
    Init: Fn(&B::Device),
{
    let device = <B as BackendTrait>::Device::default();
    init_backend(&device);
    let loader = ChunkDataLoader::<B, _, _>::from_config(chunks, &device, loader_cfg)
        .context("failed to build chunk loader")?;
    info!(
        "[{backend_name}] loader ready: batch_size={}, steps_per_epoch={}",
        loader.batch_size(),
        loader.steps_per_epoch()
    );

    for (step, batch) in loader.iter().take(batches).enumerate() {
        let [batch_size, chunk_length, features] = batch.elements.dims();
        info!(step, batch_size, chunk_length, features, "batch");
    }
    Ok(())
}

fn cmd_pad(path: &Path, length: usize, output: &Path) -> Result<()> {
    let (data, _meta): (Trajectories, DatasetMeta) = load_sequences(path)?;
    let dense = data
        .uniform_padded(length)
        .with_context(|| format!("failed to pad sequences to length {length}"))?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let payload = serde_json::to_string(&dense).context("failed to serialize padded batch")?;
    fs::write(output, payload).with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        rows = dense.rows(),
        cols = dense.cols(),
        path = %output.display(),
        "Saved padded batch"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn params() -> SynthParams {
        SynthParams {
            sequences: 6,
            min_length: 3,
            max_length: 9,
            features: 2,
            seed: 5,
        }
    }

    #[test]
    fn synthesize_respects_parameters() {
        let (data, meta) = synthesize(&params());
        assert_eq!(data.len(), 6);
        assert!(data.lengths().iter().all(|len| (3..=9).contains(len)));
        assert!(data.elements().iter().all(|row| row.len() == 2));
        assert_eq!(meta.feature_width, 2);
        assert_eq!(synthesize(&params()).0, data);
    }

    #[test]
    fn synth_without_output_caches_under_store_dir() {
        let dir = tempdir().expect("tempdir");
        let cache_dir = dir.path().join("cache");
        let override_path = dir.path().join("store.toml");
        fs::write(
            &override_path,
            format!("[store]\ncache_dir = \"{}\"\n", cache_dir.display()),
        )
        .expect("write config");

        let path = cmd_synth(None, vec![override_path.clone()], &params()).expect("synth");
        assert_eq!(path, synth_cache_path(&cache_dir, &params()));
        assert!(path.is_file());

        let (cached, _meta): (Trajectories, DatasetMeta) = load_sequences(&path).expect("load");
        assert_eq!(cached, synthesize(&params()).0);

        let again = cmd_synth(None, vec![override_path], &params()).expect("cached synth");
        assert_eq!(again, path);
    }

    #[test]
    fn synth_rejects_inverted_length_range() {
        let dir = tempdir().expect("tempdir");
        let params = SynthParams {
            min_length: 10,
            max_length: 2,
            ..params()
        };
        let output = dir.path().join("never.json");
        assert!(cmd_synth(Some(output.clone()), Vec::new(), &params).is_err());
        assert!(!output.exists());
    }
}
