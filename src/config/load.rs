use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use toml::{Table, Value};

use super::core::PipelineConfig;

/// Load configuration files in order; keys in later files override earlier ones.
pub fn load_pipeline_config(paths: &[PathBuf]) -> Result<PipelineConfig> {
    if paths.is_empty() {
        return Err(anyhow!("at least one configuration file is required"));
    }

    let mut merged = Table::new();
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let table: Table = text
            .parse()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        merge_tables(&mut merged, table);
    }

    let config = Value::Table(merged)
        .try_into::<PipelineConfig>()
        .context("failed to deserialize merged configuration")?;
    config.validate()?;
    Ok(config)
}

fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
