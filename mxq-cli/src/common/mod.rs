//! Common utilities shared between the commands.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a JSON config file, falling back to defaults when no path is given.
pub fn load_config<T: DeserializeOwned + Default>(config_path: Option<&str>) -> Result<T> {
    let Some(path) = config_path else {
        tracing::debug!("no --config given, using defaults");
        return Ok(T::default());
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path))?;

    let config = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config: {}", path))?;
    tracing::debug!(path, "loaded config");
    Ok(config)
}

/// Write `config` as pretty JSON to `path`, refusing to clobber an existing file.
pub fn write_config_template<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists; remove it first", path.display());
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).with_context(|| format!("Failed to write: {}", path.display()))?;
    Ok(())
}

/// Resolve the input values from a JSON file or the command line.
///
/// At most one source may be given. With neither, a deterministic sample of
/// `fallback_len` values is used.
pub fn read_values(
    input: Option<&str>,
    values: &[f32],
    fallback_len: usize,
) -> Result<Vec<f32>> {
    match (input, values.is_empty()) {
        (Some(_), false) => anyhow::bail!("Pass values either inline or with --input, not both"),
        (Some(path), true) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input: {}", path))?;
            let values: Vec<f32> = serde_json::from_str(&json)
                .with_context(|| format!("Input must be a JSON array of numbers: {}", path))?;
            tracing::debug!(path, count = values.len(), "read input values");
            Ok(values)
        }
        (None, false) => Ok(values.to_vec()),
        (None, true) => {
            tracing::info!(count = fallback_len, "no input given, using sample data");
            Ok(sample_values(fallback_len))
        }
    }
}

/// Deterministic signed sample spanning a few octaves.
pub fn sample_values(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32;
            (t * 0.37).sin() * (1.0 + (t * 0.11).cos().abs() * 3.0)
        })
        .collect()
}
