//! Configuration file for the `q8` and `roundtrip` commands.

use anyhow::Result;
use microscale::Q8Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::write_config_template;

/// Default file name written by `--generate-config`.
pub const CONFIG_FILE: &str = "mxq.json";

/// Digits after the decimal point in printed tables.
pub const DEFAULT_PRECISION: usize = 6;

/// Settings loaded from `mxq.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Block quantizer settings
    pub q8: Q8Config,

    /// Digits after the decimal point in printed tables
    pub precision: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            q8: Q8Config::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

impl CliConfig {
    pub fn validate(&self) -> Result<()> {
        self.q8.validate()?;
        if self.precision > 12 {
            anyhow::bail!("precision must be at most 12, got {}", self.precision);
        }
        Ok(())
    }
}

/// Write a default `mxq.json` in the current directory.
pub fn generate_config_template(command: &str) -> Result<()> {
    let config = CliConfig::default();
    write_config_template(&config, Path::new(CONFIG_FILE))?;

    println!("=== Generated {} ===", CONFIG_FILE);
    println!("Block size: {}", config.q8.block_size);
    println!("Precision: {}", config.precision);
    println!("\nEdit the config, then run:");
    println!("  mxq {} --config {}", command, CONFIG_FILE);
    Ok(())
}
