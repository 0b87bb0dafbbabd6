//! `q8`: quantize a vector blockwise and show every element's round trip.

use anyhow::{Context, Result};
use microscale::{ErrorStats, Q8Vector};

use crate::common::{load_config, read_values};
use crate::config::CliConfig;

/// Quantize and print the per-element table followed by error statistics.
pub fn run(config_path: Option<&str>, input: Option<&str>, values: &[f32]) -> Result<()> {
    let config: CliConfig = load_config(config_path)?;
    config.validate()?;

    let src = read_values(input, values, config.q8.block_size * 2)?;
    let q = Q8Vector::quantize(&src, &config.q8)
        .with_context(|| format!("Cannot quantize {} values", src.len()))?;
    let y = q.dequantize();
    tracing::debug!(blocks = q.num_blocks(), block_size = q.block_size(), "quantized");

    for line in render_table(&src, &q, &y, config.precision) {
        println!("{}", line);
    }

    let stats = ErrorStats::between(&src, &y)?;
    let p = config.precision;
    println!();
    println!("blocks: {}  bytes: {}", q.num_blocks(), q.byte_size());
    println!("max error:  {:.p$}", stats.max_abs);
    println!("mean error: {:.p$}", stats.mean_abs);
    Ok(())
}

/// Format `idx | x | q | w | y | err` rows for each element.
pub fn render_table(src: &[f32], q: &Q8Vector, y: &[f32], precision: usize) -> Vec<String> {
    let p = precision;
    let col = p + 8;
    let mut lines = Vec::with_capacity(src.len() + 1);
    lines.push(format!(
        "{:>5} | {:>col$} | {:>4} | {:>3} | {:>col$} | {:>col$}",
        "idx", "x", "q", "w", "y", "err"
    ));

    for (i, (&x, &r)) in src.iter().zip(y).enumerate() {
        let w = q.scales()[q.block(i)];
        lines.push(format!(
            "{:>5} | {:>col$.p$} | {:>4} | {:>3} | {:>col$.p$} | {:>col$.p$}",
            i,
            x,
            q.values()[i],
            w,
            r,
            (x - r).abs()
        ));
    }
    lines
}
