//! `types` and `scalar`: look at the type table and individual encodings.

use anyhow::{Context, Result};
use microscale::types::all_types;
use microscale::{dequant_scalar, quant_scalar, TypeId};

/// Print the element type table.
pub fn run_types(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(all_types())?);
        return Ok(());
    }

    println!("{:>3}  {:<6} {:>5} {:>6}", "id", "name", "size", "align");
    for info in all_types() {
        println!(
            "{:>3}  {:<6} {:>5} {:>6}",
            u8::from(info.id),
            info.name,
            info.size,
            info.alignment
        );
    }
    Ok(())
}

/// One line of `scalar` output.
pub fn format_scalar(value: f32, id: TypeId) -> Result<String> {
    let encoded = quant_scalar(value, id)
        .with_context(|| format!("{} has no single-element encoding; use `mxq q8`", id))?;
    let width = id.size() * 2;
    let decoded = dequant_scalar(encoded);
    Ok(format!(
        "{value:>14e} -> 0x{bits:0width$X} -> {decoded:e}",
        bits = encoded.bits()
    ))
}

/// Encode each value as `id` and show the pattern and its decoding.
pub fn run_scalar(id: TypeId, values: &[f32]) -> Result<()> {
    if values.is_empty() {
        anyhow::bail!("No values given");
    }
    tracing::debug!(%id, count = values.len(), "encoding scalars");

    println!("type: {} ({} byte(s) per element)", id, id.size());
    for &v in values {
        println!("{}", format_scalar(v, id)?);
    }
    Ok(())
}
