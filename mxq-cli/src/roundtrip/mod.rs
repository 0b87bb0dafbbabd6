//! `roundtrip`: quantize through the type dispatch and report the error.

use anyhow::{Context, Result};
use microscale::{
    dequant_matrix, dequant_vector, ErrorStats, MatrixBuf, Q8Config, TypeId, VectorBuf,
};
use serde::Serialize;

use crate::common::{load_config, read_values};
use crate::config::CliConfig;

/// Summary printed by `roundtrip`.
#[derive(Debug, Clone, Serialize)]
pub struct RoundtripReport {
    #[serde(rename = "type")]
    pub type_id: TypeId,
    pub shape: Option<(usize, usize)>,
    pub elements: usize,
    /// Encoded storage footprint
    pub bytes: usize,
    /// Bytes as f32
    pub f32_bytes: usize,
    pub error: ErrorStats,
}

impl RoundtripReport {
    pub fn compression_ratio(&self) -> f32 {
        if self.bytes == 0 {
            return 0.0;
        }
        self.f32_bytes as f32 / self.bytes as f32
    }
}

/// Quantize `src` as `id`, as a `rows x cols` matrix when a shape is given.
pub fn roundtrip(
    src: &[f32],
    id: TypeId,
    shape: Option<(usize, usize)>,
    q8: &Q8Config,
) -> Result<RoundtripReport> {
    let mut out = vec![0.0f32; src.len()];

    let bytes = match shape {
        Some((rows, cols)) => {
            let len = shape_len(rows, cols)?;
            if len != src.len() {
                anyhow::bail!(
                    "Shape {}x{} needs {} values, got {}",
                    rows,
                    cols,
                    len,
                    src.len()
                );
            }
            tracing::debug!(%id, rows, cols, "matrix round trip");
            let m = MatrixBuf::quantize(src, id, rows, cols, q8)
                .with_context(|| format!("Cannot quantize {}x{} as {}", rows, cols, id))?;
            dequant_matrix(&mut out, &m)?;
            m.byte_size()
        }
        None => {
            tracing::debug!(%id, len = src.len(), "vector round trip");
            let v = VectorBuf::quantize(src, id, q8)
                .with_context(|| format!("Cannot quantize {} values as {}", src.len(), id))?;
            dequant_vector(&mut out, &v)?;
            v.byte_size()
        }
    };

    Ok(RoundtripReport {
        type_id: id,
        shape,
        elements: src.len(),
        bytes,
        f32_bytes: src.len() * TypeId::F32.size(),
        error: ErrorStats::between(src, &out)?,
    })
}

fn shape_len(rows: usize, cols: usize) -> Result<usize> {
    match rows.checked_mul(cols) {
        Some(len) => Ok(len),
        None => anyhow::bail!("Shape {}x{} is too large", rows, cols),
    }
}

pub fn run(
    id: TypeId,
    shape: Option<(usize, usize)>,
    config_path: Option<&str>,
    input: Option<&str>,
    values: &[f32],
    json: bool,
) -> Result<()> {
    let config: CliConfig = load_config(config_path)?;
    config.validate()?;

    let fallback_len = match shape {
        Some((rows, cols)) => shape_len(rows, cols)?,
        None => config.q8.block_size * 4,
    };
    let src = read_values(input, values, fallback_len)?;
    let report = roundtrip(&src, id, shape, &config.q8)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let p = config.precision;
    println!("type:        {}", report.type_id);
    if let Some((rows, cols)) = report.shape {
        println!("shape:       {}x{}", rows, cols);
    }
    println!("elements:    {}", report.elements);
    println!(
        "bytes:       {} ({:.2}x smaller than f32)",
        report.bytes,
        report.compression_ratio()
    );
    println!("max error:   {:.p$}", report.error.max_abs);
    println!("mean error:  {:.p$}", report.error.mean_abs);
    println!("rmse:        {:.p$}", report.error.rmse);
    println!("max rel:     {:.p$}", report.error.max_rel);
    if report.error.non_finite > 0 {
        println!("non-finite:  {}", report.error.non_finite);
    }
    Ok(())
}
