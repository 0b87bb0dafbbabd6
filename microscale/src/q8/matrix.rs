//! Row-major Q8 matrix: one independently scaled [`Q8Vector`] per row.

use rayon::prelude::*;

use super::{Q8Config, Q8Vector};
use crate::error::{shape_len, QuantError, Result};

/// Q8 matrix stored as one quantized vector per row.
///
/// Blocks never span rows and rows never share scales, so rows are encoded
/// and decoded in parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Q8Matrix {
    rows: Vec<Q8Vector>,
    cols: usize,
}

impl Q8Matrix {
    /// Allocate a zeroed `rows x cols` matrix.
    ///
    /// `cols` must be a positive multiple of the block size.
    pub fn new(rows: usize, cols: usize, config: &Q8Config) -> Result<Self> {
        config.check_len(cols)?;
        shape_len(rows, cols)?;
        let rows = (0..rows)
            .map(|_| Q8Vector::new(cols, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows, cols })
    }

    /// Allocate and encode a row-major `rows x cols` matrix.
    pub fn quantize(src: &[f32], rows: usize, cols: usize, config: &Q8Config) -> Result<Self> {
        let mut m = Self::new(rows, cols, config)?;
        m.encode(src)?;
        Ok(m)
    }

    /// Build from already quantized rows of equal length and block size.
    ///
    /// The width is taken from the first row; use [`Q8Matrix::from_rows_with_cols`]
    /// when the row list may be empty.
    pub fn from_rows(rows: Vec<Q8Vector>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(QuantError::InvalidConfig(
                "matrix needs at least one row to infer its width".to_string(),
            ));
        };
        let cols = first.len();
        Self::from_rows_with_cols(rows, cols)
    }

    /// Build from quantized rows that must all be `cols` wide.
    ///
    /// Accepts an empty row list, matching `Q8Matrix::new(0, cols, ..)`.
    pub fn from_rows_with_cols(rows: Vec<Q8Vector>, cols: usize) -> Result<Self> {
        if cols == 0 {
            return Err(QuantError::InvalidConfig("matrix width must be positive".to_string()));
        }
        let block_size = rows.first().map_or(0, Q8Vector::block_size);

        for row in &rows {
            if row.len() != cols {
                return Err(QuantError::LengthMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            if row.block_size() != block_size {
                return Err(QuantError::InvalidConfig(format!(
                    "rows mix block sizes {} and {}",
                    block_size,
                    row.block_size()
                )));
            }
        }

        Ok(Self { rows, cols })
    }

    /// Matrix dimensions (rows, cols).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Quantized row `r`, if present.
    #[inline]
    pub fn row(&self, r: usize) -> Option<&Q8Vector> {
        self.rows.get(r)
    }

    /// All rows in order.
    #[inline]
    pub fn rows(&self) -> &[Q8Vector] {
        &self.rows
    }

    /// Storage footprint in bytes across all rows.
    pub fn byte_size(&self) -> usize {
        self.rows.iter().map(Q8Vector::byte_size).sum()
    }

    /// Quantize a row-major matrix of length `rows * cols`.
    pub fn encode(&mut self, src: &[f32]) -> Result<()> {
        let expected = self.rows.len() * self.cols;
        if src.len() != expected {
            return Err(QuantError::LengthMismatch {
                expected,
                actual: src.len(),
            });
        }
        if self.rows.is_empty() {
            return Ok(());
        }

        self.rows
            .par_iter_mut()
            .zip(src.par_chunks(self.cols))
            .for_each(|(row, data)| row.fill_from(data));
        Ok(())
    }

    /// Dequantize into a row-major buffer of length `rows * cols`.
    pub fn decode(&self, dst: &mut [f32]) -> Result<()> {
        let expected = self.rows.len() * self.cols;
        if dst.len() != expected {
            return Err(QuantError::LengthMismatch {
                expected,
                actual: dst.len(),
            });
        }
        if self.rows.is_empty() {
            return Ok(());
        }

        self.rows
            .par_iter()
            .zip(dst.par_chunks_mut(self.cols))
            .for_each(|(row, out)| row.write_into(out));
        Ok(())
    }

    /// Dequantize into a new row-major buffer.
    pub fn dequantize(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.rows.len() * self.cols];
        if !self.rows.is_empty() {
            self.rows
                .par_iter()
                .zip(out.par_chunks_mut(self.cols))
                .for_each(|(row, chunk)| row.write_into(chunk));
        }
        out
    }
}
