//! Q8-quantized vector: int8 values plus one exponent per block.

use super::{block_count, decode_block, encode_block, exp2i, Q8Config, SCALE_EXP_MAX, SCALE_EXP_MIN};
use crate::error::{QuantError, Result};

/// Quantized values and their per-block scale exponents, owned together.
///
/// The length is always a positive multiple of the block size, and
/// `scales.len() == values.len() / block_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Q8Vector {
    /// Quantized values [len]
    values: Vec<i8>,
    /// Block exponents [len / block_size]
    scales: Vec<i8>,
    block_size: usize,
}

impl Q8Vector {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Allocate a zeroed vector of `len` elements.
    ///
    /// Fails with [`QuantError::BlockMisaligned`] unless `len` is a positive
    /// multiple of `config.block_size`.
    pub fn new(len: usize, config: &Q8Config) -> Result<Self> {
        config.check_len(len)?;
        Ok(Self {
            values: vec![0; len],
            scales: vec![0; config.block_count(len)],
            block_size: config.block_size,
        })
    }

    /// Allocate and encode in one step.
    pub fn quantize(src: &[f32], config: &Q8Config) -> Result<Self> {
        let mut q = Self::new(src.len(), config)?;
        q.fill_from(src);
        Ok(q)
    }

    /// Adopt externally stored values and scales.
    ///
    /// Validates the block layout and that every exponent lies in the range
    /// the encoder produces.
    pub fn from_parts(values: Vec<i8>, scales: Vec<i8>, block_size: usize) -> Result<Self> {
        let config = Q8Config::new(block_size);
        config.check_len(values.len())?;

        let expected = config.block_count(values.len());
        if scales.len() != expected {
            return Err(QuantError::LengthMismatch {
                expected,
                actual: scales.len(),
            });
        }

        if let Some((block, &exponent)) = scales
            .iter()
            .enumerate()
            .find(|(_, &w)| !(SCALE_EXP_MIN..=SCALE_EXP_MAX).contains(&(w as i32)))
        {
            return Err(QuantError::ScaleOutOfRange {
                block,
                exponent,
                min: SCALE_EXP_MIN,
                max: SCALE_EXP_MAX,
            });
        }

        Ok(Self {
            values,
            scales,
            block_size,
        })
    }

    /// Release the storage as `(values, scales)`.
    pub fn into_parts(self) -> (Vec<i8>, Vec<i8>) {
        (self.values, self.scales)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of quantized elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Constructors reject empty input, so a built vector is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.scales.len()
    }

    /// Quantized values.
    #[inline]
    pub fn values(&self) -> &[i8] {
        &self.values
    }

    /// Block scale exponents.
    #[inline]
    pub fn scales(&self) -> &[i8] {
        &self.scales
    }

    /// Block index holding element `i`.
    #[inline]
    pub fn block(&self, i: usize) -> usize {
        block_count(i, self.block_size)
    }

    /// Linear scale `2^w` applied to element `i`.
    #[inline]
    pub fn scale_of(&self, i: usize) -> f32 {
        exp2i(self.scales[self.block(i)] as i32)
    }

    /// Storage footprint in bytes (values + scales).
    pub fn byte_size(&self) -> usize {
        self.values.len() + self.scales.len()
    }

    // ========================================================================
    // Encode / decode
    // ========================================================================

    /// Quantize `src` into this vector.
    ///
    /// `src.len()` must equal [`Self::len`]; nothing is written otherwise.
    pub fn encode(&mut self, src: &[f32]) -> Result<()> {
        if src.len() != self.len() {
            return Err(QuantError::LengthMismatch {
                expected: self.len(),
                actual: src.len(),
            });
        }
        self.fill_from(src);
        Ok(())
    }

    /// Dequantize into `dst`, which must have length [`Self::len`].
    pub fn decode(&self, dst: &mut [f32]) -> Result<()> {
        if dst.len() != self.len() {
            return Err(QuantError::LengthMismatch {
                expected: self.len(),
                actual: dst.len(),
            });
        }
        self.write_into(dst);
        Ok(())
    }

    /// Dequantize into a new buffer.
    pub fn dequantize(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.len()];
        self.write_into(&mut out);
        out
    }

    /// Encode without length checks; callers have validated `src`.
    pub(crate) fn fill_from(&mut self, src: &[f32]) {
        let bs = self.block_size;
        for ((q, w), x) in self
            .values
            .chunks_exact_mut(bs)
            .zip(self.scales.iter_mut())
            .zip(src.chunks_exact(bs))
        {
            *w = encode_block(q, x);
        }
    }

    /// Decode without length checks; callers have validated `dst`.
    pub(crate) fn write_into(&self, dst: &mut [f32]) {
        let bs = self.block_size;
        for ((out, q), &w) in dst
            .chunks_exact_mut(bs)
            .zip(self.values.chunks_exact(bs))
            .zip(&self.scales)
        {
            decode_block(out, q, w);
        }
    }
}
