//! Q8 microscaling: blockwise 8-bit quantization with a shared power-of-two scale.
//!
//! Every `block_size` consecutive elements share one signed exponent `w`; the
//! block dequantizes as `q * 2^w` with `q` in `[-127, 127]`. Storage is one byte
//! per element plus one byte per block.
//!
//! Scale selection per block:
//! - `max_abs == 0` → `w = 0`, all values zero
//! - otherwise `w = clamp(ilogb(max_abs) - 7, -7, 8)`
//!
//! The `7` is the e4m3 exponent budget: the block's largest magnitude lands
//! near `2^7`, the top of the symmetric int8 range.

mod matrix;
mod vector;

#[cfg(test)]
mod tests;

pub use matrix::Q8Matrix;
pub use vector::Q8Vector;

use serde::{Deserialize, Serialize};

use crate::error::{QuantError, Result};

/// Default number of elements sharing one scale.
pub const DEFAULT_BLOCK_SIZE: usize = 32;

/// Largest quantized magnitude (symmetric; -128 is never produced).
pub const Q8_MAX: i32 = 127;

/// Exponent budget subtracted from `ilogb(max_abs)` to pick the block scale.
pub const Q8_EXP_BUDGET: i32 = 7;

/// Smallest block scale exponent.
pub const SCALE_EXP_MIN: i32 = -7;

/// Largest block scale exponent.
pub const SCALE_EXP_MAX: i32 = 8;

//=============================================================================
// Configuration
//=============================================================================

/// Block quantizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Q8Config {
    /// Elements per shared scale
    pub block_size: usize,
}

impl Default for Q8Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Q8Config {
    pub fn new(block_size: usize) -> Self {
        Self { block_size }
    }

    /// Reject configurations no vector can satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(QuantError::InvalidConfig(
                "block_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that `len` is a positive multiple of the block size.
    pub fn check_len(&self, len: usize) -> Result<()> {
        self.validate()?;
        if len == 0 || len % self.block_size != 0 {
            return Err(QuantError::BlockMisaligned {
                len,
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    /// Number of blocks covering `len` elements.
    #[inline]
    pub fn block_count(&self, len: usize) -> usize {
        block_count(len, self.block_size)
    }
}

//=============================================================================
// Block arithmetic
//=============================================================================

/// Block index of element `n` (equivalently, block count of a length-`n` vector).
#[inline]
pub fn block_count(n: usize, block_size: usize) -> usize {
    n / block_size
}

/// Integer base-2 exponent of `|x|`.
///
/// Subnormals report their true exponent (down to -149). Zero returns
/// `i32::MIN`; infinity and NaN return `i32::MAX`.
#[inline]
pub fn ilogb(x: f32) -> i32 {
    let b = x.to_bits();
    let exp = ((b >> 23) & 0xFF) as i32;
    let mant = b & 0x7F_FFFF;
    match exp {
        0 if mant == 0 => i32::MIN,
        0 => (31 - mant.leading_zeros() as i32) - 149,
        0xFF => i32::MAX,
        _ => exp - 127,
    }
}

/// Exact `2^w` for normal exponents via IEEE-754 bit construction.
#[inline]
pub fn exp2i(w: i32) -> f32 {
    debug_assert!((-126..=127).contains(&w));
    f32::from_bits(((w + 127) as u32) << 23)
}

/// Shared scale exponent for a block whose largest magnitude is `max_abs`.
#[inline]
pub fn block_exponent(max_abs: f32) -> i8 {
    if max_abs == 0.0 {
        return 0;
    }
    ilogb(max_abs)
        .saturating_sub(Q8_EXP_BUDGET)
        .clamp(SCALE_EXP_MIN, SCALE_EXP_MAX) as i8
}

/// Quantize one element against a block scale.
///
/// Rounds half to even and saturates to `[-127, 127]`; NaN maps to 0.
#[inline]
pub fn quantize_element(x: f32, scale: f32) -> i8 {
    let r = (x / scale).round_ties_even() as i32;
    r.clamp(-Q8_MAX, Q8_MAX) as i8
}

/// Encode one block in place, returning its scale exponent.
pub(crate) fn encode_block(dst: &mut [i8], src: &[f32]) -> i8 {
    debug_assert_eq!(dst.len(), src.len());

    // NaN never compares greater, so it cannot become the block maximum
    let max_abs = src.iter().fold(0.0f32, |m, &x| {
        let a = x.abs();
        if a > m {
            a
        } else {
            m
        }
    });

    if max_abs == 0.0 {
        dst.fill(0);
        return 0;
    }

    let w = block_exponent(max_abs);
    let scale = exp2i(w as i32);
    for (q, &x) in dst.iter_mut().zip(src) {
        *q = quantize_element(x, scale);
    }
    w
}

/// Decode one block into `dst`.
#[inline]
pub(crate) fn decode_block(dst: &mut [f32], src: &[i8], w: i8) {
    debug_assert_eq!(dst.len(), src.len());
    let scale = exp2i(w as i32);
    for (out, &q) in dst.iter_mut().zip(src) {
        *out = q as f32 * scale;
    }
}
