//! Bit-level conversion between f32 and reduced-precision float formats.
//!
//! Every format shares one encode/decode routine parameterised by its
//! [`MiniFloat`] layout constants:
//!
//! | format | bits | exponent | mantissa | bias |
//! |--------|------|----------|----------|------|
//! | e5m10  | 16   | 5        | 10       | 15   |
//! | e8m7   | 16   | 8        | 7        | 127  |
//! | e4m3   | 8    | 4        | 3        | 7    |
//!
//! Conversions truncate the mantissa (no rounding). Subnormal inputs are
//! flushed by shifting their mantissa into the target width, never
//! renormalised. Exponent underflow clamps to the zero exponent, overflow
//! saturates to signed infinity. Every input has a defined output.

mod formats;


pub use formats::{E4m3, E5m10, E8m7};

//=============================================================================
// f32 layout (e8m23)
//=============================================================================

const F32_MANT_BITS: u32 = 23;
const F32_MANT_MASK: u32 = 0x7F_FFFF;
const F32_EXP_MASK: u32 = 0xFF;
const F32_BIAS: i32 = 127;
const F32_INF: u32 = 0x7F80_0000;
const F32_QNAN: u32 = 0x7FC0_0000;

/// Reinterpret an f32 as its IEEE-754 bit pattern (lossless).
#[inline]
pub fn bits_of(v: f32) -> u32 {
    v.to_bits()
}

/// Reinterpret an IEEE-754 bit pattern as an f32 (lossless).
#[inline]
pub fn f32_of(b: u32) -> f32 {
    f32::from_bits(b)
}

//=============================================================================
// Format layout
//=============================================================================

/// Bit layout of a reduced-precision float stored in the low `BITS` of a u32.
pub trait MiniFloat: Copy {
    /// Total width in bits (sign + exponent + mantissa)
    const BITS: u32;
    /// Exponent field width
    const EXP_BITS: u32;
    /// Mantissa field width
    const MANT_BITS: u32;
    /// Exponent bias
    const BIAS: i32;
    /// Mantissa payload written for NaN
    const NAN_MANTISSA: u32;

    /// Wrap a raw pattern (only the low `BITS` are meaningful).
    fn from_raw(raw: u32) -> Self;

    /// Raw pattern widened to u32.
    fn raw(self) -> u32;

    /// All-ones exponent field (infinity / NaN marker)
    #[inline]
    fn exp_max() -> u32 {
        (1 << Self::EXP_BITS) - 1
    }

    /// Mask covering the mantissa field
    #[inline]
    fn mant_mask() -> u32 {
        (1 << Self::MANT_BITS) - 1
    }
}

/// Encode an f32 into format `F`.
pub fn encode<F: MiniFloat>(v: f32) -> F {
    let b = bits_of(v);
    let sign = (b >> 31) & 0x1;
    let exponent = (b >> F32_MANT_BITS) & F32_EXP_MASK;
    let mantissa = b & F32_MANT_MASK;

    let shift = F32_MANT_BITS - F::MANT_BITS;
    let sign_bit = sign << (F::BITS - 1);
    let exp_max = F::exp_max();
    let inf = sign_bit | (exp_max << F::MANT_BITS);

    // ±0
    if exponent == 0 && mantissa == 0 {
        return F::from_raw(sign_bit);
    }

    // Subnormal: flush
    if exponent == 0 {
        return F::from_raw(sign_bit | (mantissa >> shift));
    }

    if exponent == F32_EXP_MASK {
        if mantissa == 0 {
            return F::from_raw(inf);
        }
        return F::from_raw(inf | F::NAN_MANTISSA);
    }

    let rebias = exponent as i32 - F32_BIAS + F::BIAS;

    // The all-ones exponent is reserved for inf/NaN
    if rebias >= exp_max as i32 {
        return F::from_raw(inf);
    }

    let rebias = rebias.max(0) as u32;
    F::from_raw(sign_bit | (rebias << F::MANT_BITS) | (mantissa >> shift))
}

/// Decode a format `F` pattern into an f32.
pub fn decode<F: MiniFloat>(f: F) -> f32 {
    let b = f.raw();
    let sign = (b >> (F::BITS - 1)) & 0x1;
    let exp_max = F::exp_max();
    let exponent = (b >> F::MANT_BITS) & exp_max;
    let mantissa = b & F::mant_mask();

    let shift = F32_MANT_BITS - F::MANT_BITS;
    let sign_bit = sign << 31;

    if exponent == 0 && mantissa == 0 {
        return f32_of(sign_bit);
    }

    if exponent == 0 {
        return f32_of(sign_bit | (mantissa << shift));
    }

    if exponent == exp_max {
        if mantissa == 0 {
            return f32_of(sign_bit | F32_INF);
        }
        return f32_of(sign_bit | F32_QNAN);
    }

    let rebias = (exponent as i32 - F::BIAS + F32_BIAS).clamp(0, F32_EXP_MASK as i32) as u32;
    f32_of(sign_bit | (rebias << F32_MANT_BITS) | (mantissa << shift))
}

//=============================================================================
// Per-format entry points
//=============================================================================

/// Encode f32 as half precision (e5m10).
#[inline]
pub fn e5m10_encode(v: f32) -> u16 {
    encode::<E5m10>(v).to_bits()
}

/// Decode half precision (e5m10) to f32.
#[inline]
pub fn e5m10_decode(b: u16) -> f32 {
    decode(E5m10::from_bits(b))
}

/// Encode f32 as brain float (e8m7).
#[inline]
pub fn e8m7_encode(v: f32) -> u16 {
    encode::<E8m7>(v).to_bits()
}

/// Decode brain float (e8m7) to f32.
#[inline]
pub fn e8m7_decode(b: u16) -> f32 {
    decode(E8m7::from_bits(b))
}

/// Encode f32 as 8-bit float (e4m3).
#[inline]
pub fn e4m3_encode(v: f32) -> u8 {
    encode::<E4m3>(v).to_bits()
}

/// Decode 8-bit float (e4m3) to f32.
#[inline]
pub fn e4m3_decode(b: u8) -> f32 {
    decode(E4m3::from_bits(b))
}
