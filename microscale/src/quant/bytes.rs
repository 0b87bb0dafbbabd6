//! Dispatch over raw little-endian byte buffers.
//!
//! Element `i` lives at byte offset `i * type_info.size`. Only the dense
//! types have a fixed stride; Q8 needs its scales alongside the values and
//! goes through [`crate::q8::Q8Vector`] instead.

use crate::error::{QuantError, Result};
use crate::scalar::{
    bits_of, e4m3_decode, e4m3_encode, e5m10_decode, e5m10_encode, e8m7_decode, e8m7_encode,
    f32_of,
};
use crate::types::TypeId;

fn encode_le<const N: usize>(
    dst: &mut [u8],
    src: &[f32],
    id: TypeId,
    f: impl Fn(f32) -> [u8; N],
) -> Result<()> {
    debug_assert_eq!(N, id.size());
    let expected = src.len() * id.size();
    if dst.len() != expected {
        return Err(QuantError::LengthMismatch {
            expected,
            actual: dst.len(),
        });
    }
    for (out, &x) in dst.chunks_exact_mut(N).zip(src) {
        out.copy_from_slice(&f(x));
    }
    Ok(())
}

fn decode_le<const N: usize>(
    dst: &mut [f32],
    src: &[u8],
    id: TypeId,
    f: impl Fn([u8; N]) -> f32,
) -> Result<()> {
    debug_assert_eq!(N, id.size());
    let expected = dst.len() * id.size();
    if src.len() != expected {
        return Err(QuantError::LengthMismatch {
            expected,
            actual: src.len(),
        });
    }
    for (out, chunk) in dst.iter_mut().zip(src.chunks_exact(N)) {
        let mut b = [0u8; N];
        b.copy_from_slice(chunk);
        *out = f(b);
    }
    Ok(())
}

/// Encode `src` into `dst` as type `id`.
///
/// `dst.len()` must be `src.len() * id.size()`.
pub fn quant_bytes(dst: &mut [u8], src: &[f32], id: TypeId) -> Result<()> {
    match id {
        TypeId::F32 => encode_le(dst, src, id, f32::to_le_bytes),
        TypeId::E8m23 => encode_le(dst, src, id, |x| bits_of(x).to_le_bytes()),
        TypeId::E5m10 => encode_le(dst, src, id, |x| e5m10_encode(x).to_le_bytes()),
        TypeId::E8m7 => encode_le(dst, src, id, |x| e8m7_encode(x).to_le_bytes()),
        TypeId::E4m3 => encode_le(dst, src, id, |x| [e4m3_encode(x)]),
        TypeId::Q8 => Err(QuantError::Unsupported {
            id,
            op: "quant_bytes",
        }),
    }
}

/// Decode `src` bytes of type `id` into `dst`.
///
/// `src.len()` must be `dst.len() * id.size()`.
pub fn dequant_bytes(dst: &mut [f32], src: &[u8], id: TypeId) -> Result<()> {
    match id {
        TypeId::F32 => decode_le(dst, src, id, f32::from_le_bytes),
        TypeId::E8m23 => decode_le(dst, src, id, |b| f32_of(u32::from_le_bytes(b))),
        TypeId::E5m10 => decode_le(dst, src, id, |b| e5m10_decode(u16::from_le_bytes(b))),
        TypeId::E8m7 => decode_le(dst, src, id, |b| e8m7_decode(u16::from_le_bytes(b))),
        TypeId::E4m3 => decode_le(dst, src, id, |b: [u8; 1]| e4m3_decode(b[0])),
        TypeId::Q8 => Err(QuantError::Unsupported {
            id,
            op: "dequant_bytes",
        }),
    }
}
