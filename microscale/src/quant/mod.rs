//! Type-tagged quantize/dequantize dispatch.
//!
//! Buffers carry their element type, so the codec is picked by matching on
//! the buffer rather than by a separate tag and stride:
//!
//! - `F32` is a plain copy
//! - `E8m23` reinterprets bits
//! - `E5m10`, `E8m7`, `E4m3` run the scalar codec element by element
//! - `Q8` runs the block quantizer
//!
//! For callers holding raw bytes, [`bytes`] offers the same dispatch over
//! little-endian byte buffers with the stride taken from the type table.

pub mod bytes;


use rayon::prelude::*;

use crate::error::{shape_len, QuantError, Result};
use crate::q8::{Q8Config, Q8Matrix, Q8Vector};
use crate::scalar::{bits_of, f32_of, E4m3, E5m10, E8m7};
use crate::types::TypeId;

pub use bytes::{dequant_bytes, quant_bytes};

//=============================================================================
// Scalars
//=============================================================================

/// A single encoded element of one of the dense types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    F32(f32),
    E8m23(u32),
    E5m10(E5m10),
    E8m7(E8m7),
    E4m3(E4m3),
}

impl Scalar {
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::F32(_) => TypeId::F32,
            Self::E8m23(_) => TypeId::E8m23,
            Self::E5m10(_) => TypeId::E5m10,
            Self::E8m7(_) => TypeId::E8m7,
            Self::E4m3(_) => TypeId::E4m3,
        }
    }

    /// Stored bit pattern, zero-extended.
    pub fn bits(&self) -> u32 {
        match self {
            Self::F32(v) => bits_of(*v),
            Self::E8m23(b) => *b,
            Self::E5m10(v) => v.to_bits() as u32,
            Self::E8m7(v) => v.to_bits() as u32,
            Self::E4m3(v) => v.to_bits() as u32,
        }
    }
}

/// Encode one value as type `id`.
///
/// Q8 has no per-element form and returns [`QuantError::Unsupported`].
pub fn quant_scalar(src: f32, id: TypeId) -> Result<Scalar> {
    match id {
        TypeId::F32 => Ok(Scalar::F32(src)),
        TypeId::E8m23 => Ok(Scalar::E8m23(bits_of(src))),
        TypeId::E5m10 => Ok(Scalar::E5m10(E5m10::from_f32(src))),
        TypeId::E8m7 => Ok(Scalar::E8m7(E8m7::from_f32(src))),
        TypeId::E4m3 => Ok(Scalar::E4m3(E4m3::from_f32(src))),
        TypeId::Q8 => Err(QuantError::Unsupported {
            id,
            op: "quant_scalar",
        }),
    }
}

/// Decode one element back to f32.
pub fn dequant_scalar(src: Scalar) -> f32 {
    match src {
        Scalar::F32(v) => v,
        Scalar::E8m23(b) => f32_of(b),
        Scalar::E5m10(v) => v.to_f32(),
        Scalar::E8m7(v) => v.to_f32(),
        Scalar::E4m3(v) => v.to_f32(),
    }
}

//=============================================================================
// Vectors
//=============================================================================

/// Typed storage for a vector of any element type.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorBuf {
    F32(Vec<f32>),
    E8m23(Vec<u32>),
    E5m10(Vec<E5m10>),
    E8m7(Vec<E8m7>),
    E4m3(Vec<E4m3>),
    Q8(Q8Vector),
}

impl VectorBuf {
    /// Allocate zeroed storage for `len` elements of type `id`.
    ///
    /// `config` is only consulted for Q8, whose length must be a positive
    /// multiple of the block size.
    pub fn new(id: TypeId, len: usize, config: &Q8Config) -> Result<Self> {
        Ok(match id {
            TypeId::F32 => Self::F32(vec![0.0; len]),
            TypeId::E8m23 => Self::E8m23(vec![0; len]),
            TypeId::E5m10 => Self::E5m10(vec![E5m10::ZERO; len]),
            TypeId::E8m7 => Self::E8m7(vec![E8m7::ZERO; len]),
            TypeId::E4m3 => Self::E4m3(vec![E4m3::ZERO; len]),
            TypeId::Q8 => Self::Q8(Q8Vector::new(len, config)?),
        })
    }

    /// Allocate and encode in one step.
    pub fn quantize(src: &[f32], id: TypeId, config: &Q8Config) -> Result<Self> {
        let mut buf = Self::new(id, src.len(), config)?;
        quant_vector(&mut buf, src)?;
        Ok(buf)
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            Self::F32(_) => TypeId::F32,
            Self::E8m23(_) => TypeId::E8m23,
            Self::E5m10(_) => TypeId::E5m10,
            Self::E8m7(_) => TypeId::E8m7,
            Self::E4m3(_) => TypeId::E4m3,
            Self::Q8(_) => TypeId::Q8,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::E8m23(v) => v.len(),
            Self::E5m10(v) => v.len(),
            Self::E8m7(v) => v.len(),
            Self::E4m3(v) => v.len(),
            Self::Q8(q) => q.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage footprint in bytes, including Q8 scales.
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Q8(q) => q.byte_size(),
            _ => self.len() * self.type_id().size(),
        }
    }

    /// Element `i` as a [`Scalar`], for the dense types.
    pub fn get(&self, i: usize) -> Option<Scalar> {
        match self {
            Self::F32(v) => v.get(i).copied().map(Scalar::F32),
            Self::E8m23(v) => v.get(i).copied().map(Scalar::E8m23),
            Self::E5m10(v) => v.get(i).copied().map(Scalar::E5m10),
            Self::E8m7(v) => v.get(i).copied().map(Scalar::E8m7),
            Self::E4m3(v) => v.get(i).copied().map(Scalar::E4m3),
            Self::Q8(_) => None,
        }
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(QuantError::LengthMismatch { expected, actual });
    }
    Ok(())
}

fn encode_slice<T>(dst: &mut [T], src: &[f32], f: impl Fn(f32) -> T) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = f(x);
    }
}

fn decode_slice<T: Copy>(dst: &mut [f32], src: &[T], f: impl Fn(T) -> f32) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = f(x);
    }
}

/// Quantize `src` into `dst` using the type `dst` was allocated with.
///
/// `src.len()` must equal `dst.len()`; nothing is written otherwise.
pub fn quant_vector(dst: &mut VectorBuf, src: &[f32]) -> Result<()> {
    check_len(dst.len(), src.len())?;
    match dst {
        VectorBuf::F32(d) => d.copy_from_slice(src),
        VectorBuf::E8m23(d) => encode_slice(d, src, bits_of),
        VectorBuf::E5m10(d) => encode_slice(d, src, E5m10::from_f32),
        VectorBuf::E8m7(d) => encode_slice(d, src, E8m7::from_f32),
        VectorBuf::E4m3(d) => encode_slice(d, src, E4m3::from_f32),
        VectorBuf::Q8(q) => q.encode(src)?,
    }
    Ok(())
}

/// Dequantize `src` into `dst`, which must have the same length.
pub fn dequant_vector(dst: &mut [f32], src: &VectorBuf) -> Result<()> {
    check_len(src.len(), dst.len())?;
    match src {
        VectorBuf::F32(s) => dst.copy_from_slice(s),
        VectorBuf::E8m23(s) => decode_slice(dst, s, f32_of),
        VectorBuf::E5m10(s) => decode_slice(dst, s, E5m10::to_f32),
        VectorBuf::E8m7(s) => decode_slice(dst, s, E8m7::to_f32),
        VectorBuf::E4m3(s) => decode_slice(dst, s, E4m3::to_f32),
        VectorBuf::Q8(q) => q.decode(dst)?,
    }
    Ok(())
}

//=============================================================================
// Matrices
//=============================================================================

/// Row-major matrix storage for any element type.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixBuf {
    /// Dense types: `rows * cols` elements, row-major
    Dense {
        rows: usize,
        cols: usize,
        data: VectorBuf,
    },
    /// Q8: independently scaled rows
    Q8(Q8Matrix),
}

impl MatrixBuf {
    /// Allocate zeroed `rows x cols` storage of type `id`.
    pub fn new(id: TypeId, rows: usize, cols: usize, config: &Q8Config) -> Result<Self> {
        match id {
            TypeId::Q8 => Ok(Self::Q8(Q8Matrix::new(rows, cols, config)?)),
            _ => Ok(Self::Dense {
                rows,
                cols,
                data: VectorBuf::new(id, shape_len(rows, cols)?, config)?,
            }),
        }
    }

    /// Allocate and encode in one step.
    pub fn quantize(
        src: &[f32],
        id: TypeId,
        rows: usize,
        cols: usize,
        config: &Q8Config,
    ) -> Result<Self> {
        let mut buf = Self::new(id, rows, cols, config)?;
        quant_matrix(&mut buf, src)?;
        Ok(buf)
    }

    /// View dense vector storage as a `rows x cols` matrix.
    pub fn from_dense(rows: usize, cols: usize, data: VectorBuf) -> Result<Self> {
        if let VectorBuf::Q8(_) = data {
            return Err(QuantError::Unsupported {
                id: TypeId::Q8,
                op: "from_dense",
            });
        }
        check_dense_shape(rows, cols, &data)?;
        Ok(Self::Dense { rows, cols, data })
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            Self::Dense { data, .. } => data.type_id(),
            Self::Q8(_) => TypeId::Q8,
        }
    }

    /// Matrix dimensions (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Dense { rows, cols, .. } => (*rows, *cols),
            Self::Q8(m) => m.shape(),
        }
    }

    pub fn len(&self) -> usize {
        let (rows, cols) = self.shape();
        rows.saturating_mul(cols)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_size(&self) -> usize {
        match self {
            Self::Dense { data, .. } => data.byte_size(),
            Self::Q8(m) => m.byte_size(),
        }
    }
}

fn check_dense_shape(rows: usize, cols: usize, data: &VectorBuf) -> Result<()> {
    if data.len() != shape_len(rows, cols)? {
        return Err(QuantError::ShapeMismatch {
            expected_rows: rows,
            expected_cols: cols,
            rows: 1,
            cols: data.len(),
        });
    }
    Ok(())
}

fn encode_rows<T: Send>(dst: &mut [T], src: &[f32], cols: usize, f: impl Fn(f32) -> T + Sync) {
    if cols == 0 {
        return;
    }
    dst.par_chunks_mut(cols)
        .zip(src.par_chunks(cols))
        .for_each(|(out, row)| encode_slice(out, row, &f));
}

fn decode_rows<T: Copy + Sync>(dst: &mut [f32], src: &[T], cols: usize, f: impl Fn(T) -> f32 + Sync) {
    if cols == 0 {
        return;
    }
    dst.par_chunks_mut(cols)
        .zip(src.par_chunks(cols))
        .for_each(|(out, row)| decode_slice(out, row, &f));
}

/// Quantize a row-major matrix of `rows * cols` values into `dst`.
///
/// Rows are processed in parallel; the result is identical to encoding each
/// row with [`quant_vector`].
pub fn quant_matrix(dst: &mut MatrixBuf, src: &[f32]) -> Result<()> {
    match dst {
        MatrixBuf::Q8(m) => m.encode(src),
        MatrixBuf::Dense { rows, cols, data } => {
            let cols = *cols;
            check_dense_shape(*rows, cols, data)?;
            check_len(shape_len(*rows, cols)?, src.len())?;
            match data {
                VectorBuf::F32(d) => d.copy_from_slice(src),
                VectorBuf::E8m23(d) => encode_rows(d, src, cols, bits_of),
                VectorBuf::E5m10(d) => encode_rows(d, src, cols, E5m10::from_f32),
                VectorBuf::E8m7(d) => encode_rows(d, src, cols, E8m7::from_f32),
                VectorBuf::E4m3(d) => encode_rows(d, src, cols, E4m3::from_f32),
                VectorBuf::Q8(_) => {
                    return Err(QuantError::Unsupported {
                        id: TypeId::Q8,
                        op: "dense quant_matrix",
                    })
                }
            }
            Ok(())
        }
    }
}

/// Dequantize a matrix into a row-major buffer of `rows * cols` values.
pub fn dequant_matrix(dst: &mut [f32], src: &MatrixBuf) -> Result<()> {
    match src {
        MatrixBuf::Q8(m) => m.decode(dst),
        MatrixBuf::Dense { rows, cols, data } => {
            let cols = *cols;
            check_dense_shape(*rows, cols, data)?;
            check_len(shape_len(*rows, cols)?, dst.len())?;
            match data {
                VectorBuf::F32(s) => dst.copy_from_slice(s),
                VectorBuf::E8m23(s) => decode_rows(dst, s, cols, f32_of),
                VectorBuf::E5m10(s) => decode_rows(dst, s, cols, E5m10::to_f32),
                VectorBuf::E8m7(s) => decode_rows(dst, s, cols, E8m7::to_f32),
                VectorBuf::E4m3(s) => decode_rows(dst, s, cols, E4m3::to_f32),
                VectorBuf::Q8(_) => {
                    return Err(QuantError::Unsupported {
                        id: TypeId::Q8,
                        op: "dense dequant_matrix",
                    })
                }
            }
            Ok(())
        }
    }
}
