//! Microscale - reduced-precision float codecs and blockwise Q8 quantization.
//!
//! Converts f32 data into compact storage types and back, and quantizes
//! blocks of values to int8 with a shared power-of-two scale.
//!
//! # Element Types
//! - `f32`: passthrough copy (4 bytes)
//! - `e8m23`: f32 bit pattern as `u32`, lossless (4 bytes)
//! - `e5m10`: IEEE half, 1/5/10 (2 bytes)
//! - `e8m7`: brain float, 1/8/7 (2 bytes)
//! - `e4m3`: micro float, 1/4/3, max finite 240 (1 byte)
//! - `q8`: int8 in `[-127, 127]` plus one exponent per block (1 byte + 1 per block)
//!
//! Scalar encoders truncate the mantissa; values past the largest exponent
//! become signed infinity and values below the smallest flush toward zero.
//!
//! # Usage
//! ```ignore
//! use microscale::{quant_vector, dequant_vector, Q8Config, TypeId, VectorBuf};
//!
//! let data = vec![0.25f32; 64];
//! let config = Q8Config::default();
//!
//! let mut q = VectorBuf::new(TypeId::Q8, data.len(), &config)?;
//! quant_vector(&mut q, &data)?;
//!
//! let mut out = vec![0.0; data.len()];
//! dequant_vector(&mut out, &q)?;
//! ```

pub mod error;
pub mod q8;
pub mod quant;
pub mod scalar;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{QuantError, Result};
pub use q8::{Q8Config, Q8Matrix, Q8Vector, DEFAULT_BLOCK_SIZE};
pub use quant::{
    dequant_bytes, dequant_matrix, dequant_scalar, dequant_vector, quant_bytes, quant_matrix,
    quant_scalar, quant_vector, MatrixBuf, Scalar, VectorBuf,
};
pub use scalar::{bits_of, f32_of, E4m3, E5m10, E8m7};
pub use stats::ErrorStats;
pub use types::{type_metadata, TypeId, TypeInfo};
