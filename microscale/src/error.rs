//! Error types for codec dispatch and block quantization.

use thiserror::Error;

use crate::types::TypeId;

/// Result type alias for microscale operations.
pub type Result<T> = std::result::Result<T, QuantError>;

/// Failures reported by the dispatch layer and the Q8 block quantizer.
///
/// Every check runs before the first element is written, so an `Err` always
/// leaves the destination buffer untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantError {
    /// Raw type identifier outside the closed set of element types
    #[error("Unsupported type id: {0}")]
    UnsupportedType(u8),

    /// The type exists but the requested operation is not defined for it
    #[error("Operation `{op}` is not supported for type {id}")]
    Unsupported { id: TypeId, op: &'static str },

    /// Q8 length is zero or not a multiple of the block size
    #[error("Length {len} must be a positive multiple of block size {block_size}")]
    BlockMisaligned { len: usize, block_size: usize },

    /// Source and destination slices disagree in length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Matrix dimensions disagree with the buffer they are applied to
    #[error("Shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// `rows * cols` does not fit in `usize`
    #[error("Shape {rows}x{cols} overflows the addressable element count")]
    ShapeOverflow { rows: usize, cols: usize },

    /// Stored block exponent outside the range the encoder can produce
    #[error("Block {block} scale exponent {exponent} outside [{min}, {max}]")]
    ScaleOutOfRange {
        block: usize,
        exponent: i8,
        min: i32,
        max: i32,
    },

    /// Invalid quantizer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Element count of a `rows x cols` matrix.
pub(crate) fn shape_len(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or(QuantError::ShapeOverflow { rows, cols })
}
