//! Tests for the Q8 block quantizer.

use super::*;

fn ramp(len: usize, scale: f32) -> Vec<f32> {
    (0..len)
        .map(|i| ((i as f32 * 0.37).sin()) * scale)
        .collect()
}

// ==================== helpers ====================

#[test]
fn test_ilogb() {
    assert_eq!(ilogb(1.0), 0);
    assert_eq!(ilogb(4.0), 2);
    assert_eq!(ilogb(-4.0), 2);
    assert_eq!(ilogb(7.99), 2);
    assert_eq!(ilogb(0.5), -1);
    assert_eq!(ilogb(f32::from_bits(1)), -149);
    assert_eq!(ilogb(f32::from_bits(0x0040_0000)), -127);
    assert_eq!(ilogb(0.0), i32::MIN);
    assert_eq!(ilogb(f32::INFINITY), i32::MAX);
}

#[test]
fn test_exp2i_exact() {
    assert_eq!(exp2i(0), 1.0);
    assert_eq!(exp2i(-7), 1.0 / 128.0);
    assert_eq!(exp2i(8), 256.0);
}

#[test]
fn test_block_exponent_clamps() {
    assert_eq!(block_exponent(0.0), 0);
    assert_eq!(block_exponent(1.0), -7);
    assert_eq!(block_exponent(100.0), -1); // ilogb(100) = 6
    assert_eq!(block_exponent(1.0e-6), -7);
    assert_eq!(block_exponent(1.0e9), 8);
    assert_eq!(block_exponent(f32::INFINITY), 8);
}

#[test]
fn test_quantize_element_rounding() {
    assert_eq!(quantize_element(2.5, 1.0), 2); // ties to even
    assert_eq!(quantize_element(3.5, 1.0), 4);
    assert_eq!(quantize_element(-2.5, 1.0), -2);
    assert_eq!(quantize_element(500.0, 1.0), 127);
    assert_eq!(quantize_element(-500.0, 1.0), -127);
    assert_eq!(quantize_element(f32::NAN, 1.0), 0);
    assert_eq!(quantize_element(f32::NEG_INFINITY, 1.0), -127);
}

#[test]
fn test_block_count() {
    assert_eq!(block_count(64, 32), 2);
    assert_eq!(block_count(31, 32), 0);
    assert_eq!(Q8Config::default().block_count(96), 3);
}

// ==================== config ====================

#[test]
fn test_config_default_and_validation() {
    assert_eq!(Q8Config::default().block_size, DEFAULT_BLOCK_SIZE);
    assert!(Q8Config::new(0).validate().is_err());
    assert!(Q8Config::new(16).check_len(48).is_ok());
    assert_eq!(
        Q8Config::new(16).check_len(40),
        Err(QuantError::BlockMisaligned {
            len: 40,
            block_size: 16
        })
    );
    assert!(Q8Config::default().check_len(0).is_err());
}

#[test]
fn test_config_serde_defaults() {
    let config: Q8Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Q8Config::default());

    let config: Q8Config = serde_json::from_str(r#"{"block_size": 64}"#).unwrap();
    assert_eq!(config.block_size, 64);
}

// ==================== vector ====================

#[test]
fn test_all_zero_block() {
    let src = vec![0.0f32; 32];
    let q = Q8Vector::quantize(&src, &Q8Config::default()).unwrap();

    assert_eq!(q.scales(), &[0]);
    assert!(q.values().iter().all(|&v| v == 0));
    assert!(q.dequantize().iter().all(|&v| v == 0.0));
}

#[test]
fn test_ones_block_saturates() {
    let src = vec![1.0f32; 32];
    let q = Q8Vector::quantize(&src, &Q8Config::default()).unwrap();

    assert_eq!(q.scales(), &[-7]);
    assert!(q.values().iter().all(|&v| v == 127));

    let decoded = q.dequantize();
    for &y in &decoded {
        assert_eq!(y, 0.9921875);
        assert_eq!(1.0 - y, 0.0078125);
    }
}

#[test]
fn test_never_produces_minus_128() {
    let mut src = vec![-1.0f32; 32];
    src[3] = -1.0e6;
    let q = Q8Vector::quantize(&src, &Q8Config::default()).unwrap();
    assert!(q.values().iter().all(|&v| v >= -127));
    assert_eq!(q.scales(), &[8]);
}

#[test]
fn test_vector_roundtrip_error_bounded_by_scale() {
    let src = ramp(128, 5.0);
    let q = Q8Vector::quantize(&src, &Q8Config::default()).unwrap();
    let decoded = q.dequantize();

    for (i, (&x, &y)) in src.iter().zip(&decoded).enumerate() {
        let half_step = q.scale_of(i) * 0.5;
        assert!(
            (x - y).abs() <= half_step + 1e-6 || (y.abs() == 127.0 * q.scale_of(i)),
            "element {i}: x={x}, y={y}, step={}",
            q.scale_of(i)
        );
    }
}

#[test]
fn test_blocks_are_scaled_independently() {
    let mut src = vec![0.01f32; 64];
    src[32..].fill(50.0);
    let q = Q8Vector::quantize(&src, &Q8Config::default()).unwrap();

    assert_eq!(q.num_blocks(), 2);
    assert_eq!(q.scales()[0], -7);
    assert_eq!(q.scales()[1], -2); // ilogb(50) = 5
    assert_eq!(q.block(31), 0);
    assert_eq!(q.block(32), 1);
}

#[test]
fn test_custom_block_size() {
    let config = Q8Config::new(8);
    let src = ramp(24, 2.0);
    let q = Q8Vector::quantize(&src, &config).unwrap();

    assert_eq!(q.num_blocks(), 3);
    assert_eq!(q.block_size(), 8);
    assert_eq!(q.byte_size(), 27);
}

#[test]
fn test_misaligned_length_rejected_before_work() {
    let config = Q8Config::default();
    assert_eq!(
        Q8Vector::new(48, &config).unwrap_err(),
        QuantError::BlockMisaligned {
            len: 48,
            block_size: 32
        }
    );
    assert!(Q8Vector::quantize(&[1.0; 16], &config).is_err());
    assert!(Q8Vector::new(0, &config).is_err());
}

#[test]
fn test_encode_length_mismatch_leaves_dst_untouched() {
    let config = Q8Config::default();
    let mut q = Q8Vector::quantize(&[1.0; 32], &config).unwrap();
    let before = q.clone();

    let err = q.encode(&[2.0; 64]).unwrap_err();
    assert_eq!(
        err,
        QuantError::LengthMismatch {
            expected: 32,
            actual: 64
        }
    );
    assert_eq!(q, before);

    let mut out = [0.0f32; 16];
    assert!(q.decode(&mut out).is_err());
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn test_special_values_in_block() {
    let mut src = vec![1.0f32; 32];
    src[0] = f32::NAN;
    src[1] = f32::INFINITY;
    let q = Q8Vector::quantize(&src, &Q8Config::default()).unwrap();

    assert_eq!(q.scales(), &[8]);
    assert_eq!(q.values()[0], 0);
    assert_eq!(q.values()[1], 127);
    // 1.0 / 256 rounds to zero
    assert_eq!(q.values()[2], 0);
}

#[test]
fn test_nan_only_block_is_zero() {
    let src = vec![f32::NAN; 32];
    let q = Q8Vector::quantize(&src, &Q8Config::default()).unwrap();
    assert_eq!(q.scales(), &[0]);
    assert!(q.values().iter().all(|&v| v == 0));
}

#[test]
fn test_from_parts_validation() {
    let q = Q8Vector::from_parts(vec![1; 32], vec![-3], 32).unwrap();
    assert_eq!(q.dequantize()[0], 0.125);

    assert!(matches!(
        Q8Vector::from_parts(vec![1; 32], vec![0, 0], 32),
        Err(QuantError::LengthMismatch { expected: 1, actual: 2 })
    ));
    assert!(matches!(
        Q8Vector::from_parts(vec![1; 32], vec![9], 32),
        Err(QuantError::ScaleOutOfRange { block: 0, exponent: 9, .. })
    ));
    assert!(Q8Vector::from_parts(vec![1; 30], vec![0], 32).is_err());

    let (values, scales) = q.into_parts();
    assert_eq!(values.len(), 32);
    assert_eq!(scales, vec![-3]);
}

// ==================== matrix ====================

#[test]
fn test_matrix_row_independence() {
    let cols = 32;
    let mut src = vec![1.0f32; cols];
    src.extend(std::iter::repeat(100.0f32).take(cols));

    let m = Q8Matrix::quantize(&src, 2, cols, &Q8Config::default()).unwrap();
    let row0 = m.row(0).unwrap();
    let row1 = m.row(1).unwrap();

    assert_ne!(row0.scales(), row1.scales());
    assert_eq!(row0.scales(), &[-7]);
    assert_eq!(row1.scales(), &[-1]);

    // Both rows saturate at 127 * 2^w
    let decoded = m.dequantize();
    assert!(decoded[..cols].iter().all(|&v| v == 0.9921875));
    assert!(decoded[cols..].iter().all(|&v| v == 63.5));
}

#[test]
fn test_matrix_equals_per_row_vector() {
    let (rows, cols) = (5, 64);
    let src: Vec<f32> = (0..rows * cols)
        .map(|i| ((i as f32) * 0.13).cos() * (1 + i / cols) as f32 * 3.0)
        .collect();
    let config = Q8Config::default();

    let m = Q8Matrix::quantize(&src, rows, cols, &config).unwrap();
    for r in 0..rows {
        let expected = Q8Vector::quantize(&src[r * cols..(r + 1) * cols], &config).unwrap();
        assert_eq!(m.row(r).unwrap(), &expected, "row {r}");
    }

    let mut decoded = vec![0.0f32; rows * cols];
    m.decode(&mut decoded).unwrap();
    assert_eq!(decoded, m.dequantize());
}

#[test]
fn test_matrix_shape_checks() {
    let config = Q8Config::default();
    assert!(Q8Matrix::new(2, 40, &config).is_err());

    let mut m = Q8Matrix::new(2, 32, &config).unwrap();
    assert_eq!(m.shape(), (2, 32));
    assert_eq!(m.byte_size(), 2 * (32 + 1));
    assert!(matches!(
        m.encode(&[0.0; 32]),
        Err(QuantError::LengthMismatch { expected: 64, actual: 32 })
    ));
}

#[test]
fn test_matrix_from_rows() {
    let config = Q8Config::default();
    let a = Q8Vector::quantize(&[1.0; 32], &config).unwrap();
    let b = Q8Vector::quantize(&[2.0; 32], &config).unwrap();
    let m = Q8Matrix::from_rows(vec![a.clone(), b]).unwrap();
    assert_eq!(m.shape(), (2, 32));

    let wide = Q8Vector::quantize(&[1.0; 64], &config).unwrap();
    assert!(Q8Matrix::from_rows(vec![a, wide]).is_err());
    assert!(Q8Matrix::from_rows(Vec::new()).is_err());
}

#[test]
fn test_matrix_from_rows_with_cols() {
    let config = Q8Config::default();
    let empty = Q8Matrix::from_rows_with_cols(Vec::new(), 32).unwrap();
    assert_eq!(empty, Q8Matrix::new(0, 32, &config).unwrap());
    assert_eq!(empty.shape(), (0, 32));
    assert!(empty.dequantize().is_empty());

    let a = Q8Vector::quantize(&[1.0; 32], &config).unwrap();
    let m = Q8Matrix::from_rows_with_cols(vec![a.clone()], 32).unwrap();
    assert_eq!(m, Q8Matrix::from_rows(vec![a.clone()]).unwrap());

    assert!(matches!(
        Q8Matrix::from_rows_with_cols(vec![a.clone()], 64),
        Err(QuantError::LengthMismatch { expected: 64, actual: 32 })
    ));
    let halves = Q8Vector::quantize(&[1.0; 32], &Q8Config::new(16)).unwrap();
    assert!(Q8Matrix::from_rows_with_cols(vec![a, halves], 32).is_err());
    assert!(Q8Matrix::from_rows_with_cols(Vec::new(), 0).is_err());
}

#[test]
fn test_matrix_shape_overflow() {
    assert_eq!(
        Q8Matrix::new(usize::MAX, 32, &Q8Config::default()),
        Err(QuantError::ShapeOverflow { rows: usize::MAX, cols: 32 })
    );
}

#[test]
fn test_matrix_zero_rows() {
    let mut m = Q8Matrix::new(0, 32, &Q8Config::default()).unwrap();
    assert!(m.encode(&[]).is_ok());
    assert!(m.dequantize().is_empty());
}
