//! Reconstruction error between an original slice and its round trip.

use serde::Serialize;

use crate::error::{QuantError, Result};

/// Summary of element-wise absolute and relative error.
///
/// Pairs whose error is not finite (NaN inputs, overflow to infinity) are
/// excluded from the aggregates and counted in `non_finite`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ErrorStats {
    /// Number of finite pairs aggregated
    pub count: usize,
    /// Pairs left out of the aggregates
    pub non_finite: usize,
    pub max_abs: f32,
    pub mean_abs: f32,
    pub rmse: f32,
    /// Largest `|x - y| / |x|` over non-zero originals
    pub max_rel: f32,
}

impl ErrorStats {
    /// Compare `original` with `reconstructed` element by element.
    pub fn between(original: &[f32], reconstructed: &[f32]) -> Result<Self> {
        if original.len() != reconstructed.len() {
            return Err(QuantError::LengthMismatch {
                expected: original.len(),
                actual: reconstructed.len(),
            });
        }

        let mut stats = Self::default();
        let mut sum_abs = 0.0f64;
        let mut sum_sq = 0.0f64;

        for (&x, &y) in original.iter().zip(reconstructed) {
            let err = (x - y).abs();
            if !err.is_finite() {
                stats.non_finite += 1;
                continue;
            }
            stats.count += 1;
            stats.max_abs = stats.max_abs.max(err);
            if x != 0.0 {
                stats.max_rel = stats.max_rel.max(err / x.abs());
            }
            sum_abs += err as f64;
            sum_sq += (err as f64) * (err as f64);
        }

        if stats.count > 0 {
            let n = stats.count as f64;
            stats.mean_abs = (sum_abs / n) as f32;
            stats.rmse = (sum_sq / n).sqrt() as f32;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_roundtrip_is_zero() {
        let v = [1.0f32, -2.0, 0.0, 3.5];
        let s = ErrorStats::between(&v, &v).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.max_abs, 0.0);
        assert_eq!(s.mean_abs, 0.0);
        assert_eq!(s.rmse, 0.0);
    }

    #[test]
    fn test_aggregates() {
        let s = ErrorStats::between(&[1.0, 2.0, 4.0, 0.0], &[1.5, 2.0, 3.0, 0.5]).unwrap();
        assert_eq!(s.max_abs, 1.0);
        assert_eq!(s.mean_abs, 0.5);
        assert_eq!(s.max_rel, 0.5);
        assert!((s.rmse - (1.5f32 / 4.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_pairs_excluded() {
        let s = ErrorStats::between(&[1.0, 1.0e6, f32::NAN], &[1.0, f32::INFINITY, 0.0]).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.non_finite, 2);
        assert_eq!(s.max_abs, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ErrorStats::between(&[1.0], &[]).is_err());
        assert_eq!(ErrorStats::between(&[], &[]).unwrap().count, 0);
    }
}
