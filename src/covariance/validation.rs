//! Validation helpers for the covariance layer.
//!
//! Centralizes the consistency checks shared by every kernel type:
//!
//! - **Hyperparameter validation**: [`validate_hyperparameters`] enforces the
//!   invariant that every entry is finite and strictly positive. Violations
//!   surface as [`CovarianceError::HyperparameterInvalid`], never as a shape
//!   error and never via clamping.
//! - **Point checks**: [`validate_point_dim`] and [`validate_paired_shapes`]
//!   enforce matching dimensions for pointwise and row-paired evaluation.
//! - **Noise checks**: [`validate_noise_variance`] enforces length and
//!   non-negativity of the per-point noise vector added to a symmetric
//!   kernel matrix diagonal.
use crate::covariance::errors::{CovarianceError, CovarianceResult};
use ndarray::{ArrayView1, ArrayView2};

/// Validate a hyperparameter vector: expected length, every entry finite and
/// strictly positive.
///
/// # Errors
/// - [`CovarianceError::HyperparameterLengthMismatch`] if the length differs
///   from `expected_len`.
/// - [`CovarianceError::HyperparameterInvalid`] with the index and value of
///   the first offending entry.
pub fn validate_hyperparameters(
    hyperparameters: ArrayView1<f64>, expected_len: usize,
) -> CovarianceResult<()> {
    if hyperparameters.len() != expected_len {
        return Err(CovarianceError::HyperparameterLengthMismatch {
            expected: expected_len,
            actual: hyperparameters.len(),
        });
    }
    for (index, &value) in hyperparameters.iter().enumerate() {
        if !value.is_finite() {
            return Err(CovarianceError::HyperparameterInvalid {
                index,
                value,
                reason: "Hyperparameters must be finite.",
            });
        }
        if value <= 0.0 {
            return Err(CovarianceError::HyperparameterInvalid {
                index,
                value,
                reason: "Hyperparameters must be strictly positive.",
            });
        }
    }
    Ok(())
}

/// Validate that a point carries `expected` coordinates.
///
/// # Errors
/// Returns [`CovarianceError::DimensionMismatch`] naming both dimensions.
pub fn validate_point_dim(point: ArrayView1<f64>, expected: usize) -> CovarianceResult<()> {
    if point.len() != expected {
        return Err(CovarianceError::DimensionMismatch { expected, actual: point.len() });
    }
    Ok(())
}

/// Validate two point arrays for paired row-wise evaluation: identical shape
/// and a column count matching the kernel dimension.
///
/// # Errors
/// - [`CovarianceError::ShapeMismatch`] naming both shapes when they differ.
/// - [`CovarianceError::DimensionMismatch`] when the shared column count does
///   not match `dim`.
pub fn validate_paired_shapes(
    x: ArrayView2<f64>, z: ArrayView2<f64>, dim: usize,
) -> CovarianceResult<()> {
    if x.dim() != z.dim() {
        return Err(CovarianceError::ShapeMismatch { left: x.dim(), right: z.dim() });
    }
    if x.ncols() != dim {
        return Err(CovarianceError::DimensionMismatch { expected: dim, actual: x.ncols() });
    }
    Ok(())
}

/// Validate a per-point noise variance vector against the sampled-point count.
///
/// # Errors
/// - [`CovarianceError::NoiseLengthMismatch`] if the length differs from
///   `num_sampled`.
/// - [`CovarianceError::InvalidNoise`] if any entry is NaN, infinite, or
///   negative (zero noise is legal).
pub fn validate_noise_variance(
    noise_variance: ArrayView1<f64>, num_sampled: usize,
) -> CovarianceResult<()> {
    if noise_variance.len() != num_sampled {
        return Err(CovarianceError::NoiseLengthMismatch {
            expected: num_sampled,
            actual: noise_variance.len(),
        });
    }
    for (index, &value) in noise_variance.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(CovarianceError::InvalidNoise { index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Acceptance of valid hyperparameter vectors and rejection of every
    //   invalid entry class (zero, negative, NaN, Inf) with the dedicated
    //   HyperparameterInvalid variant.
    // - Shape and dimension checks for points and paired arrays.
    // - Noise variance length and entry validation.
    //
    // They intentionally DO NOT cover:
    // - Kernel evaluation semantics (covered in kernel/matrix tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Valid hyperparameter vectors of the expected length pass validation.
    //
    // Given
    // -----
    // - A vector of strictly positive, finite entries.
    //
    // Expect
    // ------
    // - `validate_hyperparameters` returns `Ok(())`.
    fn validate_hyperparameters_accepts_positive_finite_entries() {
        let hp = array![2.0, 0.5, 1e-8];
        assert!(validate_hyperparameters(hp.view(), 3).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Every class of invalid entry (0, negative, NaN, Inf) is rejected with
    // `HyperparameterInvalid`, never with a different error type.
    //
    // Given
    // -----
    // - Vectors each containing exactly one invalid entry.
    //
    // Expect
    // ------
    // - `Err(CovarianceError::HyperparameterInvalid { .. })` in every case,
    //   reporting the offending index.
    fn validate_hyperparameters_rejects_each_invalid_entry_class() {
        let cases = [
            array![1.0, 0.0],
            array![-0.5, 1.0],
            array![1.0, f64::NAN],
            array![f64::INFINITY, 1.0],
        ];
        for hp in cases {
            let err = validate_hyperparameters(hp.view(), 2)
                .expect_err("invalid entry should be rejected");
            match err {
                CovarianceError::HyperparameterInvalid { .. } => {}
                other => panic!("Expected HyperparameterInvalid, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // A wrong-length hyperparameter vector is a length error, not a value
    // error.
    //
    // Given
    // -----
    // - A valid 2-entry vector validated against an expected length of 3.
    //
    // Expect
    // ------
    // - `Err(HyperparameterLengthMismatch { expected: 3, actual: 2 })`.
    fn validate_hyperparameters_rejects_wrong_length() {
        let hp = array![1.0, 1.0];
        let err = validate_hyperparameters(hp.view(), 3).expect_err("length mismatch");
        assert_eq!(err, CovarianceError::HyperparameterLengthMismatch { expected: 3, actual: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Paired arrays with differing shapes are rejected with both shapes in
    // the error.
    //
    // Given
    // -----
    // - A 2x2 and a 3x2 point array.
    //
    // Expect
    // ------
    // - `Err(ShapeMismatch { left: (2, 2), right: (3, 2) })`.
    fn validate_paired_shapes_names_both_shapes() {
        let x = Array2::<f64>::zeros((2, 2));
        let z = Array2::<f64>::zeros((3, 2));
        let err = validate_paired_shapes(x.view(), z.view(), 2).expect_err("shape mismatch");
        assert_eq!(err, CovarianceError::ShapeMismatch { left: (2, 2), right: (3, 2) });
    }

    #[test]
    // Purpose
    // -------
    // Noise variance entries must be finite and non-negative; zero is legal.
    //
    // Given
    // -----
    // - A valid noise vector containing a zero, and an invalid one
    //   containing a negative entry.
    //
    // Expect
    // ------
    // - The zero-containing vector passes; the negative entry is rejected
    //   with `InvalidNoise` at its index.
    fn validate_noise_variance_allows_zero_rejects_negative() {
        let ok = Array1::from(vec![0.0, 1e-3]);
        assert!(validate_noise_variance(ok.view(), 2).is_ok());

        let bad = Array1::from(vec![1e-3, -1.0]);
        let err = validate_noise_variance(bad.view(), 2).expect_err("negative noise");
        assert_eq!(err, CovarianceError::InvalidNoise { index: 1, value: -1.0 });
    }
}
