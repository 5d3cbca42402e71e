//! Kernel matrix and gradient tensor construction.
//!
//! Purpose
//! -------
//! Build the batched forms every consumer of a [`Covariance`] kernel needs,
//! written once over the trait so no kernel type reimplements them:
//!
//! - [`build_kernel_matrix`]: the symmetric `K(sampled, sampled)` matrix
//!   (optionally with per-point noise variance on the diagonal) or the
//!   rectangular cross matrix `K(sampled, to_sample)`.
//! - [`build_grad_kernel_tensor`]: spatial gradients, one matrix slice per
//!   differentiated coordinate.
//! - [`build_hyperparameter_grad_kernel_tensor`]: `∂K/∂θ`, one matrix slice
//!   per hyperparameter, consumed by the likelihood gradient.
//!
//! Conventions
//! -----------
//! - Rows index the first point array, columns the second. The symmetric
//!   form is filled upper-triangle-first and mirrored.
//! - Noise variance is legal only on the symmetric form; passing it together
//!   with `to_sample` is rejected with `NoiseWithCrossCovariance`.
use crate::covariance::{
    errors::{CovarianceError, CovarianceResult},
    traits::Covariance,
    validation::{validate_noise_variance, validate_point_dim},
};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2};

fn validate_points<C: Covariance + ?Sized>(
    cov: &C, points: ArrayView2<f64>,
) -> CovarianceResult<()> {
    for row in points.rows() {
        validate_point_dim(row, cov.dim())?;
    }
    Ok(())
}

/// Build a kernel matrix.
///
/// Without `to_sample` the result is the symmetric `n×n` self-covariance of
/// `sampled`, with `noise_variance` (if any) added entrywise to the diagonal.
/// With `to_sample` the result is the rectangular cross matrix whose rows
/// index `sampled` and whose columns index `to_sample`.
///
/// # Errors
/// - [`CovarianceError::DimensionMismatch`] for a point column count that
///   does not match the kernel.
/// - [`CovarianceError::NoiseWithCrossCovariance`] when `noise_variance` is
///   combined with `to_sample`.
/// - [`CovarianceError::NoiseLengthMismatch`] /
///   [`CovarianceError::InvalidNoise`] for a malformed noise vector.
pub fn build_kernel_matrix<C: Covariance + ?Sized>(
    cov: &C, sampled: ArrayView2<f64>, to_sample: Option<ArrayView2<f64>>,
    noise_variance: Option<ArrayView1<f64>>,
) -> CovarianceResult<Array2<f64>> {
    validate_points(cov, sampled)?;
    match to_sample {
        Some(to_sample) => {
            if noise_variance.is_some() {
                return Err(CovarianceError::NoiseWithCrossCovariance);
            }
            validate_points(cov, to_sample)?;
            let mut matrix = Array2::zeros((sampled.nrows(), to_sample.nrows()));
            for (i, xi) in sampled.rows().into_iter().enumerate() {
                for (j, zj) in to_sample.rows().into_iter().enumerate() {
                    matrix[[i, j]] = cov.point_covariance(xi, zj)?;
                }
            }
            Ok(matrix)
        }
        None => {
            let n = sampled.nrows();
            if let Some(noise) = noise_variance {
                validate_noise_variance(noise, n)?;
            }
            let mut matrix = Array2::zeros((n, n));
            for i in 0..n {
                for j in i..n {
                    let value = cov.point_covariance(sampled.row(i), sampled.row(j))?;
                    matrix[[i, j]] = value;
                    matrix[[j, i]] = value;
                }
            }
            if let Some(noise) = noise_variance {
                for i in 0..n {
                    matrix[[i, i]] += noise[i];
                }
            }
            Ok(matrix)
        }
    }
}

/// Build the spatial gradient tensor of the cross matrix.
///
/// `out[[d, i, j]] = ∂k(x_i, z_j)/∂(x_i)_d` where `x` rows come from
/// `sampled` and `z` rows from `to_sample`; `d` runs over
/// [`Covariance::grad_dim`] coordinates.
///
/// # Errors
/// [`CovarianceError::NonDifferentiable`] for a kernel without spatial
/// derivatives, plus the shape errors of [`build_kernel_matrix`].
pub fn build_grad_kernel_tensor<C: Covariance + ?Sized>(
    cov: &C, sampled: ArrayView2<f64>, to_sample: ArrayView2<f64>,
) -> CovarianceResult<Array3<f64>> {
    validate_points(cov, sampled)?;
    validate_points(cov, to_sample)?;
    let mut tensor = Array3::zeros((cov.grad_dim(), sampled.nrows(), to_sample.nrows()));
    for (i, xi) in sampled.rows().into_iter().enumerate() {
        for (j, zj) in to_sample.rows().into_iter().enumerate() {
            let grad = cov.point_grad_covariance(xi, zj)?;
            for d in 0..cov.grad_dim() {
                tensor[[d, i, j]] = grad[d];
            }
        }
    }
    Ok(tensor)
}

/// Build the hyperparameter gradient tensor of the symmetric matrix.
///
/// `out[[p, i, j]] = ∂k(x_i, x_j)/∂θ_p`; each slice is symmetric and is
/// filled upper-triangle-first. Noise is never part of this tensor (the
/// auto-noise derivative is the identity and is appended by the likelihood
/// layer).
///
/// # Errors
/// [`CovarianceError::NonDifferentiable`] for a kernel without derivatives,
/// plus point shape errors.
pub fn build_hyperparameter_grad_kernel_tensor<C: Covariance + ?Sized>(
    cov: &C, sampled: ArrayView2<f64>,
) -> CovarianceResult<Array3<f64>> {
    validate_points(cov, sampled)?;
    let n = sampled.nrows();
    let mut tensor = Array3::zeros((cov.num_hyperparameters(), n, n));
    for i in 0..n {
        for j in i..n {
            let grad = cov.point_hyperparameter_grad_covariance(sampled.row(i), sampled.row(j))?;
            for p in 0..cov.num_hyperparameters() {
                tensor[[p, i, j]] = grad[p];
                tensor[[p, j, i]] = grad[p];
            }
        }
    }
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::{kernel::RadialCovariance, radial::RadialFamily};
    use ndarray::{Array1, array};

    fn kernel() -> RadialCovariance {
        RadialCovariance::new(RadialFamily::MaternFiveHalves, array![1.5, 0.8, 1.2].view())
            .expect("valid hyperparameters")
    }

    fn sampled() -> Array2<f64> {
        array![[0.0, 0.0], [0.5, -0.3], [1.0, 0.7], [-0.2, 0.4]]
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the batched matrix with pointwise evaluation, and
    //   symmetry of the self-covariance form.
    // - The exact diagonal delta introduced by noise variance.
    // - Rejection of noise on the rectangular cross form.
    // - Shapes and finite-difference agreement of the gradient tensors.
    //
    // They intentionally DO NOT cover:
    // - Pointwise kernel math (covariance::kernel tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The symmetric kernel matrix agrees entrywise with point_covariance and
    // is exactly symmetric.
    //
    // Given
    // -----
    // - Four 2-D sampled points, no noise.
    //
    // Expect
    // ------
    // - matrix[[i, j]] == point_covariance(x_i, x_j) and
    //   matrix[[i, j]] == matrix[[j, i]] for all pairs.
    fn symmetric_matrix_matches_pointwise_evaluation() {
        let cov = kernel();
        let points = sampled();
        let matrix = build_kernel_matrix(&cov, points.view(), None, None).unwrap();
        assert_eq!(matrix.dim(), (4, 4));
        for i in 0..4 {
            for j in 0..4 {
                let pointwise =
                    cov.point_covariance(points.row(i), points.row(j)).unwrap();
                assert_eq!(matrix[[i, j]], pointwise);
                assert_eq!(matrix[[i, j]], matrix[[j, i]]);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Noise variance shifts exactly the diagonal, entry by entry, and leaves
    // every off-diagonal entry untouched.
    //
    // Given
    // -----
    // - The same sampled points with and without a distinct-per-point noise
    //   vector.
    //
    // Expect
    // ------
    // - noisy[[i, i]] − clean[[i, i]] == noise[i] exactly; all off-diagonal
    //   entries identical.
    fn noise_shifts_exactly_the_diagonal() {
        let cov = kernel();
        let points = sampled();
        let noise = Array1::from(vec![0.1, 0.0, 0.25, 1e-3]);
        let clean = build_kernel_matrix(&cov, points.view(), None, None).unwrap();
        let noisy =
            build_kernel_matrix(&cov, points.view(), None, Some(noise.view())).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                if i == j {
                    assert_eq!(noisy[[i, i]] - clean[[i, i]], noise[i]);
                } else {
                    assert_eq!(noisy[[i, j]], clean[[i, j]]);
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Noise variance on a rectangular cross matrix is rejected with the
    // dedicated error, and the cross matrix has rows = sampled, columns =
    // to_sample.
    //
    // Given
    // -----
    // - Four sampled points, two prediction points.
    //
    // Expect
    // ------
    // - `Err(NoiseWithCrossCovariance)` when noise accompanies `to_sample`.
    // - Without noise, a 4x2 matrix agreeing with pointwise evaluation.
    fn cross_matrix_rejects_noise_and_orients_rows_by_sampled() {
        let cov = kernel();
        let points = sampled();
        let to_sample = array![[0.1, 0.1], [0.9, -0.5]];
        let noise = Array1::from(vec![0.1; 4]);

        let err = build_kernel_matrix(
            &cov,
            points.view(),
            Some(to_sample.view()),
            Some(noise.view()),
        )
        .expect_err("noise with cross covariance");
        assert_eq!(err, CovarianceError::NoiseWithCrossCovariance);

        let cross =
            build_kernel_matrix(&cov, points.view(), Some(to_sample.view()), None).unwrap();
        assert_eq!(cross.dim(), (4, 2));
        for i in 0..4 {
            for j in 0..2 {
                let pointwise =
                    cov.point_covariance(points.row(i), to_sample.row(j)).unwrap();
                assert_eq!(cross[[i, j]], pointwise);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The spatial gradient tensor stacks point_grad_covariance per
    // coordinate slice in the documented orientation.
    //
    // Given
    // -----
    // - Four sampled points, two prediction points.
    //
    // Expect
    // ------
    // - Shape (2, 4, 2) and entrywise agreement with the pointwise gradient.
    fn grad_tensor_matches_pointwise_gradient() {
        let cov = kernel();
        let points = sampled();
        let to_sample = array![[0.1, 0.1], [0.9, -0.5]];
        let tensor =
            build_grad_kernel_tensor(&cov, points.view(), to_sample.view()).unwrap();
        assert_eq!(tensor.dim(), (2, 4, 2));
        for i in 0..4 {
            for j in 0..2 {
                let grad =
                    cov.point_grad_covariance(points.row(i), to_sample.row(j)).unwrap();
                for d in 0..2 {
                    assert_eq!(tensor[[d, i, j]], grad[d]);
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Each hyperparameter gradient slice is symmetric and matches a central
    // finite difference of the kernel matrix in that hyperparameter.
    //
    // Given
    // -----
    // - Four sampled points, step 1e-6 per hyperparameter.
    //
    // Expect
    // ------
    // - Shape (3, 4, 4); every slice symmetric; |analytic − FD| < 1e-5
    //   entrywise.
    fn hyperparameter_grad_tensor_matches_finite_difference() {
        let cov = kernel();
        let points = sampled();
        let tensor =
            build_hyperparameter_grad_kernel_tensor(&cov, points.view()).unwrap();
        assert_eq!(tensor.dim(), (3, 4, 4));

        let h = 1e-6;
        for p in 0..3 {
            let mut hi = cov.clone();
            let mut lo = cov.clone();
            let mut hp_hi = cov.hyperparameters();
            let mut hp_lo = cov.hyperparameters();
            hp_hi[p] += h;
            hp_lo[p] -= h;
            hi.set_hyperparameters(hp_hi.view()).unwrap();
            lo.set_hyperparameters(hp_lo.view()).unwrap();
            let up = build_kernel_matrix(&hi, points.view(), None, None).unwrap();
            let down = build_kernel_matrix(&lo, points.view(), None, None).unwrap();
            for i in 0..4 {
                for j in 0..4 {
                    assert_eq!(tensor[[p, i, j]], tensor[[p, j, i]]);
                    let fd = (up[[i, j]] - down[[i, j]]) / (2.0 * h);
                    assert!(
                        (tensor[[p, i, j]] - fd).abs() < 1e-5,
                        "hp {p} entry ({i}, {j}): analytic {}, fd {fd}",
                        tensor[[p, i, j]]
                    );
                }
            }
        }
    }
}
