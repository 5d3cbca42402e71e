//! Fitted Gaussian-process state.
//!
//! Purpose
//! -------
//! Hold everything derived from one (kernel hyperparameters, historical
//! data) pair that the likelihood and its gradient reuse: the noisy kernel
//! matrix, its Cholesky factor, the projected observations `α = K⁻¹ỹ`, and
//! the GLS pieces of an optional polynomial prior mean. The state also
//! exposes the posterior `mean`/`variance` of the fitted GP at new points.
//!
//! Key behaviors
//! -------------
//! - The state is rebuilt wholesale whenever hyperparameters change; no
//!   field is patched incrementally.
//! - All linear algebra goes through the stored Cholesky factor; no
//!   explicit matrix inverse is formed. `ndarray` matrices are copied into
//!   `nalgebra::DMatrix` for factorization (`fill_dmatrix`).
//! - With mean indices, the prior mean is `Hβ` with
//!   `β = (HᵀK⁻¹H)⁻¹ HᵀK⁻¹y` solved via two Cholesky factorizations; the
//!   observations are demeaned before projection.
//!
//! Invariants & assumptions
//! ------------------------
//! - An indefinite kernel matrix surfaces as [`GpError::CholeskyFailure`]
//!   and is never caught at this layer; only the multistart optimizer may
//!   treat it as recoverable.
use crate::covariance::{matrix::build_kernel_matrix, traits::Covariance};
use crate::gp::{
    errors::{GpError, GpResult},
    historical::HistoricalData,
};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Copy an `ndarray` matrix into a freshly allocated `nalgebra` matrix.
pub(crate) fn fill_dmatrix(src: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = src.dim();
    let mut out = DMatrix::<f64>::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            out[(i, j)] = src[[i, j]];
        }
    }
    out
}

fn fill_dvector(src: ArrayView1<f64>) -> DVector<f64> {
    DVector::from_iterator(src.len(), src.iter().copied())
}

fn array_from_dvector(src: &DVector<f64>) -> Array1<f64> {
    Array1::from_iter(src.iter().copied())
}

/// GLS polynomial-mean pieces kept for the likelihood gradient correction.
#[derive(Debug, Clone)]
struct MeanModel {
    /// Coordinate indices spanning the linear basis columns.
    indices: Vec<usize>,
    /// GLS coefficients `β`, intercept first.
    beta: Array1<f64>,
    /// `F = K⁻¹H`, one column per basis function.
    kinv_basis: DMatrix<f64>,
    /// Cholesky factor of the normal matrix `A = HᵀK⁻¹H`.
    normal: Cholesky<f64, Dyn>,
}

/// State of a GP conditioned on historical data at fixed hyperparameters.
#[derive(Debug, Clone)]
pub struct GpState {
    points: Array2<f64>,
    cholesky: Cholesky<f64, Dyn>,
    /// `Σ log diag(L)` with `K = LLᵀ`, accumulated once at build time.
    sum_log_diag_chol: f64,
    /// Observations minus the fitted prior mean (the observations
    /// themselves under a zero mean).
    demeaned: Array1<f64>,
    /// `α = K⁻¹ỹ`.
    alpha: Array1<f64>,
    mean: Option<MeanModel>,
}

impl GpState {
    /// Fit the state: build the noisy kernel matrix, factor it, fit the
    /// optional polynomial mean, and project the observations.
    ///
    /// `extra_noise` is the auto-noise hyperparameter value, added to every
    /// diagonal entry on top of the per-observation measurement noise.
    ///
    /// # Errors
    /// - [`GpError::InvalidMeanIndex`] for a basis index outside the data
    ///   dimension.
    /// - [`GpError::CholeskyFailure`] for an indefinite kernel matrix.
    /// - [`GpError::MeanBasisSingular`] for a rank-deficient basis.
    pub fn new<C: Covariance + ?Sized>(
        cov: &C, data: &HistoricalData, mean_indices: Option<&[usize]>,
        extra_noise: Option<f64>,
    ) -> GpResult<GpState> {
        let n = data.num_sampled();
        let mut kernel_matrix = build_kernel_matrix(
            cov,
            data.points(),
            None,
            Some(data.noise_variance()),
        )?;
        if let Some(noise) = extra_noise {
            for i in 0..n {
                kernel_matrix[[i, i]] += noise;
            }
        }

        let cholesky = Cholesky::new(fill_dmatrix(&kernel_matrix))
            .ok_or(GpError::CholeskyFailure { size: n })?;
        let sum_log_diag_chol = (0..n).map(|i| cholesky.l_dirty()[(i, i)].ln()).sum();

        let values = fill_dvector(data.values());
        let (mean, demeaned) = match mean_indices {
            Some(indices) => {
                let model = Self::fit_mean(&cholesky, data, indices)?;
                let basis = polynomial_basis(data.points(), &model.indices)?;
                let fitted = fill_dmatrix(&basis) * fill_dvector(model.beta.view());
                let demeaned = array_from_dvector(&(&values - &fitted));
                (Some(model), demeaned)
            }
            None => (None, array_from_dvector(&values)),
        };

        let alpha = array_from_dvector(&cholesky.solve(&fill_dvector(demeaned.view())));
        Ok(GpState {
            points: data.points().to_owned(),
            cholesky,
            sum_log_diag_chol,
            demeaned,
            alpha,
            mean,
        })
    }

    fn fit_mean(
        cholesky: &Cholesky<f64, Dyn>, data: &HistoricalData, indices: &[usize],
    ) -> GpResult<MeanModel> {
        let basis = polynomial_basis(data.points(), indices)?;
        let basis_nalg = fill_dmatrix(&basis);
        let kinv_basis = cholesky.solve(&basis_nalg);
        let normal_matrix = basis_nalg.transpose() * &kinv_basis;
        let size = normal_matrix.nrows();
        let normal =
            Cholesky::new(normal_matrix).ok_or(GpError::MeanBasisSingular { size })?;
        let rhs = kinv_basis.transpose() * fill_dvector(data.values());
        let beta = array_from_dvector(&normal.solve(&rhs));
        Ok(MeanModel { indices: indices.to_vec(), beta, kinv_basis, normal })
    }

    /// `K⁻¹ rhs` through the stored factor.
    pub fn solve(&self, rhs: ArrayView1<f64>) -> Array1<f64> {
        array_from_dvector(&self.cholesky.solve(&fill_dvector(rhs)))
    }

    /// `trace(K⁻¹ M)` through one matrix Cholesky solve.
    pub fn solve_trace(&self, matrix: &Array2<f64>) -> f64 {
        let solved = self.cholesky.solve(&fill_dmatrix(matrix));
        (0..solved.nrows()).map(|i| solved[(i, i)]).sum()
    }

    /// `trace(A⁻¹ Fᵀ M F)` for the mean-gradient correction, `None` under a
    /// zero prior mean.
    pub fn mean_correction_trace(&self, matrix: &Array2<f64>) -> Option<f64> {
        let model = self.mean.as_ref()?;
        let projected =
            model.kinv_basis.transpose() * fill_dmatrix(matrix) * &model.kinv_basis;
        let solved = model.normal.solve(&projected);
        Some((0..solved.nrows()).map(|i| solved[(i, i)]).sum())
    }

    /// Observations minus the fitted prior mean.
    pub fn demeaned(&self) -> ArrayView1<f64> {
        self.demeaned.view()
    }

    /// `α = K⁻¹ỹ`.
    pub fn alpha(&self) -> ArrayView1<f64> {
        self.alpha.view()
    }

    /// `Σ log diag(L)`; twice this is `log det K`.
    pub fn sum_log_diag_chol(&self) -> f64 {
        self.sum_log_diag_chol
    }

    /// Fitted GLS coefficients, intercept first (`None` under a zero mean).
    pub fn mean_coefficients(&self) -> Option<ArrayView1<f64>> {
        self.mean.as_ref().map(|m| m.beta.view())
    }

    /// Prior mean evaluated at arbitrary points (zero under a zero mean).
    fn prior_mean(&self, points: ArrayView2<f64>) -> GpResult<Array1<f64>> {
        match &self.mean {
            Some(model) => {
                let basis = polynomial_basis(points, &model.indices)?;
                let fitted = fill_dmatrix(&basis) * fill_dvector(model.beta.view());
                Ok(array_from_dvector(&fitted))
            }
            None => Ok(Array1::zeros(points.nrows())),
        }
    }

    /// Posterior mean of the fitted GP at `to_sample`.
    ///
    /// `m(x_*) = prior(x_*) + K(x_*, X) α`.
    pub fn mean<C: Covariance + ?Sized>(
        &self, cov: &C, to_sample: ArrayView2<f64>,
    ) -> GpResult<Array1<f64>> {
        let cross =
            build_kernel_matrix(cov, self.points.view(), Some(to_sample), None)?;
        let mut mean = self.prior_mean(to_sample)?;
        for j in 0..to_sample.nrows() {
            let mut acc = 0.0;
            for i in 0..self.points.nrows() {
                acc += cross[[i, j]] * self.alpha[i];
            }
            mean[j] += acc;
        }
        Ok(mean)
    }

    /// Posterior variance of the fitted GP at `to_sample`.
    ///
    /// `v(x_*) = k(x_*, x_*) − k_*ᵀ K⁻¹ k_*`, one Cholesky solve per point.
    pub fn variance<C: Covariance + ?Sized>(
        &self, cov: &C, to_sample: ArrayView2<f64>,
    ) -> GpResult<Array1<f64>> {
        let cross =
            build_kernel_matrix(cov, self.points.view(), Some(to_sample), None)?;
        let mut variance = Array1::zeros(to_sample.nrows());
        for j in 0..to_sample.nrows() {
            let column = cross.column(j).to_owned();
            let solved = self.solve(column.view());
            let prior = cov.point_covariance(to_sample.row(j), to_sample.row(j))?;
            variance[j] = prior - column.dot(&solved);
        }
        Ok(variance)
    }
}

/// Linear polynomial basis `[1, x_{idx_1}, .., x_{idx_m}]` per point row.
fn polynomial_basis(points: ArrayView2<f64>, indices: &[usize]) -> GpResult<Array2<f64>> {
    let dim = points.ncols();
    for &index in indices {
        if index >= dim {
            return Err(GpError::InvalidMeanIndex { index, dim });
        }
    }
    let mut basis = Array2::zeros((points.nrows(), 1 + indices.len()));
    for i in 0..points.nrows() {
        basis[[i, 0]] = 1.0;
        for (k, &index) in indices.iter().enumerate() {
            basis[[i, 1 + k]] = points[[i, index]];
        }
    }
    Ok(basis)
}
