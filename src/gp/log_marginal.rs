//! GP log-marginal-likelihood objective.
//!
//! Purpose
//! -------
//! The differentiable objective the hyperparameter optimizer maximizes:
//! the log marginal likelihood of historical data under a covariance
//! kernel, with optional trailing auto-noise hyperparameter, optional
//! log-domain parameterization, and an optional GLS polynomial prior mean.
//!
//! Conventions
//! -----------
//! - Value: `−scale · ½ (ỹᵀα + 2·Σ log diag L)` with `K = LLᵀ`. The
//!   constant `n·log 2π` term is dropped; downstream code maximizes this
//!   value, so the constant never matters.
//! - Gradient per hyperparameter `θ_p`:
//!   `scale · ½ (αᵀ(∂K/∂θ_p)α − trace(K⁻¹ ∂K/∂θ_p))`, all through
//!   Cholesky solves. The auto-noise slice is `∂K/∂noise = I`. In the log
//!   domain each entry is chain-ruled by its natural value.
//! - `hyperparameters`/`set_hyperparameters` speak the WORKING domain:
//!   log-transformed values when `log_domain` is set, natural otherwise.
//!   Every assignment rebuilds the full GP state.
//!
//! Downstream usage
//! ----------------
//! Implements the optimizer-facing objective contract through
//! `crate::optimize::objective`; posterior prediction of the fitted GP is
//! exposed via [`GpLogMarginalLikelihood::posterior_mean`] and
//! [`GpLogMarginalLikelihood::posterior_variance`].
use crate::covariance::{
    errors::CovarianceError, matrix::build_hyperparameter_grad_kernel_tensor,
    traits::Covariance,
};
use crate::gp::{
    errors::{GpError, GpResult},
    historical::HistoricalData,
    state::GpState,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

/// Configuration of a likelihood objective.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodOptions {
    /// Coordinate indices of a linear prior-mean basis (`Some(&[])` fits an
    /// intercept only); `None` fits a zero-mean GP.
    pub mean_indices: Option<Vec<usize>>,
    /// Append a trailing hyperparameter for homoskedastic extra noise.
    pub auto_noise: bool,
    /// Optimize in log-hyperparameter space.
    pub log_domain: bool,
    /// Strictly positive multiplier applied to value and gradient alike.
    pub scale: f64,
    /// Add the GLS mean-gradient correction term (REML-style) to the
    /// gradient. Off by default; the correction is small whenever the mean
    /// basis is, and downstream solvers tolerate the profile gradient.
    pub include_mean_gradient_correction: bool,
}

impl Default for LikelihoodOptions {
    fn default() -> Self {
        LikelihoodOptions {
            mean_indices: None,
            auto_noise: false,
            log_domain: false,
            scale: 1.0,
            include_mean_gradient_correction: false,
        }
    }
}

/// Log marginal likelihood of historical data under a covariance kernel.
#[derive(Debug, Clone)]
pub struct GpLogMarginalLikelihood<C: Covariance> {
    covariance: C,
    data: HistoricalData,
    options: LikelihoodOptions,
    /// Current auto-noise value in the natural domain; `Some` iff the
    /// option is enabled.
    noise: Option<f64>,
    state: GpState,
}

impl<C: Covariance> GpLogMarginalLikelihood<C> {
    /// Build the objective and fit the initial GP state.
    ///
    /// `initial_hyperparameters` is given in the working domain (see module
    /// conventions) and has length `covariance hyperparameters (+1 with
    /// auto-noise)`.
    ///
    /// # Errors
    /// - [`GpError::InvalidScale`] for a non-finite or non-positive scale.
    /// - [`GpError::HyperparameterLengthMismatch`] for a wrong-length
    ///   vector; the message notes when the auto-noise slot looks
    ///   forgotten.
    /// - Dimension mismatches between kernel and data, and numerical
    ///   failures from the initial fit, pass through from the state build.
    pub fn new(
        covariance: C, data: HistoricalData, options: LikelihoodOptions,
        initial_hyperparameters: ArrayView1<f64>,
    ) -> GpResult<GpLogMarginalLikelihood<C>> {
        if !options.scale.is_finite() || options.scale <= 0.0 {
            return Err(GpError::InvalidScale { value: options.scale });
        }
        if covariance.dim() != data.dim() {
            return Err(GpError::Covariance(CovarianceError::DimensionMismatch {
                expected: covariance.dim(),
                actual: data.dim(),
            }));
        }
        let mut covariance = covariance;
        let (natural, noise) =
            Self::checked_natural(&covariance, &options, initial_hyperparameters)?;
        let kernel_len = covariance.num_hyperparameters();
        covariance.set_hyperparameters(natural.slice(s![..kernel_len]))?;
        let state =
            GpState::new(&covariance, &data, options.mean_indices.as_deref(), noise)?;
        Ok(GpLogMarginalLikelihood { covariance, data, options, noise, state })
    }

    /// Map a working-domain vector to the natural domain, checking the
    /// length and the auto-noise slot before any state is touched.
    fn checked_natural(
        covariance: &C, options: &LikelihoodOptions, hyperparameters: ArrayView1<f64>,
    ) -> GpResult<(Array1<f64>, Option<f64>)> {
        let kernel_len = covariance.num_hyperparameters();
        let expected = kernel_len + usize::from(options.auto_noise);
        if hyperparameters.len() != expected {
            return Err(GpError::HyperparameterLengthMismatch {
                expected,
                actual: hyperparameters.len(),
                auto_noise: options.auto_noise,
            });
        }
        let natural = if options.log_domain {
            hyperparameters.mapv(f64::exp)
        } else {
            hyperparameters.to_owned()
        };
        let noise = if options.auto_noise {
            let noise = natural[kernel_len];
            if !noise.is_finite() || noise <= 0.0 {
                return Err(GpError::Covariance(CovarianceError::HyperparameterInvalid {
                    index: kernel_len,
                    value: noise,
                    reason: "Auto-noise variance must be finite and strictly positive.",
                }));
            }
            Some(noise)
        } else {
            None
        };
        Ok((natural, noise))
    }

    /// Working-domain hyperparameter count (kernel + optional noise slot).
    pub fn num_hyperparameters(&self) -> usize {
        self.covariance.num_hyperparameters() + usize::from(self.options.auto_noise)
    }

    /// Whether gradients are available (the kernel's capability flag).
    pub fn differentiable(&self) -> bool {
        self.covariance.differentiable()
    }

    /// The underlying kernel at its current hyperparameters.
    pub fn covariance(&self) -> &C {
        &self.covariance
    }

    /// The historical data the objective is fit to.
    pub fn data(&self) -> &HistoricalData {
        &self.data
    }

    /// Hyperparameters in the natural domain: kernel entries plus the
    /// trailing auto-noise value when enabled.
    fn natural_hyperparameters(&self) -> Array1<f64> {
        let mut out = Array1::zeros(self.num_hyperparameters());
        out.slice_mut(s![..self.covariance.num_hyperparameters()])
            .assign(&self.covariance.hyperparameters());
        if let Some(noise) = self.noise {
            out[self.num_hyperparameters() - 1] = noise;
        }
        out
    }

    /// Current hyperparameters in the working domain.
    pub fn hyperparameters(&self) -> Array1<f64> {
        let natural = self.natural_hyperparameters();
        if self.options.log_domain { natural.mapv(f64::ln) } else { natural }
    }

    /// Replace the hyperparameters and rebuild the GP state wholesale.
    ///
    /// # Errors
    /// - [`GpError::HyperparameterLengthMismatch`] for a wrong-length
    ///   vector.
    /// - [`CovarianceError::HyperparameterInvalid`] (as
    ///   [`GpError::Covariance`]) for an invalid natural-domain entry,
    ///   including the noise slot.
    /// - [`GpError::CholeskyFailure`] when the proposal makes the kernel
    ///   matrix indefinite.
    pub fn set_hyperparameters(
        &mut self, hyperparameters: ArrayView1<f64>,
    ) -> GpResult<()> {
        // Validation (including the noise slot) runs before the kernel is
        // touched, so a rejected proposal leaves the objective as it was.
        let (natural, noise) =
            Self::checked_natural(&self.covariance, &self.options, hyperparameters)?;
        let kernel_len = self.covariance.num_hyperparameters();
        self.covariance.set_hyperparameters(natural.slice(s![..kernel_len]))?;
        self.noise = noise;
        self.state = GpState::new(
            &self.covariance,
            &self.data,
            self.options.mean_indices.as_deref(),
            self.noise,
        )?;
        Ok(())
    }

    /// Log marginal likelihood at the current hyperparameters.
    ///
    /// `−scale · ½ (ỹᵀα + 2·Σ log diag L)`; the `n·log 2π` constant is
    /// dropped.
    pub fn compute_log_likelihood(&self) -> f64 {
        let data_fit = self.state.demeaned().dot(&self.state.alpha());
        -self.options.scale * 0.5 * (data_fit + 2.0 * self.state.sum_log_diag_chol())
    }

    /// Gradient of [`Self::compute_log_likelihood`] in the working domain.
    ///
    /// # Errors
    /// [`CovarianceError::NonDifferentiable`] (as [`GpError::Covariance`])
    /// for a kernel without hyperparameter derivatives.
    pub fn compute_grad_log_likelihood(&self) -> GpResult<Array1<f64>> {
        let tensor =
            build_hyperparameter_grad_kernel_tensor(&self.covariance, self.data.points())?;
        let half_scale = 0.5 * self.options.scale;
        let alpha = self.state.alpha();
        let n = self.data.num_sampled();

        let mut grad = Array1::zeros(self.num_hyperparameters());
        for p in 0..self.covariance.num_hyperparameters() {
            let slice = tensor.index_axis(Axis(0), p).to_owned();
            grad[p] = half_scale * self.trace_gradient_entry(&slice, alpha);
        }
        if self.options.auto_noise {
            let identity = Array2::eye(n);
            grad[self.num_hyperparameters() - 1] =
                half_scale * self.trace_gradient_entry(&identity, alpha);
        }

        if self.options.log_domain {
            grad = grad * self.natural_hyperparameters();
        }
        Ok(grad)
    }

    /// `αᵀ(∂K)α − trace(K⁻¹ ∂K)` (+ the optional mean correction).
    fn trace_gradient_entry(&self, slice: &Array2<f64>, alpha: ArrayView1<f64>) -> f64 {
        let mut quad = 0.0;
        for i in 0..slice.nrows() {
            for j in 0..slice.ncols() {
                quad += alpha[i] * slice[[i, j]] * alpha[j];
            }
        }
        let mut entry = quad - self.state.solve_trace(slice);
        if self.options.include_mean_gradient_correction {
            if let Some(correction) = self.state.mean_correction_trace(slice) {
                entry += correction;
            }
        }
        entry
    }

    /// Posterior mean of the fitted GP at `to_sample`.
    pub fn posterior_mean(&self, to_sample: ArrayView2<f64>) -> GpResult<Array1<f64>> {
        self.state.mean(&self.covariance, to_sample)
    }

    /// Posterior variance of the fitted GP at `to_sample`.
    pub fn posterior_variance(&self, to_sample: ArrayView2<f64>) -> GpResult<Array1<f64>> {
        self.state.variance(&self.covariance, to_sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::{kernel::RadialCovariance, radial::RadialFamily};
    use ndarray::array;

    fn single_point_objective(scale: f64) -> GpLogMarginalLikelihood<RadialCovariance> {
        let cov =
            RadialCovariance::new(RadialFamily::SquareExponential, array![1.0, 1.0].view())
                .unwrap();
        let data = HistoricalData::new(array![[0.0]], array![2.0], array![0.5]).unwrap();
        GpLogMarginalLikelihood::new(
            cov,
            data,
            LikelihoodOptions { scale, ..LikelihoodOptions::default() },
            array![1.0, 1.0].view(),
        )
        .expect("valid objective")
    }

    /// Deterministic d-dimensional data set for the gradient tests.
    fn synthetic_data(dim: usize) -> HistoricalData {
        let n = 6;
        let mut points = Array2::zeros((n, dim));
        let mut values = Array1::zeros(n);
        for i in 0..n {
            for j in 0..dim {
                points[[i, j]] = ((i * dim + j) as f64 * 0.37).sin();
            }
            values[i] = (i as f64 * 0.61).cos();
        }
        HistoricalData::new(points, values, Array1::from_elem(n, 1e-3)).unwrap()
    }

    fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        a.dot(&b) / (a.dot(&a).sqrt() * b.dot(&b).sqrt())
    }

    /// Central finite difference of the likelihood in working-domain
    /// hyperparameter `p`.
    fn fd_grad(
        objective: &GpLogMarginalLikelihood<RadialCovariance>, p: usize,
    ) -> f64 {
        let h = 1e-6;
        let mut hi = objective.clone();
        let mut lo = objective.clone();
        let mut hp_hi = objective.hyperparameters();
        let mut hp_lo = objective.hyperparameters();
        hp_hi[p] += h;
        hp_lo[p] -= h;
        hi.set_hyperparameters(hp_hi.view()).unwrap();
        lo.set_hyperparameters(hp_lo.view()).unwrap();
        (hi.compute_log_likelihood() - lo.compute_log_likelihood()) / (2.0 * h)
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The closed-form single-observation likelihood, including the scale
    //   multiplier.
    // - Finite-difference cosine similarity of the gradient in dimensions
    //   1 through 4, in both linear and log domains, with auto-noise.
    // - Single-pass construction at the initial hyperparameters.
    // - Hyperparameter length validation with the auto-noise hint and
    //   scale validation.
    // - Log-domain round-tripping of the hyperparameter accessors.
    //
    // They intentionally DO NOT cover:
    // - Kernel matrix construction (covariance::matrix tests) or state
    //   internals (gp::state tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The likelihood of a single observation matches its closed form
    // −scale·½(y²/k + log k) with k = pv + measurement noise.
    //
    // Given
    // -----
    // - One observation y = 2 with noise 0.5 under pv = 1 (k = 1.5), at
    //   scales 1 and 3.
    //
    // Expect
    // ------
    // - Agreement within 1e-12, and the scale-3 value is exactly three
    //   times the scale-1 value.
    fn single_observation_matches_closed_form() {
        let k: f64 = 1.5;
        let expected = -0.5 * (4.0 / k + k.ln());

        let unit = single_point_objective(1.0);
        assert!((unit.compute_log_likelihood() - expected).abs() < 1e-12);

        let scaled = single_point_objective(3.0);
        assert!((scaled.compute_log_likelihood() - 3.0 * expected).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient tracks a central finite difference across
    // dimensions 1 through 4 in the linear domain, with the auto-noise
    // slot enabled.
    //
    // Given
    // -----
    // - Six deterministic observations per dimension, square-exponential
    //   kernel, auto-noise on.
    //
    // Expect
    // ------
    // - Cosine similarity between analytic and FD gradients > 0.999 and
    //   entrywise agreement within 1e-4.
    fn gradient_matches_finite_difference_linear_domain() {
        for dim in 1..=4 {
            let mut hp = vec![1.2];
            hp.extend(std::iter::repeat(0.8).take(dim));
            hp.push(0.05);
            let cov = RadialCovariance::new(
                RadialFamily::SquareExponential,
                Array1::from(hp[..dim + 1].to_vec()).view(),
            )
            .unwrap();
            let objective = GpLogMarginalLikelihood::new(
                cov,
                synthetic_data(dim),
                LikelihoodOptions { auto_noise: true, ..LikelihoodOptions::default() },
                Array1::from(hp).view(),
            )
            .unwrap();

            let analytic = objective.compute_grad_log_likelihood().unwrap();
            let fd = Array1::from_iter(
                (0..objective.num_hyperparameters()).map(|p| fd_grad(&objective, p)),
            );
            assert!(
                cosine_similarity(analytic.view(), fd.view()) > 0.999,
                "dim {dim}: analytic {analytic:?}, fd {fd:?}"
            );
            for p in 0..analytic.len() {
                assert!(
                    (analytic[p] - fd[p]).abs() < 1e-4,
                    "dim {dim} hp {p}: analytic {}, fd {}",
                    analytic[p],
                    fd[p]
                );
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The chain-ruled log-domain gradient also tracks a finite difference
    // taken in log space, across dimensions 1 through 4.
    //
    // Given
    // -----
    // - The same data sets with log_domain set.
    //
    // Expect
    // ------
    // - Cosine similarity > 0.999 per dimension.
    fn gradient_matches_finite_difference_log_domain() {
        for dim in 1..=4 {
            let mut hp = vec![1.2];
            hp.extend(std::iter::repeat(0.8).take(dim));
            let cov = RadialCovariance::new(
                RadialFamily::SquareExponential,
                Array1::from(hp.clone()).view(),
            )
            .unwrap();
            hp.push(0.05);
            let working = Array1::from(hp).mapv(f64::ln);
            let objective = GpLogMarginalLikelihood::new(
                cov,
                synthetic_data(dim),
                LikelihoodOptions {
                    auto_noise: true,
                    log_domain: true,
                    ..LikelihoodOptions::default()
                },
                working.view(),
            )
            .unwrap();

            let analytic = objective.compute_grad_log_likelihood().unwrap();
            let fd = Array1::from_iter(
                (0..objective.num_hyperparameters()).map(|p| fd_grad(&objective, p)),
            );
            assert!(
                cosine_similarity(analytic.view(), fd.view()) > 0.999,
                "dim {dim}: analytic {analytic:?}, fd {fd:?}"
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Construction fits the GP state directly at the initial
    // hyperparameters; the kernel's construction-time setting plays no
    // role.
    //
    // Given
    // -----
    // - A kernel built at (5, 5, 5), handed to the objective with the
    //   initial vector (1.2, 0.8, 0.8), and a twin whose kernel was built
    //   at the initial vector directly.
    //
    // Expect
    // ------
    // - hyperparameters() returns the initial vector, and the two
    //   likelihood values agree within 1e-12.
    fn construction_fits_the_state_at_the_initial_hyperparameters() {
        let data = synthetic_data(2);
        let initial = array![1.2, 0.8, 0.8];
        let stale_cov = RadialCovariance::new(
            RadialFamily::SquareExponential,
            array![5.0, 5.0, 5.0].view(),
        )
        .unwrap();
        let objective = GpLogMarginalLikelihood::new(
            stale_cov,
            data.clone(),
            LikelihoodOptions::default(),
            initial.view(),
        )
        .unwrap();
        assert_eq!(objective.hyperparameters(), initial);

        let direct_cov =
            RadialCovariance::new(RadialFamily::SquareExponential, initial.view()).unwrap();
        let direct = GpLogMarginalLikelihood::new(
            direct_cov,
            data,
            LikelihoodOptions::default(),
            initial.view(),
        )
        .unwrap();
        assert!(
            (objective.compute_log_likelihood() - direct.compute_log_likelihood()).abs() < 1e-12
        );
    }

    #[test]
    // Purpose
    // -------
    // A hyperparameter vector missing the auto-noise slot is rejected with
    // a message that points at the missing term.
    //
    // Given
    // -----
    // - An auto-noise objective handed a kernel-only vector.
    //
    // Expect
    // ------
    // - `HyperparameterLengthMismatch { expected: 3, actual: 2,
    //   auto_noise: true }`, with the hint in the display text.
    fn missing_auto_noise_slot_is_called_out() {
        let cov =
            RadialCovariance::new(RadialFamily::SquareExponential, array![1.0, 1.0].view())
                .unwrap();
        let data = HistoricalData::new(array![[0.0]], array![1.0], array![0.1]).unwrap();
        let err = GpLogMarginalLikelihood::new(
            cov,
            data,
            LikelihoodOptions { auto_noise: true, ..LikelihoodOptions::default() },
            array![1.0, 1.0].view(),
        )
        .expect_err("missing noise slot");
        assert_eq!(
            err,
            GpError::HyperparameterLengthMismatch { expected: 3, actual: 2, auto_noise: true }
        );
        assert!(err.to_string().contains("auto-noise"));
    }

    #[test]
    // Purpose
    // -------
    // A non-positive scale is rejected at construction.
    //
    // Given
    // -----
    // - scale = 0.0.
    //
    // Expect
    // ------
    // - `Err(InvalidScale { value: 0.0 })`.
    fn non_positive_scale_is_rejected() {
        let cov =
            RadialCovariance::new(RadialFamily::SquareExponential, array![1.0, 1.0].view())
                .unwrap();
        let data = HistoricalData::new(array![[0.0]], array![1.0], array![0.1]).unwrap();
        let err = GpLogMarginalLikelihood::new(
            cov,
            data,
            LikelihoodOptions { scale: 0.0, ..LikelihoodOptions::default() },
            array![1.0, 1.0].view(),
        )
        .expect_err("zero scale");
        assert_eq!(err, GpError::InvalidScale { value: 0.0 });
    }

    #[test]
    // Purpose
    // -------
    // In the log domain the accessors round-trip and the likelihood value
    // equals the linear-domain value at the same natural hyperparameters.
    //
    // Given
    // -----
    // - Twin objectives over the same data, one linear and one log, set to
    //   the same natural vector.
    //
    // Expect
    // ------
    // - hyperparameters() of the log twin is the elementwise log of the
    //   linear twin's, and the two likelihood values agree within 1e-12.
    fn log_domain_round_trips_and_preserves_value() {
        let natural = array![1.5, 0.9, 0.7];
        let data = synthetic_data(2);
        let cov = RadialCovariance::new(RadialFamily::MaternFiveHalves, natural.view())
            .unwrap();
        let linear = GpLogMarginalLikelihood::new(
            cov.clone(),
            data.clone(),
            LikelihoodOptions::default(),
            natural.view(),
        )
        .unwrap();
        let log = GpLogMarginalLikelihood::new(
            cov,
            data,
            LikelihoodOptions { log_domain: true, ..LikelihoodOptions::default() },
            natural.mapv(f64::ln).view(),
        )
        .unwrap();

        for p in 0..3 {
            assert!((log.hyperparameters()[p] - linear.hyperparameters()[p].ln()).abs() < 1e-12);
        }
        assert!(
            (log.compute_log_likelihood() - linear.compute_log_likelihood()).abs() < 1e-12
        );
    }
}
