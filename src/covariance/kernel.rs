//! Radial covariance kernel with ARD length scales.
//!
//! Purpose
//! -------
//! Own a validated hyperparameter vector `[process_variance,
//! length_scale_1..d]` for one [`RadialFamily`] and evaluate covariance
//! values and derivatives between points. The process variance is factored
//! outside every radial body, so the learned scale is injected in exactly
//! one place for values and gradients alike.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every hyperparameter entry is finite and strictly positive; violating
//!   vectors are rejected at assignment, never clamped.
//! - The squared-length-scale cache is recomputed wholesale whenever the
//!   hyperparameters change (rebuild-and-replace, never patched in place).
//! - Gradient entry points are gated by the family's `differentiable` flag;
//!   the C0 Matérn family rejects them with `NonDifferentiable`.
use crate::covariance::{
    errors::{CovarianceError, CovarianceResult},
    radial::RadialFamily,
    traits::Covariance,
    validation::{validate_hyperparameters, validate_point_dim},
};
use ndarray::{Array1, ArrayView1};

/// Radial kernel: `k(x, z) = process_variance · radial(r²)` with
/// `r² = Σ ((xᵢ − zᵢ) / ℓᵢ)²`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialCovariance {
    family: RadialFamily,
    process_variance: f64,
    length_scales: Array1<f64>,
    /// Cache of `ℓᵢ²`, rebuilt on every hyperparameter assignment.
    length_scales_sq: Array1<f64>,
}

impl RadialCovariance {
    /// Construct a radial kernel from `[process_variance, length_scales..]`.
    ///
    /// `hyperparameters.len() - 1` fixes the spatial dimension; at least one
    /// length scale is required.
    ///
    /// # Errors
    /// - [`CovarianceError::HyperparameterLengthMismatch`] for a vector
    ///   shorter than two entries.
    /// - [`CovarianceError::HyperparameterInvalid`] for any NaN, infinite,
    ///   or non-positive entry.
    pub fn new(
        family: RadialFamily, hyperparameters: ArrayView1<f64>,
    ) -> CovarianceResult<RadialCovariance> {
        if hyperparameters.len() < 2 {
            return Err(CovarianceError::HyperparameterLengthMismatch {
                expected: 2,
                actual: hyperparameters.len(),
            });
        }
        validate_hyperparameters(hyperparameters, hyperparameters.len())?;
        let process_variance = hyperparameters[0];
        let length_scales = hyperparameters.slice(ndarray::s![1..]).to_owned();
        let length_scales_sq = length_scales.mapv(|l| l * l);
        Ok(RadialCovariance { family, process_variance, length_scales, length_scales_sq })
    }

    /// The kernel's radial family.
    pub fn family(&self) -> RadialFamily {
        self.family
    }

    /// The current process variance (first hyperparameter).
    pub fn process_variance(&self) -> f64 {
        self.process_variance
    }

    /// Squared weighted distance and the per-dimension differences `xᵢ − zᵢ`.
    ///
    /// The differences are returned unscaled; the chain-rule weights
    /// (`1/ℓᵢ²` for spatial gradients, `1/ℓᵢ³` for length-scale gradients)
    /// are applied by the caller.
    fn scaled_square_distance(
        &self, x: ArrayView1<f64>, z: ArrayView1<f64>,
    ) -> CovarianceResult<(f64, Array1<f64>)> {
        validate_point_dim(x, self.dim())?;
        validate_point_dim(z, self.dim())?;
        let diff = &x - &z;
        let mut r2 = 0.0;
        for (d, &ls_sq) in diff.iter().zip(self.length_scales_sq.iter()) {
            r2 += d * d / ls_sq;
        }
        Ok((r2, diff))
    }

    /// `d radial / d r²` at `r2`, or `NonDifferentiable` for the C0 family.
    fn radial_deriv(&self, r2: f64) -> CovarianceResult<f64> {
        self.family
            .radial_deriv(r2)
            .ok_or(CovarianceError::NonDifferentiable { tag: self.family.tag() })
    }
}

impl Covariance for RadialCovariance {
    fn covariance_tag(&self) -> &'static str {
        self.family.tag()
    }

    fn dim(&self) -> usize {
        self.length_scales.len()
    }

    fn num_hyperparameters(&self) -> usize {
        1 + self.length_scales.len()
    }

    fn hyperparameters(&self) -> Array1<f64> {
        let mut out = Array1::zeros(self.num_hyperparameters());
        out[0] = self.process_variance;
        out.slice_mut(ndarray::s![1..]).assign(&self.length_scales);
        out
    }

    fn set_hyperparameters(&mut self, hyperparameters: ArrayView1<f64>) -> CovarianceResult<()> {
        validate_hyperparameters(hyperparameters, self.num_hyperparameters())?;
        self.process_variance = hyperparameters[0];
        self.length_scales.assign(&hyperparameters.slice(ndarray::s![1..]));
        self.length_scales_sq = self.length_scales.mapv(|l| l * l);
        Ok(())
    }

    fn differentiable(&self) -> bool {
        self.family.differentiable()
    }

    fn point_covariance(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> CovarianceResult<f64> {
        let (r2, _) = self.scaled_square_distance(x, z)?;
        Ok(self.process_variance * self.family.radial(r2))
    }

    /// `∂k/∂xᵢ = pv · radial'(r²) · 2(xᵢ − zᵢ)/ℓᵢ²`.
    fn point_grad_covariance(
        &self, x: ArrayView1<f64>, z: ArrayView1<f64>,
    ) -> CovarianceResult<Array1<f64>> {
        let (r2, diff) = self.scaled_square_distance(x, z)?;
        let outer = self.process_variance * self.radial_deriv(r2)?;
        let mut grad = Array1::zeros(self.dim());
        for i in 0..self.dim() {
            grad[i] = outer * 2.0 * diff[i] / self.length_scales_sq[i];
        }
        Ok(grad)
    }

    /// `[∂k/∂pv, ∂k/∂ℓ₁, .., ∂k/∂ℓ_d]` with
    /// `∂k/∂ℓᵢ = pv · radial'(r²) · (−2(xᵢ − zᵢ)²/ℓᵢ³)`.
    fn point_hyperparameter_grad_covariance(
        &self, x: ArrayView1<f64>, z: ArrayView1<f64>,
    ) -> CovarianceResult<Array1<f64>> {
        let (r2, diff) = self.scaled_square_distance(x, z)?;
        let deriv = self.radial_deriv(r2)?;
        let mut grad = Array1::zeros(self.num_hyperparameters());
        grad[0] = self.family.radial(r2);
        for i in 0..self.dim() {
            let ls = self.length_scales[i];
            grad[1 + i] =
                self.process_variance * deriv * (-2.0 * diff[i] * diff[i] / (ls * ls * ls));
        }
        Ok(grad)
    }
}
