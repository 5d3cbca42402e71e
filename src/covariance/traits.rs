//! The shared covariance-kernel interface.
//!
//! Purpose
//! -------
//! Define the capability set every kernel exposes to the GP likelihood layer
//! and the matrix-building machinery: hyperparameter ownership, pointwise
//! evaluation, and (gated by a capability flag rather than a subtype)
//! spatial and hyperparameter derivatives.
//!
//! Conventions
//! -----------
//! - Hyperparameter vectors are ordered `[process_variance,
//!   length_scale_1..d, ...]`; assignment validates every entry (finite,
//!   strictly positive) and rebuilds derived caches wholesale.
//! - `point_*` methods evaluate a single point pair; the paired row-wise
//!   form [`Covariance::covariance`] and the batched matrix/tensor builders
//!   in [`crate::covariance::matrix`] are implemented once on top of them.
//! - `differentiable()` gates all gradient entry points. Kernels without
//!   spatial derivatives return
//!   [`CovarianceError::NonDifferentiable`](crate::covariance::errors::CovarianceError)
//!   instead of approximating.
use crate::covariance::{errors::CovarianceResult, validation::validate_paired_shapes};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Capability set shared by every covariance kernel.
///
/// Implementors: [`RadialCovariance`](crate::covariance::kernel::RadialCovariance)
/// and [`MultitaskCovariance`](crate::covariance::multitask::MultitaskCovariance).
pub trait Covariance {
    /// Stable type tag for diagnostics.
    fn covariance_tag(&self) -> &'static str;

    /// Number of input coordinates a point carries (including the task
    /// column for the multitask kernel).
    fn dim(&self) -> usize;

    /// Number of coordinates the spatial gradient spans (physical
    /// dimensions only; the task column is not differentiated).
    fn grad_dim(&self) -> usize {
        self.dim()
    }

    /// Length of the hyperparameter vector.
    fn num_hyperparameters(&self) -> usize;

    /// The current hyperparameter vector, in layout order.
    fn hyperparameters(&self) -> Array1<f64>;

    /// Replace the hyperparameter vector.
    ///
    /// Validates length and entries (finite, strictly positive) and rebuilds
    /// every derived cache; invalid vectors are rejected, never clamped.
    fn set_hyperparameters(&mut self, hyperparameters: ArrayView1<f64>) -> CovarianceResult<()>;

    /// Whether spatial/hyperparameter gradient entry points are callable.
    fn differentiable(&self) -> bool;

    /// Covariance between a single pair of points.
    fn point_covariance(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> CovarianceResult<f64>;

    /// Gradient of `point_covariance` with respect to the coordinates of
    /// `x`, length [`Covariance::grad_dim`].
    fn point_grad_covariance(
        &self, x: ArrayView1<f64>, z: ArrayView1<f64>,
    ) -> CovarianceResult<Array1<f64>>;

    /// Gradient of `point_covariance` with respect to each hyperparameter,
    /// length [`Covariance::num_hyperparameters`].
    fn point_hyperparameter_grad_covariance(
        &self, x: ArrayView1<f64>, z: ArrayView1<f64>,
    ) -> CovarianceResult<Array1<f64>>;

    /// Paired row-wise covariance: `out[i] = k(x[i, ..], z[i, ..])`.
    ///
    /// # Errors
    /// Shape mismatch between `x` and `z`, or a column count that does not
    /// match [`Covariance::dim`], is rejected naming both shapes.
    fn covariance(
        &self, x: ArrayView2<f64>, z: ArrayView2<f64>,
    ) -> CovarianceResult<Array1<f64>> {
        validate_paired_shapes(x, z, self.dim())?;
        let mut out = Array1::zeros(x.nrows());
        for (i, (xi, zi)) in x.rows().into_iter().zip(z.rows()).enumerate() {
            out[i] = self.point_covariance(xi, zi)?;
        }
        Ok(out)
    }
}
