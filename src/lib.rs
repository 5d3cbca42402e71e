//! gp_surrogate — Gaussian-process surrogate modeling and hyperparameter
//! fitting.
//!
//! Purpose
//! -------
//! Provide the three layers of a GP surrogate engine as one crate:
//! covariance kernels, the GP log-marginal-likelihood objective over
//! validated historical data, and a quorum-based multistart optimizer
//! that tunes kernel hyperparameters with L-BFGS.
//!
//! Key behaviors
//! -------------
//! - [`covariance`] defines the [`covariance::Covariance`] trait, the
//!   radial kernel families (square-exponential and the Matérn ladder)
//!   with their multitask tensor product, and batched kernel
//!   matrix/tensor builders.
//! - [`gp`] fits a GP to historical observations and exposes the
//!   log-marginal likelihood with analytic gradients, optional
//!   auto-noise, log-domain parameterization, a polynomial prior mean,
//!   and posterior prediction.
//! - [`optimize`] maximizes any [`optimize::Optimizable`] objective from
//!   many starting points over a search domain, reporting explicit
//!   per-attempt outcomes instead of raising on solver failure.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated once at construction; code past validation
//!   assumes finite, well-shaped data and reports violations through the
//!   layer's error enum, never panics.
//! - Derived caches (kernel length-scale squares, the GP Cholesky state)
//!   are rebuilt wholesale whenever hyperparameters change; there is no
//!   incremental updating to drift out of sync.
//!
//! Conventions
//! -----------
//! - Vectors and matrices are `ndarray` types; points are rows of an
//!   `Array2<f64>`. Dense linear algebra (Cholesky) runs through
//!   `nalgebra`.
//! - Each layer owns its error enum ([`covariance::CovarianceError`],
//!   [`gp::GpError`], [`optimize::OptError`]) with `From` conversions
//!   upward; optimization entrypoints return [`optimize::OptResult`].
//!
//! Downstream usage
//! ----------------
//! Typical flow: build a [`covariance::RadialCovariance`], wrap it with
//! [`gp::GpLogMarginalLikelihood`] over a [`gp::HistoricalData`], and
//! hand that to an [`optimize::MultistartOptimizer`] over a
//! [`optimize::TensorProductDomain`]; then predict through the fitted
//! likelihood's posterior methods.

pub mod covariance;
pub mod gp;
pub mod optimize;
