//! Gaussian-process regression and its log-marginal-likelihood objective.
//!
//! Purpose
//! -------
//! Fit a GP to validated historical observations under any
//! [`crate::covariance::Covariance`] kernel and expose the
//! log-marginal-likelihood objective whose hyperparameters the optimizer
//! layer tunes, plus posterior prediction of the fitted process.
//!
//! Key behaviors
//! -------------
//! - [`historical::HistoricalData`] validates observations once at
//!   construction.
//! - [`state::GpState`] holds everything derived from one hyperparameter
//!   setting (Cholesky factor, projections, GLS mean) and is rebuilt
//!   wholesale on every change.
//! - [`log_marginal::GpLogMarginalLikelihood`] is the maximization target:
//!   analytic value and gradient, optional auto-noise slot, optional
//!   log-domain parameterization, optional polynomial prior mean.
//!
//! Downstream usage
//! ----------------
//! [`crate::optimize`] drives `set_hyperparameters` /
//! `compute_log_likelihood` / `compute_grad_log_likelihood` through its
//! objective seam.
pub mod errors;
pub mod historical;
pub mod log_marginal;
pub mod state;

pub use errors::{GpError, GpResult};
pub use historical::HistoricalData;
pub use log_marginal::{GpLogMarginalLikelihood, LikelihoodOptions};
pub use state::GpState;
