//! Covariance-kernel framework.
//!
//! Purpose
//! -------
//! Everything the GP likelihood layer needs from a kernel: the shared
//! [`Covariance`] trait, the radial kernel families and their multitask
//! tensor product, and the batched matrix/tensor builders written once over
//! the trait.
//!
//! Key behaviors
//! -------------
//! - Kernels own a validated hyperparameter vector and rebuild derived
//!   caches wholesale on every assignment.
//! - Differentiability is a capability flag, not a subtype: gradient entry
//!   points on a non-differentiable kernel fail with
//!   [`CovarianceError::NonDifferentiable`] instead of approximating.
//! - Hyperparameter domain violations (`HyperparameterInvalid`) are kept
//!   distinct from shape errors so the optimizer layer can treat rejected
//!   proposals as recoverable.
//!
//! Downstream usage
//! ----------------
//! [`crate::gp`] builds likelihoods over these kernels;
//! [`crate::optimize`] tunes their hyperparameters.
pub mod errors;
pub mod kernel;
pub mod matrix;
pub mod multitask;
pub mod radial;
pub mod traits;
pub mod validation;

pub use errors::{CovarianceError, CovarianceResult};
pub use kernel::RadialCovariance;
pub use matrix::{
    build_grad_kernel_tensor, build_hyperparameter_grad_kernel_tensor, build_kernel_matrix,
};
pub use multitask::MultitaskCovariance;
pub use radial::RadialFamily;
pub use traits::Covariance;
