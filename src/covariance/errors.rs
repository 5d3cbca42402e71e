//! Error types for the covariance-kernel layer.
//!
//! Two families of failures are kept deliberately distinct:
//!
//! - **Hyperparameter domain errors** ([`CovarianceError::HyperparameterInvalid`]):
//!   a NaN, infinite, or non-positive entry in a hyperparameter vector. These
//!   are raised synchronously at assignment and are never silently corrected.
//! - **Shape/dimension errors** (everything else): malformed point arrays or
//!   mismatched dimensions. These are programmer errors and always name the
//!   offending shapes so the call site can be fixed.
//!
//! Callers that need to treat a rejected hyperparameter proposal as a
//! recoverable event (the multistart optimizer does) can match on the
//! `HyperparameterInvalid` variant without ambiguity.

/// Crate-wide result alias for covariance operations.
pub type CovarianceResult<T> = Result<T, CovarianceError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CovarianceError {
    // ---- Hyperparameters ----
    /// A hyperparameter entry is NaN, infinite, or not strictly positive.
    HyperparameterInvalid {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Hyperparameter vector length does not match the kernel's layout.
    HyperparameterLengthMismatch {
        expected: usize,
        actual: usize,
    },

    // ---- Points ----
    /// A point has the wrong number of coordinates for this kernel.
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },

    /// Two point arrays that must be evaluated pairwise differ in shape.
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    // ---- Kernel matrices ----
    /// Noise variance vector length does not match the sampled-point count.
    NoiseLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Noise variance entries must be finite and non-negative.
    InvalidNoise {
        index: usize,
        value: f64,
    },

    /// Noise variance is only legal on the symmetric (self-covariance) matrix.
    NoiseWithCrossCovariance,

    // ---- Capabilities ----
    /// Gradient entry point called on a kernel without spatial derivatives.
    NonDifferentiable {
        tag: &'static str,
    },
}

impl std::error::Error for CovarianceError {}

impl std::fmt::Display for CovarianceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CovarianceError::HyperparameterInvalid { index, value, reason } => {
                write!(f, "Invalid hyperparameter at index {index}: {value}: {reason}")
            }
            CovarianceError::HyperparameterLengthMismatch { expected, actual } => {
                write!(f, "Hyperparameter length mismatch: expected {expected}, actual {actual}")
            }
            CovarianceError::DimensionMismatch { expected, actual } => {
                write!(f, "Point dimension mismatch: expected {expected}, actual {actual}")
            }
            CovarianceError::ShapeMismatch { left, right } => {
                write!(f, "Point arrays have mismatched shapes: left {left:?}, right {right:?}")
            }
            CovarianceError::NoiseLengthMismatch { expected, actual } => {
                write!(f, "Noise variance length mismatch: expected {expected}, actual {actual}")
            }
            CovarianceError::InvalidNoise { index, value } => {
                write!(
                    f,
                    "Invalid noise variance at index {index}: {value}, must be finite and >= 0"
                )
            }
            CovarianceError::NoiseWithCrossCovariance => {
                write!(f, "Noise variance may only be added to a symmetric kernel matrix")
            }
            CovarianceError::NonDifferentiable { tag } => {
                write!(f, "Covariance kernel '{tag}' does not expose spatial derivatives")
            }
        }
    }
}
