//! Error types for the Gaussian-process layer.
//!
//! Purpose
//! -------
//! Separate the three failure classes the likelihood layer can hit:
//!
//! - **Data errors**: malformed historical data, rejected at construction.
//! - **Configuration errors**: bad scale, bad mean index, or a
//!   hyperparameter vector of the wrong length (the message says whether
//!   the auto-noise slot was likely forgotten).
//! - **Numerical failures**: an indefinite kernel matrix or a singular
//!   mean-basis normal matrix. These surface as errors here and are only
//!   treated as recoverable by the multistart optimizer.
//!
//! Kernel-layer errors pass through unchanged via `From<CovarianceError>`.
use crate::covariance::errors::CovarianceError;

/// Result alias for GP operations.
pub type GpResult<T> = Result<T, GpError>;

#[derive(Debug, Clone, PartialEq)]
pub enum GpError {
    // ---- Historical data ----
    /// Historical data must contain at least one observation.
    EmptyHistoricalData,

    /// Points, values, and noise vectors must agree on the sample count.
    HistoricalLengthMismatch {
        points: usize,
        values: usize,
        noise: usize,
    },

    /// A sampled point coordinate or observed value is NaN or infinite.
    NonFiniteObservation {
        index: usize,
    },

    // ---- Configuration ----
    /// The likelihood scaling factor must be finite and strictly positive.
    InvalidScale {
        value: f64,
    },

    /// A polynomial-mean coordinate index is out of range for the data.
    InvalidMeanIndex {
        index: usize,
        dim: usize,
    },

    /// Hyperparameter vector length does not match the objective's layout.
    ///
    /// `auto_noise` records whether the objective carries a trailing noise
    /// slot, so the message can point at the usual culprit.
    HyperparameterLengthMismatch {
        expected: usize,
        actual: usize,
        auto_noise: bool,
    },

    // ---- Numerical failures ----
    /// The kernel matrix is not positive definite.
    CholeskyFailure {
        size: usize,
    },

    /// The mean-basis normal matrix `Hᵀ K⁻¹ H` is singular.
    MeanBasisSingular {
        size: usize,
    },

    // ---- Kernel layer ----
    /// A covariance-layer error, passed through unchanged.
    Covariance(CovarianceError),
}

impl GpError {
    /// Whether this error is a numerical failure the multistart optimizer
    /// may treat as a failed attempt rather than a terminal error.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            GpError::CholeskyFailure { .. }
                | GpError::MeanBasisSingular { .. }
                | GpError::Covariance(CovarianceError::HyperparameterInvalid { .. })
        )
    }
}

impl std::error::Error for GpError {}

impl std::fmt::Display for GpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpError::EmptyHistoricalData => {
                write!(f, "Historical data must contain at least one observation")
            }
            GpError::HistoricalLengthMismatch { points, values, noise } => {
                write!(
                    f,
                    "Historical data length mismatch: {points} points, {values} values, \
                     {noise} noise entries"
                )
            }
            GpError::NonFiniteObservation { index } => {
                write!(f, "Historical observation {index} contains a non-finite entry")
            }
            GpError::InvalidScale { value } => {
                write!(f, "Likelihood scale must be finite and > 0, got {value}")
            }
            GpError::InvalidMeanIndex { index, dim } => {
                write!(f, "Polynomial mean index {index} out of range for dimension {dim}")
            }
            GpError::HyperparameterLengthMismatch { expected, actual, auto_noise } => {
                write!(
                    f,
                    "Hyperparameter length mismatch: expected {expected}, actual {actual}"
                )?;
                if *auto_noise && *actual + 1 == *expected {
                    write!(f, " (the trailing auto-noise term appears to be missing)")?;
                }
                Ok(())
            }
            GpError::CholeskyFailure { size } => {
                write!(f, "Cholesky factorization failed: {size}x{size} kernel matrix is not \
                           positive definite")
            }
            GpError::MeanBasisSingular { size } => {
                write!(f, "Mean-basis normal matrix ({size}x{size}) is singular")
            }
            GpError::Covariance(err) => write!(f, "{err}"),
        }
    }
}

impl From<CovarianceError> for GpError {
    fn from(err: CovarianceError) -> Self {
        GpError::Covariance(err)
    }
}
