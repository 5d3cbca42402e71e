//! Error types for the optimizer layer.
//!
//! One enum covers the whole layer: objective-seam failures, solver
//! configuration, Argmin runtime wrappers, and the multistart terminal
//! conditions. Errors raised by this crate inside Argmin closures travel
//! through `argmin::core::Error` and are recovered by a two-stage
//! downcast in the `From<Error>` conversion, so no error identity is lost
//! across the solver boundary.
use argmin::core::{ArgminError, Error};

use crate::gp::errors::GpError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Objective seam ----
    /// Analytic gradients requested from an objective without them.
    NonDifferentiableObjective,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Parameter vector length does not match the objective.
    PointDimMismatch {
        expected: usize,
        actual: usize,
    },

    /// Objective returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// A recoverable numerical failure inside the objective (indefinite
    /// kernel matrix, rejected hyperparameter proposal). The multistart
    /// loop records these as failed attempts instead of propagating.
    NumericalFailure {
        reason: String,
    },

    // ---- Solver options ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Domain ----
    /// Interval bounds must be finite with `min <= max`.
    InvalidDomainBounds {
        index: usize,
        min: f64,
        max: f64,
    },

    /// Log-space sampling requires strictly positive lower bounds.
    LogSampleNonPositiveBound {
        index: usize,
        min: f64,
    },

    /// A domain must span at least one dimension.
    EmptyDomain,

    // ---- Multistart ----
    /// Multistart fraction must lie in [0, 1].
    InvalidSuccessFraction {
        fraction: f64,
    },

    /// Neither selected starts nor a positive multistart count supplied.
    NoStartingPoints,

    /// The configured starts and the backup pool are exhausted without
    /// reaching the success quorum.
    QuorumNotReached {
        attempts: usize,
        successes: usize,
        required: usize,
    },

    /// The solver finished without producing a best parameter vector.
    MissingTerminalPoint,

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated. Line searches raise this
    /// when they cannot make progress from a pathological start; the
    /// multistart loop records it as a failed attempt.
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// Whether the multistart loop may record this error as a failed
    /// attempt instead of propagating it.
    ///
    /// Covers the per-start pathologies: numerical failures inside the
    /// objective, non-finite values, and solver-side line-search
    /// breakdowns. Configuration and backend errors stay terminal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OptError::NumericalFailure { .. }
                | OptError::NonFiniteCost { .. }
                | OptError::ConditionViolated { .. }
        )
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Objective seam ----
            OptError::NonDifferentiableObjective => {
                write!(f, "Objective does not provide analytic gradients")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            OptError::PointDimMismatch { expected, actual } => {
                write!(f, "Point dimension mismatch: expected {expected}, actual {actual}")
            }
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite objective value: {value}")
            }
            OptError::NumericalFailure { reason } => {
                write!(f, "Numerical failure in objective: {reason}")
            }

            // ---- Solver options ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Domain ----
            OptError::InvalidDomainBounds { index, min, max } => {
                write!(f, "Invalid domain bounds at dimension {index}: [{min}, {max}]")
            }
            OptError::LogSampleNonPositiveBound { index, min } => {
                write!(
                    f,
                    "Log-space sampling requires positive bounds; dimension {index} starts \
                     at {min}"
                )
            }
            OptError::EmptyDomain => {
                write!(f, "Domain must span at least one dimension")
            }

            // ---- Multistart ----
            OptError::InvalidSuccessFraction { fraction } => {
                write!(f, "Multistart success fraction must lie in [0, 1], got {fraction}")
            }
            OptError::NoStartingPoints => {
                write!(
                    f,
                    "No starting points: supply selected starts or a positive multistart count"
                )
            }
            OptError::QuorumNotReached { attempts, successes, required } => {
                write!(
                    f,
                    "Multistart quorum not reached: {successes} successes out of {attempts} \
                     attempts, {required} required"
                )
            }
            OptError::MissingTerminalPoint => {
                write!(f, "Solver finished without a best parameter vector")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    /// Recover error identity across the Argmin boundary.
    ///
    /// Errors this crate raised inside cost/gradient closures come back
    /// first; genuine Argmin errors are mapped to their wrappers; anything
    /// else becomes a `BackendError` with its display text.
    fn from(original_err: Error) -> Self {
        match original_err.downcast::<OptError>() {
            Ok(opt_err) => opt_err,
            Err(other) => match other.downcast::<ArgminError>() {
                Ok(argmin_err) => match argmin_err {
                    ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                    ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                    ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                    ArgminError::ConditionViolated { text } => {
                        OptError::ConditionViolated { text }
                    }
                    ArgminError::CheckpointNotFound { text } => {
                        OptError::CheckPointNotFound { text }
                    }
                    ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                    ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                    _ => OptError::UnknownError,
                },
                Err(err) => OptError::BackendError { text: err.to_string() },
            },
        }
    }
}

impl From<GpError> for OptError {
    /// Numerical GP failures become recoverable `NumericalFailure`s; any
    /// other GP error is a terminal backend error.
    fn from(err: GpError) -> Self {
        if err.is_numerical() {
            OptError::NumericalFailure { reason: err.to_string() }
        } else {
            OptError::BackendError { text: err.to_string() }
        }
    }
}
