//! Multistart hyperparameter optimization built on Argmin.
//!
//! Purpose
//! -------
//! Maximize any stateful objective — in this crate, the GP log-marginal
//! likelihood — with L-BFGS local solves launched from many starting
//! points over a search domain. Callers implement [`Optimizable`], pick
//! tolerances and a quorum policy, and receive an explicit best point
//! plus a per-attempt record; raw solver details stay internal.
//!
//! Key behaviors
//! -------------
//! - [`objective::Optimizable`] is the seam between domain models and the
//!   solver; [`adapter`] flips it into Argmin's minimization convention
//!   with analytic or finite-difference gradients.
//! - [`builders`] and [`local`] wrap solver construction and a single
//!   solve into [`LocalOutcome`], where failure is a flag, not an
//!   exception.
//! - [`domain`] supplies bounds, feasibility, and Latin-hypercube start
//!   generation; [`multistart`] runs the quorum loop with a backup pool.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are maximized; the cost sign flip lives entirely in the
//!   adapter.
//! - Objectives treat rejected or numerically infeasible points as
//!   recoverable [`OptError`] values, never panics; the multistart loop
//!   records such attempts and moves on.
//! - Errors raised inside solver closures round-trip through
//!   `argmin::core::Error` without losing identity.
//!
//! Conventions
//! -----------
//! - Parameters and gradients use the [`types::Point`] / [`types::Grad`]
//!   aliases (`Array1<f64>`); values are in maximization space.
//! - Public entrypoints return [`OptResult<T>`]; callers never see raw
//!   Argmin errors.
//!
//! Testing notes
//! -------------
//! - Submodule tests cover local concerns (validation, adapter sign
//!   conventions, solver wiring, quorum accounting) on toy quadratics.
//! - `tests/integration_gp_multistart.rs` drives the full stack against
//!   analytic optima.
pub mod adapter;
pub mod builders;
pub mod domain;
pub mod errors;
pub mod local;
pub mod multistart;
pub mod objective;
pub mod types;
pub mod validation;

pub use adapter::GradientMode;
pub use builders::{LineSearcher, SolverOptions, Tolerances};
pub use domain::{ClosedInterval, Domain, TensorProductDomain};
pub use errors::{OptError, OptResult};
pub use local::{LocalOptimizer, LocalOutcome};
pub use multistart::{
    DEFAULT_BACKUP_POOL_SIZE, MultistartOptimizer, MultistartOptions, OptimizationResults,
};
pub use objective::Optimizable;
pub use types::{Grad, Point, Value};
