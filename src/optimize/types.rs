//! Shared numeric aliases and solver wiring for the optimizer layer.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! multistart optimizer so the rest of the optimization code stays
//! agnostic to `ndarray` and Argmin generics.
//!
//! Conventions
//! -----------
//! - [`Point`] and [`Grad`] are column vectors of length equal to the
//!   number of free parameters; [`Value`] is a scalar objective value in
//!   maximization space (sign flips live in the adapter).
//! - The line-search aliases assume Argmin's three-parameter forms
//!   `(Param, Gradient, Float)` as of the pinned Argmin version.
//! - `DEFAULT_LBFGS_MEM` is the typical L-BFGS history size; callers may
//!   override it via per-run options.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;

/// Parameter vector the optimizer moves through.
pub type Point = Array1<f64>;

/// Gradient vector, matching the shape of [`Point`].
pub type Grad = Array1<f64>;

/// Scalar objective value in maximization space.
pub type Value = f64;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Point, Grad, Value>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Point, Grad, Value>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Point, Grad, Value>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Point, Grad, Value>;
