//! Solver configuration and L-BFGS construction helpers.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring behind small builders: callers pick a
//! line search and tolerances through [`SolverOptions`] and get back a
//! fully configured L-BFGS instance, leaving the initial point and
//! iteration cap to the runner layer.
//!
//! Conventions
//! -----------
//! - Tolerances are validated once in [`Tolerances::new`]; at least one
//!   stopping rule must be present.
//! - When a tolerance is `None` the corresponding `with_tolerance_*`
//!   call is skipped and Argmin's default stays in effect.
//! - Errors from Argmin's configuration calls surface through the
//!   crate's `From<argmin::core::Error>` conversion; raw Argmin errors
//!   never leak across module boundaries.
use argmin::solver::quasinewton::LBFGS;
use std::str::FromStr;

use crate::optimize::{
    errors::{OptError, OptResult},
    types::{
        DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS,
        Point, Value,
    },
    validation::{verify_tol_cost, verify_tol_grad},
};

/// Choice of line search used inside the L-BFGS solver.
///
/// Parses case-insensitively from `"MoreThuente"` / `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Numerical tolerances and iteration limits for a local solve.
///
/// Any field can be `None` but at least one of the three must be
/// provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Configuration of one local solver run.
///
/// Defaults: `tol_grad = 1e-6`, `max_iter = 300`, More–Thuente line
/// search, quiet, default L-BFGS memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl SolverOptions {
    /// Create a new set of solver options.
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] for an explicit zero memory.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(mem) = lbfgs_mem {
            if mem == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Construct L-BFGS with the Hager–Zhang line search.
///
/// # Errors
/// Returned when Argmin rejects a tolerance setting.
pub fn build_solver_hager_zhang(opts: &SolverOptions) -> OptResult<LbfgsHagerZhang> {
    let line_search = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(line_search, mem), opts)
}

/// Construct L-BFGS with the More–Thuente line search.
///
/// # Errors
/// Returned when Argmin rejects a tolerance setting.
pub fn build_solver_more_thuente(opts: &SolverOptions) -> OptResult<LbfgsMoreThuente> {
    let line_search = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(line_search, mem), opts)
}

/// Apply optional tolerances to an L-BFGS solver, regardless of line
/// search.
///
/// # Errors
/// Returned when `with_tolerance_grad` / `with_tolerance_cost` rejects a
/// value.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Point, Grad, Value>, opts: &SolverOptions,
) -> OptResult<LBFGS<L, Point, Grad, Value>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
