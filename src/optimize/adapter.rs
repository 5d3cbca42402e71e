//! Adapter that exposes an [`Optimizable`] as an `argmin` problem.
//!
//! We convert a *maximization* of an objective `f(x)` into a
//! *minimization* problem by defining the cost as `c(x) = -f(x)`. In
//! analytic mode the objective's gradient is negated accordingly. In
//! finite-difference mode we differentiate the **cost** closure, so no
//! sign flip is needed in that branch.
//!
//! The objective is stateful, so the adapter holds it behind a `RefCell`:
//! every cost/gradient evaluation first moves the objective to the
//! requested point, then evaluates.
use std::cell::RefCell;

use crate::optimize::{
    errors::OptError,
    objective::Optimizable,
    types::{Grad, Point, Value},
    validation::validate_grad,
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// How the adapter produces gradients for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientMode {
    /// Use the objective's analytic gradient (requires
    /// `differentiable()`).
    Analytic,
    /// Finite-difference the cost closure; works for any objective.
    FiniteDifference,
}

/// Bridges an [`Optimizable`] to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `-f(x)`.
/// - `Gradient::gradient` returns `-∇f(x)` in analytic mode, or a
///   finite-difference gradient of the cost in FD mode (central first,
///   forward retry on failure).
pub struct ObjectiveAdapter<'a, O: Optimizable> {
    objective: RefCell<&'a mut O>,
    mode: GradientMode,
}

impl<'a, O: Optimizable> ObjectiveAdapter<'a, O> {
    /// Wrap a mutable objective for one solver run.
    pub fn new(objective: &'a mut O, mode: GradientMode) -> Self {
        Self { objective: RefCell::new(objective), mode }
    }
}

impl<'a, O: Optimizable> CostFunction for ObjectiveAdapter<'a, O> {
    type Param = Point;
    type Output = Value;

    /// Evaluate the cost `c(x) = -f(x)` at `x`.
    ///
    /// # Errors
    /// Propagates seam errors from the move/evaluate pair and rejects
    /// non-finite values with `NonFiniteCost`.
    fn cost(&self, point: &Self::Param) -> Result<Self::Output, Error> {
        let mut objective = self.objective.borrow_mut();
        objective.set_current_point(point.view())?;
        let output = objective.compute_objective_function()?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, O: Optimizable> Gradient for ObjectiveAdapter<'a, O> {
    type Param = Point;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `x`.
    ///
    /// Analytic mode validates the objective's gradient and returns its
    /// negation. FD mode differentiates the cost closure: central
    /// differences first; if any cost evaluation failed (captured via
    /// `closure_err`, since the FD closure cannot return `Result`) or the
    /// result fails validation, retry once with forward differences.
    ///
    /// # Errors
    /// - Seam errors from the move/evaluate pair.
    /// - Validation errors for wrong-dimension or non-finite gradients.
    fn gradient(&self, point: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = point.len();
        match self.mode {
            GradientMode::Analytic => {
                let mut objective = self.objective.borrow_mut();
                objective.set_current_point(point.view())?;
                let grad = objective.compute_grad_objective_function()?;
                validate_grad(&grad, dim)?;
                Ok(-grad)
            }
            GradientMode::FiniteDifference => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |point: &Point| -> f64 {
                    match self.cost(point) {
                        Ok(value) => value,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = point.central_diff(&cost_func);
                if closure_err.borrow().is_some() {
                    return run_forward_diff(point, &cost_func, &closure_err);
                }
                match validate_grad(&fd_grad, dim) {
                    Ok(()) => Ok(fd_grad),
                    Err(_) => run_forward_diff(point, &cost_func, &closure_err),
                }
            }
        }
    }
}

/// Compute a forward-difference gradient of `func` at `point`, with error
/// capture.
///
/// Clears `closure_err`, performs `forward_diff`, surfaces any captured
/// error, and validates the resulting gradient.
fn run_forward_diff<G: Fn(&Point) -> f64>(
    point: &Point, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = point.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, point.len())?;
    Ok(fd_grad)
}
