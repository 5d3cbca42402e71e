//! The objective seam between domain models and the optimizer.
//!
//! Purpose
//! -------
//! Define [`Optimizable`], the contract every maximization target
//! implements: a current point the solver moves, a scalar value, and
//! (capability-gated) an analytic gradient. The multistart engine is
//! written entirely against this trait, so any stateful model can be
//! tuned, not just the GP likelihood.
//!
//! Conventions
//! -----------
//! - Objectives are MAXIMIZED; the adapter owns the sign flip into
//!   Argmin's minimization convention.
//! - Objectives are stateful: `set_current_point` mutates the model in
//!   place (rebuilding whatever caches it keeps) and subsequent
//!   `compute_*` calls evaluate at that point.
//! - Recoverable evaluation failures surface as
//!   [`OptError::NumericalFailure`]; the multistart loop records them as
//!   failed attempts.
use crate::covariance::traits::Covariance;
use crate::gp::log_marginal::GpLogMarginalLikelihood;
use crate::optimize::{
    errors::{OptError, OptResult},
    types::{Grad, Point, Value},
};
use ndarray::ArrayView1;

/// A stateful maximization target.
pub trait Optimizable {
    /// Whether [`Optimizable::compute_grad_objective_function`] is
    /// callable.
    fn differentiable(&self) -> bool;

    /// Number of free parameters.
    fn num_parameters(&self) -> usize;

    /// The current parameter vector.
    fn current_point(&self) -> Point;

    /// Move the objective to `point`, rebuilding internal state.
    ///
    /// # Errors
    /// [`OptError::PointDimMismatch`] for a wrong-length vector;
    /// [`OptError::NumericalFailure`] for a rejected or numerically
    /// infeasible point.
    fn set_current_point(&mut self, point: ArrayView1<f64>) -> OptResult<()>;

    /// Objective value at the current point.
    fn compute_objective_function(&self) -> OptResult<Value>;

    /// Gradient of the objective at the current point.
    ///
    /// # Errors
    /// [`OptError::NonDifferentiableObjective`] when
    /// [`Optimizable::differentiable`] is false.
    fn compute_grad_objective_function(&self) -> OptResult<Grad>;
}

impl<C: Covariance> Optimizable for GpLogMarginalLikelihood<C> {
    fn differentiable(&self) -> bool {
        GpLogMarginalLikelihood::differentiable(self)
    }

    fn num_parameters(&self) -> usize {
        self.num_hyperparameters()
    }

    fn current_point(&self) -> Point {
        self.hyperparameters()
    }

    fn set_current_point(&mut self, point: ArrayView1<f64>) -> OptResult<()> {
        if point.len() != self.num_hyperparameters() {
            return Err(OptError::PointDimMismatch {
                expected: self.num_hyperparameters(),
                actual: point.len(),
            });
        }
        self.set_hyperparameters(point)?;
        Ok(())
    }

    fn compute_objective_function(&self) -> OptResult<Value> {
        Ok(self.compute_log_likelihood())
    }

    fn compute_grad_objective_function(&self) -> OptResult<Grad> {
        if !GpLogMarginalLikelihood::differentiable(self) {
            return Err(OptError::NonDifferentiableObjective);
        }
        Ok(self.compute_grad_log_likelihood()?)
    }
}
