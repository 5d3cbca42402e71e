//! Single-start local optimization runner.
//!
//! Purpose
//! -------
//! Run one L-BFGS solve of an [`Optimizable`] from its current point and
//! report an explicit [`LocalOutcome`]: terminal point, value, and a
//! success flag derived from the solver's termination status. Failure is
//! data, not control flow; the only errors this layer returns are
//! configuration problems and evaluation errors the solver could not
//! step around.
//!
//! Key behaviors
//! -------------
//! - [`GradientMode::Analytic`] requires the objective's capability flag;
//!   construction of the run fails with `NonDifferentiableObjective`
//!   otherwise. [`GradientMode::FiniteDifference`] works for any
//!   objective.
//! - The solver is seeded with the objective's current point; on
//!   completion the objective is moved to the terminal point, so the
//!   caller can immediately evaluate or predict there.
//! - `success` is true only for a solver-reported convergence
//!   (gradient/cost tolerance); hitting the iteration cap is not a
//!   success.
use crate::optimize::{
    adapter::{GradientMode, ObjectiveAdapter},
    builders::{LineSearcher, SolverOptions, build_solver_hager_zhang, build_solver_more_thuente},
    errors::OptResult,
    objective::Optimizable,
    types::{Grad, Point, Value},
    validation::validate_terminal_point,
};
use argmin::core::{Executor, State, TerminationReason, TerminationStatus};

/// Result of one local solver run.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOutcome {
    /// Where the solver started.
    pub starting_point: Point,
    /// Best point found.
    pub point: Point,
    /// Objective value at `point` (maximization space).
    pub value: Value,
    /// Solver-reported convergence; iteration-cap exits are failures.
    pub success: bool,
    /// Iterations performed.
    pub iterations: u64,
    /// Human-readable termination status.
    pub status: String,
}

/// One-shot local optimizer: solver options plus gradient mode.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOptimizer {
    options: SolverOptions,
    mode: GradientMode,
}

impl LocalOptimizer {
    pub fn new(options: SolverOptions, mode: GradientMode) -> LocalOptimizer {
        LocalOptimizer { options, mode }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn mode(&self) -> GradientMode {
        self.mode
    }

    /// Run one solve from the objective's current point.
    ///
    /// # Errors
    /// - [`crate::optimize::errors::OptError::NonDifferentiableObjective`]
    ///   when analytic mode is requested without gradients.
    /// - Evaluation errors raised at the starting point (including
    ///   recoverable `NumericalFailure`s, which the multistart loop
    ///   absorbs).
    pub fn optimize<O: Optimizable>(&self, objective: &mut O) -> OptResult<LocalOutcome> {
        if self.mode == GradientMode::Analytic && !objective.differentiable() {
            return Err(crate::optimize::errors::OptError::NonDifferentiableObjective);
        }
        let starting_point = objective.current_point();

        let (point, value, iterations, termination) = {
            let problem = ObjectiveAdapter::new(&mut *objective, self.mode);
            match self.options.line_searcher {
                LineSearcher::HagerZhang => run_lbfgs(
                    starting_point.clone(),
                    &self.options,
                    problem,
                    build_solver_hager_zhang(&self.options)?,
                )?,
                LineSearcher::MoreThuente => run_lbfgs(
                    starting_point.clone(),
                    &self.options,
                    problem,
                    build_solver_more_thuente(&self.options)?,
                )?,
            }
        };
        objective.set_current_point(point.view())?;

        let success = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        Ok(LocalOutcome {
            starting_point,
            point,
            value,
            success,
            iterations,
            status: format!("{termination:?}"),
        })
    }
}

/// Shared executor wiring for both line-search variants.
fn run_lbfgs<'a, O, S>(
    theta0: Point, opts: &SolverOptions, problem: ObjectiveAdapter<'a, O>, solver: S,
) -> OptResult<(Point, Value, u64, TerminationStatus)>
where
    O: Optimizable,
    S: argmin::core::Solver<
            ObjectiveAdapter<'a, O>,
            argmin::core::IterState<Point, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let termination = result.get_termination_status().clone();
    let point = validate_terminal_point(result.take_best_param())?;
    Ok((point, -result.get_best_cost(), iterations, termination))
}
