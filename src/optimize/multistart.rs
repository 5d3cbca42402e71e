//! Quorum-based multistart optimization over a search domain.
//!
//! Purpose
//! -------
//! Run the local solver from many starting points and return the best
//! feasible converged point together with a full per-attempt record.
//! Individual solver failures are data: each attempt lands in
//! [`OptimizationResults`] with a NaN value when it failed, and only the
//! terminal condition — the configured starts plus the backup pool
//! exhausted below quorum — is an error.
//!
//! Key behaviors
//! -------------
//! - Starting points are caller-selected rows, topped up with
//!   quasi-random domain samples to the configured count; a fixed-size
//!   backup pool of further samples is consumed only while the quorum is
//!   still unmet.
//! - The local solver is unconstrained; a converged terminal point that
//!   stepped outside the domain is projected onto the nearest bound and
//!   re-evaluated there, so a feasible domain excluding the objective's
//!   maximum resolves to a boundary point rather than an error.
//! - Recoverable evaluation errors (rejected proposals, indefinite
//!   kernel matrices, line-search breakdowns) are recorded as failed
//!   attempts; configuration and backend errors propagate immediately.
//! - With a zero quorum the engine still returns a point: the first
//!   failed attempt's starting point stands in as a provisional best, so
//!   the fallback is always inside the domain, but it never counts
//!   toward the quorum.
//!
//! Invariants & assumptions
//! ------------------------
//! - The three record vectors in [`OptimizationResults`] always have the
//!   same length, one entry per attempt, in attempt order.
//! - Selected starts are attempted before any generated ones, in row
//!   order.
use crate::optimize::{
    domain::Domain,
    errors::{OptError, OptResult},
    local::LocalOptimizer,
    objective::Optimizable,
    types::{Point, Value},
};
use ndarray::ArrayView2;

/// Backup starts drawn beyond the configured count before giving up.
pub const DEFAULT_BACKUP_POOL_SIZE: usize = 16;

/// Multistart policy: how many starts, and how many must succeed.
///
/// The required quorum is `max(min_successes,
/// ceil(min_success_fraction * configured))` where `configured` is the
/// number of non-backup starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultistartOptions {
    /// Starts to run; `0` means "exactly the selected starts".
    pub num_multistarts: usize,
    /// Absolute success quorum.
    pub min_successes: usize,
    /// Relative success quorum, as a fraction of the configured starts.
    pub min_success_fraction: f64,
    /// Extra domain samples consumed only while the quorum is unmet.
    pub backup_pool_size: usize,
    /// Sample generated starts in log space.
    pub log_sample: bool,
}

impl MultistartOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// [`OptError::InvalidSuccessFraction`] when the fraction is not in
    /// `[0, 1]`.
    pub fn new(
        num_multistarts: usize, min_successes: usize, min_success_fraction: f64,
        backup_pool_size: usize, log_sample: bool,
    ) -> OptResult<Self> {
        if !min_success_fraction.is_finite()
            || !(0.0..=1.0).contains(&min_success_fraction)
        {
            return Err(OptError::InvalidSuccessFraction { fraction: min_success_fraction });
        }
        Ok(Self {
            num_multistarts,
            min_successes,
            min_success_fraction,
            backup_pool_size,
            log_sample,
        })
    }
}

impl Default for MultistartOptions {
    /// Selected starts only, no quorum, default backup pool, linear
    /// sampling.
    fn default() -> Self {
        Self {
            num_multistarts: 0,
            min_successes: 0,
            min_success_fraction: 0.0,
            backup_pool_size: DEFAULT_BACKUP_POOL_SIZE,
            log_sample: false,
        }
    }
}

/// Per-attempt record of a multistart run, in attempt order.
///
/// The vectors are parallel: entry `i` of each describes attempt `i`.
/// Failed attempts carry a NaN value and their starting point (or the
/// solver's terminal point, when one exists) as the ending point.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResults {
    pub starting_points: Vec<Point>,
    pub ending_points: Vec<Point>,
    pub function_values: Vec<Value>,
}

impl OptimizationResults {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            starting_points: Vec::with_capacity(capacity),
            ending_points: Vec::with_capacity(capacity),
            function_values: Vec::with_capacity(capacity),
        }
    }

    fn record(&mut self, start: Point, end: Point, value: Value) {
        self.starting_points.push(start);
        self.ending_points.push(end);
        self.function_values.push(value);
    }

    /// Number of attempts recorded.
    pub fn num_attempts(&self) -> usize {
        self.function_values.len()
    }

    /// Number of recorded successes (finite values).
    pub fn num_successes(&self) -> usize {
        self.function_values.iter().filter(|v| v.is_finite()).count()
    }
}

/// Multistart engine: a domain to sample, a local solver, and a quorum
/// policy.
#[derive(Debug, Clone, PartialEq)]
pub struct MultistartOptimizer<D: Domain> {
    domain: D,
    local: LocalOptimizer,
    options: MultistartOptions,
}

impl<D: Domain> MultistartOptimizer<D> {
    pub fn new(domain: D, local: LocalOptimizer, options: MultistartOptions) -> Self {
        Self { domain, local, options }
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn options(&self) -> &MultistartOptions {
        &self.options
    }

    /// Maximize `objective` from many starts and return the best point
    /// with the per-attempt record.
    ///
    /// `selected_starts` rows are attempted first; the start list is
    /// topped up with domain samples to the configured count and the
    /// backup pool is appended after them.
    ///
    /// A converged run whose terminal point left the domain is projected
    /// onto the nearest bound and re-evaluated there before it is scored,
    /// so the returned best point is always feasible.
    ///
    /// # Errors
    /// - [`OptError::NoStartingPoints`] with no selected starts and
    ///   `num_multistarts == 0`.
    /// - [`OptError::PointDimMismatch`] when selected starts do not match
    ///   the domain dimension.
    /// - [`OptError::QuorumNotReached`] when all starts, backup pool
    ///   included, yield fewer successes than required.
    /// - Non-recoverable solver or evaluation errors, unchanged.
    pub fn optimize<O: Optimizable>(
        &self, objective: &mut O, selected_starts: Option<ArrayView2<f64>>,
    ) -> OptResult<(Point, OptimizationResults)> {
        let num_selected = selected_starts.map_or(0, |s| s.nrows());
        if let Some(selected) = selected_starts {
            if num_selected > 0 && selected.ncols() != self.domain.dim() {
                return Err(OptError::PointDimMismatch {
                    expected: self.domain.dim(),
                    actual: selected.ncols(),
                });
            }
        }
        let configured = if self.options.num_multistarts == 0 {
            num_selected
        } else {
            self.options.num_multistarts.max(num_selected)
        };
        if configured == 0 {
            return Err(OptError::NoStartingPoints);
        }
        let required = self.options.min_successes.max(
            (self.options.min_success_fraction * configured as f64).ceil() as usize,
        );

        let num_generated = configured - num_selected + self.options.backup_pool_size;
        let generated = if num_generated > 0 {
            Some(
                self.domain
                    .generate_quasi_random_points_in_domain(num_generated, self.options.log_sample)?,
            )
        } else {
            None
        };
        let starts = selected_starts
            .iter()
            .flat_map(|s| s.rows().into_iter())
            .chain(generated.iter().flat_map(|g| g.rows().into_iter()));

        let mut results = OptimizationResults::with_capacity(configured);
        let mut attempts = 0usize;
        let mut successes = 0usize;
        let mut best: Option<(Point, Value)> = None;
        let mut provisional: Option<Point> = None;

        for start in starts {
            let start = start.to_owned();
            attempts += 1;

            if let Err(err) = objective.set_current_point(start.view()) {
                if !err.is_recoverable() {
                    return Err(err);
                }
                provisional.get_or_insert_with(|| start.clone());
                results.record(start.clone(), start, f64::NAN);
                if attempts >= configured && successes >= required {
                    break;
                }
                continue;
            }

            match self.local.optimize(objective) {
                Ok(outcome) => {
                    if outcome.success {
                        let end;
                        let value;
                        if self.domain.check_point_acceptable(outcome.point.view()) {
                            end = outcome.point;
                            value = outcome.value;
                        } else {
                            // The unconstrained solve left the box; the
                            // nearest feasible point is the answer for this
                            // start.
                            end = self.domain.project_point_into_domain(outcome.point.view());
                            match objective
                                .set_current_point(end.view())
                                .and_then(|_| objective.compute_objective_function())
                            {
                                Ok(projected_value) => value = projected_value,
                                Err(err) => {
                                    if !err.is_recoverable() {
                                        return Err(err);
                                    }
                                    provisional.get_or_insert_with(|| start.clone());
                                    results.record(start.clone(), start, f64::NAN);
                                    if attempts >= configured && successes >= required {
                                        break;
                                    }
                                    continue;
                                }
                            }
                        }
                        successes += 1;
                        let better = best
                            .as_ref()
                            .map_or(true, |(_, best_value)| value > *best_value);
                        if better {
                            best = Some((end.clone(), value));
                        }
                        results.record(start, end, value);
                    } else {
                        provisional.get_or_insert_with(|| start.clone());
                        results.record(start, outcome.point, f64::NAN);
                    }
                }
                Err(err) => {
                    if !err.is_recoverable() {
                        return Err(err);
                    }
                    provisional.get_or_insert_with(|| start.clone());
                    results.record(start.clone(), start, f64::NAN);
                }
            }

            if attempts >= configured && successes >= required {
                break;
            }
        }

        if successes < required {
            return Err(OptError::QuorumNotReached { attempts, successes, required });
        }
        let best_point = match best {
            Some((point, _)) => point,
            None => provisional.ok_or(OptError::NoStartingPoints)?,
        };
        objective.set_current_point(best_point.view())?;
        Ok((best_point, results))
    }
}
