//! Search domains and quasi-random start generation.
//!
//! Purpose
//! -------
//! Define the [`Domain`] seam the multistart engine consumes — bounds,
//! feasibility checks, and quasi-random point generation — plus
//! [`TensorProductDomain`], a box-bounds implementation with
//! Latin-hypercube sampling so the engine is exercisable end to end
//! without an external sampler.
//!
//! Conventions
//! -----------
//! - Intervals are closed; feasibility is inclusive at both ends.
//! - Sampling is deterministic for a given construction seed: each call
//!   re-derives its generator from the stored seed, so repeated calls
//!   return the same stratified design.
//! - Log-space sampling stratifies `[ln min, ln max]` per dimension and
//!   requires strictly positive lower bounds.
use crate::optimize::errors::{OptError, OptResult};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

/// A closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedInterval {
    pub min: f64,
    pub max: f64,
}

impl ClosedInterval {
    /// Construct a validated interval (finite bounds, `min <= max`).
    ///
    /// # Errors
    /// [`OptError::InvalidDomainBounds`] with `index = 0`; use
    /// [`TensorProductDomain::new`] to get per-dimension indices.
    pub fn new(min: f64, max: f64) -> OptResult<ClosedInterval> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(OptError::InvalidDomainBounds { index: 0, min, max });
        }
        Ok(ClosedInterval { min, max })
    }

    /// Interval length.
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive membership test.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Nearest value inside the interval.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Search domain seam consumed by the multistart engine.
pub trait Domain {
    /// Number of coordinates per point.
    fn dim(&self) -> usize;

    /// Per-dimension closed bounds.
    fn domain_bounds(&self) -> Vec<ClosedInterval>;

    /// Whether `point` lies inside the domain (inclusive bounds).
    fn check_point_acceptable(&self, point: ArrayView1<f64>) -> bool;

    /// Project `point` onto the domain, coordinate by coordinate.
    ///
    /// For box bounds this is the nearest feasible point; the multistart
    /// engine uses it to pull an unconstrained solver's terminal point
    /// back onto the boundary.
    fn project_point_into_domain(&self, point: ArrayView1<f64>) -> Array1<f64> {
        Array1::from_iter(
            point
                .iter()
                .zip(self.domain_bounds())
                .map(|(&value, interval)| interval.clamp(value)),
        )
    }

    /// Draw `num_points` quasi-random points, one row each.
    ///
    /// With `log_sample` the stratification happens in log space, for
    /// hyperparameter-style domains spanning orders of magnitude.
    fn generate_quasi_random_points_in_domain(
        &self, num_points: usize, log_sample: bool,
    ) -> OptResult<Array2<f64>>;
}

/// Box domain: a product of closed intervals with Latin-hypercube
/// sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorProductDomain {
    intervals: Vec<ClosedInterval>,
    seed: u64,
}

impl TensorProductDomain {
    /// Construct from per-dimension bounds and a sampling seed.
    ///
    /// # Errors
    /// - [`OptError::EmptyDomain`] for zero dimensions.
    /// - [`OptError::InvalidDomainBounds`] naming the first dimension with
    ///   non-finite or inverted bounds.
    pub fn new(bounds: &[(f64, f64)], seed: u64) -> OptResult<TensorProductDomain> {
        if bounds.is_empty() {
            return Err(OptError::EmptyDomain);
        }
        let mut intervals = Vec::with_capacity(bounds.len());
        for (index, &(min, max)) in bounds.iter().enumerate() {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(OptError::InvalidDomainBounds { index, min, max });
            }
            intervals.push(ClosedInterval { min, max });
        }
        Ok(TensorProductDomain { intervals, seed })
    }
}

impl Domain for TensorProductDomain {
    fn dim(&self) -> usize {
        self.intervals.len()
    }

    fn domain_bounds(&self) -> Vec<ClosedInterval> {
        self.intervals.clone()
    }

    fn check_point_acceptable(&self, point: ArrayView1<f64>) -> bool {
        point.len() == self.dim()
            && point
                .iter()
                .zip(self.intervals.iter())
                .all(|(&value, interval)| interval.contains(value))
    }

    /// Latin-hypercube design: per dimension, one point per stratum of a
    /// `num_points`-way split, with independently shuffled stratum
    /// assignments across dimensions.
    fn generate_quasi_random_points_in_domain(
        &self, num_points: usize, log_sample: bool,
    ) -> OptResult<Array2<f64>> {
        if log_sample {
            for (index, interval) in self.intervals.iter().enumerate() {
                if interval.min <= 0.0 {
                    return Err(OptError::LogSampleNonPositiveBound {
                        index,
                        min: interval.min,
                    });
                }
            }
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points = Array2::zeros((num_points, self.dim()));
        let mut strata: Vec<usize> = (0..num_points).collect();
        for (j, interval) in self.intervals.iter().enumerate() {
            strata.shuffle(&mut rng);
            let (low, span) = if log_sample {
                (interval.min.ln(), interval.max.ln() - interval.min.ln())
            } else {
                (interval.min, interval.length())
            };
            for (i, &stratum) in strata.iter().enumerate() {
                let fraction = (stratum as f64 + rng.gen::<f64>()) / num_points as f64;
                let coordinate = low + fraction * span;
                points[[i, j]] = if log_sample { coordinate.exp() } else { coordinate };
            }
        }
        Ok(points)
    }
}
