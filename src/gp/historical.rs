//! Validated historical observations for a Gaussian process.
//!
//! Purpose
//! -------
//! Own the `(points, values, noise_variance)` triple every GP is fit to,
//! with all consistency checks done once at construction so downstream code
//! can index freely:
//!
//! - at least one observation;
//! - one value and one noise entry per sampled point;
//! - every coordinate and value finite;
//! - noise entries finite and non-negative (zero is legal).
use crate::covariance::validation::validate_noise_variance;
use crate::gp::errors::{GpError, GpResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Immutable, validated observation set.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalData {
    points: Array2<f64>,
    values: Array1<f64>,
    noise_variance: Array1<f64>,
}

impl HistoricalData {
    /// Validate and take ownership of an observation set.
    ///
    /// # Errors
    /// - [`GpError::EmptyHistoricalData`] for zero observations.
    /// - [`GpError::HistoricalLengthMismatch`] when the three lengths
    ///   disagree.
    /// - [`GpError::NonFiniteObservation`] naming the first row with a NaN
    ///   or infinite coordinate or value.
    /// - Noise entries are checked by the covariance-layer validator and
    ///   pass through as [`GpError::Covariance`].
    pub fn new(
        points: Array2<f64>, values: Array1<f64>, noise_variance: Array1<f64>,
    ) -> GpResult<HistoricalData> {
        let n = points.nrows();
        if n == 0 {
            return Err(GpError::EmptyHistoricalData);
        }
        if values.len() != n || noise_variance.len() != n {
            return Err(GpError::HistoricalLengthMismatch {
                points: n,
                values: values.len(),
                noise: noise_variance.len(),
            });
        }
        for (index, (row, &value)) in points.rows().into_iter().zip(values.iter()).enumerate() {
            if !value.is_finite() || row.iter().any(|c| !c.is_finite()) {
                return Err(GpError::NonFiniteObservation { index });
            }
        }
        validate_noise_variance(noise_variance.view(), n)?;
        Ok(HistoricalData { points, values, noise_variance })
    }

    /// Sampled points, one row per observation.
    pub fn points(&self) -> ArrayView2<f64> {
        self.points.view()
    }

    /// Observed objective values.
    pub fn values(&self) -> ArrayView1<f64> {
        self.values.view()
    }

    /// Per-observation measurement noise variance.
    pub fn noise_variance(&self) -> ArrayView1<f64> {
        self.noise_variance.view()
    }

    /// Number of observations.
    pub fn num_sampled(&self) -> usize {
        self.points.nrows()
    }

    /// Number of coordinates per point.
    pub fn dim(&self) -> usize {
        self.points.ncols()
    }
}
