//! Radial kernel families as a tagged-variant enum.
//!
//! Every radial kernel in this crate is a pure scalar function of the squared
//! weighted distance `r² = Σ ((xᵢ − zᵢ) / ℓᵢ)²`. A family supplies exactly two
//! pieces of data through match arms:
//!
//! - `radial(r²)`: the profile value, normalized so `radial(0) = 1` (the
//!   process variance is applied outside, once, by the owning kernel).
//! - `radial_deriv(r²)`: `d radial / d r²`, available only for
//!   differentiable families. The Matérn ν=1/2 profile `exp(−r)` has a
//!   derivative in `r²` that is singular at `r = 0`, so it reports
//!   `differentiable() == false` and returns `None` here.
//!
//! All distance-matrix and gradient-tensor machinery is shared (see
//! `covariance::matrix`); a family never reimplements it.

/// Radial covariance profile family.
///
/// Variants:
/// - `SquareExponential`: `exp(−r²/2)`; infinitely differentiable.
/// - `MaternHalf` (C0): `exp(−r)`; continuous but not differentiable.
/// - `MaternThreeHalves` (C2): `(1 + √3·r)·exp(−√3·r)`; once differentiable.
/// - `MaternFiveHalves` (C4): `(1 + √5·r + (5/3)·r²)·exp(−√5·r)`; twice
///   differentiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialFamily {
    SquareExponential,
    MaternHalf,
    MaternThreeHalves,
    MaternFiveHalves,
}

impl RadialFamily {
    /// Stable type tag for diagnostics and error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            RadialFamily::SquareExponential => "square_exponential",
            RadialFamily::MaternHalf => "matern_12",
            RadialFamily::MaternThreeHalves => "matern_32",
            RadialFamily::MaternFiveHalves => "matern_52",
        }
    }

    /// Whether spatial and hyperparameter gradients are defined everywhere.
    pub fn differentiable(&self) -> bool {
        !matches!(self, RadialFamily::MaternHalf)
    }

    /// Evaluate the radial profile at squared weighted distance `r2 >= 0`.
    ///
    /// Normalized so that `radial(0.0) == 1.0` for every family.
    pub fn radial(&self, r2: f64) -> f64 {
        match self {
            RadialFamily::SquareExponential => (-0.5 * r2).exp(),
            RadialFamily::MaternHalf => (-r2.sqrt()).exp(),
            RadialFamily::MaternThreeHalves => {
                let sqrt3_r = (3.0 * r2).sqrt();
                (1.0 + sqrt3_r) * (-sqrt3_r).exp()
            }
            RadialFamily::MaternFiveHalves => {
                let sqrt5_r = (5.0 * r2).sqrt();
                (1.0 + sqrt5_r + (5.0 / 3.0) * r2) * (-sqrt5_r).exp()
            }
        }
    }

    /// Derivative of the profile with respect to `r²`, where defined.
    ///
    /// The Matérn families are usually written in terms of `r`; the chain
    /// rule factor `1/(2r)` cancels analytically, so every differentiable
    /// arm below is finite at `r = 0`:
    ///
    /// - SquareExponential: `−½·exp(−r²/2)`
    /// - MaternThreeHalves: `−(3/2)·exp(−√3·r)`
    /// - MaternFiveHalves: `−(5/6)·(1 + √5·r)·exp(−√5·r)`
    ///
    /// Returns `None` for the non-differentiable `MaternHalf` family.
    pub fn radial_deriv(&self, r2: f64) -> Option<f64> {
        match self {
            RadialFamily::SquareExponential => Some(-0.5 * (-0.5 * r2).exp()),
            RadialFamily::MaternHalf => None,
            RadialFamily::MaternThreeHalves => {
                let sqrt3_r = (3.0 * r2).sqrt();
                Some(-1.5 * (-sqrt3_r).exp())
            }
            RadialFamily::MaternFiveHalves => {
                let sqrt5_r = (5.0 * r2).sqrt();
                Some(-(5.0 / 6.0) * (1.0 + sqrt5_r) * (-sqrt5_r).exp())
            }
        }
    }
}
