//! Multitask tensor-product covariance.
//!
//! Purpose
//! -------
//! Correlate observations across related tasks by composing two radial
//! kernels as a product:
//!
//! `K((x, t), (z, s)) = pv · K_phys(x, z) · K_task(t, s)`
//!
//! where `x, z` are physical coordinates and `t, s` are scalar task
//! coordinates carried as the LAST input column.
//!
//! Invariants & assumptions
//! ------------------------
//! - Both sub-kernels have their process variance pinned to `1.0`; the
//!   combined `pv` is the single source of truth for the learned scale.
//! - Hyperparameter layout: `[pv, phys length scales.., task length scale]`.
//! - The spatial gradient spans the physical coordinates only; the task
//!   column is an index, not a differentiated input, so
//!   `grad_dim() == dim() − 1`.
use crate::covariance::{
    errors::{CovarianceError, CovarianceResult},
    kernel::RadialCovariance,
    radial::RadialFamily,
    traits::Covariance,
    validation::{validate_hyperparameters, validate_point_dim},
};
use ndarray::{Array1, ArrayView1, Axis, s};

/// Product of a physical radial kernel and a single-dimension task kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct MultitaskCovariance {
    process_variance: f64,
    phys: RadialCovariance,
    task: RadialCovariance,
}

impl MultitaskCovariance {
    /// Construct from `[pv, phys length scales.., task length scale]`.
    ///
    /// The physical dimension is `hyperparameters.len() − 2`; points carry
    /// one extra trailing task coordinate.
    ///
    /// # Errors
    /// - [`CovarianceError::HyperparameterLengthMismatch`] for fewer than
    ///   three entries (pv + at least one physical scale + task scale).
    /// - [`CovarianceError::HyperparameterInvalid`] for any NaN, infinite,
    ///   or non-positive entry.
    pub fn new(
        phys_family: RadialFamily, task_family: RadialFamily,
        hyperparameters: ArrayView1<f64>,
    ) -> CovarianceResult<MultitaskCovariance> {
        if hyperparameters.len() < 3 {
            return Err(CovarianceError::HyperparameterLengthMismatch {
                expected: 3,
                actual: hyperparameters.len(),
            });
        }
        validate_hyperparameters(hyperparameters, hyperparameters.len())?;
        let phys_dim = hyperparameters.len() - 2;
        let (phys, task) = Self::build_sub_kernels(
            phys_family,
            task_family,
            hyperparameters.slice(s![1..1 + phys_dim]),
            hyperparameters[1 + phys_dim],
        )?;
        Ok(MultitaskCovariance { process_variance: hyperparameters[0], phys, task })
    }

    /// The combined process variance (first hyperparameter).
    pub fn process_variance(&self) -> f64 {
        self.process_variance
    }

    /// Number of physical coordinates (excludes the task column).
    pub fn phys_dim(&self) -> usize {
        self.phys.dim()
    }

    /// Rebuild both sub-kernels with process variance pinned to one.
    fn build_sub_kernels(
        phys_family: RadialFamily, task_family: RadialFamily,
        phys_scales: ArrayView1<f64>, task_scale: f64,
    ) -> CovarianceResult<(RadialCovariance, RadialCovariance)> {
        let mut phys_hp = Array1::ones(1 + phys_scales.len());
        phys_hp.slice_mut(s![1..]).assign(&phys_scales);
        let phys = RadialCovariance::new(phys_family, phys_hp.view())?;
        let task = RadialCovariance::new(task_family, Array1::from(vec![1.0, task_scale]).view())?;
        Ok((phys, task))
    }

    /// Split a point into its physical slice and single-entry task slice.
    fn split<'a>(
        &self, point: ArrayView1<'a, f64>,
    ) -> CovarianceResult<(ArrayView1<'a, f64>, ArrayView1<'a, f64>)> {
        validate_point_dim(point, self.dim())?;
        Ok(point.split_at(Axis(0), self.phys_dim()))
    }

    /// `NonDifferentiable` unless both sub-kernels carry derivatives.
    fn require_differentiable(&self) -> CovarianceResult<()> {
        if !self.differentiable() {
            return Err(CovarianceError::NonDifferentiable { tag: self.covariance_tag() });
        }
        Ok(())
    }
}

impl Covariance for MultitaskCovariance {
    fn covariance_tag(&self) -> &'static str {
        "multitask_tensor"
    }

    fn dim(&self) -> usize {
        self.phys.dim() + 1
    }

    fn grad_dim(&self) -> usize {
        self.phys.dim()
    }

    fn num_hyperparameters(&self) -> usize {
        2 + self.phys.dim()
    }

    fn hyperparameters(&self) -> Array1<f64> {
        let mut out = Array1::zeros(self.num_hyperparameters());
        out[0] = self.process_variance;
        let phys_hp = self.phys.hyperparameters();
        out.slice_mut(s![1..1 + self.phys.dim()]).assign(&phys_hp.slice(s![1..]));
        out[1 + self.phys.dim()] = self.task.hyperparameters()[1];
        out
    }

    fn set_hyperparameters(&mut self, hyperparameters: ArrayView1<f64>) -> CovarianceResult<()> {
        validate_hyperparameters(hyperparameters, self.num_hyperparameters())?;
        let phys_dim = self.phys.dim();
        let (phys, task) = Self::build_sub_kernels(
            self.phys.family(),
            self.task.family(),
            hyperparameters.slice(s![1..1 + phys_dim]),
            hyperparameters[1 + phys_dim],
        )?;
        self.process_variance = hyperparameters[0];
        self.phys = phys;
        self.task = task;
        Ok(())
    }

    fn differentiable(&self) -> bool {
        self.phys.differentiable() && self.task.differentiable()
    }

    fn point_covariance(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> CovarianceResult<f64> {
        let (x_phys, x_task) = self.split(x)?;
        let (z_phys, z_task) = self.split(z)?;
        let phys = self.phys.point_covariance(x_phys, z_phys)?;
        let task = self.task.point_covariance(x_task, z_task)?;
        Ok(self.process_variance * phys * task)
    }

    /// Product rule over the physical coordinates only:
    /// `∂K/∂xᵢ = pv · K_task · ∂K_phys/∂xᵢ`.
    fn point_grad_covariance(
        &self, x: ArrayView1<f64>, z: ArrayView1<f64>,
    ) -> CovarianceResult<Array1<f64>> {
        self.require_differentiable()?;
        let (x_phys, x_task) = self.split(x)?;
        let (z_phys, z_task) = self.split(z)?;
        let task = self.task.point_covariance(x_task, z_task)?;
        let phys_grad = self.phys.point_grad_covariance(x_phys, z_phys)?;
        Ok(phys_grad * (self.process_variance * task))
    }

    /// `[K_phys·K_task, pv·K_task·∂K_phys/∂ℓᵢ.., pv·K_phys·∂K_task/∂ℓ_task]`.
    ///
    /// The sub-kernel hyperparameter gradients carry a leading slot for
    /// their pinned process variance; those slots are skipped here.
    fn point_hyperparameter_grad_covariance(
        &self, x: ArrayView1<f64>, z: ArrayView1<f64>,
    ) -> CovarianceResult<Array1<f64>> {
        self.require_differentiable()?;
        let (x_phys, x_task) = self.split(x)?;
        let (z_phys, z_task) = self.split(z)?;
        let phys = self.phys.point_covariance(x_phys, z_phys)?;
        let task = self.task.point_covariance(x_task, z_task)?;
        let phys_hp_grad = self.phys.point_hyperparameter_grad_covariance(x_phys, z_phys)?;
        let task_hp_grad = self.task.point_hyperparameter_grad_covariance(x_task, z_task)?;

        let d = self.phys.dim();
        let mut grad = Array1::zeros(self.num_hyperparameters());
        grad[0] = phys * task;
        for i in 0..d {
            grad[1 + i] = self.process_variance * task * phys_hp_grad[1 + i];
        }
        grad[1 + d] = self.process_variance * phys * task_hp_grad[1];
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::matrix::build_kernel_matrix;
    use ndarray::{Array2, array};

    fn kernel() -> MultitaskCovariance {
        // 2 physical dimensions + task column.
        MultitaskCovariance::new(
            RadialFamily::SquareExponential,
            RadialFamily::MaternFiveHalves,
            array![2.0, 0.7, 1.3, 0.9].view(),
        )
        .expect("valid hyperparameters")
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The tensor-product factorization against manually composed
    //   sub-kernel values.
    // - Dimension accounting: dim() counts the task column, grad_dim()
    //   does not.
    // - Finite-difference agreement of spatial and hyperparameter gradients
    //   through the product rule.
    // - Symmetry of the composite kernel, agreement of the batched matrix
    //   builder and the paired row-wise form with pointwise evaluation.
    // - Hyperparameter validation and round-tripping through the combined
    //   layout.
    //
    // They intentionally DO NOT cover:
    // - Radial profile math (covariance::radial / covariance::kernel tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The multitask covariance equals pv times the product of the two
    // sub-kernel values, each evaluated with unit process variance.
    //
    // Given
    // -----
    // - A 2-D physical pair on distinct tasks, and standalone sub-kernels
    //   built with the same length scales.
    //
    // Expect
    // ------
    // - K((x,t),(z,s)) == 2.0 · K_phys(x,z) · K_task(t,s) within 1e-15.
    fn factorizes_as_product_of_sub_kernels() {
        let cov = kernel();
        let x = array![0.2, -0.5, 0.0];
        let z = array![0.9, 0.1, 1.0];

        let phys = RadialCovariance::new(
            RadialFamily::SquareExponential,
            array![1.0, 0.7, 1.3].view(),
        )
        .unwrap();
        let task =
            RadialCovariance::new(RadialFamily::MaternFiveHalves, array![1.0, 0.9].view())
                .unwrap();
        let expected = 2.0
            * phys.point_covariance(x.slice(s![..2]), z.slice(s![..2])).unwrap()
            * task.point_covariance(x.slice(s![2..]), z.slice(s![2..])).unwrap();

        let value = cov.point_covariance(x.view(), z.view()).unwrap();
        assert!((value - expected).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // dim() includes the task column, grad_dim() excludes it, and the
    // hyperparameter vector round-trips through the combined layout.
    //
    // Given
    // -----
    // - A kernel over 2 physical dimensions.
    //
    // Expect
    // ------
    // - dim() == 3, grad_dim() == 2, num_hyperparameters() == 4.
    // - hyperparameters() returns the construction vector; after
    //   set_hyperparameters the new vector is returned verbatim.
    fn dimension_accounting_and_hyperparameter_round_trip() {
        let mut cov = kernel();
        assert_eq!(cov.dim(), 3);
        assert_eq!(cov.grad_dim(), 2);
        assert_eq!(cov.num_hyperparameters(), 4);
        assert_eq!(cov.hyperparameters(), array![2.0, 0.7, 1.3, 0.9]);

        let updated = array![1.0, 1.1, 0.6, 2.0];
        cov.set_hyperparameters(updated.view()).expect("valid update");
        assert_eq!(cov.hyperparameters(), updated);
    }

    #[test]
    // Purpose
    // -------
    // The composite kernel is symmetric in its arguments, and the batched
    // symmetric matrix agrees with pointwise evaluation entry by entry.
    //
    // Given
    // -----
    // - Four (physical, task) points mixing two task coordinates.
    //
    // Expect
    // ------
    // - k(x, z) == k(z, x) for every pair; build_kernel_matrix equals the
    //   pointwise matrix within 1e-15 and is exactly symmetric.
    fn symmetry_and_matrix_builder_agree_with_pointwise() {
        let cov = kernel();
        let points = array![
            [0.2, -0.5, 0.0],
            [0.9, 0.1, 1.0],
            [-0.4, 0.3, 0.0],
            [0.6, -0.2, 1.0],
        ];

        let matrix = build_kernel_matrix(&cov, points.view(), None, None).unwrap();
        assert_eq!(matrix.dim(), (4, 4));
        for i in 0..4 {
            for j in 0..4 {
                let forward =
                    cov.point_covariance(points.row(i), points.row(j)).unwrap();
                let backward =
                    cov.point_covariance(points.row(j), points.row(i)).unwrap();
                assert!((forward - backward).abs() < 1e-15, "({i}, {j})");
                assert!((matrix[[i, j]] - forward).abs() < 1e-15, "({i}, {j})");
                assert_eq!(matrix[[i, j]], matrix[[j, i]]);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The paired row-wise covariance of the trait matches pointwise
    // evaluation per row and rejects mismatched shapes.
    //
    // Given
    // -----
    // - Two 3-row point arrays over the composite kernel, then a pair
    //   with differing row counts.
    //
    // Expect
    // ------
    // - out[i] == k(x[i], z[i]) within 1e-15 for each row; the mismatch
    //   fails with ShapeMismatch naming both shapes.
    fn paired_covariance_matches_pointwise_rows() {
        let cov = kernel();
        let x = array![[0.2, -0.5, 0.0], [0.9, 0.1, 1.0], [-0.4, 0.3, 0.0]];
        let z = array![[0.6, -0.2, 1.0], [0.0, 0.0, 0.0], [0.5, 0.5, 1.0]];

        let paired = cov.covariance(x.view(), z.view()).unwrap();
        assert_eq!(paired.len(), 3);
        for i in 0..3 {
            let pointwise = cov.point_covariance(x.row(i), z.row(i)).unwrap();
            assert!((paired[i] - pointwise).abs() < 1e-15, "row {i}");
        }

        let short = Array2::<f64>::zeros((2, 3));
        let err = cov.covariance(x.view(), short.view()).expect_err("row mismatch");
        assert_eq!(err, CovarianceError::ShapeMismatch { left: (3, 3), right: (2, 3) });
    }

    #[test]
    // Purpose
    // -------
    // The spatial gradient spans physical coordinates only and matches a
    // central finite difference in each of them.
    //
    // Given
    // -----
    // - A fixed point pair with distinct task coordinates, step 1e-6.
    //
    // Expect
    // ------
    // - Gradient length 2; |analytic − FD| < 1e-6 per coordinate.
    fn spatial_gradient_matches_finite_difference() {
        let cov = kernel();
        let x = array![0.2, -0.5, 0.0];
        let z = array![0.9, 0.1, 1.0];
        let grad = cov.point_grad_covariance(x.view(), z.view()).unwrap();
        assert_eq!(grad.len(), 2);

        let h = 1e-6;
        for i in 0..2 {
            let mut hi = x.clone();
            let mut lo = x.clone();
            hi[i] += h;
            lo[i] -= h;
            let fd = (cov.point_covariance(hi.view(), z.view()).unwrap()
                - cov.point_covariance(lo.view(), z.view()).unwrap())
                / (2.0 * h);
            assert!((grad[i] - fd).abs() < 1e-6, "dim {i}: analytic {}, fd {fd}", grad[i]);
        }
    }

    #[test]
    // Purpose
    // -------
    // The hyperparameter gradient over [pv, phys scales, task scale]
    // matches central finite differences through the product rule.
    //
    // Given
    // -----
    // - A fixed point pair, step 1e-6 per hyperparameter.
    //
    // Expect
    // ------
    // - |analytic − FD| < 1e-5 for each of the four hyperparameters.
    fn hyperparameter_gradient_matches_finite_difference() {
        let cov = kernel();
        let x = array![0.2, -0.5, 0.0];
        let z = array![0.9, 0.1, 1.0];
        let grad = cov.point_hyperparameter_grad_covariance(x.view(), z.view()).unwrap();
        assert_eq!(grad.len(), 4);

        let h = 1e-6;
        for p in 0..4 {
            let mut hi = cov.clone();
            let mut lo = cov.clone();
            let mut hp_hi = cov.hyperparameters();
            let mut hp_lo = cov.hyperparameters();
            hp_hi[p] += h;
            hp_lo[p] -= h;
            hi.set_hyperparameters(hp_hi.view()).unwrap();
            lo.set_hyperparameters(hp_lo.view()).unwrap();
            let fd = (hi.point_covariance(x.view(), z.view()).unwrap()
                - lo.point_covariance(x.view(), z.view()).unwrap())
                / (2.0 * h);
            assert!((grad[p] - fd).abs() < 1e-5, "hp {p}: analytic {}, fd {fd}", grad[p]);
        }
    }

    #[test]
    // Purpose
    // -------
    // A non-differentiable task family disables gradients for the whole
    // product kernel while values keep working.
    //
    // Given
    // -----
    // - A multitask kernel whose task family is the C0 Matérn.
    //
    // Expect
    // ------
    // - `differentiable()` is false; the gradient entry points fail with
    //   `NonDifferentiable`; `point_covariance` succeeds.
    fn non_differentiable_task_family_disables_gradients() {
        let cov = MultitaskCovariance::new(
            RadialFamily::SquareExponential,
            RadialFamily::MaternHalf,
            array![1.0, 1.0, 1.0].view(),
        )
        .unwrap();
        let x = array![0.0, 0.0, 0.0];
        let z = array![1.0, 1.0, 1.0];
        assert!(!cov.differentiable());
        assert!(cov.point_covariance(x.view(), z.view()).is_ok());
        let err = cov.point_grad_covariance(x.view(), z.view()).expect_err("gated");
        assert!(matches!(err, CovarianceError::NonDifferentiable { .. }));
    }
}
