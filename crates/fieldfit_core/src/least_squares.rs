//! Direct solution of the linear least-squares problem behind [`Regressor`].
//!
//! Stacking the basis-integral vectors `v_i` as rows of `A` and the measured
//! work as `w`, the regressor's gradient vanishes exactly on the solutions of
//! `AᵀA c = Aᵀw`.

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{DMatrix, DVector};

use crate::regressor::Regressor;

/// Singular values below `SVD_EPS * σ_max` are treated as zero.
const SVD_EPS: f64 = 1e-12;

/// Builds the design matrix `A` (one row per sample) and the work vector `w`.
pub fn design_matrix(regressor: &Regressor) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let dataset = regressor.dataset();
    let rows = dataset.len();
    if rows == 0 {
        bail!("Cannot build a design matrix for an empty dataset.");
    }
    let cols = regressor.model().coefficient_count();

    let mut a = DMatrix::zeros(rows, cols);
    for i in 0..rows {
        let v = dataset
            .basis_vector(i)
            .with_context(|| format!("Failed to build basis vector for sample {}.", i))?;
        for (j, value) in v.iter().enumerate() {
            a[(i, j)] = *value;
        }
    }
    let w = DVector::from_iterator(rows, dataset.samples().iter().map(|s| s.work));
    Ok((a, w))
}

/// Returns `(AᵀA, Aᵀw)`.
pub fn normal_equations(regressor: &Regressor) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let (a, w) = design_matrix(regressor)?;
    let at = a.transpose();
    Ok((&at * &a, &at * &w))
}

/// Minimum-norm least-squares coefficients, via SVD of the design matrix.
pub fn fit(regressor: &Regressor) -> Result<Vec<f64>> {
    let (a, w) = design_matrix(regressor)?;
    let svd = a.svd(true, true);
    let sigma_max = svd.singular_values.iter().cloned().fold(0.0, f64::max);
    let solution = svd
        .solve(&w, SVD_EPS * sigma_max.max(f64::MIN_POSITIVE))
        .map_err(|e| anyhow!("Least-squares solve failed: {}", e))?;
    if solution.iter().any(|v| !v.is_finite()) {
        bail!("Least-squares solution is not finite.");
    }
    Ok(solution.iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::datasets::random_dataset;
    use crate::field::FieldModel;
    use crate::traits::Domain;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    fn random_regressor(seed: u64, points: usize, max_degree: u32) -> Regressor {
        let mut rng = StdRng::seed_from_u64(seed);
        let spec = random_dataset(points, 2, &mut rng);
        let dataset = Arc::new(Dataset::from_spec(&spec).expect("dataset"));
        let model = Arc::new(FieldModel::new(2, max_degree).expect("model"));
        Regressor::new(model, dataset).expect("regressor")
    }

    #[test]
    fn fit_satisfies_normal_equations() {
        // 8 points give 28 samples against 12 coefficients.
        let regressor = random_regressor(9, 8, 2);
        let fit = fit(&regressor).expect("fit");
        let (ata, atw) = normal_equations(&regressor).expect("normal equations");
        let c = DVector::from_column_slice(&fit);
        let residual = &ata * &c - &atw;
        assert!(residual.norm() < 1e-8 * (1.0 + atw.norm()));

        let gradient = regressor.gradient(&fit).expect("gradient");
        assert!(gradient.iter().all(|g| g.abs() < 1e-8));
    }

    #[test]
    fn design_matrix_rows_are_basis_vectors() {
        let regressor = random_regressor(1, 4, 1);
        let (a, w) = design_matrix(&regressor).expect("design matrix");
        assert_eq!(a.nrows(), 6);
        assert_eq!(a.ncols(), regressor.coefficient_count());
        for i in 0..a.nrows() {
            let v = regressor.dataset().basis_vector(i).expect("vector");
            for (j, value) in v.iter().enumerate() {
                assert_eq!(a[(i, j)], *value);
            }
            assert_eq!(w[i], regressor.dataset().samples()[i].work);
        }
    }

    #[test]
    fn design_matrix_rejects_empty_dataset() {
        let dataset = Arc::new(Dataset::new(Vec::new(), Vec::new()).expect("dataset"));
        let model = Arc::new(FieldModel::new(2, 1).expect("model"));
        let regressor = Regressor::new(model, dataset).expect("regressor");
        assert_err_contains(design_matrix(&regressor), "empty dataset");
    }
}
