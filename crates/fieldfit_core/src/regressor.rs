use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::{FieldError, Result};
use crate::field::{dot, FieldModel};
use crate::traits::Domain;

/// Least-squares fit of a [`FieldModel`] to the work samples of a [`Dataset`].
///
/// `objective` reports the root-mean-square work residual. `gradient` is the
/// gradient of the *unnormalized* sum of squares scaled by `2 / N`, not the
/// gradient of `objective`; a solver driving it to zero solves the normal
/// equations of the linear problem.
#[derive(Debug, Clone)]
pub struct Regressor {
    model: Arc<FieldModel>,
    dataset: Arc<Dataset>,
}

impl Regressor {
    pub fn new(model: Arc<FieldModel>, dataset: Arc<Dataset>) -> Result<Self> {
        dataset.bind(&model)?;
        Ok(Self { model, dataset })
    }

    pub fn model(&self) -> &Arc<FieldModel> {
        &self.model
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    fn check(&self, c: &[f64]) -> Result<()> {
        self.model.check_coefficients(c)?;
        if self.dataset.is_empty() {
            return Err(FieldError::EmptyDataset);
        }
        Ok(())
    }

    fn residual(&self, index: usize, c: &[f64]) -> Result<f64> {
        let v = self.dataset.basis_vector(index)?;
        let predicted = dot(v, c);
        let residual = predicted - self.dataset.samples()[index].work;
        if !residual.is_finite() {
            return Err(FieldError::NumericOverflow(format!(
                "residual of sample {} is not finite",
                index
            )));
        }
        Ok(residual)
    }

    /// `Σ_i (v_i · c - w_i)^2`
    pub fn sum_of_squares(&self, c: &[f64]) -> Result<f64> {
        self.check(c)?;
        let mut total = 0.0;
        for index in 0..self.dataset.len() {
            let r = self.residual(index, c)?;
            total += r * r;
        }
        if !total.is_finite() {
            return Err(FieldError::NumericOverflow(
                "sum of squared residuals is not finite".to_string(),
            ));
        }
        Ok(total)
    }

    /// Predicted work for every sample, in sample order.
    pub fn predictions(&self, c: &[f64]) -> Result<Vec<f64>> {
        self.check(c)?;
        (0..self.dataset.len())
            .map(|index| -> Result<f64> { Ok(dot(self.dataset.basis_vector(index)?, c)) })
            .collect()
    }

    /// Predicted minus measured work for every sample.
    pub fn residuals(&self, c: &[f64]) -> Result<Vec<f64>> {
        self.check(c)?;
        (0..self.dataset.len())
            .map(|index| self.residual(index, c))
            .collect()
    }

    fn accumulate_gradient(&self, c: &[f64], out: &mut [f64]) -> Result<()> {
        out.fill(0.0);
        for index in 0..self.dataset.len() {
            let r = self.residual(index, c)?;
            let v = self.dataset.basis_vector(index)?;
            for (g, vk) in out.iter_mut().zip(v) {
                *g += r * vk;
            }
        }

        let scale = 2.0 / self.dataset.len() as f64;
        for g in out.iter_mut() {
            *g *= scale;
            if !g.is_finite() {
                return Err(FieldError::NumericOverflow(
                    "gradient is not finite".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Domain for Regressor {
    fn coefficient_count(&self) -> usize {
        self.model.coefficient_count()
    }

    fn objective(&self, c: &[f64]) -> Result<f64> {
        let n = self.dataset.len() as f64;
        Ok((self.sum_of_squares(c)? / n).sqrt())
    }

    /// Writes `(2 / N) Σ_i r_i v_i` into `out`. If a residual or gradient
    /// entry is not finite, `out` is left zeroed rather than holding partial
    /// sums.
    fn gradient_into(&self, c: &[f64], out: &mut [f64]) -> Result<()> {
        self.check(c)?;
        if out.len() != self.model.coefficient_count() {
            return Err(FieldError::DimensionMismatch {
                expected: self.model.coefficient_count(),
                got: out.len(),
            });
        }

        let result = self.accumulate_gradient(c, out);
        if result.is_err() {
            out.fill(0.0);
        }
        result
    }
}
