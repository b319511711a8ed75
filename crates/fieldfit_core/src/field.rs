//! Polynomial vector fields that are linear in their coefficients.
//!
//! Component `d` of the field is `F_d(x) = Σ_j c[d, j] · m_j(x)` where `m_j`
//! runs over the monomial [`Basis`]. Coefficients are stored output-major, so
//! `c[d, j]` lives at index `d * basis.len() + j`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::basis::Basis;
use crate::error::{construction, FieldError, Result};
use crate::quadrature::gauss_legendre_rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub dim: usize,
    pub max_degree: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            max_degree: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    basis: Basis,
    output_dim: usize,
    coefficient_count: usize,
    /// Gauss–Legendre nodes and weights on `[0, 1]`, exact for every monomial
    /// restricted to a segment.
    rule: Vec<(f64, f64)>,
}

impl FieldModel {
    pub fn new(dim: usize, max_degree: u32) -> Result<Self> {
        let basis = Basis::new(dim, max_degree)?;
        let output_dim = dim;
        let coefficient_count = output_dim.checked_mul(basis.len()).ok_or_else(|| {
            construction(format!(
                "coefficient count for dim {} and max_degree {} overflows",
                dim, max_degree
            ))
        })?;
        let rule = gauss_legendre_rule(max_degree as usize / 2 + 1)?;
        debug!(
            "built field model: dim={}, max_degree={}, basis={}, coefficients={}",
            dim,
            max_degree,
            basis.len(),
            coefficient_count
        );
        Ok(Self {
            basis,
            output_dim,
            coefficient_count,
            rule,
        })
    }

    pub fn from_config(config: &FieldConfig) -> Result<Self> {
        Self::new(config.dim, config.max_degree)
    }

    pub fn dim(&self) -> usize {
        self.basis.dim()
    }

    pub fn max_degree(&self) -> u32 {
        self.basis.max_degree()
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn coefficient_count(&self) -> usize {
        self.coefficient_count
    }

    pub(crate) fn check_coefficients(&self, c: &[f64]) -> Result<()> {
        if c.len() != self.coefficient_count {
            return Err(FieldError::DimensionMismatch {
                expected: self.coefficient_count,
                got: c.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_point(&self, point: &[f64]) -> Result<()> {
        if point.len() != self.dim() {
            return Err(construction(format!(
                "point has dimension {}, field expects {}",
                point.len(),
                self.dim()
            )));
        }
        if point.iter().any(|v| !v.is_finite()) {
            return Err(construction(format!("point {:?} is not finite", point)));
        }
        Ok(())
    }

    /// Evaluates the field with coefficients `c` at `point`.
    pub fn evaluate_field(&self, point: &[f64], c: &[f64]) -> Result<Vec<f64>> {
        self.check_coefficients(c)?;
        self.check_point(point)?;

        let n = self.basis.len();
        let mut monomials = vec![0.0; n];
        self.basis.evaluate_all(point, &mut monomials)?;

        let mut out = vec![0.0; self.output_dim];
        for (d, value) in out.iter_mut().enumerate() {
            let row = &c[d * n..(d + 1) * n];
            *value = row.iter().zip(&monomials).map(|(c, m)| c * m).sum();
            if !value.is_finite() {
                return Err(FieldError::NumericOverflow(format!(
                    "field component {} is not finite at {:?}",
                    d, point
                )));
            }
        }
        Ok(out)
    }

    /// Builds the vector `v` with `v · c` equal to the line integral of the
    /// coefficient-`c` field along the straight segment from `a` to `b`.
    ///
    /// With `x(t) = a + t (b - a)` every monomial becomes a polynomial `p_j(t)`
    /// of degree at most `max_degree`, and `v[d, j] = (b - a)[d] · ∫_0^1 p_j(t) dt`.
    /// The integral is taken with a Gauss–Legendre rule of `max_degree / 2 + 1`
    /// nodes, which is exact for that degree and never expands `p_j` into
    /// power form, so endpoints of opposite sign do not cancel.
    pub fn line_integral_vector(&self, a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
        self.check_point(a)?;
        self.check_point(b)?;

        let dim = self.dim();
        let max_degree = self.max_degree() as usize;
        let delta: Vec<f64> = a.iter().zip(b).map(|(a, b)| b - a).collect();

        let n = self.basis.len();
        let mut integrals = vec![0.0; n];
        // powers[i * (max_degree + 1) + e] = x_i(t)^e at the current node
        let mut powers = vec![1.0; dim * (max_degree + 1)];
        for &(t, weight) in &self.rule {
            for i in 0..dim {
                let x = a[i] + t * delta[i];
                let row = &mut powers[i * (max_degree + 1)..(i + 1) * (max_degree + 1)];
                for e in 1..=max_degree {
                    row[e] = row[e - 1] * x;
                }
            }
            for (integral, term) in integrals.iter_mut().zip(self.basis.iter()) {
                let mut value = weight;
                for (i, &e) in term.exponents().iter().enumerate() {
                    value *= powers[i * (max_degree + 1) + e as usize];
                }
                *integral += value;
            }
        }

        let mut out = vec![0.0; self.coefficient_count];
        for (j, term) in self.basis.iter().enumerate() {
            if !integrals[j].is_finite() {
                return Err(FieldError::NumericOverflow(format!(
                    "integral of monomial {:?} from {:?} to {:?} is not finite",
                    term.exponents(),
                    a,
                    b
                )));
            }
            for d in 0..dim {
                let value = delta[d] * integrals[j];
                if !value.is_finite() {
                    return Err(FieldError::NumericOverflow(format!(
                        "work contribution ({}, {}) is not finite",
                        d, j
                    )));
                }
                out[d * n + j] = value;
            }
        }
        Ok(out)
    }

    /// Exact work of the coefficient-`c` field along the segment from `a` to `b`.
    pub fn predict_work(&self, a: &[f64], b: &[f64], c: &[f64]) -> Result<f64> {
        self.check_coefficients(c)?;
        let v = self.line_integral_vector(a, b)?;
        Ok(dot(&v, c))
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrature::{line_integral_quadrature, QuadratureSettings};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vec(rng: &mut StdRng, len: usize, scale: f64) -> Vec<f64> {
        (0..len).map(|_| rng.gen_range(-scale..scale)).collect()
    }

    #[test]
    fn evaluate_field_sums_monomials_per_component() {
        // basis for (2, 1): [1, x, y]
        let model = FieldModel::new(2, 1).expect("model should build");
        let c = [1.0, 2.0, 3.0, -1.0, 0.0, 4.0];
        let value = model.evaluate_field(&[2.0, 5.0], &c).expect("field should evaluate");
        assert_eq!(value, vec![1.0 + 4.0 + 15.0, -1.0 + 20.0]);
    }

    #[test]
    fn evaluate_field_rejects_wrong_coefficient_length() {
        let model = FieldModel::new(2, 1).expect("model should build");
        let err = model
            .evaluate_field(&[0.0, 0.0], &[1.0; 5])
            .expect_err("expected mismatch");
        assert_eq!(err, FieldError::DimensionMismatch { expected: 6, got: 5 });
    }

    #[test]
    fn line_integral_of_constant_field_is_displacement_dot() {
        let model = FieldModel::new(2, 0).expect("model should build");
        let v = model
            .line_integral_vector(&[1.0, 1.0], &[4.0, -1.0])
            .expect("vector should build");
        assert_eq!(v, vec![3.0, -2.0]);
    }

    #[test]
    fn line_integral_keeps_start_point_contribution() {
        // F = (x, 0) from (2, 0) to (3, 0): ∫ x dx over [2, 3] = 2.5
        let model = FieldModel::new(2, 1).expect("model should build");
        let c = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let work = model
            .predict_work(&[2.0, 0.0], &[3.0, 0.0], &c)
            .expect("work should compute");
        assert!((work - 2.5).abs() < 1e-14);
    }

    #[test]
    fn line_integral_vector_is_linear_in_coefficients() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = FieldModel::new(3, 3).expect("model should build");
        let a = random_vec(&mut rng, 3, 2.0);
        let b = random_vec(&mut rng, 3, 2.0);
        let v = model.line_integral_vector(&a, &b).expect("vector should build");

        let c1 = random_vec(&mut rng, model.coefficient_count(), 1.0);
        let c2 = random_vec(&mut rng, model.coefficient_count(), 1.0);
        let (alpha, beta) = (1.5, -0.25);
        let combined: Vec<f64> = c1
            .iter()
            .zip(&c2)
            .map(|(x, y)| alpha * x + beta * y)
            .collect();

        let lhs = dot(&v, &combined);
        let rhs = alpha * dot(&v, &c1) + beta * dot(&v, &c2);
        assert!((lhs - rhs).abs() <= 1e-12 * (1.0 + rhs.abs()));
    }

    #[test]
    fn line_integral_matches_quadrature() {
        let mut rng = StdRng::seed_from_u64(42);
        let settings = QuadratureSettings {
            nodes: 24,
            panels: 8,
        };
        let cases: &[(usize, u32)] = &[(1, 4), (2, 3), (3, 2), (1, 20), (2, 12)];
        for &(dim, degree) in cases {
            let model = FieldModel::new(dim, degree).expect("model should build");
            for trial in 0..6 {
                let mut a = random_vec(&mut rng, dim, 1.5);
                let mut b = random_vec(&mut rng, dim, 1.5);
                if trial % 2 == 0 {
                    // push the segment through the origin
                    for (x, y) in a.iter_mut().zip(b.iter_mut()) {
                        *y = -0.7 * *x;
                    }
                }
                if trial == 5 {
                    a.iter_mut().for_each(|x| *x = -1.0);
                    b.iter_mut().for_each(|x| *x = 1.0);
                }
                let c = random_vec(&mut rng, model.coefficient_count(), 1.0);
                let exact = model.predict_work(&a, &b, &c).expect("work should compute");
                let numeric = line_integral_quadrature(&a, &b, settings, |x| {
                    model.evaluate_field(x, &c)
                })
                .expect("quadrature should compute");
                // bound by the size of the individual contributions, not by 1
                let v = model.line_integral_vector(&a, &b).expect("vector should build");
                let magnitude: f64 = v.iter().zip(&c).map(|(v, c)| (v * c).abs()).sum();
                assert!(
                    (exact - numeric).abs() <= 1e-10 * magnitude,
                    "dim {dim}, degree {degree}: exact {exact} vs quadrature {numeric}"
                );
            }
        }
    }

    #[test]
    fn high_degree_monomials_integrate_across_the_origin() {
        // ∫_{-1}^{1} x^k dx = (1 - (-1)^(k + 1)) / (k + 1)
        for degree in [20u32, 25, 30, 40] {
            let model = FieldModel::new(1, degree).expect("model should build");
            let v = model
                .line_integral_vector(&[-1.0], &[1.0])
                .expect("vector should build");
            for (j, term) in model.basis().iter().enumerate() {
                let k = term.exponents()[0];
                let exact = if k % 2 == 0 { 2.0 / (k as f64 + 1.0) } else { 0.0 };
                assert!(
                    (v[j] - exact).abs() <= 1e-13 * exact.abs().max(1.0) / (k as f64 + 1.0),
                    "x^{k}: {} vs {exact}",
                    v[j]
                );
            }
        }
    }

    #[test]
    fn high_degree_cross_terms_cancel_on_symmetric_segment() {
        // Each component of x^i y^j along (-1, -1) -> (1, 1) is ∫ s^(i+j) ds over [-1, 1].
        let model = FieldModel::new(2, 22).expect("model should build");
        let v = model
            .line_integral_vector(&[-1.0, -1.0], &[1.0, 1.0])
            .expect("vector should build");
        let n = model.basis().len();
        for (j, term) in model.basis().iter().enumerate() {
            let k = term.degree();
            let exact = if k % 2 == 0 { 2.0 / (k as f64 + 1.0) } else { 0.0 };
            for d in 0..2 {
                assert!(
                    (v[d * n + j] - exact).abs() <= 1e-13,
                    "{:?}: {} vs {exact}",
                    term.exponents(),
                    v[d * n + j]
                );
            }
        }
    }

    #[test]
    fn line_integral_is_antisymmetric_in_endpoints() {
        let model = FieldModel::new(2, 2).expect("model should build");
        let forward = model
            .line_integral_vector(&[0.5, -1.0], &[2.0, 3.0])
            .expect("vector should build");
        let backward = model
            .line_integral_vector(&[2.0, 3.0], &[0.5, -1.0])
            .expect("vector should build");
        for (f, b) in forward.iter().zip(&backward) {
            assert!((f + b).abs() < 1e-12);
        }
    }

    #[test]
    fn line_integral_reports_overflow() {
        let model = FieldModel::new(1, 200).expect("model should build");
        let err = model
            .line_integral_vector(&[0.0], &[1e3])
            .expect_err("expected overflow");
        assert!(matches!(err, FieldError::NumericOverflow(_)));
    }

    #[test]
    fn line_integral_rejects_mismatched_points() {
        let model = FieldModel::new(2, 1).expect("model should build");
        let err = model
            .line_integral_vector(&[0.0], &[1.0, 1.0])
            .expect_err("expected construction error");
        assert!(matches!(err, FieldError::Construction(_)));
    }

    #[test]
    fn config_default_builds_quadratic_planar_model() {
        let model = FieldModel::from_config(&FieldConfig::default()).expect("model should build");
        assert_eq!(model.dim(), 2);
        assert_eq!(model.basis().len(), 6);
        assert_eq!(model.coefficient_count(), 12);
    }
}
