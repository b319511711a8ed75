//! Composite Gauss–Legendre quadrature of line integrals along straight segments.
//!
//! [`gauss_legendre_rule`] also supplies the exact monomial integrals of
//! [`crate::field`]; the composite quadrature cross-checks them and handles
//! fields that are only available pointwise.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{construction, FieldError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadratureSettings {
    /// Gauss–Legendre nodes per panel.
    pub nodes: usize,
    /// Equal-width panels splitting `t ∈ [0, 1]`.
    pub panels: usize,
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self {
            nodes: 16,
            panels: 4,
        }
    }
}

/// Gauss–Legendre nodes and weights on `[0, 1]`, nodes ascending.
pub fn gauss_legendre_rule(count: usize) -> Result<Vec<(f64, f64)>> {
    if count == 0 {
        return Err(construction("quadrature needs at least one node"));
    }
    let n = count;
    let m = (n + 1) / 2;
    let mut rule = vec![(0.0, 0.0); n];
    for i in 0..m {
        let mut x = f64::cos(PI * (i as f64 + 0.75) / (n as f64 + 0.5));
        for _ in 0..100 {
            let (value, derivative) = legendre_with_derivative(n, x);
            let step = value / derivative;
            x -= step;
            if step.abs() < 1e-15 {
                break;
            }
        }
        let slope = legendre_with_derivative(n, x).1;
        // Weight on [-1, 1] is 2 / ((1 - x^2) P_n'(x)^2); halve it for [0, 1].
        let weight = 1.0 / ((1.0 - x * x) * slope * slope);
        let t = 0.5 * (x + 1.0);
        rule[i] = (t, weight);
        rule[n - i - 1] = (1.0 - t, weight);
    }
    rule.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(rule)
}

/// `(P_n(x), P_n'(x))` from the three-term recurrence, with the derivative
/// carried by `P_k' = P_{k-2}' + (2k - 1) P_{k-1}` so `x = ±1` needs no
/// special case.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let (mut lower, mut upper) = (1.0, x);
    let (mut lower_slope, mut upper_slope) = (0.0, 1.0);
    for k in 2..=n {
        let k = k as f64;
        let next = ((2.0 * k - 1.0) * x * upper - (k - 1.0) * lower) / k;
        let next_slope = lower_slope + (2.0 * k - 1.0) * upper;
        lower = upper;
        upper = next;
        lower_slope = upper_slope;
        upper_slope = next_slope;
    }
    (upper, upper_slope)
}

/// Integrates `∫_0^1 F(a + t (b - a)) · (b - a) dt` numerically.
pub fn line_integral_quadrature<F>(
    a: &[f64],
    b: &[f64],
    settings: QuadratureSettings,
    field: F,
) -> Result<f64>
where
    F: Fn(&[f64]) -> Result<Vec<f64>>,
{
    if a.len() != b.len() {
        return Err(construction(format!(
            "segment endpoints differ in dimension ({} vs {})",
            a.len(),
            b.len()
        )));
    }
    if settings.panels == 0 {
        return Err(construction("quadrature needs at least one panel"));
    }
    let rule = gauss_legendre_rule(settings.nodes)?;
    let delta: Vec<f64> = a.iter().zip(b).map(|(a, b)| b - a).collect();
    let width = 1.0 / settings.panels as f64;

    let mut point = vec![0.0; a.len()];
    let mut total = 0.0;
    for panel in 0..settings.panels {
        let start = panel as f64 * width;
        for &(node, weight) in &rule {
            let t = start + node * width;
            for (slot, (a, d)) in point.iter_mut().zip(a.iter().zip(&delta)) {
                *slot = a + t * d;
            }
            let value = field(&point)?;
            let tangential: f64 = value.iter().zip(&delta).map(|(f, d)| f * d).sum();
            total += weight * width * tangential;
        }
    }
    if !total.is_finite() {
        return Err(FieldError::NumericOverflow(format!(
            "quadrature from {:?} to {:?} is not finite",
            a, b
        )));
    }
    Ok(total)
}
