use anyhow::{bail, Context, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::traits::Domain;

/// Fixed-step gradient descent settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DescentSettings {
    pub step_size: f64,
    pub max_steps: usize,
    /// Stop once the objective or the gradient norm falls to this value.
    pub tolerance: f64,
}

impl Default for DescentSettings {
    fn default() -> Self {
        Self {
            step_size: 1e-2,
            max_steps: 10_000,
            tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescentResult {
    pub coefficients: Vec<f64>,
    pub objective: f64,
    pub gradient_norm: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Runs `c ← c - step · gradient(c)` until a tolerance is met or the step
/// budget is exhausted. Running out of steps is not an error; check
/// [`DescentResult::converged`].
pub fn minimize(
    domain: &impl Domain,
    initial_guess: &[f64],
    settings: DescentSettings,
) -> Result<DescentResult> {
    let dim = domain.coefficient_count();
    if initial_guess.len() != dim {
        bail!(
            "Initial guess dimension mismatch. Expected {}, got {}.",
            dim,
            initial_guess.len()
        );
    }
    if settings.max_steps == 0 {
        bail!("max_steps must be greater than zero.");
    }
    if settings.step_size.is_nan() || settings.step_size <= 0.0 {
        bail!("step_size must be positive.");
    }
    if settings.tolerance.is_nan() || settings.tolerance <= 0.0 {
        bail!("tolerance must be positive.");
    }

    let mut state = initial_guess.to_vec();
    let mut gradient = vec![0.0; dim];
    let mut iterations = 0usize;

    loop {
        let objective = domain
            .objective(&state)
            .with_context(|| format!("Objective failed at iteration {}.", iterations))?;
        domain
            .gradient_into(&state, &mut gradient)
            .with_context(|| format!("Gradient failed at iteration {}.", iterations))?;
        let gradient_norm = l2_norm(&gradient);
        trace!(
            "descent step {}: objective = {:e}, |gradient| = {:e}",
            iterations,
            objective,
            gradient_norm
        );

        let converged = objective <= settings.tolerance || gradient_norm <= settings.tolerance;
        if converged || iterations >= settings.max_steps {
            debug!(
                "descent stopped after {} steps (converged = {}, objective = {:e})",
                iterations, converged, objective
            );
            return Ok(DescentResult {
                coefficients: state,
                objective,
                gradient_norm,
                iterations,
                converged,
            });
        }

        for (x, g) in state.iter_mut().zip(&gradient) {
            *x -= settings.step_size * g;
        }
        iterations += 1;
    }
}

fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}
