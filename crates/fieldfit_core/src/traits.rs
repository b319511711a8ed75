use crate::error::Result;

/// A residual/gap pair consumed by an iterative solver.
///
/// The solver owns the coefficient vector and hands it in fresh on every call;
/// implementations must not retain it.
pub trait Domain {
    /// Returns the length of the coefficient vector this domain accepts.
    fn coefficient_count(&self) -> usize;

    /// Evaluates the scalar gap (distance-to-equilibrium) at `c`.
    fn objective(&self, c: &[f64]) -> Result<f64>;

    /// Evaluates the residual vector at `c`.
    /// out: buffer of length `coefficient_count()` to write the result into
    fn gradient_into(&self, c: &[f64], out: &mut [f64]) -> Result<()>;

    /// Allocating convenience wrapper around [`Domain::gradient_into`].
    fn gradient(&self, c: &[f64]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.coefficient_count()];
        self.gradient_into(c, &mut out)?;
        Ok(out)
    }
}
