//! Bounded-total-degree monomial basis.
//!
//! A basis over `dim` variables with maximal degree `max_degree` contains every
//! exponent tuple with nonnegative entries summing to at most `max_degree`. Terms
//! are grouped by increasing total degree; inside a degree the tuples run in
//! reverse lexicographic order, so `x^2` precedes `x*y` precedes `y^2`.
//!
//! The order is the coefficient indexing used throughout the crate and never
//! changes once a [`Basis`] exists.

use serde::{Deserialize, Serialize};

use crate::error::{construction, FieldError, Result};

/// Largest number of monomials a [`Basis`] will enumerate.
pub const MAX_BASIS_TERMS: usize = 1 << 20;

/// Exponents of one monomial `x1^e1 * x2^e2 * ...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExponentTuple(Vec<u32>);

impl ExponentTuple {
    pub fn new(exponents: Vec<u32>) -> Self {
        Self(exponents)
    }

    pub fn exponents(&self) -> &[u32] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Total degree of the monomial.
    pub fn degree(&self) -> u64 {
        self.0.iter().map(|&e| e as u64).sum()
    }

    /// Evaluates the monomial at `point`.
    ///
    /// Fails with [`FieldError::NumericOverflow`] instead of returning a
    /// non-finite value.
    pub fn evaluate(&self, point: &[f64]) -> Result<f64> {
        debug_assert_eq!(point.len(), self.0.len());
        let mut value = 1.0;
        for (&x, &e) in point.iter().zip(&self.0) {
            if e == 0 {
                continue;
            }
            value *= x.powi(e as i32);
        }
        if !value.is_finite() {
            return Err(FieldError::NumericOverflow(format!(
                "monomial {:?} is not finite at {:?}",
                self.0, point
            )));
        }
        Ok(value)
    }
}

/// Ordered, immutable set of monomials of bounded total degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basis {
    dim: usize,
    max_degree: u32,
    terms: Vec<ExponentTuple>,
}

impl Basis {
    pub fn new(dim: usize, max_degree: u32) -> Result<Self> {
        if dim == 0 {
            return Err(construction("basis dimension must be positive"));
        }
        if max_degree > i32::MAX as u32 {
            return Err(construction(format!(
                "max_degree {} exceeds the supported exponent range",
                max_degree
            )));
        }
        let size = basis_size(dim, max_degree).ok_or_else(|| {
            construction(format!(
                "basis for dim {} and max_degree {} is too large",
                dim, max_degree
            ))
        })?;
        if size > MAX_BASIS_TERMS {
            return Err(construction(format!(
                "basis for dim {} and max_degree {} has {} terms, limit is {}",
                dim, max_degree, size, MAX_BASIS_TERMS
            )));
        }

        let mut terms = Vec::with_capacity(size);
        let mut prefix = Vec::with_capacity(dim);
        for degree in 0..=max_degree {
            compositions(degree, dim, &mut prefix, &mut terms);
        }
        debug_assert_eq!(terms.len(), size);

        Ok(Self {
            dim,
            max_degree,
            terms,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn max_degree(&self) -> u32 {
        self.max_degree
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[ExponentTuple] {
        &self.terms
    }

    pub fn get(&self, index: usize) -> Option<&ExponentTuple> {
        self.terms.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExponentTuple> {
        self.terms.iter()
    }

    /// Evaluates every monomial at `point`, in basis order.
    pub fn evaluate_all(&self, point: &[f64], out: &mut [f64]) -> Result<()> {
        if point.len() != self.dim {
            return Err(construction(format!(
                "point has dimension {}, basis expects {}",
                point.len(),
                self.dim
            )));
        }
        for (slot, term) in out.iter_mut().zip(&self.terms) {
            *slot = term.evaluate(point)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Basis {
    type Item = &'a ExponentTuple;
    type IntoIter = std::slice::Iter<'a, ExponentTuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Appends every composition of `total` into `parts` nonnegative parts,
/// largest leading part first.
fn compositions(total: u32, parts: usize, prefix: &mut Vec<u32>, out: &mut Vec<ExponentTuple>) {
    if parts == 1 {
        prefix.push(total);
        out.push(ExponentTuple::new(prefix.clone()));
        prefix.pop();
        return;
    }
    for first in (0..=total).rev() {
        prefix.push(first);
        compositions(total - first, parts - 1, prefix, out);
        prefix.pop();
    }
}

/// Number of monomials of total degree at most `max_degree` in `dim`
/// variables, `C(max_degree + dim, dim)`, or `None` if it does not fit in
/// `usize`.
pub fn basis_size(dim: usize, max_degree: u32) -> Option<usize> {
    binomial(max_degree as u128 + dim as u128, dim as u128)
}

/// Number of monomials of total degree exactly `degree`,
/// `C(degree + dim - 1, dim - 1)`.
pub fn degree_count(dim: usize, degree: u32) -> Option<usize> {
    if dim == 0 {
        return Some(0);
    }
    binomial(degree as u128 + dim as u128 - 1, dim as u128 - 1)
}

fn binomial(n: u128, k: u128) -> Option<usize> {
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 1..=k {
        // result * (n - k + i) is divisible by i at every step.
        result = result.checked_mul(n - k + i)? / i;
    }
    usize::try_from(result).ok()
}
