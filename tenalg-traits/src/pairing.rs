//! Natural pairings applied to contracted index pairs.
//!
//! Every term of a contraction is multiplied by a pairing factor computed from
//! the component values of the summed indices. The default [`Euclidean`]
//! pairing is the identity; [`DiagonalMetric`] weights each summed component,
//! which covers signatures such as Minkowski space.

use crate::Scalar;

/// Weight applied to one term of a contraction.
pub trait NaturalPairing<T> {
    /// Factor for the term whose summed indices take the values `summed`.
    fn factor(&self, summed: &[usize]) -> T;

    /// Whether this pairing is defined on an axis of extent `dim`.
    ///
    /// Checked once when a contraction is built, never per term.
    fn supports_dim(&self, _dim: usize) -> bool {
        true
    }
}

/// Identity pairing: every term weighs one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl<T: Scalar> NaturalPairing<T> for Euclidean {
    #[inline(always)]
    fn factor(&self, _summed: &[usize]) -> T {
        T::one()
    }
}

/// Pairing given by a diagonal metric `g = diag(weights)`.
///
/// The factor of a term is the product of `weights[v]` over the summed
/// component values `v`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalMetric<T> {
    weights: Vec<T>,
}

impl<T: Scalar> DiagonalMetric<T> {
    pub fn new(weights: Vec<T>) -> Self {
        Self { weights }
    }

    /// Lorentzian signature `(-, +, ..., +)` on `dim` axes.
    pub fn minkowski(dim: usize) -> Self {
        let mut weights = vec![T::one(); dim];
        if let Some(first) = weights.first_mut() {
            *first = T::zero() - T::one();
        }
        Self { weights }
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }
}

impl<T: Scalar> NaturalPairing<T> for DiagonalMetric<T> {
    #[inline]
    fn factor(&self, summed: &[usize]) -> T {
        summed
            .iter()
            .fold(T::one(), |acc, &v| acc * self.weights[v])
    }

    fn supports_dim(&self, dim: usize) -> bool {
        dim <= self.weights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_is_identity() {
        let f: f64 = Euclidean.factor(&[0, 3, 7]);
        assert_eq!(f, 1.0);
        let empty: f64 = Euclidean.factor(&[]);
        assert_eq!(empty, 1.0);
    }

    #[test]
    fn test_minkowski_signature() {
        let g = DiagonalMetric::<f64>::minkowski(4);
        assert_eq!(g.weights(), &[-1.0, 1.0, 1.0, 1.0]);
        assert_eq!(g.factor(&[0]), -1.0);
        assert_eq!(g.factor(&[2]), 1.0);
        assert_eq!(g.factor(&[0, 0]), 1.0);
        assert!(g.supports_dim(4));
        assert!(!g.supports_dim(5));
    }
}
