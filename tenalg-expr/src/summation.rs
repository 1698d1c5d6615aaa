//! Summation evaluators.
//!
//! Both evaluators iterate the combined index list `free ++ summed`: the free
//! values are fixed by the caller, the summed values run through an odometer,
//! and precomputed [`IndexMap`]s gather each operand's own multi-index out of
//! the combined one. Terms accumulate in odometer order.

use smallvec::{smallvec, SmallVec};
use tenalg_index::{DimIndex, IndexMap, MultiIndex, INLINE_RANK};
use tenalg_traits::{NaturalPairing, Scalar};

use crate::error::{ExprError, Result};

type Values = SmallVec<[usize; INLINE_RANK]>;
type Combined = SmallVec<[usize; 2 * INLINE_RANK]>;

fn check_pairing<T, P: NaturalPairing<T>>(pairing: &P, summed: &[DimIndex]) -> Result<()> {
    match summed.iter().find(|d| !pairing.supports_dim(d.dim)) {
        Some(d) => Err(ExprError::UnsupportedPairing {
            symbol: d.symbol,
            dim: d.dim,
        }),
        None => Ok(()),
    }
}

/// Sums the repeated indices of a single operand, as in the trace `T(i, i)`.
#[derive(Debug, Clone)]
pub struct UnarySummation<P> {
    summed_dims: Values,
    operand: IndexMap,
    pairing: P,
}

impl<P> UnarySummation<P> {
    /// `occurrences` is the operand's index list as written; `free` and
    /// `summed` are its classification.
    pub fn new<T>(
        occurrences: &[DimIndex],
        free: &[DimIndex],
        summed: &[DimIndex],
        pairing: P,
    ) -> Result<Self>
    where
        P: NaturalPairing<T>,
    {
        check_pairing::<T, P>(&pairing, summed)?;
        let combined: Vec<DimIndex> = free.iter().chain(summed.iter()).copied().collect();
        Ok(Self {
            summed_dims: summed.iter().map(|d| d.dim).collect(),
            operand: IndexMap::new(&combined, occurrences)?,
            pairing,
        })
    }

    pub fn pairing(&self) -> &P {
        &self.pairing
    }

    /// `sum over summed of pairing(summed) * read(operand multi-index)`.
    pub fn evaluate<T, F>(&self, free: &[usize], mut read: F) -> T
    where
        T: Scalar,
        P: NaturalPairing<T>,
        F: FnMut(&[usize]) -> T,
    {
        let mut combined: Combined = SmallVec::from_slice(free);
        combined.resize(free.len() + self.summed_dims.len(), 0);
        let mut operand: Values = smallvec![0; self.operand.len()];

        let mut acc = T::zero();
        let mut summed = MultiIndex::zero(&self.summed_dims);
        while !summed.is_at_end() {
            combined[free.len()..].copy_from_slice(summed.values());
            self.operand.apply(&combined, &mut operand);
            acc = acc + self.pairing.factor(summed.values()) * read(&operand);
            summed.increment();
        }
        acc
    }
}

/// Outer product plus contraction of two operands.
#[derive(Debug, Clone)]
pub struct BinarySummation<P> {
    summed_dims: Values,
    left: IndexMap,
    right: IndexMap,
    pairing: P,
}

impl<P> BinarySummation<P> {
    pub fn new<T>(
        free: &[DimIndex],
        summed: &[DimIndex],
        left_free: &[DimIndex],
        right_free: &[DimIndex],
        pairing: P,
    ) -> Result<Self>
    where
        P: NaturalPairing<T>,
    {
        check_pairing::<T, P>(&pairing, summed)?;
        let combined: Vec<DimIndex> = free.iter().chain(summed.iter()).copied().collect();
        Ok(Self {
            summed_dims: summed.iter().map(|d| d.dim).collect(),
            left: IndexMap::new(&combined, left_free)?,
            right: IndexMap::new(&combined, right_free)?,
            pairing,
        })
    }

    pub fn is_outer_product(&self) -> bool {
        self.summed_dims.is_empty()
    }

    pub fn evaluate<T, L, R>(&self, free: &[usize], mut left: L, mut right: R) -> T
    where
        T: Scalar,
        P: NaturalPairing<T>,
        L: FnMut(&[usize]) -> T,
        R: FnMut(&[usize]) -> T,
    {
        let mut lv: Values = smallvec![0; self.left.len()];
        let mut rv: Values = smallvec![0; self.right.len()];

        if self.is_outer_product() {
            self.left.apply(free, &mut lv);
            self.right.apply(free, &mut rv);
            return left(&lv) * right(&rv);
        }

        let mut combined: Combined = SmallVec::from_slice(free);
        combined.resize(free.len() + self.summed_dims.len(), 0);

        let mut acc = T::zero();
        let mut summed = MultiIndex::zero(&self.summed_dims);
        while !summed.is_at_end() {
            combined[free.len()..].copy_from_slice(summed.values());
            self.left.apply(&combined, &mut lv);
            self.right.apply(&combined, &mut rv);
            acc = acc + self.pairing.factor(summed.values()) * left(&lv) * right(&rv);
            summed.increment();
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenalg_traits::{DiagonalMetric, Euclidean};

    fn d(c: char, dim: usize) -> DimIndex {
        DimIndex::new(c, dim)
    }

    #[test]
    fn test_unary_trace() {
        let occ = [d('i', 3), d('i', 3)];
        let u = UnarySummation::new::<f64>(&occ, &[], &[d('i', 3)], Euclidean).unwrap();
        // identity-like read: 1 on the diagonal
        let v: f64 = u.evaluate(&[], |m| if m[0] == m[1] { (m[0] + 1) as f64 } else { 100.0 });
        assert_eq!(v, 6.0);
    }

    #[test]
    fn test_binary_contraction_order() {
        // C(i) = A(i, j) B(j)
        let a = |m: &[usize]| (m[0] * 10 + m[1]) as f64;
        let b = |m: &[usize]| (m[0] + 1) as f64;
        let s = BinarySummation::new::<f64>(
            &[d('i', 2)],
            &[d('j', 3)],
            &[d('i', 2), d('j', 3)],
            &[d('j', 3)],
            Euclidean,
        )
        .unwrap();
        assert!(!s.is_outer_product());
        let c1: f64 = s.evaluate(&[1], a, b);
        assert_eq!(c1, 10.0 * 1.0 + 11.0 * 2.0 + 12.0 * 3.0);
    }

    #[test]
    fn test_outer_product_branch() {
        let s = BinarySummation::new::<f64>(
            &[d('i', 2), d('j', 2)],
            &[],
            &[d('i', 2)],
            &[d('j', 2)],
            Euclidean,
        )
        .unwrap();
        assert!(s.is_outer_product());
        let v: f64 = s.evaluate(&[1, 0], |m| (m[0] + 2) as f64, |m| (m[0] + 5) as f64);
        assert_eq!(v, 15.0);
    }

    #[test]
    fn test_metric_pairing_applies_per_term() {
        let g = DiagonalMetric::<f64>::minkowski(2);
        let s = BinarySummation::new::<f64>(&[], &[d('k', 2)], &[d('k', 2)], &[d('k', 2)], g)
            .unwrap();
        let v: f64 = s.evaluate(&[], |m| (m[0] + 1) as f64, |m| (m[0] + 1) as f64);
        assert_eq!(v, -1.0 + 4.0);
    }

    #[test]
    fn test_pairing_rejects_large_dim() {
        let g = DiagonalMetric::<f64>::minkowski(2);
        let err = BinarySummation::new::<f64>(&[], &[d('k', 3)], &[d('k', 3)], &[d('k', 3)], g)
            .unwrap_err();
        assert_eq!(
            err,
            ExprError::UnsupportedPairing {
                symbol: tenalg_index::Symbol::new('k'),
                dim: 3
            }
        );
    }
}
