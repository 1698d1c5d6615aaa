//! Symmetric powers: one stored component per multiset of index values.

use smallvec::SmallVec;
use tenalg_index::{run_lengths, MultiIndex, INLINE_RANK};

use crate::combinatorics::{
    binomial_coefficient, for_each_distinct_permutation, index_of_greatest_simplicial_number_leq,
    max_multinomial, multinomial,
};
use crate::scale::ScaleFactor;
use crate::shape::{Shape, Slot};
use crate::{Result, ShapeError};

/// The `order`-th symmetric power of a `dim`-dimensional space.
///
/// A multi-index is normalized by sorting its values descending; the sorted
/// tuple `a_0 >= a_1 >= ... >= a_{k-1}` is stored at offset
/// `sum_i C(a_i + k - i - 1, k - i)`. For order 2 over 3 dimensions this gives
/// `s00, s10, s11, s20, s21, s22`.
///
/// Components are never procedural zeros. The scale factor is one over the
/// number of distinct arrangements of the multi-index, the multinomial
/// `order! / prod(run!)` over its runs of equal values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymmetricPower {
    order: usize,
    dim: usize,
    dims: SmallVec<[usize; INLINE_RANK]>,
}

impl SymmetricPower {
    /// Fails with [`ShapeError::InvalidOrder`] when some component would have
    /// more arrangements than fit in a `u64`.
    pub fn new(order: usize, dim: usize) -> Result<Self> {
        if max_multinomial(order, dim).is_none() {
            return Err(ShapeError::InvalidOrder { order, dim });
        }
        Ok(Self {
            order,
            dim,
            dims: SmallVec::from_elem(dim, order),
        })
    }

    /// Extent of each factor axis.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn sorted(m: &[usize]) -> SmallVec<[usize; INLINE_RANK]> {
        let mut sorted = SmallVec::from_slice(m);
        sorted.sort_unstable_by(|a: &usize, b: &usize| b.cmp(a));
        sorted
    }

    fn offset_of_sorted(&self, sorted: &[usize]) -> usize {
        sorted
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                let k = self.order - i;
                binomial_coefficient(a + k - 1, k)
            })
            .sum()
    }

    /// Distinct arrangements of a sorted multi-index; bounded in `new`.
    fn arrangements(sorted: &[usize]) -> u64 {
        debug_assert!(sorted.windows(2).all(|w| w[0] >= w[1]));
        multinomial(&run_lengths(sorted)).unwrap_or(u64::MAX)
    }

    fn factor_of_sorted(sorted: &[usize]) -> ScaleFactor {
        ScaleFactor::new(1, 1, Self::arrangements(sorted))
    }
}

impl Shape for SymmetricPower {
    fn factor_dims(&self) -> &[usize] {
        &self.dims
    }

    fn storage_count(&self) -> usize {
        if self.order == 0 {
            return 1;
        }
        binomial_coefficient(self.dim + self.order - 1, self.order)
    }

    #[inline]
    fn is_procedural_zero(&self, _m: &[usize]) -> bool {
        false
    }

    fn scalar_factor(&self, m: &[usize]) -> ScaleFactor {
        Self::factor_of_sorted(&Self::sorted(m))
    }

    fn storage_index(&self, m: &[usize]) -> Option<usize> {
        Some(self.offset_of_sorted(&Self::sorted(m)))
    }

    fn locate(&self, m: &[usize]) -> Option<Slot> {
        let sorted = Self::sorted(m);
        Some(Slot {
            storage: self.offset_of_sorted(&sorted),
            factor: Self::factor_of_sorted(&sorted),
        })
    }

    fn canonical_multi_index(&self, storage: usize) -> MultiIndex {
        let mut values: SmallVec<[usize; INLINE_RANK]> = SmallVec::with_capacity(self.order);
        let mut rest = storage;
        for i in 0..self.order {
            let k = self.order - i;
            let a = index_of_greatest_simplicial_number_leq(rest, k);
            rest -= binomial_coefficient(a + k - 1, k);
            values.push(a);
        }
        MultiIndex::from_values_unchecked(&values, &self.dims)
    }

    fn for_each_preimage(&self, storage: usize, f: &mut dyn FnMut(&[usize])) {
        let canonical = self.canonical_multi_index(storage);
        for_each_distinct_permutation(canonical.values(), f);
    }

    fn term_count(&self, storage: usize) -> usize {
        let canonical = self.canonical_multi_index(storage);
        Self::arrangements(canonical.values()) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_two_layout() {
        let s = SymmetricPower::new(2, 3).unwrap();
        assert_eq!(s.storage_count(), 6);
        let canon: Vec<Vec<usize>> = (0..6)
            .map(|p| s.canonical_multi_index(p).values().to_vec())
            .collect();
        assert_eq!(
            canon,
            vec![
                vec![0, 0],
                vec![1, 0],
                vec![1, 1],
                vec![2, 0],
                vec![2, 1],
                vec![2, 2],
            ]
        );
        assert_eq!(s.storage_index(&[0, 2]), s.storage_index(&[2, 0]));
    }

    #[test]
    fn test_scale_factor() {
        let s = SymmetricPower::new(2, 3).unwrap();
        assert!(s.scalar_factor(&[1, 1]).is_one());
        assert_eq!(s.scalar_factor(&[0, 1]), ScaleFactor::new(1, 1, 2));
        // the canonical [1, 0] is not a unit-factor preimage
        let canonical = s.canonical_multi_index(1);
        assert_eq!(canonical.values(), &[1, 0]);
        assert_eq!(s.scalar_factor(canonical.values()), ScaleFactor::new(1, 1, 2));

        let t = SymmetricPower::new(3, 2).unwrap();
        // [1, 0, 0]: 3! / (1! 2!) arrangements
        assert_eq!(t.scalar_factor(&[0, 1, 0]), ScaleFactor::new(1, 1, 3));
        let p = t.storage_index(&[0, 1, 0]).unwrap();
        assert_eq!(t.term_count(p), 3);
    }

    #[test]
    fn test_bijection_order_three() {
        let s = SymmetricPower::new(3, 4).unwrap();
        assert_eq!(s.storage_count(), 20);
        let mut total_terms = 0;
        for p in 0..s.storage_count() {
            let c = s.canonical_multi_index(p);
            assert!(c.values().windows(2).all(|w| w[0] >= w[1]));
            assert_eq!(s.storage_index(c.values()), Some(p));
            assert!(s.scalar_factor(c.values()).numerator() >= 1);
            s.for_each_preimage(p, &mut |m| assert_eq!(s.storage_index(m), Some(p)));
            total_terms += s.term_count(p);
        }
        assert_eq!(total_terms, s.dimension());
    }

    #[test]
    fn test_high_order_factors_stay_exact() {
        let s = SymmetricPower::new(21, 2).unwrap();
        assert_eq!(s.storage_count(), 22);
        assert!(s.scalar_factor(&[0; 21]).is_one());
        let mut m = [0usize; 21];
        m[..10].fill(1);
        let slot = s.locate(&m).unwrap();
        assert_eq!(slot.factor, ScaleFactor::new(1, 1, 352_716));
        assert_eq!(s.term_count(slot.storage), 352_716);

        assert_eq!(
            SymmetricPower::new(21, 21),
            Err(ShapeError::InvalidOrder { order: 21, dim: 21 })
        );
    }

    #[test]
    fn test_order_zero() {
        let s = SymmetricPower::new(0, 5).unwrap();
        assert_eq!(s.storage_count(), 1);
        assert_eq!(s.storage_index(&[]), Some(0));
        assert_eq!(s.dimension(), 1);
    }
}
