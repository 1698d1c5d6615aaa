//! Exterior powers: antisymmetric tensors stored once per strictly increasing
//! index tuple.

use smallvec::SmallVec;
use tenalg_index::{MultiIndex, INLINE_RANK};

use crate::combinatorics::{
    binomial_coefficient, checked_factorial, for_each_distinct_permutation,
    index_of_greatest_binomial_leq, permutation_sign,
};
use crate::scale::ScaleFactor;
use crate::shape::{Shape, Slot};
use crate::{Result, ShapeError};

/// The `order`-th exterior power of a `dim`-dimensional space.
///
/// A multi-index is normalized by sorting ascending. Repeated values make the
/// component a procedural zero; otherwise the sorted tuple
/// `a_0 < a_1 < ... < a_{k-1}` is stored at `sum_i C(a_i, i + 1)` and the scale
/// factor is the sign of the sorting permutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExteriorPower {
    order: usize,
    dim: usize,
    terms: usize,
    dims: SmallVec<[usize; INLINE_RANK]>,
}

impl ExteriorPower {
    /// Fails with [`ShapeError::InvalidOrder`] when `order > dim`, where every
    /// component would be a procedural zero, or when the `order!` arrangements
    /// of a slot do not fit in a `u64`.
    pub fn new(order: usize, dim: usize) -> Result<Self> {
        let terms = match checked_factorial(order as u64) {
            Some(terms) if order <= dim => terms,
            _ => return Err(ShapeError::InvalidOrder { order, dim }),
        };
        Ok(Self {
            order,
            dim,
            terms: terms as usize,
            dims: SmallVec::from_elem(dim, order),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Ascending copy of `m`, or `None` if a value repeats.
    fn sorted_distinct(m: &[usize]) -> Option<SmallVec<[usize; INLINE_RANK]>> {
        let mut sorted: SmallVec<[usize; INLINE_RANK]> = SmallVec::from_slice(m);
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            None
        } else {
            Some(sorted)
        }
    }

    fn offset_of_sorted(sorted: &[usize]) -> usize {
        sorted
            .iter()
            .enumerate()
            .map(|(i, &a)| binomial_coefficient(a, i + 1))
            .sum()
    }
}

impl Shape for ExteriorPower {
    fn factor_dims(&self) -> &[usize] {
        &self.dims
    }

    fn storage_count(&self) -> usize {
        binomial_coefficient(self.dim, self.order)
    }

    fn is_procedural_zero(&self, m: &[usize]) -> bool {
        Self::sorted_distinct(m).is_none()
    }

    fn scalar_factor(&self, m: &[usize]) -> ScaleFactor {
        ScaleFactor::from_sign(permutation_sign(m))
    }

    fn storage_index(&self, m: &[usize]) -> Option<usize> {
        Self::sorted_distinct(m).map(|sorted| Self::offset_of_sorted(&sorted))
    }

    fn locate(&self, m: &[usize]) -> Option<Slot> {
        let sorted = Self::sorted_distinct(m)?;
        Some(Slot {
            storage: Self::offset_of_sorted(&sorted),
            factor: ScaleFactor::from_sign(permutation_sign(m)),
        })
    }

    fn canonical_multi_index(&self, storage: usize) -> MultiIndex {
        let mut values: SmallVec<[usize; INLINE_RANK]> = SmallVec::from_elem(0, self.order);
        let mut rest = storage;
        // peel the largest value first
        for i in (1..=self.order).rev() {
            let a = index_of_greatest_binomial_leq(rest, i);
            rest -= binomial_coefficient(a, i);
            values[i - 1] = a;
        }
        MultiIndex::from_values_unchecked(&values, &self.dims)
    }

    fn for_each_preimage(&self, storage: usize, f: &mut dyn FnMut(&[usize])) {
        let canonical = self.canonical_multi_index(storage);
        for_each_distinct_permutation(canonical.values(), f);
    }

    fn term_count(&self, _storage: usize) -> usize {
        self.terms
    }
}
