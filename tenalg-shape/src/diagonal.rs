//! Diagonal 2-tensors: only the shared-index components are stored.

use tenalg_index::MultiIndex;

use crate::scale::ScaleFactor;
use crate::shape::Shape;

/// A `rows x cols` 2-tensor whose off-diagonal components are procedural
/// zeros. Storage holds the `min(rows, cols)` diagonal entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagonal2 {
    dims: [usize; 2],
}

impl Diagonal2 {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { dims: [rows, cols] }
    }

    pub fn square(dim: usize) -> Self {
        Self::new(dim, dim)
    }

    pub fn rows(&self) -> usize {
        self.dims[0]
    }

    pub fn cols(&self) -> usize {
        self.dims[1]
    }
}

impl Shape for Diagonal2 {
    fn factor_dims(&self) -> &[usize] {
        &self.dims
    }

    fn storage_count(&self) -> usize {
        self.dims[0].min(self.dims[1])
    }

    #[inline]
    fn is_procedural_zero(&self, m: &[usize]) -> bool {
        m[0] != m[1]
    }

    #[inline]
    fn scalar_factor(&self, _m: &[usize]) -> ScaleFactor {
        ScaleFactor::ONE
    }

    #[inline]
    fn storage_index(&self, m: &[usize]) -> Option<usize> {
        (m[0] == m[1]).then_some(m[0])
    }

    fn canonical_multi_index(&self, storage: usize) -> MultiIndex {
        MultiIndex::from_values_unchecked(&[storage, storage], &self.dims)
    }

    fn for_each_preimage(&self, storage: usize, f: &mut dyn FnMut(&[usize])) {
        f(&[storage, storage]);
    }

    fn term_count(&self, _storage: usize) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_diagonal_zero() {
        let s = Diagonal2::square(3);
        assert_eq!(s.storage_count(), 3);
        for r in 0..3 {
            for c in 0..3 {
                assert_eq!(s.is_procedural_zero(&[r, c]), r != c);
                assert_eq!(s.storage_index(&[r, c]).is_none(), r != c);
            }
        }
        assert_eq!(s.canonical_multi_index(2).values(), &[2, 2]);
    }

    #[test]
    fn test_rectangular() {
        let s = Diagonal2::new(2, 4);
        assert_eq!(s.storage_count(), 2);
        assert_eq!(s.dimension(), 8);
        assert_eq!(s.storage_index(&[1, 1]), Some(1));
        assert_eq!(s.storage_index(&[1, 3]), None);
    }
}
