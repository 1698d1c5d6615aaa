//! Tensor-product shape: every component stored, row-major.

use smallvec::SmallVec;
use tenalg_index::{MultiIndex, INLINE_RANK};

use crate::scale::ScaleFactor;
use crate::shape::{Shape, Slot};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dense {
    dims: SmallVec<[usize; INLINE_RANK]>,
}

impl Dense {
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: SmallVec::from_slice(dims),
        }
    }

    pub fn vector(dim: usize) -> Self {
        Self::new(&[dim])
    }

    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::new(&[rows, cols])
    }

    pub fn scalar() -> Self {
        Self::new(&[])
    }
}

impl Shape for Dense {
    fn factor_dims(&self) -> &[usize] {
        &self.dims
    }

    fn storage_count(&self) -> usize {
        self.dimension()
    }

    #[inline]
    fn is_procedural_zero(&self, _m: &[usize]) -> bool {
        false
    }

    #[inline]
    fn scalar_factor(&self, _m: &[usize]) -> ScaleFactor {
        ScaleFactor::ONE
    }

    #[inline]
    fn storage_index(&self, m: &[usize]) -> Option<usize> {
        Some(
            m.iter()
                .zip(self.dims.iter())
                .fold(0, |acc, (&v, &d)| acc * d + v),
        )
    }

    fn canonical_multi_index(&self, storage: usize) -> MultiIndex {
        MultiIndex::from_flat_unchecked(storage, &self.dims)
    }

    fn for_each_preimage(&self, storage: usize, f: &mut dyn FnMut(&[usize])) {
        f(self.canonical_multi_index(storage).values());
    }

    #[inline]
    fn locate(&self, m: &[usize]) -> Option<Slot> {
        self.storage_index(m).map(|storage| Slot {
            storage,
            factor: ScaleFactor::ONE,
        })
    }

    fn term_count(&self, _storage: usize) -> usize {
        1
    }
}
