//! The shape descriptor protocol.

use std::fmt::Debug;

use tenalg_index::{IndexError, MultiIndex};

use crate::scale::ScaleFactor;
use crate::{Result, ShapeError};

/// Where a logical component lives in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub storage: usize,
    pub factor: ScaleFactor,
}

/// Maps the logical multi-indices of a tensor onto its stored components.
///
/// A tensor presents `order()` factor axes with the extents in
/// [`factor_dims`](Self::factor_dims). Some logical components are
/// *procedural zeros* with no storage; every other component maps to exactly
/// one storage slot and reads as `stored * scalar_factor(m)`. The map from
/// non-zero multi-indices to `0..storage_count()` is onto, and
/// [`canonical_multi_index`](Self::canonical_multi_index) picks one preimage
/// per slot. Its factor is not necessarily one: exterior canonical indices
/// read with `+1`, symmetric ones with one over their arrangement count.
///
/// Multi-index arguments are raw values in factor order. They must be in
/// range; [`check_multi_index`](Self::check_multi_index) validates them.
pub trait Shape: Clone + Debug + PartialEq {
    /// Extent of each factor axis, in order.
    fn factor_dims(&self) -> &[usize];

    /// Number of stored components.
    fn storage_count(&self) -> usize;

    fn is_procedural_zero(&self, m: &[usize]) -> bool;

    /// Multiplier applied to the stored value on read. Only meaningful off the
    /// procedural zeros.
    fn scalar_factor(&self, m: &[usize]) -> ScaleFactor;

    /// Storage slot of `m`, `None` exactly on procedural zeros.
    fn storage_index(&self, m: &[usize]) -> Option<usize>;

    /// The representative multi-index of a storage slot.
    fn canonical_multi_index(&self, storage: usize) -> MultiIndex;

    /// Call `f` with every multi-index that maps to `storage`.
    fn for_each_preimage(&self, storage: usize, f: &mut dyn FnMut(&[usize]));

    fn order(&self) -> usize {
        self.factor_dims().len()
    }

    /// Number of logical components, the product of the factor extents.
    fn dimension(&self) -> usize {
        self.factor_dims().iter().product()
    }

    /// Storage slot and scale factor in one step.
    fn locate(&self, m: &[usize]) -> Option<Slot> {
        self.storage_index(m).map(|storage| Slot {
            storage,
            factor: self.scalar_factor(m),
        })
    }

    /// Number of logical components sharing `storage`.
    fn term_count(&self, storage: usize) -> usize {
        let mut count = 0;
        self.for_each_preimage(storage, &mut |_| count += 1);
        count
    }

    fn check_multi_index(&self, m: &[usize]) -> Result<()> {
        let dims = self.factor_dims();
        if m.len() != dims.len() {
            return Err(ShapeError::RankMismatch {
                expected: dims.len(),
                found: m.len(),
            });
        }
        for (&value, &bound) in m.iter().zip(dims.iter()) {
            if value >= bound {
                return Err(IndexError::OutOfRange { value, bound }.into());
            }
        }
        Ok(())
    }

    fn check_storage_index(&self, storage: usize) -> Result<()> {
        let count = self.storage_count();
        if storage >= count {
            return Err(IndexError::FlatOutOfRange {
                value: storage,
                total: count,
            }
            .into());
        }
        Ok(())
    }
}
