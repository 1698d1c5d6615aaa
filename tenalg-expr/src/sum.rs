//! Addition and subtraction nodes.

use smallvec::{smallvec, SmallVec};
use tenalg_index::{
    check_shared_dims, find_duplicate, same_symbol_set, symbols_of, union_symbols, DimIndex,
    IndexMap, Symbol, INLINE_RANK,
};
use tenalg_shape::MemoryRange;

use crate::error::{ExprError, Result};
use crate::expr::IndexedExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// `left ± right` over the same set of free indices.
///
/// The right operand may list its free indices in any order; the result
/// takes the left operand's order.
#[derive(Debug, Clone)]
pub struct Sum<L, R> {
    left: L,
    right: R,
    sign: Sign,
    right_map: IndexMap,
    used: Vec<Symbol>,
}

impl<L, R> Sum<L, R>
where
    L: IndexedExpr,
    R: IndexedExpr<Scalar = L::Scalar>,
{
    pub fn new(left: L, right: R, sign: Sign) -> Result<Self> {
        let lf = left.free_indices();
        let rf = right.free_indices();
        if let Some(dup) = find_duplicate(lf).or_else(|| find_duplicate(rf)) {
            return Err(ExprError::DuplicateFreeIndex(dup));
        }
        if !same_symbol_set(lf, rf) {
            return Err(ExprError::FreeIndexMismatch {
                left: symbols_of(lf),
                right: symbols_of(rf),
            });
        }
        check_shared_dims(lf, rf)?;

        let used = union_symbols(left.used_indices(), right.used_indices());
        if let Some(d) = lf.iter().find(|d| used.contains(&d.symbol)) {
            return Err(ExprError::IndexReused(d.symbol));
        }
        let right_map = IndexMap::new(lf, rf)?;
        Ok(Self {
            left,
            right,
            sign,
            right_map,
            used,
        })
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }
}

impl<L, R> IndexedExpr for Sum<L, R>
where
    L: IndexedExpr,
    R: IndexedExpr<Scalar = L::Scalar>,
{
    type Scalar = L::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        self.left.free_indices()
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    #[inline]
    fn component(&self, free: &[usize]) -> L::Scalar {
        let mut mapped: SmallVec<[usize; INLINE_RANK]> = smallvec![0; self.right_map.len()];
        self.right_map.apply(free, &mut mapped);
        let l = self.left.component(free);
        let r = self.right.component(&mapped);
        match self.sign {
            Sign::Plus => l + r,
            Sign::Minus => l - r,
        }
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.left.overlaps_memory_range(range) || self.right.overlaps_memory_range(range)
    }
}
