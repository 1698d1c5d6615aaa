//! Outer product with contraction of shared indices.

use tenalg_index::{
    check_shared_dims, intersection, symmetric_difference, union_symbols, DimIndex, Symbol,
};
use tenalg_shape::MemoryRange;
use tenalg_traits::{Euclidean, NaturalPairing};

use crate::error::{ExprError, Result};
use crate::expr::IndexedExpr;
use crate::summation::BinarySummation;

/// `left * right` in Einstein notation.
///
/// Indices free in both operands are summed, weighted by the pairing `P`;
/// the rest stay free, left operand's first.
#[derive(Debug, Clone)]
pub struct Product<L, R, P = Euclidean> {
    left: L,
    right: R,
    free: Vec<DimIndex>,
    summed: Vec<DimIndex>,
    used: Vec<Symbol>,
    summation: BinarySummation<P>,
}

impl<L, R, P> Product<L, R, P>
where
    L: IndexedExpr,
    R: IndexedExpr<Scalar = L::Scalar>,
    P: NaturalPairing<L::Scalar>,
{
    pub fn new(left: L, right: R, pairing: P) -> Result<Self> {
        let lf = left.free_indices();
        let rf = right.free_indices();
        check_shared_dims(lf, rf)?;
        let summed = intersection(lf, rf)?;
        let free = symmetric_difference(lf, rf);

        let lu = left.used_indices();
        let ru = right.used_indices();
        if let Some(d) = free
            .iter()
            .chain(summed.iter())
            .find(|d| lu.contains(&d.symbol) || ru.contains(&d.symbol))
        {
            return Err(ExprError::IndexReused(d.symbol));
        }

        let summation = BinarySummation::new::<L::Scalar>(&free, &summed, lf, rf, pairing)?;
        let mut used = union_symbols(lu, ru);
        for d in &summed {
            if !used.contains(&d.symbol) {
                used.push(d.symbol);
            }
        }
        Ok(Self {
            left,
            right,
            free,
            summed,
            used,
            summation,
        })
    }

    /// Indices contracted by this node.
    pub fn summed_indices(&self) -> &[DimIndex] {
        &self.summed
    }
}

impl<L, R, P> IndexedExpr for Product<L, R, P>
where
    L: IndexedExpr,
    R: IndexedExpr<Scalar = L::Scalar>,
    P: NaturalPairing<L::Scalar>,
{
    type Scalar = L::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    #[inline]
    fn component(&self, free: &[usize]) -> L::Scalar {
        self.summation.evaluate(
            free,
            |m| self.left.component(m),
            |m| self.right.component(m),
        )
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.left.overlaps_memory_range(range) || self.right.overlaps_memory_range(range)
    }
}
