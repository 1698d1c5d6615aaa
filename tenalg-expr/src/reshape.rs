//! Structural reshaping: moving between factor indices and storage indices.
//!
//! A storage index `P` over shape `S` ranges over `S.storage_count()` and
//! names one stored component. Reading the tensor `x` it addresses through
//! `S` gives
//!
//! ```text
//! E_S(x)[m] = 0                          if m is a procedural zero of S
//!           = factor_S(m) * x[storage_S(m)]  otherwise
//! ```
//!
//! Every node here consumes some free indices of its operand, which become
//! used, and appends the new ones at the end of the free list.

use num_traits::Zero;
use smallvec::{smallvec, SmallVec};
use tenalg_index::{
    find_duplicate, position_of, union_symbols, DimIndex, IntoSymbols, MultiIndex, Symbol,
    INLINE_RANK,
};
use tenalg_shape::{MemoryRange, Shape};

use crate::error::{ExprError, Result};
use crate::expr::IndexedExpr;

type Values = SmallVec<[usize; INLINE_RANK]>;

/// Where one operand index takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// Position in the node's own free list.
    Free(usize),
    /// Position among the values produced by the node.
    Slot(usize),
}

/// The operand's free list with `consumed` taken out.
///
/// Returns the remaining free indices and, for each operand index, where
/// its value comes from: remaining indices keep their order at the front of
/// the node's free list, consumed ones read `Slot(k)` for their position `k`
/// in `consumed`.
pub(crate) fn consume(
    free: &[DimIndex],
    consumed: &[Symbol],
) -> Result<(Vec<DimIndex>, SmallVec<[Source; INLINE_RANK]>)> {
    for &s in consumed {
        if position_of(free, s).is_none() {
            return Err(ExprError::NotFree(s));
        }
    }
    let mut rest = Vec::with_capacity(free.len());
    let mut sources = SmallVec::new();
    for d in free {
        match consumed.iter().position(|&s| s == d.symbol) {
            Some(k) => sources.push(Source::Slot(k)),
            None => {
                sources.push(Source::Free(rest.len()));
                rest.push(*d);
            }
        }
    }
    Ok((rest, sources))
}

/// Check that `fresh` symbols can be appended after `rest`.
pub(crate) fn check_fresh(
    fresh: &[Symbol],
    rest: &[DimIndex],
    used: &[Symbol],
    consumed: &[Symbol],
) -> Result<()> {
    for (k, &s) in fresh.iter().enumerate() {
        if fresh[..k].contains(&s) || position_of(rest, s).is_some() {
            return Err(ExprError::DuplicateFreeIndex(s));
        }
        if used.contains(&s) || consumed.contains(&s) {
            return Err(ExprError::IndexReused(s));
        }
    }
    Ok(())
}

/// Storage index symbol `index` must be free with extent `storage_count`.
pub(crate) fn check_storage_index(free: &[DimIndex], index: Symbol, storage_count: usize) -> Result<()> {
    let d = position_of(free, index)
        .map(|k| free[k])
        .ok_or(ExprError::NotFree(index))?;
    if d.dim != storage_count {
        return Err(ExprError::DimensionMismatch {
            symbol: index,
            dim_a: d.dim,
            dim_b: storage_count,
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn gather(sources: &[Source], free: &[usize], slots: &[usize], out: &mut [usize]) {
    for (o, src) in out.iter_mut().zip(sources.iter()) {
        *o = match *src {
            Source::Free(k) => free[k],
            Source::Slot(k) => slots[k],
        };
    }
}

/// `E_S(operand)[m]`, with the operand's storage index in `Slot(0)`.
#[inline]
pub(crate) fn read_through<S, E>(
    shape: &S,
    expr: &E,
    sources: &[Source],
    free: &[usize],
    m: &[usize],
) -> E::Scalar
where
    S: Shape,
    E: IndexedExpr,
{
    match shape.locate(m) {
        Some(slot) => {
            let mut sub: Values = smallvec![0; sources.len()];
            gather(sources, free, &[slot.storage], &mut sub);
            slot.factor.apply(expr.component(&sub))
        }
        None => E::Scalar::zero(),
    }
}

/// Merges several free indices into one storage index.
///
/// `value[rest, P] = operand[rest, c] / factor_S(c)` with `c` the canonical
/// multi-index of `P`. Components of the operand off the canonical
/// multi-indices are not read, so bundling assumes the operand already has
/// the symmetry of `S`.
#[derive(Debug, Clone)]
pub struct Bundle<E, S> {
    expr: E,
    shape: S,
    sources: SmallVec<[Source; INLINE_RANK]>,
    free: Vec<DimIndex>,
    used: Vec<Symbol>,
}

impl<E: IndexedExpr, S: Shape> Bundle<E, S> {
    pub fn new(
        expr: E,
        indices: impl IntoSymbols,
        shape: S,
        into: impl Into<Symbol>,
    ) -> Result<Self> {
        let bundled = indices.into_symbols();
        let into = into.into();
        let sub_free = expr.free_indices();

        if bundled.len() != shape.order() {
            return Err(ExprError::RankMismatch {
                expected: shape.order(),
                found: bundled.len(),
            });
        }
        let listed: Vec<DimIndex> = bundled
            .iter()
            .map(|&s| {
                position_of(sub_free, s)
                    .map(|k| sub_free[k])
                    .ok_or(ExprError::NotFree(s))
            })
            .collect::<Result<_>>()?;
        if let Some(dup) = find_duplicate(&listed) {
            return Err(ExprError::DuplicateFreeIndex(dup));
        }
        let found: Vec<usize> = listed.iter().map(|d| d.dim).collect();
        if found != shape.factor_dims() {
            return Err(ExprError::ShapeMismatch {
                expected: shape.factor_dims().to_vec(),
                found,
            });
        }

        let (mut free, sources) = consume(sub_free, &bundled)?;
        check_fresh(&[into], &free, expr.used_indices(), &bundled)?;
        free.push(DimIndex::new(into, shape.storage_count()));
        let used = union_symbols(expr.used_indices(), &bundled);
        Ok(Self {
            expr,
            shape,
            sources,
            free,
            used,
        })
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }
}

impl<E: IndexedExpr, S: Shape> IndexedExpr for Bundle<E, S> {
    type Scalar = E::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    fn component(&self, free: &[usize]) -> E::Scalar {
        let p = free[free.len() - 1];
        let c = self.shape.canonical_multi_index(p);
        let mut sub: Values = smallvec![0; self.sources.len()];
        gather(&self.sources, free, c.values(), &mut sub);
        self.shape
            .scalar_factor(c.values())
            .divide_out(self.expr.component(&sub))
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.expr.overlaps_memory_range(range)
    }
}

/// Expands a storage index into one free index per factor of `S`.
///
/// `value[rest, m] = E_S(operand)[m]`, so procedural zeros read as zero and
/// scale factors are applied.
#[derive(Debug, Clone)]
pub struct Split<E, S> {
    expr: E,
    shape: S,
    sources: SmallVec<[Source; INLINE_RANK]>,
    free: Vec<DimIndex>,
    used: Vec<Symbol>,
}

impl<E: IndexedExpr, S: Shape> Split<E, S> {
    pub fn new(
        expr: E,
        index: impl Into<Symbol>,
        shape: S,
        into: impl IntoSymbols,
    ) -> Result<Self> {
        let index = index.into();
        let fresh = into.into_symbols();
        check_storage_index(expr.free_indices(), index, shape.storage_count())?;
        if fresh.len() != shape.order() {
            return Err(ExprError::RankMismatch {
                expected: shape.order(),
                found: fresh.len(),
            });
        }

        let (mut free, sources) = consume(expr.free_indices(), &[index])?;
        check_fresh(&fresh, &free, expr.used_indices(), &[index])?;
        free.extend(
            fresh
                .iter()
                .zip(shape.factor_dims())
                .map(|(&s, &dim)| DimIndex::new(s, dim)),
        );
        let used = union_symbols(expr.used_indices(), &[index]);
        Ok(Self {
            expr,
            shape,
            sources,
            free,
            used,
        })
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }
}

impl<E: IndexedExpr, S: Shape> IndexedExpr for Split<E, S> {
    type Scalar = E::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    fn component(&self, free: &[usize]) -> E::Scalar {
        let m = &free[free.len() - self.shape.order()..];
        read_through(&self.shape, &self.expr, &self.sources, free, m)
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.expr.overlaps_memory_range(range)
    }
}

/// [`Split`] followed by row-major flattening of the factor multi-index into
/// a single index over `S.dimension()`.
#[derive(Debug, Clone)]
pub struct SplitToIndex<E, S> {
    expr: E,
    shape: S,
    sources: SmallVec<[Source; INLINE_RANK]>,
    free: Vec<DimIndex>,
    used: Vec<Symbol>,
}

impl<E: IndexedExpr, S: Shape> SplitToIndex<E, S> {
    pub fn new(
        expr: E,
        index: impl Into<Symbol>,
        shape: S,
        into: impl Into<Symbol>,
    ) -> Result<Self> {
        let index = index.into();
        let into = into.into();
        check_storage_index(expr.free_indices(), index, shape.storage_count())?;

        let (mut free, sources) = consume(expr.free_indices(), &[index])?;
        check_fresh(&[into], &free, expr.used_indices(), &[index])?;
        free.push(DimIndex::new(into, shape.dimension()));
        let used = union_symbols(expr.used_indices(), &[index]);
        Ok(Self {
            expr,
            shape,
            sources,
            free,
            used,
        })
    }
}

impl<E: IndexedExpr, S: Shape> IndexedExpr for SplitToIndex<E, S> {
    type Scalar = E::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    fn component(&self, free: &[usize]) -> E::Scalar {
        let q = free[free.len() - 1];
        let m = MultiIndex::from_flat_unchecked(q, self.shape.factor_dims());
        read_through(&self.shape, &self.expr, &self.sources, free, m.values())
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.expr.overlaps_memory_range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexed::IndexNotation;
    use crate::ExprExt;
    use approx::assert_abs_diff_eq;
    use tenalg_shape::{Dense, Diagonal2, ExteriorPower, SymmetricPower, Tensor};

    fn symmetric_matrix() -> Tensor<Dense, f64> {
        Tensor::from_storage(
            Dense::matrix(3, 3),
            vec![1.0, 2.0, 3.0, 2.0, 4.0, 5.0, 3.0, 5.0, 6.0],
        )
        .unwrap()
    }

    // ========================================================================
    // Bundle / split
    // ========================================================================

    #[test]
    fn test_bundle_then_split_round_trips_symmetric() {
        let a = symmetric_matrix();
        let shape = SymmetricPower::new(2, 3).unwrap();
        let b = a.at("ij").bundle("ij", shape.clone(), 'p').unwrap();
        assert_eq!(b.free_indices(), &[DimIndex::new('p', 6)]);
        assert_eq!(b.used_indices(), &[Symbol::new('i'), Symbol::new('j')]);

        let s = b.split('p', shape, "kl").unwrap();
        let dense = s.to_dense_vec();
        for (x, y) in dense.iter().zip(a.to_dense_vec()) {
            assert_abs_diff_eq!(*x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_bundle_matches_stored_components() {
        let a = symmetric_matrix();
        let shape = SymmetricPower::new(2, 3).unwrap();
        let s = Tensor::<_, f64>::from_fn(shape.clone(), |m| a.logical(m));
        let b = a.at("ij").bundle("ij", shape, 'p').unwrap();
        for (x, y) in b.to_dense_vec().iter().zip(s.to_storage_vec()) {
            assert_abs_diff_eq!(*x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_split_keeps_other_free_indices_first() {
        // T(a, p) with p over the diagonal of a 2x2
        let t = Tensor::from_storage(Dense::matrix(3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        let s = t.at("ap").split('p', Diagonal2::square(2), "ij").unwrap();
        assert_eq!(
            s.free_indices(),
            &[
                DimIndex::new('a', 3),
                DimIndex::new('i', 2),
                DimIndex::new('j', 2)
            ]
        );
        assert_eq!(s.component(&[2, 1, 1]), 6.0);
        assert_eq!(s.component(&[2, 0, 1]), 0.0);
    }

    #[test]
    fn test_split_antisymmetric_signs() {
        let v = Tensor::from_storage(Dense::vector(3), vec![1.0, 2.0, 3.0]).unwrap();
        let shape = ExteriorPower::new(2, 3).unwrap();
        let s = v.at("p").split('p', shape.clone(), "ij").unwrap();
        for i in 0..3 {
            assert_eq!(s.component(&[i, i]), 0.0);
            for j in 0..3 {
                assert_eq!(s.component(&[i, j]), -s.component(&[j, i]));
            }
        }
        let c = shape.canonical_multi_index(2);
        assert_eq!(s.component(c.values()), 3.0);
    }

    #[test]
    fn test_split_to_index_flattens() {
        let d = Tensor::from_storage(Dense::vector(2), vec![7.0, 9.0]).unwrap();
        let s = d.at("p").split_to_index('p', Diagonal2::square(2), 'q').unwrap();
        assert_eq!(s.free_indices(), &[DimIndex::new('q', 4)]);
        assert_eq!(s.to_dense_vec(), vec![7.0, 0.0, 0.0, 9.0]);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_reshape_errors() {
        let a = symmetric_matrix();
        let shape = SymmetricPower::new(2, 3).unwrap();
        assert_eq!(
            a.at("ij").bundle("ik", shape.clone(), 'p').unwrap_err(),
            ExprError::NotFree(Symbol::new('k'))
        );
        assert!(matches!(
            a.at("ij").bundle("i", shape.clone(), 'p'),
            Err(ExprError::RankMismatch { .. })
        ));
        assert!(matches!(
            a.at("ij").bundle("ij", SymmetricPower::new(2, 2).unwrap(), 'p'),
            Err(ExprError::ShapeMismatch { .. })
        ));
        assert_eq!(
            a.at("ij").bundle("ij", shape.clone(), 'i').unwrap_err(),
            ExprError::IndexReused(Symbol::new('i'))
        );
        // i is 3 wide, not 6
        assert!(matches!(
            a.at("ij").split('i', shape.clone(), "kl"),
            Err(ExprError::DimensionMismatch { .. })
        ));
        let v = Tensor::<_, f64>::zeros(Dense::matrix(6, 3));
        assert_eq!(
            v.at("pj").split('p', shape, "jk").unwrap_err(),
            ExprError::DuplicateFreeIndex(Symbol::new('j'))
        );
    }
}
