//! Assignment targets and the aliasing protocol.

use std::fmt;

use log::{debug, trace};
use num_traits::Zero;
use smallvec::{smallvec, SmallVec};
use tenalg_index::{
    check_shared_dims, find_duplicate, same_symbol_set, symbols_of, DimIndex, IndexMap,
    IntoSymbols, MultiIndex, Symbol, SymbolList, INLINE_RANK,
};
use tenalg_shape::{MemoryRange, Shape, ShapeError, Tensor};
use tenalg_traits::Scalar;

use crate::error::{ExprError, Result};
use crate::expr::{Access, IndexedExpr, LeafIdentity};
use crate::indexed::{read, resolve};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssignOp {
    Set,
    Add,
    Sub,
}

impl AssignOp {
    fn name(self) -> &'static str {
        match self {
            AssignOp::Set => "assign",
            AssignOp::Add => "add_assign",
            AssignOp::Sub => "sub_assign",
        }
    }
}

/// A tensor with distinct abstract indices applied, as the target of `=`,
/// `+=` or `-=`.
///
/// Before writing, the right-hand side is asked whether it reads the target's
/// storage. If it does, the assignment fails with [`ExprError::Aliasing`]
/// instead of producing an order-dependent result; evaluate the right-hand
/// side with [`eval`](crate::ExprExt::eval) first, or opt out with
/// [`no_alias`](Self::no_alias) when the overlap is known to be harmless.
///
/// With logical indices the right-hand side must be representable by the
/// target's shape: zero on its procedural zeros, and consistent across all
/// multi-indices sharing a storage slot. Anything else fails with
/// [`ShapeError::ProceduralZero`] or [`ExprError::SymmetryMismatch`] before
/// any write. Storage-index targets take every slot as given.
pub struct IndexedMut<'a, S, T> {
    tensor: &'a Tensor<S, T>,
    access: Access,
    symbols: SymbolList,
    free: Vec<DimIndex>,
    check_aliasing: bool,
}

impl<'a, S: Shape, T: Scalar> IndexedMut<'a, S, T> {
    pub fn new(tensor: &'a Tensor<S, T>, indices: impl IntoSymbols) -> Result<Self> {
        let symbols = indices.into_symbols();
        let (access, free) = resolve(tensor.shape(), &symbols)?;
        if let Some(dup) = find_duplicate(&free) {
            return Err(ExprError::NotAnLvalue(dup));
        }
        Ok(Self {
            tensor,
            access,
            symbols,
            free,
            check_aliasing: true,
        })
    }

    /// Skip the aliasing scan for assignments through this target.
    pub fn no_alias(mut self) -> Self {
        self.check_aliasing = false;
        self
    }

    pub fn checks_aliasing(&self) -> bool {
        self.check_aliasing
    }

    /// `self = rhs`.
    pub fn assign<R>(&self, rhs: R) -> Result<()>
    where
        R: IndexedExpr<Scalar = T>,
    {
        self.apply(rhs, AssignOp::Set)
    }

    /// `self += rhs`.
    pub fn add_assign<R>(&self, rhs: R) -> Result<()>
    where
        R: IndexedExpr<Scalar = T>,
    {
        self.apply(rhs, AssignOp::Add)
    }

    /// `self -= rhs`.
    pub fn sub_assign<R>(&self, rhs: R) -> Result<()>
    where
        R: IndexedExpr<Scalar = T>,
    {
        self.apply(rhs, AssignOp::Sub)
    }

    fn identity(&self) -> LeafIdentity {
        LeafIdentity {
            range: self.tensor.memory_range(),
            access: self.access,
            symbols: self.symbols.clone(),
        }
    }

    fn validate<R: IndexedExpr<Scalar = T>>(&self, rhs: &R) -> Result<IndexMap> {
        let rf = rhs.free_indices();
        if let Some(dup) = find_duplicate(rf) {
            return Err(ExprError::DuplicateFreeIndex(dup));
        }
        if !same_symbol_set(&self.free, rf) {
            return Err(ExprError::FreeIndexMismatch {
                left: symbols_of(&self.free),
                right: symbols_of(rf),
            });
        }
        check_shared_dims(&self.free, rf)?;
        Ok(IndexMap::new(&self.free, rf)?)
    }

    /// Every logical component of `rhs` must survive the trip through storage.
    fn check_representable<R>(&self, rhs: &R, to_rhs: &IndexMap) -> Result<()>
    where
        R: IndexedExpr<Scalar = T>,
    {
        let shape = self.tensor.shape();
        if shape.storage_count() == shape.dimension() {
            return Ok(());
        }
        let mut mapped: SmallVec<[usize; INLINE_RANK]> = smallvec![0; to_rhs.len()];
        let mut canonical_mapped = mapped.clone();
        for m in MultiIndex::iter(shape.factor_dims()) {
            to_rhs.apply(m.values(), &mut mapped);
            let value = rhs.component(&mapped);
            let Some(slot) = shape.locate(m.values()) else {
                if value != T::zero() {
                    return Err(ShapeError::ProceduralZero(m.values().to_vec()).into());
                }
                continue;
            };
            let canonical = shape.canonical_multi_index(slot.storage);
            if canonical.values() == m.values() {
                continue;
            }
            to_rhs.apply(canonical.values(), &mut canonical_mapped);
            let expected = shape
                .scalar_factor(canonical.values())
                .divide_out(rhs.component(&canonical_mapped));
            if slot.factor.divide_out(value) != expected {
                return Err(ExprError::SymmetryMismatch {
                    index: m.values().to_vec(),
                    canonical: canonical.values().to_vec(),
                });
            }
        }
        Ok(())
    }

    fn apply<R>(&self, rhs: R, op: AssignOp) -> Result<()>
    where
        R: IndexedExpr<Scalar = T>,
    {
        let to_rhs = self.validate(&rhs)?;

        if op == AssignOp::Set && rhs.leaf_identity().as_ref() == Some(&self.identity()) {
            trace!("{}: self-assignment, nothing to do", op.name());
            return Ok(());
        }

        let range = self.tensor.memory_range();
        if self.check_aliasing && rhs.overlaps_memory_range(&range) {
            debug!(
                "{}: right-hand side overlaps destination {:#x}+{}",
                op.name(),
                range.start,
                range.len
            );
            return Err(ExprError::Aliasing {
                operation: op.name(),
            });
        }

        if self.access == Access::Logical {
            self.check_representable(&rhs, &to_rhs)?;
        }

        trace!(
            "{}: {} slots, {:?} access",
            op.name(),
            self.tensor.shape().storage_count(),
            self.access
        );
        let shape = self.tensor.shape();
        let components = self.tensor.components();
        let mut mapped: SmallVec<[usize; INLINE_RANK]> = smallvec![0; to_rhs.len()];
        for p in 0..shape.storage_count() {
            let value = match self.access {
                Access::Logical => {
                    let m = shape.canonical_multi_index(p);
                    to_rhs.apply(m.values(), &mut mapped);
                    shape.scalar_factor(m.values()).divide_out(rhs.component(&mapped))
                }
                Access::Storage => {
                    mapped[0] = p;
                    rhs.component(&mapped)
                }
            };
            let stored = match op {
                AssignOp::Set => value,
                AssignOp::Add => components.get(p) + value,
                AssignOp::Sub => components.get(p) - value,
            };
            components.set(p, stored);
        }
        Ok(())
    }
}

impl<'a, S: Shape, T: Scalar> IndexedExpr for IndexedMut<'a, S, T> {
    type Scalar = T;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &[]
    }

    #[inline]
    fn component(&self, free: &[usize]) -> T {
        read(self.tensor, self.access, free)
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.tensor.memory_range().overlaps(range)
    }

    fn leaf_identity(&self) -> Option<LeafIdentity> {
        Some(self.identity())
    }
}

impl<S, T> fmt::Debug for IndexedMut<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedMut")
            .field("access", &self.access)
            .field("free", &self.free)
            .field("check_aliasing", &self.check_aliasing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexed::IndexNotation;
    use crate::ExprExt;
    use approx::assert_abs_diff_eq;
    use tenalg_shape::{Dense, Diagonal2, SymmetricPower};

    fn matrix() -> Tensor<Dense, f64> {
        Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap()
    }

    #[test]
    fn test_transpose_into_other() {
        let a = matrix();
        let b = Tensor::zeros(Dense::matrix(2, 2));
        b.lhs("ij").unwrap().assign(a.at("ji")).unwrap();
        assert_eq!(b.to_storage_vec(), vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_add_and_sub_assign() {
        let a = matrix();
        let b = matrix();
        let target = b.lhs("ij").unwrap();
        target.add_assign(a.at("ij")).unwrap();
        assert_eq!(b.to_storage_vec(), vec![2.0, 4.0, 6.0, 8.0]);
        target.sub_assign(a.at("ji")).unwrap();
        assert_eq!(b.to_storage_vec(), vec![1.0, 1.0, 4.0, 4.0]);
    }

    #[test]
    fn test_repeated_index_is_not_an_lvalue() {
        let a = matrix();
        assert_eq!(
            a.lhs("ii").unwrap_err(),
            ExprError::NotAnLvalue(Symbol::new('i'))
        );
    }

    #[test]
    fn test_free_set_mismatch() {
        let a = matrix();
        let v = Tensor::<_, f64>::zeros(Dense::vector(2));
        let err = a.lhs("ij").unwrap().assign(v.at("i")).unwrap_err();
        assert!(matches!(err, ExprError::FreeIndexMismatch { .. }));
    }

    #[test]
    fn test_aliasing_rejected_and_opt_out() {
        let t = matrix();
        let err = t.lhs("ij").unwrap().assign(t.at("ji")).unwrap_err();
        assert_eq!(err, ExprError::Aliasing { operation: "assign" });
        // untouched after the rejection
        assert_eq!(t.to_storage_vec(), vec![1.0, 2.0, 3.0, 4.0]);

        // element-wise scaling in place reads each slot before writing it
        t.lhs("ij")
            .unwrap()
            .no_alias()
            .assign(t.at("ij").scale(2.0))
            .unwrap();
        assert_eq!(t.to_storage_vec(), vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_self_assignment_is_noop() {
        let t = matrix();
        t.lhs("ij").unwrap().assign(t.at("ij")).unwrap();
        assert_eq!(t.to_storage_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        // += on itself goes through the scan
        assert!(t.lhs("ij").unwrap().add_assign(t.at("ij")).is_err());
    }

    #[test]
    fn test_symmetric_target_divides_out_factor() {
        let a = Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 5.0, 5.0, 3.0]).unwrap();
        let s = Tensor::<_, f64>::zeros(SymmetricPower::new(2, 2).unwrap());
        s.lhs("ij").unwrap().assign(a.at("ij")).unwrap();
        for r in 0..2 {
            for c in 0..2 {
                assert_abs_diff_eq!(s.get(&[r, c]).unwrap(), a.get(&[r, c]).unwrap());
            }
        }
    }

    #[test]
    fn test_diagonal_target_rejects_off_diagonal_values() {
        let a = Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 7.0, 0.0, 4.0]).unwrap();
        let d = Tensor::<_, f64>::zeros(Diagonal2::square(2));
        let err = d.lhs("ij").unwrap().assign(a.at("ij")).unwrap_err();
        assert_eq!(err, ExprError::Shape(ShapeError::ProceduralZero(vec![0, 1])));
        assert_eq!(err, ExprError::from(d.set(&[0, 1], 7.0).unwrap_err()));
        assert_eq!(d.to_storage_vec(), vec![0.0, 0.0]);

        let diag = Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 0.0, 0.0, 4.0]).unwrap();
        d.lhs("ij").unwrap().assign(diag.at("ij")).unwrap();
        assert_eq!(d.to_storage_vec(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_symmetric_target_rejects_asymmetric_values() {
        let a = Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 2.0, 10.0, 4.0]).unwrap();
        let s = Tensor::<_, f64>::zeros(SymmetricPower::new(2, 2).unwrap());
        let err = s.lhs("ij").unwrap().add_assign(a.at("ij")).unwrap_err();
        assert!(matches!(err, ExprError::SymmetryMismatch { .. }));
        assert!(s.to_storage_vec().iter().all(|&x| x == 0.0));

        // symmetric in aggregate is enough
        s.lhs("ij")
            .unwrap()
            .assign((a.at("ij") + a.at("ji")) / 2.0_f64)
            .unwrap();
        assert_eq!(s.get(&[0, 1]).unwrap(), 6.0);
        assert_eq!(s.get(&[1, 0]).unwrap(), 6.0);
    }

    #[test]
    fn test_storage_target() {
        let d = Tensor::<_, f64>::zeros(Diagonal2::square(3));
        let v = Tensor::from_storage(Dense::vector(3), vec![2.0, 3.0, 5.0]).unwrap();
        d.lhs("p").unwrap().assign(v.at("p")).unwrap();
        assert_eq!(d.get(&[2, 2]).unwrap(), 5.0);
        assert_eq!(d.get(&[0, 2]).unwrap(), 0.0);
    }
}
