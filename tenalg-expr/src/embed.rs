//! Moving a storage index between two shapes over the same factors.

use num_traits::Zero;
use smallvec::SmallVec;
use tenalg_index::{union_symbols, DimIndex, Symbol, INLINE_RANK};
use tenalg_shape::{MemoryRange, Shape};

use crate::error::{ExprError, Result};
use crate::expr::IndexedExpr;
use crate::reshape::{check_fresh, check_storage_index, consume, read_through, Source};

fn check_same_factors<S: Shape, A: Shape>(from: &S, to: &A) -> Result<()> {
    if from.factor_dims() != to.factor_dims() {
        return Err(ExprError::ShapeMismatch {
            expected: from.factor_dims().to_vec(),
            found: to.factor_dims().to_vec(),
        });
    }
    Ok(())
}

/// Rewrites a storage index of `S` as a storage index of the larger shape `A`,
/// for instance diagonal into dense or symmetric into dense.
///
/// `value[rest, Q] = E_S(operand)[c] / factor_A(c)` with `c` the canonical
/// multi-index of `Q` in `A`. Procedural zeros of `S` come out as zero.
#[derive(Debug, Clone)]
pub struct Embed<E, S, A> {
    expr: E,
    subspace: S,
    ambient: A,
    sources: SmallVec<[Source; INLINE_RANK]>,
    free: Vec<DimIndex>,
    used: Vec<Symbol>,
}

impl<E: IndexedExpr, S: Shape, A: Shape> Embed<E, S, A> {
    pub fn new(
        expr: E,
        index: impl Into<Symbol>,
        subspace: S,
        ambient: A,
        into: impl Into<Symbol>,
    ) -> Result<Self> {
        let index = index.into();
        let into = into.into();
        check_same_factors(&subspace, &ambient)?;
        check_storage_index(expr.free_indices(), index, subspace.storage_count())?;

        let (mut free, sources) = consume(expr.free_indices(), &[index])?;
        check_fresh(&[into], &free, expr.used_indices(), &[index])?;
        free.push(DimIndex::new(into, ambient.storage_count()));
        let used = union_symbols(expr.used_indices(), &[index]);
        Ok(Self {
            expr,
            subspace,
            ambient,
            sources,
            free,
            used,
        })
    }
}

impl<E: IndexedExpr, S: Shape, A: Shape> IndexedExpr for Embed<E, S, A> {
    type Scalar = E::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    fn component(&self, free: &[usize]) -> E::Scalar {
        let q = free[free.len() - 1];
        let c = self.ambient.canonical_multi_index(q);
        let v = read_through(&self.subspace, &self.expr, &self.sources, free, c.values());
        self.ambient.scalar_factor(c.values()).divide_out(v)
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.expr.overlaps_memory_range(range)
    }
}

/// The adjoint of [`Embed`]: rewrites a storage index of `A` as a storage
/// index of `S`.
///
/// `value[rest, P] = sum over m in preimage_S(P) of factor_S(m) * E_A(operand)[m]`,
/// so every one of the `term_count` multi-indices sharing `P` contributes.
#[derive(Debug, Clone)]
pub struct Coembed<E, A, S> {
    expr: E,
    ambient: A,
    subspace: S,
    sources: SmallVec<[Source; INLINE_RANK]>,
    free: Vec<DimIndex>,
    used: Vec<Symbol>,
}

impl<E: IndexedExpr, A: Shape, S: Shape> Coembed<E, A, S> {
    pub fn new(
        expr: E,
        index: impl Into<Symbol>,
        ambient: A,
        subspace: S,
        into: impl Into<Symbol>,
    ) -> Result<Self> {
        let index = index.into();
        let into = into.into();
        check_same_factors(&subspace, &ambient)?;
        check_storage_index(expr.free_indices(), index, ambient.storage_count())?;

        let (mut free, sources) = consume(expr.free_indices(), &[index])?;
        check_fresh(&[into], &free, expr.used_indices(), &[index])?;
        free.push(DimIndex::new(into, subspace.storage_count()));
        let used = union_symbols(expr.used_indices(), &[index]);
        Ok(Self {
            expr,
            ambient,
            subspace,
            sources,
            free,
            used,
        })
    }
}

impl<E: IndexedExpr, A: Shape, S: Shape> IndexedExpr for Coembed<E, A, S> {
    type Scalar = E::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    fn component(&self, free: &[usize]) -> E::Scalar {
        let p = free[free.len() - 1];
        let mut acc = E::Scalar::zero();
        self.subspace.for_each_preimage(p, &mut |m: &[usize]| {
            let v = read_through(&self.ambient, &self.expr, &self.sources, free, m);
            acc = acc + self.subspace.scalar_factor(m).apply(v);
        });
        acc
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
    use tenalg_shape::{Dense, Diagonal2, SymmetricPower, Tensor};

    #[test]
    fn test_embed_diagonal_into_dense() {
        let d = Tensor::from_storage(Dense::vector(3), vec![2.0, 3.0, 5.0]).unwrap();
        let e = d
            .at("p")
            .embed('p', Diagonal2::square(3), Dense::matrix(3, 3), 'q')
            .unwrap();
        assert_eq!(e.free_indices(), &[DimIndex::new('q', 9)]);
        assert_eq!(
            e.to_dense_vec(),
            vec![2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 5.0]
        );
    }

    #[test]
    fn test_coembed_inverts_diagonal_embed() {
        let d = Tensor::from_storage(Dense::vector(3), vec![2.0, 3.0, 5.0]).unwrap();
        let round = d
            .at("p")
            .embed('p', Diagonal2::square(3), Dense::matrix(3, 3), 'q')
            .unwrap()
            .coembed('q', Dense::matrix(3, 3), Diagonal2::square(3), 'r')
            .unwrap();
        assert_eq!(round.to_dense_vec(), vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_embed_symmetric_reproduces_logical_values() {
        let shape = SymmetricPower::new(2, 3).unwrap();
        let s = Tensor::<_, f64>::from_fn(shape.clone(), |m| (m[0] + m[1] * m[1]) as f64);
        let e = s
            .at("p")
            .embed('p', shape, Dense::matrix(3, 3), 'q')
            .unwrap();
        for (x, y) in e.to_dense_vec().iter().zip(s.to_dense_vec()) {
            assert_abs_diff_eq!(*x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_coembed_is_adjoint_of_embed() {
        // <embed x, y> over dense storage equals <x, coembed y> over symmetric storage
        let shape = SymmetricPower::new(2, 3).unwrap();
        let x = Tensor::from_storage(Dense::vector(6), vec![1.0, -2.0, 0.5, 3.0, 1.5, -1.0])
            .unwrap();
        let y = Tensor::from_storage(
            Dense::vector(9),
            vec![0.3, 1.0, -0.7, 2.0, 0.1, 0.9, -1.2, 0.4, 0.6],
        )
        .unwrap();
        let lhs = x
            .at("p")
            .embed('p', shape.clone(), Dense::matrix(3, 3), 'q')
            .unwrap()
            .try_mul(y.at("q"))
            .unwrap()
            .to_scalar()
            .unwrap();
        let rhs = x
            .at("r")
            .try_mul(
                y.at("q")
                    .coembed('q', Dense::matrix(3, 3), shape, 'r')
                    .unwrap(),
            )
            .unwrap()
            .to_scalar()
            .unwrap();
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-12);
    }

    #[test]
    fn test_embed_rejects_different_factors() {
        let d = Tensor::<_, f64>::zeros(Dense::vector(3));
        assert!(matches!(
            d.at("p")
                .embed('p', Diagonal2::square(3), Dense::matrix(3, 4), 'q'),
            Err(ExprError::ShapeMismatch { .. })
        ));
    }
}
