//! The expression-node capability and its builder methods.

use num_traits::{One, Zero};
use smallvec::SmallVec;
use tenalg_index::{DimIndex, IntoSymbols, MultiIndex, Symbol, SymbolList, INLINE_RANK};
use tenalg_shape::{MemoryRange, Shape};
use tenalg_traits::{Euclidean, NaturalPairing, Scalar};

use crate::embed::{Coembed, Embed};
use crate::error::{ExprError, Result};
use crate::product::Product;
use crate::reshape::{Bundle, Split, SplitToIndex};
use crate::scaled::Scaled;
use crate::sum::{Sign, Sum};
use crate::temporary::Temporary;

/// How a leaf addresses its tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// One index per factor, through the shape descriptor.
    Logical,
    /// A single index over the raw storage vector.
    Storage,
}

/// Identifies a plain, non-summing leaf: which storage it reads and in which
/// index order. Two equal identities read exactly the same components at the
/// same free multi-index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafIdentity {
    pub range: MemoryRange,
    pub access: Access,
    pub symbols: SymbolList,
}

/// A lazily evaluated tensor expression in abstract-index notation.
///
/// The free and used index lists are computed and validated when a node is
/// built. [`component`](Self::component) takes the free values in
/// `free_indices()` order.
pub trait IndexedExpr {
    type Scalar: Scalar;

    /// Indices left open by the expression, each with its extent.
    fn free_indices(&self) -> &[DimIndex];

    /// Symbols already bound somewhere inside the expression, by summation or
    /// by a reshaping node. They may not reappear higher up.
    fn used_indices(&self) -> &[Symbol];

    fn component(&self, free: &[usize]) -> Self::Scalar;

    /// Whether evaluating the expression reads any byte of `range`.
    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool;

    fn leaf_identity(&self) -> Option<LeafIdentity> {
        None
    }
}

impl<E: IndexedExpr + ?Sized> IndexedExpr for &E {
    type Scalar = E::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        (**self).free_indices()
    }

    fn used_indices(&self) -> &[Symbol] {
        (**self).used_indices()
    }

    #[inline]
    fn component(&self, free: &[usize]) -> Self::Scalar {
        (**self).component(free)
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        (**self).overlaps_memory_range(range)
    }

    fn leaf_identity(&self) -> Option<LeafIdentity> {
        (**self).leaf_identity()
    }
}

/// Extents of a free index list.
pub fn free_dims(free: &[DimIndex]) -> SmallVec<[usize; INLINE_RANK]> {
    free.iter().map(|d| d.dim).collect()
}

/// Builder methods available on every expression.
///
/// The `try_*` methods return construction errors; the operator overloads
/// build the same nodes and panic on them instead.
pub trait ExprExt: IndexedExpr + Sized {
    fn try_add<R>(self, rhs: R) -> Result<Sum<Self, R>>
    where
        R: IndexedExpr<Scalar = Self::Scalar>,
    {
        Sum::new(self, rhs, Sign::Plus)
    }

    fn try_sub<R>(self, rhs: R) -> Result<Sum<Self, R>>
    where
        R: IndexedExpr<Scalar = Self::Scalar>,
    {
        Sum::new(self, rhs, Sign::Minus)
    }

    /// Outer product, contracting indices free on both sides.
    fn try_mul<R>(self, rhs: R) -> Result<Product<Self, R>>
    where
        R: IndexedExpr<Scalar = Self::Scalar>,
    {
        Product::new(self, rhs, Euclidean)
    }

    /// Like [`try_mul`](Self::try_mul), weighting every contraction term by
    /// `pairing`.
    fn contract_with<R, P>(self, rhs: R, pairing: P) -> Result<Product<Self, R, P>>
    where
        R: IndexedExpr<Scalar = Self::Scalar>,
        P: NaturalPairing<Self::Scalar>,
    {
        Product::new(self, rhs, pairing)
    }

    fn scale(self, factor: Self::Scalar) -> Scaled<Self> {
        Scaled::multiply(self, factor)
    }

    fn divide(self, divisor: Self::Scalar) -> Scaled<Self> {
        Scaled::divide(self, divisor)
    }

    /// Division that refuses a zero divisor.
    fn checked_divide(self, divisor: Self::Scalar) -> Option<Scaled<Self>> {
        if divisor == <Self::Scalar as Zero>::zero() {
            log::debug!("checked_divide: zero divisor");
            return None;
        }
        Some(Scaled::divide(self, divisor))
    }

    fn negate(self) -> Scaled<Self> {
        Scaled::multiply(self, <Self::Scalar as Zero>::zero() - <Self::Scalar as One>::one())
    }

    /// Merge the free `indices` into one index `into` over `shape`'s storage.
    fn bundle<S: Shape>(
        self,
        indices: impl IntoSymbols,
        shape: S,
        into: impl Into<Symbol>,
    ) -> Result<Bundle<Self, S>> {
        Bundle::new(self, indices, shape, into)
    }

    /// Expand the free storage index `index` of `shape` into one index per
    /// factor.
    fn split<S: Shape>(
        self,
        index: impl Into<Symbol>,
        shape: S,
        into: impl IntoSymbols,
    ) -> Result<Split<Self, S>> {
        Split::new(self, index, shape, into)
    }

    /// Expand `index` over `shape`'s storage into a single row-major index
    /// over `shape.dimension()`.
    fn split_to_index<S: Shape>(
        self,
        index: impl Into<Symbol>,
        shape: S,
        into: impl Into<Symbol>,
    ) -> Result<SplitToIndex<Self, S>> {
        SplitToIndex::new(self, index, shape, into)
    }

    /// Move `index` from `subspace` storage to `ambient` storage.
    fn embed<S: Shape, A: Shape>(
        self,
        index: impl Into<Symbol>,
        subspace: S,
        ambient: A,
        into: impl Into<Symbol>,
    ) -> Result<Embed<Self, S, A>> {
        Embed::new(self, index, subspace, ambient, into)
    }

    /// Move `index` from `ambient` storage back to `subspace` storage.
    fn coembed<A: Shape, S: Shape>(
        self,
        index: impl Into<Symbol>,
        ambient: A,
        subspace: S,
        into: impl Into<Symbol>,
    ) -> Result<Coembed<Self, A, S>> {
        Coembed::new(self, index, ambient, subspace, into)
    }

    /// Materialize into a temporary, in one pass.
    fn eval(&self) -> Temporary<Self::Scalar> {
        Temporary::new(self)
    }

    /// The value of a fully contracted expression.
    fn to_scalar(&self) -> Result<Self::Scalar> {
        let free = self.free_indices();
        if !free.is_empty() {
            return Err(ExprError::NotFullyContracted(
                free.iter().map(|d| d.symbol).collect(),
            ));
        }
        Ok(self.component(&[]))
    }

    /// Every component in row-major order over the free indices.
    fn to_dense_vec(&self) -> Vec<Self::Scalar> {
        MultiIndex::iter(&free_dims(self.free_indices()))
            .map(|m| self.component(m.values()))
            .collect()
    }
}

impl<E: IndexedExpr> ExprExt for E {}
