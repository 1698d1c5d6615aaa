//! Leaf nodes: a tensor with abstract indices applied.

use std::fmt;

use log::trace;
use tenalg_index::{classify, DimIndex, IntoSymbols, Symbol, SymbolList};
use tenalg_shape::{MemoryRange, Shape, Tensor};
use tenalg_traits::{Euclidean, NaturalPairing, Scalar};

use crate::assign::IndexedMut;
use crate::error::{ExprError, Result};
use crate::expr::{Access, IndexedExpr, LeafIdentity};
use crate::summation::UnarySummation;

/// Resolve call-site symbols against a tensor's shape.
///
/// One symbol per factor addresses logical components; a single symbol on a
/// tensor of higher order addresses the storage vector.
pub(crate) fn resolve<S: Shape>(
    shape: &S,
    symbols: &[Symbol],
) -> Result<(Access, Vec<DimIndex>)> {
    let dims = shape.factor_dims();
    if symbols.len() == dims.len() {
        let occurrences = symbols
            .iter()
            .zip(dims.iter())
            .map(|(&s, &d)| DimIndex::new(s, d))
            .collect();
        Ok((Access::Logical, occurrences))
    } else if symbols.len() == 1 {
        Ok((
            Access::Storage,
            vec![DimIndex::new(symbols[0], shape.storage_count())],
        ))
    } else {
        Err(ExprError::RankMismatch {
            expected: dims.len(),
            found: symbols.len(),
        })
    }
}

#[inline]
pub(crate) fn read<S: Shape, T: Scalar>(tensor: &Tensor<S, T>, access: Access, m: &[usize]) -> T {
    match access {
        Access::Logical => tensor.logical(m),
        Access::Storage => tensor.components().get(m[0]),
    }
}

/// A tensor read through an index list, such as `T(i, j)` or the trace
/// `T(i, i)`.
///
/// Symbols that occur twice are summed by a [`UnarySummation`] weighted by
/// the pairing `P`.
#[derive(Clone)]
pub struct Indexed<'a, S, T, P = Euclidean> {
    tensor: &'a Tensor<S, T>,
    access: Access,
    symbols: SymbolList,
    free: Vec<DimIndex>,
    used: Vec<Symbol>,
    summation: Option<UnarySummation<P>>,
}

impl<'a, S, T, P> Indexed<'a, S, T, P>
where
    S: Shape,
    T: Scalar,
    P: NaturalPairing<T>,
{
    pub fn new(tensor: &'a Tensor<S, T>, indices: impl IntoSymbols, pairing: P) -> Result<Self> {
        let symbols = indices.into_symbols();
        let (access, occurrences) = resolve(tensor.shape(), &symbols)?;
        let c = classify(&occurrences)?;
        let summation = if c.summed.is_empty() {
            None
        } else {
            Some(UnarySummation::new::<T>(
                &occurrences,
                &c.free,
                &c.summed,
                pairing,
            )?)
        };
        Ok(Self {
            tensor,
            access,
            symbols,
            used: c.summed.iter().map(|d| d.symbol).collect(),
            free: c.free,
            summation,
        })
    }

    pub fn tensor(&self) -> &'a Tensor<S, T> {
        self.tensor
    }

    pub fn access(&self) -> Access {
        self.access
    }
}

impl<'a, S, T, P> IndexedExpr for Indexed<'a, S, T, P>
where
    S: Shape,
    T: Scalar,
    P: NaturalPairing<T>,
{
    type Scalar = T;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &self.used
    }

    #[inline]
    fn component(&self, free: &[usize]) -> T {
        match &self.summation {
            None => read(self.tensor, self.access, free),
            Some(s) => s.evaluate(free, |m| read(self.tensor, self.access, m)),
        }
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.tensor.memory_range().overlaps(range)
    }

    fn leaf_identity(&self) -> Option<LeafIdentity> {
        if self.summation.is_some() {
            return None;
        }
        Some(LeafIdentity {
            range: self.tensor.memory_range(),
            access: self.access,
            symbols: self.symbols.clone(),
        })
    }
}

impl<S, T, P> fmt::Debug for Indexed<'_, S, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indexed")
            .field("access", &self.access)
            .field("symbols", &self.symbols)
            .field("free", &self.free)
            .field("used", &self.used)
            .finish()
    }
}

/// Abstract-index notation on tensors.
pub trait IndexNotation<S: Shape, T: Scalar> {
    /// Apply `indices` for reading.
    fn try_at(&self, indices: impl IntoSymbols) -> Result<Indexed<'_, S, T>>;

    /// Apply `indices` for reading with a non-default pairing on the summed
    /// indices.
    fn try_at_with<P: NaturalPairing<T>>(
        &self,
        indices: impl IntoSymbols,
        pairing: P,
    ) -> Result<Indexed<'_, S, T, P>>;

    /// Apply `indices` as an assignment target.
    fn lhs(&self, indices: impl IntoSymbols) -> Result<IndexedMut<'_, S, T>>;

    /// [`try_at`](Self::try_at) for operator-style code.
    ///
    /// # Panics
    /// If the indices do not fit the tensor.
    fn at(&self, indices: impl IntoSymbols) -> Indexed<'_, S, T> {
        self.try_at(indices).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<S: Shape, T: Scalar> IndexNotation<S, T> for Tensor<S, T> {
    fn try_at(&self, indices: impl IntoSymbols) -> Result<Indexed<'_, S, T>> {
        Indexed::new(self, indices, Euclidean)
    }

    fn try_at_with<P: NaturalPairing<T>>(
        &self,
        indices: impl IntoSymbols,
        pairing: P,
    ) -> Result<Indexed<'_, S, T, P>> {
        Indexed::new(self, indices, pairing)
    }

    fn lhs(&self, indices: impl IntoSymbols) -> Result<IndexedMut<'_, S, T>> {
        let target = IndexedMut::new(self, indices)?;
        trace!("lhs: target {:?}", target.free_indices());
        Ok(target)
    }
}
