//! Materialized expressions.

use std::fmt;

use log::debug;
use tenalg_index::{DimIndex, MultiIndex, Symbol};
use tenalg_shape::{Components, MemoryRange};
use tenalg_traits::Scalar;

use crate::expr::{free_dims, IndexedExpr};

/// An expression evaluated once into its own dense buffer, row-major over its
/// free indices.
///
/// Reading a temporary never touches the tensors the original expression
/// referenced, so it is the way to assign an expression to one of its own
/// operands.
pub struct Temporary<T> {
    free: Vec<DimIndex>,
    dims: Vec<usize>,
    components: Components<T>,
}

impl<T: Scalar> Temporary<T> {
    pub fn new<E>(expr: &E) -> Self
    where
        E: IndexedExpr<Scalar = T> + ?Sized,
    {
        let free = expr.free_indices().to_vec();
        let dims = free_dims(&free).to_vec();
        let total: usize = dims.iter().product();
        debug!("eval: materializing {} components over {:?}", total, free);
        let values = MultiIndex::iter(&dims)
            .map(|m| expr.component(m.values()))
            .collect();
        Self {
            free,
            dims,
            components: Components::from_vec(values),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.components.to_vec()
    }
}

impl<T: Scalar> IndexedExpr for Temporary<T> {
    type Scalar = T;

    fn free_indices(&self) -> &[DimIndex] {
        &self.free
    }

    fn used_indices(&self) -> &[Symbol] {
        &[]
    }

    #[inline]
    fn component(&self, free: &[usize]) -> T {
        let mut flat = 0;
        for (&v, &d) in free.iter().zip(self.dims.iter()) {
            flat = flat * d + v;
        }
        self.components.get(flat)
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.components.memory_range().overlaps(range)
    }
}

impl<T: Scalar> Clone for Temporary<T> {
    fn clone(&self) -> Self {
        Self {
            free: self.free.clone(),
            dims: self.dims.clone(),
            components: self.components.clone(),
        }
    }
}

impl<T: Scalar> fmt::Debug for Temporary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Temporary")
            .field("free", &self.free)
            .field("components", &self.components)
            .finish()
    }
}
