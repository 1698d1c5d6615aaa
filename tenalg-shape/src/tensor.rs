//! Owned tensors: a shape descriptor plus its stored components.

use std::fmt;

use tenalg_index::MultiIndex;
use tenalg_traits::Scalar;

use crate::components::Components;
use crate::memory::MemoryRange;
use crate::shape::Shape;
use crate::{Result, ShapeError};

/// A tensor with `shape.storage_count()` stored components.
///
/// Logical reads go through the shape: procedural zeros read as zero and
/// every other component reads as `stored * scalar_factor(m)`.
pub struct Tensor<S, T> {
    shape: S,
    components: Components<T>,
}

impl<S: Shape, T: Scalar> Tensor<S, T> {
    pub fn zeros(shape: S) -> Self {
        let components = Components::filled(shape.storage_count(), T::zero());
        Self { shape, components }
    }

    /// Wrap raw storage, which must hold exactly `storage_count` values.
    pub fn from_storage(shape: S, storage: Vec<T>) -> Result<Self> {
        if storage.len() != shape.storage_count() {
            return Err(ShapeError::StorageLength {
                expected: shape.storage_count(),
                found: storage.len(),
            });
        }
        Ok(Self {
            shape,
            components: Components::from_vec(storage),
        })
    }

    /// Build from the raw value of each storage slot.
    pub fn from_storage_fn<F>(shape: S, f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        let count = shape.storage_count();
        let components = Components::from_vec((0..count).map(f).collect());
        Self { shape, components }
    }

    /// Build from logical values.
    ///
    /// `f` is called once per storage slot, at the slot's canonical
    /// multi-index. Values at other multi-indices follow from the shape's
    /// symmetry.
    pub fn from_fn<F>(shape: S, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> T,
    {
        let count = shape.storage_count();
        let values: Vec<T> = (0..count)
            .map(|p| {
                let m = shape.canonical_multi_index(p);
                shape.scalar_factor(m.values()).divide_out(f(m.values()))
            })
            .collect();
        Self {
            shape,
            components: Components::from_vec(values),
        }
    }

    #[inline]
    pub fn shape(&self) -> &S {
        &self.shape
    }

    #[inline]
    pub fn components(&self) -> &Components<T> {
        &self.components
    }

    pub fn memory_range(&self) -> MemoryRange {
        self.components.memory_range()
    }

    /// Logical component at `m`, checked against the factor extents.
    pub fn get(&self, m: &[usize]) -> Result<T> {
        self.shape.check_multi_index(m)?;
        Ok(self.logical(m))
    }

    /// Logical component at an in-range `m`.
    #[inline]
    pub fn logical(&self, m: &[usize]) -> T {
        match self.shape.locate(m) {
            Some(slot) => slot.factor.apply(self.components.get(slot.storage)),
            None => T::zero(),
        }
    }

    /// Write a logical component.
    ///
    /// The scale factor is divided out before storing, so every multi-index
    /// sharing the slot changes with it. Procedural zeros accept only zero.
    pub fn set(&self, m: &[usize], value: T) -> Result<()> {
        self.shape.check_multi_index(m)?;
        match self.shape.locate(m) {
            Some(slot) => {
                self.components
                    .set(slot.storage, slot.factor.divide_out(value));
                Ok(())
            }
            None if value == T::zero() => Ok(()),
            None => Err(ShapeError::ProceduralZero(m.to_vec())),
        }
    }

    pub fn storage(&self, i: usize) -> Result<T> {
        self.shape.check_storage_index(i)?;
        Ok(self.components.get(i))
    }

    pub fn set_storage(&self, i: usize, value: T) -> Result<()> {
        self.shape.check_storage_index(i)?;
        self.components.set(i, value);
        Ok(())
    }

    pub fn to_storage_vec(&self) -> Vec<T> {
        self.components.to_vec()
    }

    /// All `dimension()` logical components in row-major order.
    pub fn to_dense_vec(&self) -> Vec<T> {
        MultiIndex::iter(self.shape.factor_dims())
            .map(|m| self.logical(m.values()))
            .collect()
    }
}

impl<S: Shape, T: Scalar> Clone for Tensor<S, T> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            components: self.components.clone(),
        }
    }
}

impl<S: Shape, T: Scalar> fmt::Debug for Tensor<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("components", &self.components)
            .finish()
    }
}

impl<S: Shape, T: Scalar> PartialEq for Tensor<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.components == other.components
    }
}
