//! Fixed-size component storage.

use std::cell::Cell;
use std::fmt;

use crate::memory::MemoryRange;
use crate::{Result, ShapeError};

/// A fixed-length array of components with interior mutability.
///
/// Writes go through `&self`, so an assignment destination can be read by the
/// expression being assigned to it. [`memory_range`](Self::memory_range) lets
/// the assignment detect that case. `Components` is `!Sync`; all reads and
/// writes happen on one thread.
pub struct Components<T> {
    cells: Box<[Cell<T>]>,
}

impl<T: Copy> Components<T> {
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            cells: values.into_iter().map(Cell::new).collect(),
        }
    }

    pub fn filled(len: usize, value: T) -> Self {
        Self {
            cells: (0..len).map(|_| Cell::new(value)).collect(),
        }
    }

    /// Build from an iterator that yields exactly `len` values.
    ///
    /// Every slot is written once from the iterator with no prior fill.
    pub fn from_iter_exact<I>(len: usize, iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let cells: Box<[Cell<T>]> = iter.into_iter().map(Cell::new).collect();
        if cells.len() != len {
            return Err(ShapeError::StorageLength {
                expected: len,
                found: cells.len(),
            });
        }
        Ok(Self { cells })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Panics if `i` is out of range, like slice indexing.
    #[inline]
    pub fn get(&self, i: usize) -> T {
        self.cells[i].get()
    }

    #[inline]
    pub fn set(&self, i: usize, value: T) {
        self.cells[i].set(value);
    }

    pub fn try_get(&self, i: usize) -> Option<T> {
        self.cells.get(i).map(Cell::get)
    }

    pub fn memory_range(&self) -> MemoryRange {
        MemoryRange::of_slice(&self.cells[..])
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.cells.iter().map(Cell::get).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.cells.iter().map(Cell::get)
    }
}

impl<T: Copy> Clone for Components<T> {
    fn clone(&self) -> Self {
        Self {
            cells: self.cells.iter().map(|c| Cell::new(c.get())).collect(),
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Components<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Copy + PartialEq> PartialEq for Components<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_through_shared_ref() {
        let c = Components::from_vec(vec![1.0, 2.0, 3.0]);
        let alias = &c;
        c.set(1, 5.0);
        assert_eq!(alias.get(1), 5.0);
        assert_eq!(c.to_vec(), vec![1.0, 5.0, 3.0]);
        assert_eq!(c.try_get(3), None);
    }

    #[test]
    fn test_from_iter_exact() {
        let c = Components::from_iter_exact(3, (0..3).map(|i| i * 2)).unwrap();
        assert_eq!(c.to_vec(), vec![0, 2, 4]);
        assert_eq!(
            Components::from_iter_exact(4, 0..3).unwrap_err(),
            ShapeError::StorageLength {
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_memory_range() {
        let c = Components::filled(4, 0.0f64);
        let d = c.clone();
        assert_eq!(c.memory_range().len, 32);
        assert!(c.memory_range().overlaps(&c.memory_range()));
        assert!(!c.memory_range().overlaps(&d.memory_range()));
        assert_eq!(c, d);
    }
}
