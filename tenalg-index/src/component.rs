//! Bounded single-axis component index.

use crate::{IndexError, Result};

/// A position `value` on an axis of size `bound`.
///
/// The checked constructor enforces `value < bound`. The position equal to
/// `bound` is reachable only through [`increment`](Self::increment) and acts as
/// the end sentinel of odometer iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentIndex {
    value: usize,
    bound: usize,
}

impl ComponentIndex {
    pub fn new(value: usize, bound: usize) -> Result<Self> {
        if value >= bound {
            return Err(IndexError::OutOfRange { value, bound });
        }
        Ok(Self { value, bound })
    }

    /// Construct without the range check.
    ///
    /// For hot paths where the caller already proved `value < bound`.
    #[inline]
    pub fn new_unchecked(value: usize, bound: usize) -> Self {
        debug_assert!(value < bound, "component index {value} >= {bound}");
        Self { value, bound }
    }

    #[inline]
    pub fn value(&self) -> usize {
        self.value
    }

    #[inline]
    pub fn bound(&self) -> usize {
        self.bound
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.value >= self.bound
    }

    #[inline]
    pub fn increment(&mut self) {
        self.value += 1;
    }

    #[inline]
    pub fn reset(&mut self) {
        self.value = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_check() {
        assert!(ComponentIndex::new(2, 3).is_ok());
        assert_eq!(
            ComponentIndex::new(3, 3),
            Err(IndexError::OutOfRange { value: 3, bound: 3 })
        );
    }

    #[test]
    fn test_increment_reaches_end() {
        let mut c = ComponentIndex::new(0, 2).unwrap();
        assert!(!c.is_at_end());
        c.increment();
        assert!(!c.is_at_end());
        c.increment();
        assert!(c.is_at_end());
        c.reset();
        assert_eq!(c.value(), 0);
    }
}
