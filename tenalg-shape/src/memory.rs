//! Byte ranges of component allocations, for aliasing queries.

/// Half-open byte range `[start, start + len)` of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    pub start: usize,
    pub len: usize,
}

impl MemoryRange {
    pub fn of_slice<T>(slice: &[T]) -> Self {
        Self {
            start: slice.as_ptr() as usize,
            len: std::mem::size_of_val(slice),
        }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the two ranges share at least one byte. Empty ranges overlap
    /// nothing.
    #[inline]
    pub fn overlaps(&self, other: &MemoryRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end()
            && other.start < self.end()
    }

    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        self.start <= addr && addr < self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = MemoryRange { start: 100, len: 16 };
        let b = MemoryRange { start: 108, len: 16 };
        let c = MemoryRange { start: 116, len: 4 };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(a.contains(115));
        assert!(!a.contains(116));
    }

    #[test]
    fn test_empty_never_overlaps() {
        let a = MemoryRange { start: 100, len: 16 };
        let e = MemoryRange { start: 104, len: 0 };
        assert!(!a.overlaps(&e));
        assert!(!e.overlaps(&e));
    }

    #[test]
    fn test_of_slice() {
        let v = [0u32; 4];
        let r = MemoryRange::of_slice(&v);
        assert_eq!(r.len, 16);
        assert!(r.overlaps(&MemoryRange::of_slice(&v[2..])));
    }
}
