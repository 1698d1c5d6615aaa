//! Fixed-length multi-indices with odometer iteration.

use std::cmp::Ordering;
use std::ops::{BitOr, Range};

use smallvec::SmallVec;

use crate::component::ComponentIndex;
use crate::{IndexError, Result, INLINE_RANK};

type Axes = SmallVec<[usize; INLINE_RANK]>;

/// Lengths of the runs of equal consecutive values in `values`.
///
/// Unchecked counterpart of [`MultiIndex::run_lengths`] for callers that
/// sorted the values themselves.
pub fn run_lengths(values: &[usize]) -> SmallVec<[usize; INLINE_RANK]> {
    let mut runs = SmallVec::new();
    let mut rest = values;
    while let Some(&head) = rest.first() {
        let run = rest.iter().take_while(|&&v| v == head).count();
        runs.push(run);
        rest = &rest[run..];
    }
    runs
}

/// An ordered tuple of per-axis component positions.
///
/// Iteration follows row-major order: [`increment`](Self::increment) advances
/// the last axis and carries into the previous one on overflow. The head axis
/// reaching its bound is the end sentinel, after which
/// [`is_at_end`](Self::is_at_end) holds until [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiIndex {
    values: Axes,
    dims: Axes,
    at_end: bool,
}

impl MultiIndex {
    /// The all-zero multi-index over axes of the given sizes.
    pub fn zero(dims: &[usize]) -> Self {
        Self {
            values: SmallVec::from_elem(0, dims.len()),
            dims: SmallVec::from_slice(dims),
            at_end: dims.iter().any(|&d| d == 0),
        }
    }

    /// Decompose a flat offset row-major, most significant axis first.
    pub fn from_flat(flat: usize, dims: &[usize]) -> Result<Self> {
        let total: usize = dims.iter().product();
        if flat >= total {
            return Err(IndexError::FlatOutOfRange { value: flat, total });
        }
        Ok(Self::from_flat_unchecked(flat, dims))
    }

    /// Decompose a flat offset without the range check.
    pub fn from_flat_unchecked(flat: usize, dims: &[usize]) -> Self {
        debug_assert!(flat < dims.iter().product::<usize>());
        let mut values: Axes = SmallVec::from_elem(0, dims.len());
        let mut rest = flat;
        for k in (0..dims.len()).rev() {
            values[k] = rest % dims[k];
            rest /= dims[k];
        }
        Self {
            values,
            dims: SmallVec::from_slice(dims),
            at_end: false,
        }
    }

    /// Build from explicit per-axis values, range-checking each axis.
    pub fn from_values(values: &[usize], dims: &[usize]) -> Result<Self> {
        if values.len() != dims.len() {
            return Err(IndexError::LengthMismatch(values.len(), dims.len()));
        }
        for (&value, &bound) in values.iter().zip(dims.iter()) {
            if value >= bound {
                return Err(IndexError::OutOfRange { value, bound });
            }
        }
        Ok(Self {
            values: SmallVec::from_slice(values),
            dims: SmallVec::from_slice(dims),
            at_end: false,
        })
    }

    /// Build from per-axis values without the range check.
    pub fn from_values_unchecked(values: &[usize], dims: &[usize]) -> Self {
        debug_assert_eq!(values.len(), dims.len());
        debug_assert!(values.iter().zip(dims.iter()).all(|(v, d)| v < d));
        Self {
            values: SmallVec::from_slice(values),
            dims: SmallVec::from_slice(dims),
            at_end: false,
        }
    }

    /// Build from per-axis component indices, which are already range-checked.
    pub fn from_components(components: &[ComponentIndex]) -> Self {
        Self {
            values: components.iter().map(|c| c.value()).collect(),
            dims: components.iter().map(|c| c.bound()).collect(),
            at_end: components.iter().any(|c| c.is_at_end()),
        }
    }

    pub fn from2(c0: ComponentIndex, c1: ComponentIndex) -> Self {
        Self::from_components(&[c0, c1])
    }

    pub fn from3(c0: ComponentIndex, c1: ComponentIndex, c2: ComponentIndex) -> Self {
        Self::from_components(&[c0, c1, c2])
    }

    pub fn from4(
        c0: ComponentIndex,
        c1: ComponentIndex,
        c2: ComponentIndex,
        c3: ComponentIndex,
    ) -> Self {
        Self::from_components(&[c0, c1, c2, c3])
    }

    /// Iterate every multi-index over `dims` in row-major order.
    pub fn iter(dims: &[usize]) -> MultiIndexIter {
        MultiIndexIter {
            cursor: Self::zero(dims),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[usize] {
        &self.values
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn get(&self, axis: usize) -> usize {
        self.values[axis]
    }

    pub fn component(&self, axis: usize) -> ComponentIndex {
        ComponentIndex::new_unchecked(self.values[axis], self.dims[axis])
    }

    /// Product of the axis sizes.
    pub fn total(&self) -> usize {
        self.dims.iter().product()
    }

    /// Row-major flat offset; inverse of [`from_flat`](Self::from_flat).
    pub fn value(&self) -> usize {
        flat_value(&self.values, &self.dims)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.at_end
    }

    /// Advance to the next position in row-major order.
    pub fn increment(&mut self) {
        if self.at_end {
            return;
        }
        let rank = self.dims.len();
        if rank == 0 {
            self.at_end = true;
            return;
        }
        for axis in (0..rank).rev() {
            self.values[axis] += 1;
            if self.values[axis] < self.dims[axis] {
                return;
            }
            if axis == 0 {
                // head axis stays at its bound as the sentinel
                self.at_end = true;
                return;
            }
            self.values[axis] = 0;
        }
    }

    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
        self.at_end = self.dims.iter().any(|&d| d == 0);
    }

    /// The first `n` axes.
    pub fn leading(&self, n: usize) -> MultiIndexSlice<'_> {
        self.range(0..n)
    }

    /// The last `n` axes.
    pub fn trailing(&self, n: usize) -> MultiIndexSlice<'_> {
        let len = self.len();
        assert!(n <= len, "trailing({n}) on a multi-index of length {len}");
        self.range(len - n..len)
    }

    /// A contiguous run of axes, borrowed without copying.
    pub fn range(&self, range: Range<usize>) -> MultiIndexSlice<'_> {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "axis range {:?} out of bounds for length {}",
            range,
            self.len()
        );
        MultiIndexSlice {
            values: &self.values[range.clone()],
            dims: &self.dims[range],
        }
    }

    /// Whether every axis has the same bound.
    pub fn is_uniform(&self) -> bool {
        self.dims.windows(2).all(|w| w[0] == w[1])
    }

    /// Sort the raw values in place.
    ///
    /// Only legal on uniform multi-indices, since sorting permutes values
    /// across axes.
    pub fn sort_by<F>(&mut self, compare: F) -> Result<()>
    where
        F: FnMut(&usize, &usize) -> Ordering,
    {
        self.ensure_uniform()?;
        self.values.sort_by(compare);
        Ok(())
    }

    pub fn sorted_by<F>(&self, compare: F) -> Result<Self>
    where
        F: FnMut(&usize, &usize) -> Ordering,
    {
        let mut out = self.clone();
        out.sort_by(compare)?;
        Ok(out)
    }

    pub fn sort_descending(&mut self) -> Result<()> {
        self.sort_by(|a, b| b.cmp(a))
    }

    pub fn sort_ascending(&mut self) -> Result<()> {
        self.sort_by(|a, b| a.cmp(b))
    }

    /// Length of the run of values equal to the head value.
    pub fn head_run_length(&self) -> usize {
        match self.values.first() {
            None => 0,
            Some(&head) => self.values.iter().take_while(|&&v| v == head).count(),
        }
    }

    /// Lengths of the runs of equal values, head first.
    ///
    /// The multi-index must be uniform and sorted (either direction), so that
    /// equal values form consecutive runs.
    pub fn run_lengths(&self) -> Result<SmallVec<[usize; INLINE_RANK]>> {
        self.ensure_uniform()?;
        let non_increasing = self.values.windows(2).all(|w| w[0] >= w[1]);
        let non_decreasing = self.values.windows(2).all(|w| w[0] <= w[1]);
        if !non_increasing && !non_decreasing {
            return Err(IndexError::NotSorted(self.values.to_vec()));
        }
        Ok(run_lengths(&self.values))
    }

    /// Product of the factorials of the run lengths of equal values, under
    /// the same preconditions as [`run_lengths`](Self::run_lengths).
    pub fn multiplicity(&self) -> Result<u64> {
        Ok(self
            .run_lengths()?
            .iter()
            .map(|&run| (1..=run as u64).product::<u64>())
            .product())
    }

    /// Concatenate two multi-indices; also available as `a | b`.
    pub fn concat(&self, other: &MultiIndex) -> MultiIndex {
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        let mut dims = self.dims.clone();
        dims.extend_from_slice(&other.dims);
        MultiIndex {
            values,
            dims,
            at_end: self.at_end || other.at_end,
        }
    }

    fn ensure_uniform(&self) -> Result<()> {
        if self.is_uniform() {
            Ok(())
        } else {
            Err(IndexError::NotUniform(self.dims.to_vec()))
        }
    }
}

impl BitOr for MultiIndex {
    type Output = MultiIndex;

    fn bitor(self, rhs: MultiIndex) -> MultiIndex {
        self.concat(&rhs)
    }
}

impl BitOr<&MultiIndex> for &MultiIndex {
    type Output = MultiIndex;

    fn bitor(self, rhs: &MultiIndex) -> MultiIndex {
        self.concat(rhs)
    }
}

/// Borrowed contiguous run of axes of a [`MultiIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiIndexSlice<'a> {
    values: &'a [usize],
    dims: &'a [usize],
}

impl<'a> MultiIndexSlice<'a> {
    #[inline]
    pub fn values(&self) -> &'a [usize] {
        self.values
    }

    #[inline]
    pub fn dims(&self) -> &'a [usize] {
        self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self) -> usize {
        flat_value(self.values, self.dims)
    }

    pub fn to_multi_index(&self) -> MultiIndex {
        MultiIndex {
            values: SmallVec::from_slice(self.values),
            dims: SmallVec::from_slice(self.dims),
            at_end: false,
        }
    }
}

/// Iterator over all positions of a multi-index, in row-major order.
#[derive(Debug, Clone)]
pub struct MultiIndexIter {
    cursor: MultiIndex,
}

impl Iterator for MultiIndexIter {
    type Item = MultiIndex;

    fn next(&mut self) -> Option<MultiIndex> {
        if self.cursor.is_at_end() {
            return None;
        }
        let current = self.cursor.clone();
        self.cursor.increment();
        Some(current)
    }
}

#[inline]
fn flat_value(values: &[usize], dims: &[usize]) -> usize {
    values
        .iter()
        .zip(dims.iter())
        .fold(0, |acc, (&v, &d)| acc * d + v)
}
