//! Abstract index symbols, multi-indices and index classification.
//!
//! This crate provides the index algebra underneath tenalg's expression
//! templates:
//!
//! - [`Symbol`] / [`DimIndex`]: abstract index tokens, optionally annotated with
//!   the extent of the axis they range over
//! - [`ComponentIndex`] / [`MultiIndex`]: bounded per-axis positions and their
//!   fixed-length tuples, with odometer iteration in row-major order
//! - [`classify`]: partition of an index occurrence list into free and summed
//!   indices
//! - [`IndexMap`]: the permutation map that extracts an operand's own slice of
//!   a larger multi-index
//!
//! # Example
//!
//! ```
//! use tenalg_index::{classify, DimIndex, MultiIndex};
//!
//! // T(i, j) * v(j): j is summed, i stays free
//! let occurrences = [
//!     DimIndex::new('i', 3),
//!     DimIndex::new('j', 3),
//!     DimIndex::new('j', 3),
//! ];
//! let c = classify(&occurrences).unwrap();
//! assert_eq!(c.free, vec![DimIndex::new('i', 3)]);
//! assert_eq!(c.summed, vec![DimIndex::new('j', 3)]);
//!
//! let mut m = MultiIndex::zero(&[2, 3]);
//! let mut visited = 0;
//! while !m.is_at_end() {
//!     visited += 1;
//!     m.increment();
//! }
//! assert_eq!(visited, 6);
//! ```

pub mod classify;
pub mod component;
pub mod multi_index;
pub mod symbol;

pub use classify::{
    check_shared_dims, classify, contains_symbol, find_duplicate, has_duplicates, intersection,
    position_of, same_symbol_set, symbols_of, symmetric_difference, union_symbols,
    Classification, IndexMap,
};
pub use component::ComponentIndex;
pub use multi_index::{run_lengths, MultiIndex, MultiIndexIter, MultiIndexSlice};
pub use symbol::{DimIndex, IntoSymbols, Symbol, SymbolList};

/// Inline capacity for per-axis storage. Ranks up to this stay on the stack.
pub const INLINE_RANK: usize = 8;

/// Errors raised by index construction and classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// A component index is not below its axis bound.
    #[error("component index {value} out of range for axis of size {bound}")]
    OutOfRange { value: usize, bound: usize },

    /// A flat offset is not below the total component count.
    #[error("flat index {value} out of range for {total} components")]
    FlatOutOfRange { value: usize, total: usize },

    /// Two sequences that must pair up have different lengths.
    #[error("length mismatch: {0} vs {1}")]
    LengthMismatch(usize, usize),

    /// Value sorting requires every axis to share one bound.
    #[error("multi-index is not uniform: axis bounds {0:?}")]
    NotUniform(Vec<usize>),

    /// Run-length multiplicity requires a sorted multi-index.
    #[error("multi-index {0:?} is not sorted")]
    NotSorted(Vec<usize>),

    /// An abstract index occurs three or more times in one expression.
    #[error("index '{symbol}' occurs {count} times; at most two occurrences are allowed")]
    Multiplicity { symbol: Symbol, count: usize },

    /// A list that must hold distinct symbols repeats one.
    #[error("duplicate index '{0}'")]
    DuplicateSymbol(Symbol),

    /// Two occurrences of one symbol range over different extents.
    #[error("dimension mismatch for index '{symbol}': {dim_a} vs {dim_b}")]
    DimensionMismatch {
        symbol: Symbol,
        dim_a: usize,
        dim_b: usize,
    },

    /// A codomain symbol is missing from the domain of an index map.
    #[error("index '{0}' not found in domain")]
    UnknownSymbol(Symbol),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
