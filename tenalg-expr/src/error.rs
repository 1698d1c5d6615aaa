use tenalg_index::{IndexError, Symbol};
use tenalg_shape::ShapeError;

/// Errors raised while building or assigning expressions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("free index sets differ: {left:?} vs {right:?}")]
    FreeIndexMismatch { left: Vec<Symbol>, right: Vec<Symbol> },

    #[error("duplicate free index '{0}'")]
    DuplicateFreeIndex(Symbol),

    #[error("dimension mismatch for index '{symbol}': {dim_a} vs {dim_b}")]
    DimensionMismatch {
        symbol: Symbol,
        dim_a: usize,
        dim_b: usize,
    },

    /// A symbol already bound inside a subexpression would occur again.
    #[error("index '{0}' is already used in a subexpression")]
    IndexReused(Symbol),

    /// Summed indices on an assignment target.
    #[error("index '{0}' is summed; a summing expression cannot be assigned to")]
    NotAnLvalue(Symbol),

    #[error("aliasing detected in {operation}: right-hand side overlaps the destination")]
    Aliasing { operation: &'static str },

    /// Two multi-indices sharing a storage slot of the target would store
    /// different values.
    #[error("component {index:?} disagrees with {canonical:?}, which shares its storage")]
    SymmetryMismatch {
        index: Vec<usize>,
        canonical: Vec<usize>,
    },

    #[error("expression still has free indices {0:?}")]
    NotFullyContracted(Vec<Symbol>),

    #[error("rank mismatch: expected {expected} indices, found {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("index '{0}' is not free")]
    NotFree(Symbol),

    #[error("shape mismatch: expected factor dims {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("pairing does not support index '{symbol}' of dimension {dim}")]
    UnsupportedPairing { symbol: Symbol, dim: usize },

    #[error(transparent)]
    Index(IndexError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl From<IndexError> for ExprError {
    /// Extent mismatches surface as [`ExprError::DimensionMismatch`] no matter
    /// which layer found them.
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::DimensionMismatch {
                symbol,
                dim_a,
                dim_b,
            } => ExprError::DimensionMismatch {
                symbol,
                dim_a,
                dim_b,
            },
            other => ExprError::Index(other),
        }
    }
}

/// Convenience alias for `Result<T, ExprError>`.
pub type Result<T> = std::result::Result<T, ExprError>;
