//! Tensor algebra in abstract-index notation.
//!
//! Tensors carry a shape descriptor that decides which logical components
//! are stored: [`Dense`], [`Diagonal2`], [`SymmetricPower`] and
//! [`ExteriorPower`]. Components outside storage are procedural zeros;
//! stored components are read through an exact [`ScaleFactor`]. Expressions
//! over tensors are written Einstein style and evaluated lazily.
//!
//! # Core Types
//!
//! - [`Tensor`]: a shape plus its stored components
//! - [`Shape`]: the shape descriptor protocol
//! - [`MultiIndex`] / [`Symbol`]: component positions and abstract indices
//! - [`IndexedExpr`] / [`ExprExt`]: expression nodes and their builders
//! - [`IndexedMut`]: assignment with aliasing detection
//!
//! # Example
//!
//! ```rust
//! use tenalg::prelude::*;
//!
//! // a symmetric 2-tensor on a 3-dimensional space stores 6 components
//! let s = Tensor::<_, f64>::zeros(SymmetricPower::new(2, 3).unwrap());
//! assert_eq!(s.to_storage_vec().len(), 6);
//!
//! let a = Tensor::from_storage(
//!     Dense::matrix(3, 3),
//!     vec![1.0, 2.0, 0.0, 2.0, 5.0, 4.0, 0.0, 4.0, 3.0],
//! )
//! .unwrap();
//! s.lhs("ij").unwrap().assign(a.at("ij")).unwrap();
//! assert_eq!(s.get(&[2, 1]).unwrap(), 4.0);
//!
//! // contract with a vector: u(i) = S(i, j) v(j)
//! let v = Tensor::from_storage(Dense::vector(3), vec![1.0, 0.0, 1.0]).unwrap();
//! let u = (s.at("ij") * v.at("j")).eval();
//! assert_eq!(u.to_vec(), vec![1.0, 6.0, 3.0]);
//! ```
//!
//! # Aliasing
//!
//! An assignment whose right-hand side reads the destination fails instead
//! of silently producing an order-dependent result. Evaluate first:
//!
//! ```rust
//! use tenalg::prelude::*;
//!
//! let t = Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert!(matches!(
//!     t.lhs("ij").unwrap().assign(t.at("ji")),
//!     Err(ExprError::Aliasing { .. })
//! ));
//! t.lhs("ij").unwrap().assign(t.at("ji").eval()).unwrap();
//! assert_eq!(t.to_storage_vec(), vec![1.0, 3.0, 2.0, 4.0]);
//! ```

pub use tenalg_expr::{
    free_dims, Access, BinarySummation, Bundle, Coembed, Embed, ExprError, ExprExt, IndexNotation,
    Indexed, IndexedExpr, IndexedMut, LeafIdentity, Product, ScaleOp, Scaled, Sign, Split,
    SplitToIndex, Sum, Temporary, UnarySummation,
};
pub use tenalg_index::{
    classify, Classification, ComponentIndex, DimIndex, IndexError, IndexMap, IntoSymbols,
    MultiIndex, MultiIndexIter, MultiIndexSlice, Symbol, SymbolList,
};
pub use tenalg_shape::{
    invert_diagonal_into, invert_into, Components, Dense, Diagonal2, ExteriorPower, MemoryRange,
    ScaleFactor, Shape, ShapeError, Slot, SymmetricPower, Tensor,
};
pub use tenalg_traits::{DiagonalMetric, Euclidean, NaturalPairing, Scalar};

/// Index and shape helper modules, for code that works below the
/// expression layer.
pub mod index {
    pub use tenalg_index::*;
}

pub mod shape {
    pub use tenalg_shape::*;
}

/// The types and traits needed to write expressions.
pub mod prelude {
    pub use crate::{
        Dense, Diagonal2, ExprError, ExprExt, ExteriorPower, IndexNotation, IndexedExpr, Shape,
        SymmetricPower, Tensor,
    };
}
