//! Abstract-index expression templates over tenalg tensors.
//!
//! Applying symbols to a tensor gives a lazy expression node; nodes combine
//! with `+`, `-`, `*` and scalars into a tree that is validated when it is
//! built and evaluated only when assigned or read:
//!
//! - Indices free in both factors of a product are contracted, Einstein
//!   style, optionally weighted by a [`NaturalPairing`](tenalg_traits::NaturalPairing)
//! - A symbol repeated on one tensor, as in `T(i, i)`, is a trace
//! - Sums match free indices as sets, in any order
//! - [`IndexedMut`] assigns an expression to a tensor, refusing right-hand
//!   sides that read the destination
//!
//! # Example
//!
//! ```
//! use tenalg_expr::{ExprExt, IndexNotation};
//! use tenalg_shape::{Dense, Tensor};
//!
//! let a = Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let v = Tensor::from_storage(Dense::vector(2), vec![1.0, 1.0]).unwrap();
//! let w = Tensor::<_, f64>::zeros(Dense::vector(2));
//!
//! // w(i) = A(i, j) v(j)
//! w.lhs("i").unwrap().assign(a.at("ij") * v.at("j")).unwrap();
//! assert_eq!(w.to_storage_vec(), vec![3.0, 7.0]);
//!
//! // the trace A(i, i)
//! assert_eq!(a.at("ii").to_scalar().unwrap(), 5.0);
//! ```

pub mod assign;
pub mod embed;
pub mod error;
pub mod expr;
pub mod indexed;
mod ops;
pub mod product;
/// Bundling factor indices into storage indices and back.
pub mod reshape;
pub mod scaled;
pub mod sum;
pub mod summation;
pub mod temporary;

pub use assign::IndexedMut;
pub use embed::{Coembed, Embed};
pub use error::{ExprError, Result};
pub use expr::{free_dims, Access, ExprExt, IndexedExpr, LeafIdentity};
pub use indexed::{IndexNotation, Indexed};
pub use product::Product;
pub use reshape::{Bundle, Split, SplitToIndex};
pub use scaled::{ScaleOp, Scaled};
pub use sum::{Sign, Sum};
pub use summation::{BinarySummation, UnarySummation};
pub use temporary::Temporary;
