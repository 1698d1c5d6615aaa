//! Shape descriptors, component storage and tensors.
//!
//! A [`Shape`] describes how the logical components of a tensor map onto the
//! components it actually stores. Four shape families are provided:
//!
//! - [`Dense`]: every component stored, row-major
//! - [`Diagonal2`]: off-diagonal components are procedural zeros
//! - [`SymmetricPower`]: one stored component per multiset of index values,
//!   with a multiplicity-based scale factor
//! - [`ExteriorPower`]: repeated values are procedural zeros, the scale factor
//!   is the sign of the sorting permutation
//!
//! [`Tensor`] pairs a shape with a [`Components`] buffer.
//!
//! # Example
//!
//! ```
//! use tenalg_shape::{Shape, SymmetricPower, Tensor};
//!
//! let s = Tensor::<_, f64>::from_storage(
//!     SymmetricPower::new(2, 3).unwrap(),
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
//! )
//! .unwrap();
//! assert_eq!(s.shape().storage_index(&[0, 1]), s.shape().storage_index(&[1, 0]));
//! assert_eq!(s.get(&[0, 1]).unwrap(), s.get(&[1, 0]).unwrap());
//! ```

pub mod combinatorics;
pub mod components;
pub mod dense;
pub mod diagonal;
pub mod exterior;
/// Inversion of square 2-tensors with a success flag.
pub mod linalg;
pub mod memory;
pub mod scale;
pub mod shape;
pub mod symmetric;
pub mod tensor;

pub use components::Components;
pub use dense::Dense;
pub use diagonal::Diagonal2;
pub use exterior::ExteriorPower;
pub use linalg::{invert_diagonal_into, invert_into};
pub use memory::MemoryRange;
pub use scale::ScaleFactor;
pub use shape::{Shape, Slot};
pub use symmetric::SymmetricPower;
pub use tensor::Tensor;

use tenalg_index::IndexError;

/// Errors raised by shapes and tensors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Raw storage does not match the shape's storage count.
    #[error("storage length mismatch: expected {expected}, found {found}")]
    StorageLength { expected: usize, found: usize },

    /// A multi-index has the wrong number of axes.
    #[error("rank mismatch: expected {expected} axes, found {found}")]
    RankMismatch { expected: usize, found: usize },

    /// A nonzero value was written to a component with no storage.
    #[error("component {0:?} is a procedural zero and cannot hold a nonzero value")]
    ProceduralZero(Vec<usize>),

    /// The shape has no nonzero components at this order.
    #[error("order {order} is invalid for dimension {dim}")]
    InvalidOrder { order: usize, dim: usize },
}

/// Result type for shape operations.
pub type Result<T> = std::result::Result<T, ShapeError>;
