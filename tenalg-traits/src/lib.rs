//! Shared traits for the tenalg workspace.
//!
//! This crate holds the trait definitions every other tenalg crate builds on:
//!
//! - [`Scalar`]: the component type bound used by tensors and expressions
//! - [`NaturalPairing`]: the weight applied to each term of a contraction
//!
//! Keeping them here lets downstream crates implement the traits for their own
//! scalar types without orphan rule violations.

pub mod pairing;
pub mod scalar;

pub use pairing::{DiagonalMetric, Euclidean, NaturalPairing};
pub use scalar::{scalar_from_count, Scalar};
