//! Scalar type bounds for tensor components.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

use num_traits::{One, Zero};

/// Shared trait bounds for all component types.
///
/// Division is part of the bound because scale factors are divided out when a
/// logical component is written back to storage. No ordering or conversion
/// from primitives is required, so complex numbers and custom semiring types
/// qualify as long as they provide the ring operations.
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Zero
    + One
    + 'static
{
}

impl<T> Scalar for T where
    T: Copy
        + Debug
        + PartialEq
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
        + Zero
        + One
        + 'static
{
}

/// Build the scalar `n` out of `one()` and `+`.
///
/// Uses binary doubling, so the cost is logarithmic in `n`.
pub fn scalar_from_count<T: Scalar>(n: u64) -> T {
    let mut result = T::zero();
    let mut power = T::one();
    let mut rest = n;
    while rest > 0 {
        if rest & 1 == 1 {
            result = result + power;
        }
        power = power + power;
        rest >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn assert_scalar<T: Scalar>() {}

    #[test]
    fn test_standard_types() {
        assert_scalar::<f32>();
        assert_scalar::<f64>();
        assert_scalar::<i32>();
        assert_scalar::<i64>();
        assert_scalar::<Complex64>();
    }

    #[test]
    fn test_scalar_from_count() {
        assert_eq!(scalar_from_count::<f64>(0), 0.0);
        assert_eq!(scalar_from_count::<f64>(1), 1.0);
        assert_eq!(scalar_from_count::<f64>(6), 6.0);
        assert_eq!(scalar_from_count::<i64>(5040), 5040);
        assert_eq!(
            scalar_from_count::<Complex64>(24),
            Complex64::new(24.0, 0.0)
        );
    }
}
