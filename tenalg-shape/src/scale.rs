//! Exact scale factors relating stored and logical component values.

use std::fmt;

use tenalg_traits::{scalar_from_count, Scalar};

/// Rational multiplier `sign * numerator / denominator`.
///
/// A logical component reads as `stored * factor`; writes divide the factor
/// back out. Kept exact so that shapes stay independent of the scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleFactor {
    negative: bool,
    numerator: u64,
    denominator: u64,
}

impl ScaleFactor {
    pub const ONE: ScaleFactor = ScaleFactor {
        negative: false,
        numerator: 1,
        denominator: 1,
    };

    pub const MINUS_ONE: ScaleFactor = ScaleFactor {
        negative: true,
        numerator: 1,
        denominator: 1,
    };

    /// `sign * numerator / denominator`, reduced to lowest terms.
    ///
    /// Both magnitudes must be nonzero.
    pub fn new(sign: i8, numerator: u64, denominator: u64) -> Self {
        debug_assert!(numerator != 0 && denominator != 0);
        let g = gcd(numerator, denominator);
        Self {
            negative: sign < 0,
            numerator: numerator / g,
            denominator: denominator / g,
        }
    }

    pub fn from_sign(sign: i8) -> Self {
        if sign < 0 {
            Self::MINUS_ONE
        } else {
            Self::ONE
        }
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        *self == Self::ONE
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn reciprocal(&self) -> Self {
        Self {
            negative: self.negative,
            numerator: self.denominator,
            denominator: self.numerator,
        }
    }

    /// The factor as a scalar. Lossy for integer scalars when the
    /// denominator is not one.
    pub fn to_scalar<T: Scalar>(&self) -> T {
        let magnitude = scalar_from_count::<T>(self.numerator) / scalar_from_count::<T>(self.denominator);
        if self.negative {
            T::zero() - magnitude
        } else {
            magnitude
        }
    }

    /// `stored * factor`, multiplying before dividing.
    #[inline]
    pub fn apply<T: Scalar>(&self, stored: T) -> T {
        if self.is_one() {
            return stored;
        }
        let v = stored * scalar_from_count::<T>(self.numerator) / scalar_from_count::<T>(self.denominator);
        if self.negative {
            T::zero() - v
        } else {
            v
        }
    }

    /// `logical / factor`: the value to store for a logical component.
    #[inline]
    pub fn divide_out<T: Scalar>(&self, logical: T) -> T {
        self.reciprocal().apply(logical)
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        if self.denominator == 1 {
            write!(f, "{sign}{}", self.numerator)
        } else {
            write!(f, "{sign}{}/{}", self.numerator, self.denominator)
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
