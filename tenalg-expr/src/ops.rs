//! Operator overloads on expression nodes.
//!
//! Every operator builds the same node as the matching [`ExprExt`] method.
//! Construction errors panic with the error message; use the `try_*` methods
//! to handle them.
//!
//! Scalar operators are implemented for several scalar types, so an
//! unsuffixed literal leaves the product's type open. Suffix the literal
//! when calling a method directly on the result:
//!
//! ```
//! use tenalg_expr::{ExprExt, IndexNotation};
//! use tenalg_shape::{Dense, Tensor};
//!
//! let v = Tensor::from_storage(Dense::vector(2), vec![1.0, 2.0]).unwrap();
//! let w = (v.at("i") * 2.0_f64).eval();
//! assert_eq!(w.to_vec(), vec![2.0, 4.0]);
//! ```

use std::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex;
use tenalg_traits::{Euclidean, Scalar};

use crate::embed::{Coembed, Embed};
use crate::error::Result;
use crate::expr::{ExprExt, IndexedExpr};
use crate::indexed::Indexed;
use crate::product::Product;
use crate::reshape::{Bundle, Split, SplitToIndex};
use crate::scaled::Scaled;
use crate::sum::{Sign, Sum};
use crate::temporary::Temporary;

#[track_caller]
fn built<N>(node: Result<N>) -> N {
    node.unwrap_or_else(|e| panic!("{e}"))
}

macro_rules! impl_node_ops {
    ({$($gen:tt)*} $ty:ty) => {
        impl<$($gen)*, Rhs> Add<Rhs> for $ty
        where
            $ty: IndexedExpr,
            Rhs: IndexedExpr<Scalar = <$ty as IndexedExpr>::Scalar>,
        {
            type Output = Sum<$ty, Rhs>;

            #[track_caller]
            fn add(self, rhs: Rhs) -> Self::Output {
                built(Sum::new(self, rhs, Sign::Plus))
            }
        }

        impl<$($gen)*, Rhs> Sub<Rhs> for $ty
        where
            $ty: IndexedExpr,
            Rhs: IndexedExpr<Scalar = <$ty as IndexedExpr>::Scalar>,
        {
            type Output = Sum<$ty, Rhs>;

            #[track_caller]
            fn sub(self, rhs: Rhs) -> Self::Output {
                built(Sum::new(self, rhs, Sign::Minus))
            }
        }

        impl<$($gen)*, Rhs> Mul<Rhs> for $ty
        where
            $ty: IndexedExpr,
            Rhs: IndexedExpr<Scalar = <$ty as IndexedExpr>::Scalar>,
        {
            type Output = Product<$ty, Rhs>;

            #[track_caller]
            fn mul(self, rhs: Rhs) -> Self::Output {
                built(Product::new(self, rhs, Euclidean))
            }
        }

        impl<$($gen)*> Neg for $ty
        where
            $ty: IndexedExpr,
        {
            type Output = Scaled<$ty>;

            fn neg(self) -> Self::Output {
                self.negate()
            }
        }
    };
}

macro_rules! impl_scalar_op {
    ({$($gen:tt)*} $ty:ty, $s:ty) => {
        impl<$($gen)*> Mul<$s> for $ty
        where
            $ty: IndexedExpr<Scalar = $s>,
        {
            type Output = Scaled<$ty>;

            fn mul(self, factor: $s) -> Self::Output {
                Scaled::multiply(self, factor)
            }
        }

        impl<$($gen)*> Div<$s> for $ty
        where
            $ty: IndexedExpr<Scalar = $s>,
        {
            type Output = Scaled<$ty>;

            fn div(self, divisor: $s) -> Self::Output {
                Scaled::divide(self, divisor)
            }
        }

        impl<$($gen)*> Mul<$ty> for $s
        where
            $ty: IndexedExpr<Scalar = $s>,
        {
            type Output = Scaled<$ty>;

            fn mul(self, expr: $ty) -> Self::Output {
                Scaled::multiply(expr, self)
            }
        }
    };
}

macro_rules! impl_scalar_ops {
    ($gen:tt $ty:ty; $($s:ty),*) => {
        $(impl_scalar_op!($gen $ty, $s);)*
    };
}

macro_rules! impl_expr_ops {
    ($gen:tt $ty:ty) => {
        impl_node_ops!($gen $ty);
        impl_scalar_ops!($gen $ty; f32, f64, i32, i64, Complex<f32>, Complex<f64>);
    };
}

impl_expr_ops!({'a, S, T, P} Indexed<'a, S, T, P>);
impl_expr_ops!({L, R} Sum<L, R>);
impl_expr_ops!({E: IndexedExpr} Scaled<E>);
impl_expr_ops!({L, R, P} Product<L, R, P>);
impl_expr_ops!({E, S} Bundle<E, S>);
impl_expr_ops!({E, S} Split<E, S>);
impl_expr_ops!({E, S} SplitToIndex<E, S>);
impl_expr_ops!({E, S, A} Embed<E, S, A>);
impl_expr_ops!({E, A, S} Coembed<E, A, S>);
impl_expr_ops!({T: Scalar} Temporary<T>);
