//! Inversion of square 2-tensors.
//!
//! Failure is reported through the returned flag, never through an error:
//! on `false` the destination holds unspecified values.

use log::debug;
use tenalg_traits::Scalar;

use crate::dense::Dense;
use crate::diagonal::Diagonal2;
use crate::shape::Shape;
use crate::tensor::Tensor;

/// Invert a square dense 2-tensor into `dst` by Gauss-Jordan elimination.
///
/// Returns `false` when `src` is singular, not square, or when `dst` does not
/// have the same shape.
#[must_use]
pub fn invert_into<T: Scalar>(src: &Tensor<Dense, T>, dst: &mut Tensor<Dense, T>) -> bool {
    let dims = src.shape().factor_dims();
    if dims.len() != 2 || dims[0] != dims[1] || src.shape() != dst.shape() {
        debug!("invert_into: shape {:?} is not an invertible square", dims);
        return false;
    }
    let n = dims[0];
    let mut a = src.to_storage_vec();
    let mut inv: Vec<T> = (0..n * n)
        .map(|k| if k / n == k % n { T::one() } else { T::zero() })
        .collect();

    for col in 0..n {
        let Some(pivot) = (col..n).find(|&r| a[r * n + col] != T::zero()) else {
            debug!("invert_into: singular at column {col}");
            return false;
        };
        if pivot != col {
            for k in 0..n {
                a.swap(pivot * n + k, col * n + k);
                inv.swap(pivot * n + k, col * n + k);
            }
        }
        let p = a[col * n + col];
        for k in 0..n {
            a[col * n + k] = a[col * n + k] / p;
            inv[col * n + k] = inv[col * n + k] / p;
        }
        for r in (0..n).filter(|&r| r != col) {
            let f = a[r * n + col];
            if f == T::zero() {
                continue;
            }
            for k in 0..n {
                a[r * n + k] = a[r * n + k] - f * a[col * n + k];
                inv[r * n + k] = inv[r * n + k] - f * inv[col * n + k];
            }
        }
    }

    for (k, v) in inv.into_iter().enumerate() {
        dst.components().set(k, v);
    }
    true
}

/// Invert a square diagonal 2-tensor entrywise.
#[must_use]
pub fn invert_diagonal_into<T: Scalar>(
    src: &Tensor<Diagonal2, T>,
    dst: &mut Tensor<Diagonal2, T>,
) -> bool {
    let shape = src.shape();
    if shape.rows() != shape.cols() || shape != dst.shape() {
        return false;
    }
    let stored = src.components();
    if stored.iter().any(|v| v == T::zero()) {
        debug!("invert_diagonal_into: zero on the diagonal");
        return false;
    }
    for (k, v) in stored.iter().enumerate() {
        dst.components().set(k, T::one() / v);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_invert_2x2() {
        let a = Tensor::from_storage(Dense::matrix(2, 2), vec![4.0, 7.0, 2.0, 6.0]).unwrap();
        let mut inv = Tensor::zeros(Dense::matrix(2, 2));
        assert!(invert_into(&a, &mut inv));
        let expected = [0.6, -0.7, -0.2, 0.4];
        for (got, want) in inv.to_storage_vec().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invert_needs_row_swap() {
        let a = Tensor::from_storage(
            Dense::matrix(3, 3),
            vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 2.0],
        )
        .unwrap();
        let mut inv = Tensor::zeros(Dense::matrix(3, 3));
        assert!(invert_into(&a, &mut inv));
        let expected = [0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.5];
        for (got, want) in inv.to_storage_vec().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_and_non_square() {
        let s = Tensor::from_storage(Dense::matrix(2, 2), vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        let mut out = Tensor::zeros(Dense::matrix(2, 2));
        assert!(!invert_into(&s, &mut out));

        let r = Tensor::<_, f64>::zeros(Dense::matrix(2, 3));
        let mut out = Tensor::zeros(Dense::matrix(2, 3));
        assert!(!invert_into(&r, &mut out));
    }

    #[test]
    fn test_invert_diagonal() {
        let d = Tensor::from_storage(Diagonal2::square(3), vec![2.0, 4.0, 0.5]).unwrap();
        let mut inv = Tensor::zeros(Diagonal2::square(3));
        assert!(invert_diagonal_into(&d, &mut inv));
        assert_eq!(inv.to_storage_vec(), vec![0.5, 0.25, 2.0]);

        let z = Tensor::from_storage(Diagonal2::square(2), vec![1.0, 0.0]).unwrap();
        let mut out = Tensor::zeros(Diagonal2::square(2));
        assert!(!invert_diagonal_into(&z, &mut out));
    }
}
