//! Scalar multiplication and division nodes.

use tenalg_index::{DimIndex, Symbol};
use tenalg_shape::MemoryRange;

use crate::expr::IndexedExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOp {
    Multiply,
    Divide,
}

/// An expression multiplied or divided by a scalar held by value.
#[derive(Debug, Clone)]
pub struct Scaled<E: IndexedExpr> {
    expr: E,
    factor: E::Scalar,
    op: ScaleOp,
}

impl<E: IndexedExpr> Scaled<E> {
    pub fn multiply(expr: E, factor: E::Scalar) -> Self {
        Self {
            expr,
            factor,
            op: ScaleOp::Multiply,
        }
    }

    /// Division by zero follows the scalar type's own semantics.
    pub fn divide(expr: E, divisor: E::Scalar) -> Self {
        Self {
            expr,
            factor: divisor,
            op: ScaleOp::Divide,
        }
    }

    pub fn factor(&self) -> E::Scalar {
        self.factor
    }

    pub fn op(&self) -> ScaleOp {
        self.op
    }
}

impl<E: IndexedExpr> IndexedExpr for Scaled<E> {
    type Scalar = E::Scalar;

    fn free_indices(&self) -> &[DimIndex] {
        self.expr.free_indices()
    }

    fn used_indices(&self) -> &[Symbol] {
        self.expr.used_indices()
    }

    #[inline]
    fn component(&self, free: &[usize]) -> E::Scalar {
        let v = self.expr.component(free);
        match self.op {
            ScaleOp::Multiply => v * self.factor,
            ScaleOp::Divide => v / self.factor,
        }
    }

    fn overlaps_memory_range(&self, range: &MemoryRange) -> bool {
        self.expr.overlaps_memory_range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexed::IndexNotation;
    use crate::ExprExt;
    use num_complex::Complex64;
    use tenalg_shape::{Dense, Tensor};

    #[test]
    fn test_scale_divide_negate() {
        let v = Tensor::from_storage(Dense::vector(3), vec![2.0, 4.0, 6.0]).unwrap();
        assert_eq!(v.at("i").scale(0.5).to_dense_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(v.at("i").divide(2.0).to_dense_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(v.at("i").negate().component(&[2]), -6.0);
        assert!(v.at("i").checked_divide(0.0).is_none());
    }

    #[test]
    fn test_integer_division_truncates() {
        let v = Tensor::from_storage(Dense::vector(2), vec![7_i64, -7]).unwrap();
        assert_eq!(v.at("i").divide(2).to_dense_vec(), vec![3, -3]);
    }

    #[test]
    fn test_complex_scale() {
        let v = Tensor::from_storage(
            Dense::vector(2),
            vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)],
        )
        .unwrap();
        let i = Complex64::new(0.0, 1.0);
        let s = v.at("a").scale(i);
        assert_eq!(s.component(&[0]), i);
        assert_eq!(s.component(&[1]), Complex64::new(-1.0, 0.0));
    }
}
