//! Integer combinatorics behind the symmetric and exterior storage bijections.

/// `n!`, or `None` once it leaves `u64` (from `21!` on).
pub fn checked_factorial(n: u64) -> Option<u64> {
    (1..=n).try_fold(1u64, |acc, i| acc.checked_mul(i))
}

/// `C(n, k)`, zero when `k > n`.
pub fn binomial_coefficient(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result = 1usize;
    for i in 0..k {
        // exact at every step: result * (n - i) is divisible by (i + 1)
        result = result * (n - i) / (i + 1);
    }
    result
}

/// Largest `a` with `C(a + order - 1, order) <= value`.
///
/// `C(a + order - 1, order)` counts the sorted `order`-tuples whose values are
/// all below `a`, so `a` is the head value of the symmetric tuple at storage
/// offset `value`.
pub fn index_of_greatest_simplicial_number_leq(value: usize, order: usize) -> usize {
    if order == 0 {
        return 0;
    }
    let mut a = 0;
    while binomial_coefficient(a + order, order) <= value {
        a += 1;
    }
    a
}

/// Largest `a` with `C(a, k) <= value`; the exterior counterpart of
/// [`index_of_greatest_simplicial_number_leq`].
pub fn index_of_greatest_binomial_leq(value: usize, k: usize) -> usize {
    if k == 0 {
        return 0;
    }
    let mut a = k - 1;
    while binomial_coefficient(a + 1, k) <= value {
        a += 1;
    }
    a
}

/// Sign of the permutation that sorts `values` ascending: `-1` for an odd
/// inversion count, `+1` otherwise. Equal values are not inversions.
pub fn permutation_sign(values: &[usize]) -> i8 {
    let mut sign = 1i8;
    for (k, &v) in values.iter().enumerate() {
        for &w in &values[k + 1..] {
            if v > w {
                sign = -sign;
            }
        }
    }
    sign
}

/// `C(n, k)` without leaving `u64`, or `None` if the result does not fit.
pub fn checked_binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result = 1u128;
    for i in 0..u128::from(k) {
        // C(n, i) grows with i up to k, so every partial result must fit too
        result = result * (u128::from(n) - i) / (i + 1);
        if result > u128::from(u64::MAX) {
            return None;
        }
    }
    Some(result as u64)
}

/// Number of distinct arrangements of a multiset whose equal values come in
/// runs of the given lengths: `(sum runs)! / prod(run!)`.
///
/// Built as a product of binomials, so it stays exact whenever the result
/// fits in `u64`, even where the factorials do not.
pub fn multinomial(runs: &[usize]) -> Option<u64> {
    let mut total = 0u64;
    let mut result = 1u64;
    for &run in runs {
        total += run as u64;
        result = result.checked_mul(checked_binomial(total, run as u64)?)?;
    }
    Some(result)
}

/// The largest [`multinomial`] over `order` values drawn from `dim`: the
/// runs split `order` as evenly as possible over `min(order, dim)` values.
pub fn max_multinomial(order: usize, dim: usize) -> Option<u64> {
    let parts = order.min(dim);
    if parts == 0 {
        return Some(1);
    }
    let (q, r) = (order / parts, order % parts);
    let runs: Vec<usize> = (0..parts).map(|i| if i < r { q + 1 } else { q }).collect();
    multinomial(&runs)
}

/// Advance `values` to the next lexicographic permutation.
///
/// Returns `false` (leaving `values` sorted ascending) once the last
/// permutation has been passed. Repeated values yield each distinct
/// arrangement once.
pub fn next_permutation(values: &mut [usize]) -> bool {
    let n = values.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && values[i - 1] >= values[i] {
        i -= 1;
    }
    if i == 0 {
        values.reverse();
        return false;
    }
    let mut j = n - 1;
    while values[j] <= values[i - 1] {
        j -= 1;
    }
    values.swap(i - 1, j);
    values[i..].reverse();
    true
}

/// Call `f` once for every distinct arrangement of `values`.
pub fn for_each_distinct_permutation(values: &[usize], f: &mut dyn FnMut(&[usize])) {
    let mut work: Vec<usize> = values.to_vec();
    work.sort_unstable();
    loop {
        f(&work);
        if !next_permutation(&mut work) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial() {
        assert_eq!(checked_factorial(0), Some(1));
        assert_eq!(checked_factorial(1), Some(1));
        assert_eq!(checked_factorial(5), Some(120));
        assert_eq!(checked_factorial(20), Some(2_432_902_008_176_640_000));
        assert_eq!(checked_factorial(21), None);
    }

    #[test]
    fn test_checked_binomial() {
        assert_eq!(checked_binomial(5, 2), Some(10));
        assert_eq!(checked_binomial(2, 3), Some(0));
        assert_eq!(checked_binomial(66, 33), Some(7_219_428_434_016_265_740));
        assert_eq!(checked_binomial(68, 34), None);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial_coefficient(5, 2), 10);
        assert_eq!(binomial_coefficient(5, 0), 1);
        assert_eq!(binomial_coefficient(5, 5), 1);
        assert_eq!(binomial_coefficient(2, 3), 0);
        assert_eq!(binomial_coefficient(0, 0), 1);
        assert_eq!(binomial_coefficient(30, 15), 155_117_520);
    }

    #[test]
    fn test_greatest_simplicial() {
        // order 2: C(a + 1, 2) = 0, 1, 3, 6, 10, ...
        let heads: Vec<usize> = (0..10)
            .map(|v| index_of_greatest_simplicial_number_leq(v, 2))
            .collect();
        assert_eq!(heads, vec![0, 1, 1, 2, 2, 2, 3, 3, 3, 3]);
        // order 1 is the identity
        assert_eq!(index_of_greatest_simplicial_number_leq(7, 1), 7);
    }

    #[test]
    fn test_greatest_binomial() {
        // k = 2: C(a, 2) = 0, 0, 1, 3, 6, ...
        let heads: Vec<usize> = (0..7)
            .map(|v| index_of_greatest_binomial_leq(v, 2))
            .collect();
        assert_eq!(heads, vec![1, 2, 2, 3, 3, 3, 4]);
    }

    #[test]
    fn test_permutation_sign() {
        assert_eq!(permutation_sign(&[0, 1, 2]), 1);
        assert_eq!(permutation_sign(&[1, 0, 2]), -1);
        assert_eq!(permutation_sign(&[2, 0, 1]), 1);
        assert_eq!(permutation_sign(&[2, 1, 0]), -1);
        assert_eq!(permutation_sign(&[]), 1);
    }

    #[test]
    fn test_multinomial() {
        // [2, 2, 1, 0, 0, 0]: 6! / (2! 1! 3!)
        assert_eq!(multinomial(&[2, 1, 3]), Some(60));
        assert_eq!(multinomial(&[1, 1, 1]), Some(6));
        assert_eq!(multinomial(&[]), Some(1));
        // 21 values in two runs, far past 21! in the naive form
        assert_eq!(multinomial(&[11, 10]), Some(352_716));
        assert_eq!(multinomial(&[1; 21]), None);
    }

    #[test]
    fn test_max_multinomial() {
        assert_eq!(max_multinomial(2, 3), Some(2));
        assert_eq!(max_multinomial(3, 2), Some(3));
        assert_eq!(max_multinomial(4, 4), Some(24));
        assert_eq!(max_multinomial(0, 5), Some(1));
        assert_eq!(max_multinomial(21, 2), Some(352_716));
        assert_eq!(max_multinomial(21, 21), None);
    }

    #[test]
    fn test_distinct_permutations() {
        let mut seen = Vec::new();
        for_each_distinct_permutation(&[1, 0, 1], &mut |p| seen.push(p.to_vec()));
        assert_eq!(seen, vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]);

        let mut count = 0;
        for_each_distinct_permutation(&[0, 1, 2, 3], &mut |_| count += 1);
        assert_eq!(count, 24);

        let mut empty = 0;
        for_each_distinct_permutation(&[], &mut |_| empty += 1);
        assert_eq!(empty, 1);
    }
}
