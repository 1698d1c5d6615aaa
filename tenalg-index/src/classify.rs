//! Free/summed partition of index lists and the maps between index orders.

use smallvec::SmallVec;

use crate::symbol::{DimIndex, Symbol};
use crate::{IndexError, Result, INLINE_RANK};

/// Partition of an index occurrence list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Indices occurring exactly once, in order of first occurrence.
    pub free: Vec<DimIndex>,
    /// Indices occurring exactly twice, in order of first occurrence.
    pub summed: Vec<DimIndex>,
}

impl Classification {
    /// `free ++ summed`: the order summation evaluators iterate in.
    pub fn combined(&self) -> Vec<DimIndex> {
        self.free.iter().chain(self.summed.iter()).copied().collect()
    }
}

/// Split an occurrence list into free and summed indices.
///
/// Every symbol must occur at most twice, and both occurrences of a summed
/// symbol must range over the same extent.
pub fn classify(occurrences: &[DimIndex]) -> Result<Classification> {
    // (first occurrence, count), in order of first occurrence
    let mut seen: Vec<(DimIndex, usize)> = Vec::with_capacity(occurrences.len());
    for idx in occurrences {
        match seen.iter_mut().find(|(s, _)| s.symbol == idx.symbol) {
            Some((first, count)) => {
                if first.dim != idx.dim {
                    return Err(IndexError::DimensionMismatch {
                        symbol: idx.symbol,
                        dim_a: first.dim,
                        dim_b: idx.dim,
                    });
                }
                *count += 1;
            }
            None => seen.push((*idx, 1)),
        }
    }

    let mut out = Classification::default();
    for (idx, count) in seen {
        match count {
            1 => out.free.push(idx),
            2 => out.summed.push(idx),
            _ => {
                return Err(IndexError::Multiplicity {
                    symbol: idx.symbol,
                    count,
                })
            }
        }
    }
    Ok(out)
}

#[inline]
pub fn contains_symbol(list: &[DimIndex], symbol: Symbol) -> bool {
    list.iter().any(|d| d.symbol == symbol)
}

pub fn position_of(list: &[DimIndex], symbol: Symbol) -> Option<usize> {
    list.iter().position(|d| d.symbol == symbol)
}

/// First symbol that appears twice in `list`.
pub fn find_duplicate(list: &[DimIndex]) -> Option<Symbol> {
    list.iter()
        .enumerate()
        .find(|(k, d)| contains_symbol(&list[..*k], d.symbol))
        .map(|(_, d)| d.symbol)
}

pub fn has_duplicates(list: &[DimIndex]) -> bool {
    find_duplicate(list).is_some()
}

/// Whether `a` and `b` name the same symbols, ignoring order.
pub fn same_symbol_set(a: &[DimIndex], b: &[DimIndex]) -> bool {
    a.len() == b.len()
        && a.iter().all(|d| contains_symbol(b, d.symbol))
        && b.iter().all(|d| contains_symbol(a, d.symbol))
}

/// Check that every symbol shared by `a` and `b` has one extent.
pub fn check_shared_dims(a: &[DimIndex], b: &[DimIndex]) -> Result<()> {
    for x in a {
        if let Some(y) = b.iter().find(|y| y.symbol == x.symbol) {
            if x.dim != y.dim {
                return Err(IndexError::DimensionMismatch {
                    symbol: x.symbol,
                    dim_a: x.dim,
                    dim_b: y.dim,
                });
            }
        }
    }
    Ok(())
}

/// Symbols of `a` also in `b`, in `a`'s order.
pub fn intersection(a: &[DimIndex], b: &[DimIndex]) -> Result<Vec<DimIndex>> {
    check_shared_dims(a, b)?;
    Ok(a.iter()
        .filter(|d| contains_symbol(b, d.symbol))
        .copied()
        .collect())
}

/// Symbols of `a` not in `b`, followed by symbols of `b` not in `a`.
pub fn symmetric_difference(a: &[DimIndex], b: &[DimIndex]) -> Vec<DimIndex> {
    a.iter()
        .filter(|d| !contains_symbol(b, d.symbol))
        .chain(b.iter().filter(|d| !contains_symbol(a, d.symbol)))
        .copied()
        .collect()
}

/// `a` followed by the symbols of `b` not already in `a`.
pub fn union_symbols(a: &[Symbol], b: &[Symbol]) -> Vec<Symbol> {
    let mut out = a.to_vec();
    for s in b {
        if !out.contains(s) {
            out.push(*s);
        }
    }
    out
}

pub fn symbols_of(list: &[DimIndex]) -> Vec<Symbol> {
    list.iter().map(|d| d.symbol).collect()
}

/// Gathers an operand's index values out of a larger multi-index.
///
/// Built once from a domain list (distinct symbols) and a codomain list whose
/// symbols all occur in the domain. The codomain may repeat symbols, which is
/// how a trace such as `T(i, i)` reads its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    positions: SmallVec<[usize; INLINE_RANK]>,
}

impl IndexMap {
    pub fn new(domain: &[DimIndex], codomain: &[DimIndex]) -> Result<Self> {
        if let Some(dup) = find_duplicate(domain) {
            return Err(IndexError::DuplicateSymbol(dup));
        }
        let positions = codomain
            .iter()
            .map(|c| position_of(domain, c.symbol).ok_or(IndexError::UnknownSymbol(c.symbol)))
            .collect::<Result<_>>()?;
        Ok(Self { positions })
    }

    /// Map over a domain of the same symbols, checking extents.
    pub fn new_checked(domain: &[DimIndex], codomain: &[DimIndex]) -> Result<Self> {
        check_shared_dims(domain, codomain)?;
        Self::new(domain, codomain)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn is_identity(&self) -> bool {
        self.positions.iter().enumerate().all(|(k, &p)| k == p)
    }

    /// `out[k] = domain_values[positions[k]]`.
    #[inline]
    pub fn apply(&self, domain_values: &[usize], out: &mut [usize]) {
        debug_assert_eq!(out.len(), self.positions.len());
        for (o, &p) in out.iter_mut().zip(self.positions.iter()) {
            *o = domain_values[p];
        }
    }

    pub fn apply_to_vec(&self, domain_values: &[usize]) -> SmallVec<[usize; INLINE_RANK]> {
        self.positions.iter().map(|&p| domain_values[p]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(c: char, dim: usize) -> DimIndex {
        DimIndex::new(c, dim)
    }

    #[test]
    fn test_classify_partition() {
        let c = classify(&[d('i', 2), d('j', 3), d('k', 4), d('j', 3)]).unwrap();
        assert_eq!(c.free, vec![d('i', 2), d('k', 4)]);
        assert_eq!(c.summed, vec![d('j', 3)]);
        assert_eq!(c.combined(), vec![d('i', 2), d('k', 4), d('j', 3)]);
    }

    #[test]
    fn test_classify_rejects_triple() {
        let err = classify(&[d('i', 2), d('i', 2), d('i', 2)]).unwrap_err();
        assert_eq!(
            err,
            IndexError::Multiplicity {
                symbol: Symbol::new('i'),
                count: 3
            }
        );
    }

    #[test]
    fn test_classify_rejects_dim_mismatch() {
        assert!(matches!(
            classify(&[d('i', 2), d('i', 3)]),
            Err(IndexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_set_helpers() {
        let a = [d('i', 2), d('j', 3)];
        let b = [d('j', 3), d('k', 4)];
        assert_eq!(intersection(&a, &b).unwrap(), vec![d('j', 3)]);
        assert_eq!(symmetric_difference(&a, &b), vec![d('i', 2), d('k', 4)]);
        assert!(same_symbol_set(&a, &[d('j', 3), d('i', 2)]));
        assert!(!same_symbol_set(&a, &b));
        assert!(has_duplicates(&[d('i', 2), d('i', 2)]));
        assert!(!has_duplicates(&a));
        let u = union_symbols(&symbols_of(&a), &symbols_of(&b));
        assert_eq!(u, "ijk".chars().map(Symbol::new).collect::<Vec<_>>());
    }

    #[test]
    fn test_index_map_gathers() {
        let domain = [d('i', 2), d('j', 3), d('k', 4)];
        let map = IndexMap::new(&domain, &[d('k', 4), d('i', 2)]).unwrap();
        let mut out = [0; 2];
        map.apply(&[1, 2, 3], &mut out);
        assert_eq!(out, [3, 1]);
        assert!(!map.is_identity());
        assert!(IndexMap::new(&domain, &domain).unwrap().is_identity());
    }

    #[test]
    fn test_index_map_repeated_codomain() {
        let domain = [d('i', 3)];
        let map = IndexMap::new(&domain, &[d('i', 3), d('i', 3)]).unwrap();
        assert_eq!(map.apply_to_vec(&[2]).as_slice(), &[2, 2]);
    }

    #[test]
    fn test_index_map_errors() {
        assert_eq!(
            IndexMap::new(&[d('i', 2)], &[d('j', 2)]),
            Err(IndexError::UnknownSymbol(Symbol::new('j')))
        );
        assert_eq!(
            IndexMap::new(&[d('i', 2), d('i', 2)], &[d('i', 2)]),
            Err(IndexError::DuplicateSymbol(Symbol::new('i')))
        );
    }
}
