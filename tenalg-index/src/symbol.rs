//! Abstract index symbols.

use std::fmt;

use smallvec::SmallVec;

use crate::INLINE_RANK;

/// Opaque token naming an index slot in an expression, such as `i` or `j`.
///
/// Symbols carry identity only: two symbols are the same index exactly when
/// they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol(char);

impl Symbol {
    #[inline]
    pub const fn new(c: char) -> Self {
        Symbol(c)
    }

    #[inline]
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl From<char> for Symbol {
    #[inline]
    fn from(c: char) -> Self {
        Symbol(c)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A symbol annotated with the extent of the axis it ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimIndex {
    pub symbol: Symbol,
    pub dim: usize,
}

impl DimIndex {
    #[inline]
    pub fn new(symbol: impl Into<Symbol>, dim: usize) -> Self {
        Self {
            symbol: symbol.into(),
            dim,
        }
    }
}

impl fmt::Display for DimIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol, self.dim)
    }
}

/// Symbol list as written at a call site.
pub type SymbolList = SmallVec<[Symbol; INLINE_RANK]>;

/// Conversion of call-site index notation into a symbol list.
///
/// A string contributes one symbol per non-whitespace character, so
/// `t.at("ij")` and `t.at(['i', 'j'])` name the same slots.
pub trait IntoSymbols {
    fn into_symbols(self) -> SymbolList;
}

impl IntoSymbols for &str {
    fn into_symbols(self) -> SymbolList {
        self.chars()
            .filter(|c| !c.is_whitespace())
            .map(Symbol)
            .collect()
    }
}

impl IntoSymbols for char {
    fn into_symbols(self) -> SymbolList {
        std::iter::once(Symbol(self)).collect()
    }
}

impl IntoSymbols for Symbol {
    fn into_symbols(self) -> SymbolList {
        std::iter::once(self).collect()
    }
}

impl<const N: usize> IntoSymbols for [char; N] {
    fn into_symbols(self) -> SymbolList {
        self.iter().copied().map(Symbol).collect()
    }
}

impl<const N: usize> IntoSymbols for [Symbol; N] {
    fn into_symbols(self) -> SymbolList {
        self.iter().copied().collect()
    }
}

impl IntoSymbols for &[char] {
    fn into_symbols(self) -> SymbolList {
        self.iter().copied().map(Symbol).collect()
    }
}

impl IntoSymbols for &[Symbol] {
    fn into_symbols(self) -> SymbolList {
        self.iter().copied().collect()
    }
}

impl IntoSymbols for Vec<Symbol> {
    fn into_symbols(self) -> SymbolList {
        self.into_iter().collect()
    }
}

impl IntoSymbols for SymbolList {
    fn into_symbols(self) -> SymbolList {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_skips_whitespace() {
        let s = " i j\tk ".into_symbols();
        assert_eq!(s.as_slice(), &[Symbol('i'), Symbol('j'), Symbol('k')]);
    }

    #[test]
    fn test_unicode_symbols() {
        let s = "αβ".into_symbols();
        assert_eq!(s.as_slice(), &[Symbol::new('α'), Symbol::new('β')]);
    }

    #[test]
    fn test_equivalent_notations() {
        assert_eq!("ij".into_symbols(), ['i', 'j'].into_symbols());
        assert_eq!(
            'k'.into_symbols(),
            [Symbol::new('k')].into_symbols()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(DimIndex::new('i', 3).to_string(), "i:3");
    }
}
