// Input alphabet: an ordered set of symbols with stable indices.

use std::hash::Hash;

use hashbrown::HashMap;

/// An ordered set of distinct symbols.
///
/// The index of a symbol is the position at which it was first inserted, so
/// enumerating the alphabet always yields symbols in first-seen order.
#[derive(Debug, Clone)]
pub struct Alphabet<I> {
    symbols: Vec<I>,
    indices: HashMap<I, usize>,
}

impl<I> Default for Alphabet<I> {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            indices: HashMap::new(),
        }
    }
}

impl<I: Clone + Eq + Hash> Alphabet<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol and return its index.
    ///
    /// Inserting a symbol that is already present leaves the alphabet
    /// unchanged and returns the existing index.
    pub fn push(&mut self, symbol: I) -> usize {
        if let Some(&index) = self.indices.get(&symbol) {
            return index;
        }
        let index = self.symbols.len();
        self.indices.insert(symbol.clone(), index);
        self.symbols.push(symbol);
        index
    }

    /// Look up the index of a symbol.
    pub fn index_of(&self, symbol: &I) -> Option<usize> {
        self.indices.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &I) -> bool {
        self.indices.contains_key(symbol)
    }
}

impl<I> Alphabet<I> {
    /// Number of symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbol stored at `index`.
    pub fn symbol(&self, index: usize) -> Option<&I> {
        self.symbols.get(index)
    }

    /// Iterate in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, I> {
        self.symbols.iter()
    }
}

impl<I: PartialEq> PartialEq for Alphabet<I> {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl<I: Eq> Eq for Alphabet<I> {}

impl<I: Clone + Eq + Hash> FromIterator<I> for Alphabet<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut alphabet = Self::new();
        for symbol in iter {
            alphabet.push(symbol);
        }
        alphabet
    }
}

impl<'a, I> IntoIterator for &'a Alphabet<I> {
    type Item = &'a I;
    type IntoIter = std::slice::Iter<'a, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
