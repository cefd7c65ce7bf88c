//! Ordered sets of token types.

use std::collections::BTreeSet;

use graft_core::{TokenType, Vocabulary};

/// Set of token types, iterated in ascending type order (EOF first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet(BTreeSet<TokenType>);

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(ttype: TokenType) -> Self {
        Self(BTreeSet::from([ttype]))
    }

    pub fn insert(&mut self, ttype: TokenType) -> bool {
        self.0.insert(ttype)
    }

    pub fn contains(&self, ttype: TokenType) -> bool {
        self.0.contains(&ttype)
    }

    pub fn union_with(&mut self, other: &TokenSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn union(&self, other: &TokenSet) -> TokenSet {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.0.iter().copied()
    }

    /// `'y'` for a single type, `{'x', 'y'}` otherwise.
    pub fn render(&self, vocabulary: &Vocabulary) -> String {
        let names: Vec<String> = self.iter().map(|t| vocabulary.display_name(t)).collect();
        match names.as_slice() {
            [single] => single.clone(),
            _ => format!("{{{}}}", names.join(", ")),
        }
    }
}

impl FromIterator<TokenType> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
