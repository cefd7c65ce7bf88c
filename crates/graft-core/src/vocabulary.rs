//! Token vocabulary: the name and literal numbering shared by a combined grammar.
//!
//! Types are assigned densely from [`MIN_USER_TYPE`]. Type `0` is reserved as
//! invalid and end of input is the negative sentinel [`EOF`]. Once a
//! composition pass has finished the vocabulary is treated as read-only.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grammar::quote_literal;

/// Integer token type.
pub type TokenType = i32;

/// End of input. Never assigned to a user token.
pub const EOF: TokenType = -1;
/// Reserved, never assigned.
pub const INVALID_TYPE: TokenType = 0;
/// First type handed out to user tokens.
pub const MIN_USER_TYPE: TokenType = 1;

/// Name under which end of input can be referenced from a rule.
pub const EOF_NAME: &str = "EOF";

/// Prefix for types created for literals no lexer rule covers.
const IMPLICIT_LITERAL_PREFIX: &str = "T__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Name to type, in assignment order.
    names: IndexMap<String, TokenType>,
    /// Unquoted literal text to type, in assignment order.
    literals: IndexMap<String, TokenType>,
    /// Index `t` holds the symbolic name of type `t`; slot 0 is unused.
    symbolic: Vec<Option<String>>,
    /// Index `t` holds the literal aliased to type `t`, if any.
    literal_of: Vec<Option<String>>,
    implicit_literals: u32,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            symbolic: vec![None],
            literal_of: vec![None],
            ..Self::default()
        }
    }

    /// Highest assigned type, or `INVALID_TYPE` when empty.
    pub fn max_type(&self) -> TokenType {
        (self.symbolic.len().max(1) - 1) as TokenType
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn next_type(&mut self) -> TokenType {
        if self.symbolic.is_empty() {
            self.symbolic.push(None);
            self.literal_of.push(None);
        }
        let ttype = self.symbolic.len() as TokenType;
        self.symbolic.push(None);
        self.literal_of.push(None);
        ttype
    }

    /// Define a named token, returning its type.
    ///
    /// Defining a name twice returns the type assigned the first time.
    pub fn define_name(&mut self, name: &str) -> TokenType {
        if name == EOF_NAME {
            return EOF;
        }
        if let Some(&ttype) = self.names.get(name) {
            return ttype;
        }
        let ttype = self.next_type();
        self.names.insert(name.to_owned(), ttype);
        self.symbolic[ttype as usize] = Some(name.to_owned());
        ttype
    }

    /// Map `literal` to an existing type.
    ///
    /// Returns the previously mapped type as the error when the literal is
    /// already bound to a different type.
    pub fn alias_literal(&mut self, literal: &str, ttype: TokenType) -> Result<(), TokenType> {
        if let Some(&existing) = self.literals.get(literal) {
            return if existing == ttype { Ok(()) } else { Err(existing) };
        }
        self.literals.insert(literal.to_owned(), ttype);
        if let Some(slot) = self.literal_of.get_mut(ttype as usize)
            && slot.is_none()
        {
            *slot = Some(literal.to_owned());
        }
        Ok(())
    }

    /// Give `literal` a type of its own named `T__<n>`, unless it already has one.
    pub fn define_implicit_literal(&mut self, literal: &str) -> TokenType {
        if let Some(&ttype) = self.literals.get(literal) {
            return ttype;
        }
        let name = format!("{IMPLICIT_LITERAL_PREFIX}{}", self.implicit_literals);
        self.implicit_literals += 1;
        let ttype = self.define_name(&name);
        self.literals.insert(literal.to_owned(), ttype);
        self.literal_of[ttype as usize] = Some(literal.to_owned());
        ttype
    }

    pub fn token_type(&self, name: &str) -> Option<TokenType> {
        if name == EOF_NAME {
            return Some(EOF);
        }
        self.names.get(name).copied()
    }

    pub fn literal_type(&self, literal: &str) -> Option<TokenType> {
        self.literals.get(literal).copied()
    }

    pub fn symbolic_name(&self, ttype: TokenType) -> Option<&str> {
        if ttype == EOF {
            return Some(EOF_NAME);
        }
        self.symbolic.get(usize::try_from(ttype).ok()?)?.as_deref()
    }

    pub fn literal_name(&self, ttype: TokenType) -> Option<&str> {
        self.literal_of.get(usize::try_from(ttype).ok()?)?.as_deref()
    }

    /// Name shown in diagnostics: the quoted literal when one exists,
    /// otherwise the symbolic name. End of input shows as `<EOF>`.
    pub fn display_name(&self, ttype: TokenType) -> String {
        if ttype == EOF {
            return "<EOF>".to_owned();
        }
        if let Some(literal) = self.literal_name(ttype) {
            return quote_literal(literal);
        }
        match self.symbolic_name(ttype) {
            Some(name) => name.to_owned(),
            None => ttype.to_string(),
        }
    }

    /// `(name, type)` pairs with `EOF` first, then in assignment order.
    pub fn names(&self) -> impl Iterator<Item = (&str, TokenType)> {
        std::iter::once((EOF_NAME, EOF)).chain(self.names.iter().map(|(n, &t)| (n.as_str(), t)))
    }

    /// `(literal, type)` pairs in assignment order. Literals are unquoted.
    pub fn literals(&self) -> impl Iterator<Item = (&str, TokenType)> {
        self.literals.iter().map(|(l, &t)| (l.as_str(), t))
    }

    /// Symbolic names ordered by type.
    pub fn symbolic_names(&self) -> Vec<&str> {
        self.symbolic.iter().skip(1).flatten().map(String::as_str).collect()
    }

    /// Renders `{EOF=-1, B=1, A=2}`.
    pub fn describe_names(&self) -> String {
        let entries: Vec<String> = self.names().map(|(n, t)| format!("{n}={t}")).collect();
        format!("{{{}}}", entries.join(", "))
    }

    /// Renders `{'a'=2, 'b'=1}`, sorted by literal text.
    pub fn describe_literals(&self) -> String {
        let mut entries: Vec<(&str, TokenType)> = self.literals().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let entries: Vec<String> = entries
            .into_iter()
            .map(|(l, t)| format!("{}={t}", quote_literal(l)))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

impl std::fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "names:    {}", self.describe_names())?;
        writeln!(f, "literals: {}", self.describe_literals())?;
        write!(f, "types:    [{}]", self.symbolic_names().join(", "))
    }
}
