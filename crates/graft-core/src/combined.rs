//! The combined grammar produced by composition.
//!
//! One rule set plus one vocabulary, merged from a delegator and its
//! transitive delegates. It is read-only after composition and can be cached
//! in a compact binary form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grammar::{GrammarError, GrammarKind, RuleDef};
use crate::vocabulary::Vocabulary;

/// A rule that survived override resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRule {
    /// The surviving definition, copied verbatim from its source grammar.
    pub def: RuleDef,
    /// Grammar the definition came from.
    pub origin: String,
    /// Lower-priority grammars whose same-named definitions were discarded.
    pub shadowed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedGrammar {
    /// Delegator name.
    pub name: String,
    pub kind: GrammarKind,
    /// Source grammars in priority order, delegator first.
    pub sources: Vec<String>,
    /// Rules in merge order: delegator rules first, then each delegate's
    /// rules that were not already defined.
    pub rules: IndexMap<String, ResolvedRule>,
    pub vocabulary: Vocabulary,
    /// Delegator options. Delegate options never reach the combined grammar.
    pub options: IndexMap<String, String>,
    /// Named actions merged across sources.
    pub named_actions: IndexMap<String, String>,
}

impl CombinedGrammar {
    pub fn rule(&self, name: &str) -> Option<&RuleDef> {
        self.rules.get(name).map(|r| &r.def)
    }

    pub fn resolved(&self, name: &str) -> Option<&ResolvedRule> {
        self.rules.get(name)
    }

    /// Grammar whose definition of `name` won.
    pub fn origin_of(&self, name: &str) -> Option<&str> {
        self.rules.get(name).map(|r| r.origin.as_str())
    }

    pub fn parser_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.values().map(|r| &r.def).filter(|d| !d.is_lexer_rule())
    }

    pub fn lexer_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.values().map(|r| &r.def).filter(|d| d.is_lexer_rule())
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, GrammarError> {
        postcard::from_bytes(bytes).map_err(GrammarError::Binary)
    }

    pub fn to_binary(&self) -> Vec<u8> {
        postcard::to_allocvec(self).expect("serialization should not fail")
    }

    /// Human-readable listing of rules with provenance, for debugging and tests.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for resolved in self.rules.values() {
            out.push_str(&resolved.def.to_string());
            out.push_str("  // ");
            out.push_str(&resolved.origin);
            if !resolved.shadowed.is_empty() {
                out.push_str(", shadows ");
                out.push_str(&resolved.shadowed.join(", "));
            }
            out.push('\n');
        }
        out
    }
}
