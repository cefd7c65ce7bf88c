//! Grammar model for delegator and delegate grammars.
//!
//! A [`Grammar`] is one grammar file that has already been parsed from
//! source: rules, token declarations, options and opaque action payloads.
//! Models can be built in code (see the builder helpers) or read from JSON.

mod build;
mod json;
mod types;


pub use build::{
    action, choice, group, lit, opt, plus, quantified, range, rule, star, tok,
};
pub use json::GrammarError;
pub use types::{
    Alternative, Element, Grammar, GrammarKind, Quantifier, RuleDef, is_token_name,
    quote_literal,
};
