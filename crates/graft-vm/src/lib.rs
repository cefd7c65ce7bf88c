#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Parser runtime for composed graft grammars.
//!
//! A [`CombinedGrammar`] is lowered once into a [`Program`], which a
//! [`Parser`] then runs over any [`TokenSource`]. Runs produce a
//! [`ParseTree`] plus the syntax errors recovery repaired along the way.
//!
//! # Example
//!
//! ```
//! use graft_compiler::compose;
//! use graft_core::grammar::{Grammar, RuleDef, lit, rule};
//! use graft_vm::{Token, parse};
//!
//! let s = Grammar::parser("S").rule(RuleDef::new("b").alt([lit("y")]));
//! let m = Grammar::combined("M")
//!     .import("S")
//!     .rule(RuleDef::new("a").alt([lit("x"), rule("b")]));
//! let composition = compose(&m, &[s]);
//! let grammar = composition.grammar().expect("valid composition");
//!
//! let x = grammar.vocabulary.literal_type("x").unwrap();
//! let y = grammar.vocabulary.literal_type("y").unwrap();
//! let tokens = vec![Token::new(x, "x"), Token::new(y, "y")];
//!
//! let outcome = parse(grammar, tokens.into_iter(), "a").unwrap();
//! assert_eq!(outcome.tree.to_string_tree(), "(a x (b y))");
//! assert!(outcome.errors.is_empty());
//! ```

pub mod decision;
pub mod engine;
pub mod error;
pub mod program;
pub mod token;
pub mod token_set;
pub mod tree;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod program_tests;

pub use decision::{
    Decision, DecisionProcedure, DecisionRequest, Ll1Predictor, LookaheadPredictor, NoViableAlt,
};
pub use engine::{
    ActionKind, FiredAction, FuelLimits, LogTracer, NoopTracer, ParseOutcome, Parser,
    ParserConfig, PrintTracer, SyncReporting, Tracer, Verbosity,
};
pub use error::{RuntimeError, SyntaxError, SyntaxErrorKind, SyntaxErrors};
pub use graft_core::CombinedGrammar;
pub use program::Program;
pub use token::{Token, TokenBuffer, TokenSource};
pub use token_set::TokenSet;
pub use tree::{NodeId, NodeKind, ParseTree};

/// Lower `grammar` and parse `tokens` from rule `start` with the default
/// configuration.
pub fn parse(
    grammar: &CombinedGrammar,
    tokens: impl TokenSource,
    start: &str,
) -> Result<ParseOutcome, RuntimeError> {
    let program = Program::new(grammar)?;
    Parser::new(&program).parse(tokens, start)
}
