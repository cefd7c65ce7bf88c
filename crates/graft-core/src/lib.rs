#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the graft composer and runtime.
//!
//! - [`grammar`]: per-file grammar models, before composition
//! - [`Vocabulary`]: token name and literal numbering
//! - [`CombinedGrammar`]: the merged, read-only result of composition

pub mod grammar;

mod colors;
mod combined;
mod vocabulary;


pub use colors::Colors;
pub use combined::{CombinedGrammar, ResolvedRule};
pub use grammar::{Grammar, GrammarError, GrammarKind};
pub use vocabulary::{EOF, EOF_NAME, INVALID_TYPE, MIN_USER_TYPE, TokenType, Vocabulary};
