#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Grammar composer for graft.
//!
//! Merges a delegator grammar with its transitive delegates into one
//! [`CombinedGrammar`] with a shared token vocabulary.
//!
//! # Example
//!
//! ```
//! use graft_compiler::compose;
//! use graft_core::grammar::{Grammar, RuleDef, lit, rule};
//!
//! let s = Grammar::parser("S").rule(RuleDef::new("a").alt([lit("b")]));
//! let m = Grammar::combined("M")
//!     .import("S")
//!     .rule(RuleDef::new("s").alt([rule("a")]));
//!
//! let composition = compose(&m, &[s]);
//! let grammar = composition.grammar().expect("valid composition");
//! assert_eq!(grammar.origin_of("a"), Some("S"));
//! ```

pub mod compose;
pub mod diagnostics;

#[cfg(test)]
pub mod test_utils;

pub use compose::{
    ComposeConfig, Composer, Composition, ImplicitTokens, ImportOrder, compose, compose_with,
};
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Location, Severity};
pub use graft_core::CombinedGrammar;

/// Errors that stop composition from producing a usable grammar.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("composition failed with {} error(s)", .0.error_count())]
    CompositionFailed(Diagnostics),

    #[error("grammar `{0}` is not in the pool")]
    UnknownGrammar(String),
}

/// Result type for composition passes that produce output alongside
/// non-fatal diagnostics.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;
