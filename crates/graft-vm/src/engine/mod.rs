//! Parser runtime.
//!
//! The engine interprets a [`Program`](crate::Program) over a token stream,
//! building a [`ParseTree`] while a pluggable decision procedure picks
//! alternatives and loop exits. Syntax errors are repaired in place and
//! collected; only resource limits and unresolvable names abort a run.

mod config;
mod frame;
mod parser;
mod recovery;
mod trace;

#[cfg(test)]
mod recovery_tests;
#[cfg(test)]
mod trace_tests;

pub use config::{FuelLimits, ParserConfig, SyncReporting};
pub use parser::Parser;
pub use trace::{LogTracer, NoopTracer, PrintTracer, Tracer, Verbosity};

use crate::error::SyntaxErrors;
use crate::tree::{NodeId, ParseTree};

/// Result of one parse run.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub tree: ParseTree,
    pub errors: SyntaxErrors,
    /// On-channel tokens consumed, EOF excluded.
    pub consumed: usize,
    /// Actions in the order they fired.
    pub actions: Vec<FiredAction>,
}

impl ParseOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// `@init`, before the rule body.
    Init,
    /// Embedded in an alternative.
    Inline,
    /// `@after`, once the rule body matched.
    After,
}

/// An action the parser passed over. Payloads are opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredAction {
    pub kind: ActionKind,
    /// Rule whose node was open when the action fired.
    pub rule: String,
    pub node: NodeId,
    pub payload: String,
}
