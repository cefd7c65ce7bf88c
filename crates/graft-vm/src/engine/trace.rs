//! Tracing infrastructure for debugging parse runs.
//!
//! The tracer is a zero-cost abstraction: with [`NoopTracer`] every hook is
//! an empty `#[inline(always)]` function and disappears from the compiled
//! parser. [`PrintTracer`] collects an indented, human-readable log and
//! [`LogTracer`] forwards events to the `log` facade.

use graft_core::{Colors, Vocabulary};

use super::ActionKind;
use crate::decision::Decision;
use crate::error::SyntaxError;
use crate::program::BlockId;
use crate::token::{Token, escape_whitespace};
use crate::token_set::TokenSet;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Rule entry and exit, consumed tokens, syntax errors.
    #[default]
    Default,
    /// Adds decisions, actions and recovery.
    Verbose,
    /// Adds token positions.
    VeryVerbose,
}

/// Parse run instrumentation.
///
/// Hooks receive what the parser already has at hand. Formatting happens in
/// the implementation.
pub trait Tracer {
    /// Called after a rule is entered, before its body runs.
    fn trace_enter_rule(&mut self, rule: &str, lookahead: &Token);

    /// Called when a rule returns, normally or after recovery.
    fn trace_exit_rule(&mut self, rule: &str, recovered: bool);

    /// Called after the decision procedure answered.
    fn trace_decision(&mut self, rule: &str, block: BlockId, decision: &Decision);

    /// Called after a token is matched and consumed.
    fn trace_consume(&mut self, token: &Token);

    /// Called when a token is consumed by recovery or conjured by insertion.
    fn trace_error_token(&mut self, token: &Token, conjured: bool);

    /// Called when an action fires.
    fn trace_action(&mut self, kind: ActionKind, payload: &str);

    /// Called for every recorded syntax error.
    fn trace_syntax_error(&mut self, error: &SyntaxError);

    /// Called before rule-level recovery discards tokens.
    fn trace_recover(&mut self, rule: &str, recovery_set: &TokenSet);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_enter_rule(&mut self, _rule: &str, _lookahead: &Token) {}

    #[inline(always)]
    fn trace_exit_rule(&mut self, _rule: &str, _recovered: bool) {}

    #[inline(always)]
    fn trace_decision(&mut self, _rule: &str, _block: BlockId, _decision: &Decision) {}

    #[inline(always)]
    fn trace_consume(&mut self, _token: &Token) {}

    #[inline(always)]
    fn trace_error_token(&mut self, _token: &Token, _conjured: bool) {}

    #[inline(always)]
    fn trace_action(&mut self, _kind: ActionKind, _payload: &str) {}

    #[inline(always)]
    fn trace_syntax_error(&mut self, _error: &SyntaxError) {}

    #[inline(always)]
    fn trace_recover(&mut self, _rule: &str, _recovery_set: &TokenSet) {}
}

/// Trace symbols.
mod symbol {
    pub const ENTER: &str = "▶";
    pub const EXIT: &str = "◀";
    pub const CONSUME: &str = "●";
    pub const ERROR_TOKEN: &str = "○";
    pub const DECISION: &str = "◆";
    pub const ACTION: &str = "⬥";
    pub const SYNTAX_ERROR: &str = "✗";
    pub const RECOVER: &str = "↺";
}

/// Tracer that collects an indented execution log.
pub struct PrintTracer<'p> {
    vocabulary: &'p Vocabulary,
    verbosity: Verbosity,
    colors: Colors,
    lines: Vec<String>,
    depth: usize,
}

impl<'p> PrintTracer<'p> {
    pub fn new(vocabulary: &'p Vocabulary, verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            vocabulary,
            verbosity,
            colors,
            lines: Vec::new(),
            depth: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn push(&mut self, symbol: &str, content: &str) {
        let indent = "  ".repeat(self.depth);
        self.lines.push(format!("{indent}{symbol} {content}"));
    }

    fn format_token(&self, token: &Token) -> String {
        let text = escape_whitespace(&token.text);
        if self.verbosity == Verbosity::VeryVerbose {
            format!("{text} @{}:{}", token.line, token.column)
        } else {
            text
        }
    }
}

impl Tracer for PrintTracer<'_> {
    fn trace_enter_rule(&mut self, rule: &str, lookahead: &Token) {
        let mut content = self.colors.paint(self.colors.blue, rule);
        if self.verbosity != Verbosity::Default {
            content.push_str(&format!(" at {}", lookahead.error_display()));
        }
        self.push(symbol::ENTER, &content);
        self.depth += 1;
    }

    fn trace_exit_rule(&mut self, rule: &str, recovered: bool) {
        self.depth = self.depth.saturating_sub(1);
        let mut content = self.colors.paint(self.colors.blue, rule);
        if recovered {
            content.push_str(" (recovered)");
        }
        self.push(symbol::EXIT, &content);
    }

    fn trace_decision(&mut self, rule: &str, block: BlockId, decision: &Decision) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let outcome = match decision {
            Decision::Alt(alt) => format!("alt {alt}"),
            Decision::Exit => "exit".to_owned(),
            Decision::NoViableAlt(_) => "no viable alternative".to_owned(),
        };
        let content = self
            .colors
            .paint(self.colors.dim, &format!("{rule} block {block}: {outcome}"));
        self.push(symbol::DECISION, &content);
    }

    fn trace_consume(&mut self, token: &Token) {
        let text = self.format_token(token);
        let content = self.colors.paint(self.colors.green, &text);
        self.push(symbol::CONSUME, &content);
    }

    fn trace_error_token(&mut self, token: &Token, conjured: bool) {
        let text = if conjured {
            token.text.clone()
        } else {
            self.format_token(token)
        };
        let content = self.colors.paint(self.colors.red, &text);
        self.push(symbol::ERROR_TOKEN, &content);
    }

    fn trace_action(&mut self, kind: ActionKind, payload: &str) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let prefix = match kind {
            ActionKind::Init => "@init ",
            ActionKind::Inline => "",
            ActionKind::After => "@after ",
        };
        let content = self
            .colors
            .paint(self.colors.dim, &format!("{prefix}{{{payload}}}"));
        self.push(symbol::ACTION, &content);
    }

    fn trace_syntax_error(&mut self, error: &SyntaxError) {
        let content = self.colors.paint(self.colors.red, &error.to_string());
        self.push(symbol::SYNTAX_ERROR, &content);
    }

    fn trace_recover(&mut self, rule: &str, recovery_set: &TokenSet) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let set = recovery_set.render(self.vocabulary);
        let content = self
            .colors
            .paint(self.colors.dim, &format!("{rule} recovers until {set}"));
        self.push(symbol::RECOVER, &content);
    }
}

/// Tracer that forwards events to the `log` facade.
///
/// Syntax errors and recovery go to `debug`, everything else to `trace`.
#[derive(Debug, Clone, Copy)]
pub struct LogTracer<'p> {
    vocabulary: &'p Vocabulary,
}

impl<'p> LogTracer<'p> {
    pub fn new(vocabulary: &'p Vocabulary) -> Self {
        Self { vocabulary }
    }
}

impl Tracer for LogTracer<'_> {
    fn trace_enter_rule(&mut self, rule: &str, lookahead: &Token) {
        log::trace!("enter {rule} at {}", lookahead.error_display());
    }

    fn trace_exit_rule(&mut self, rule: &str, recovered: bool) {
        log::trace!("exit {rule}{}", if recovered { " (recovered)" } else { "" });
    }

    fn trace_decision(&mut self, rule: &str, block: BlockId, decision: &Decision) {
        log::trace!("{rule} block {block}: {decision:?}");
    }

    fn trace_consume(&mut self, token: &Token) {
        log::trace!(
            "consume {} as {}",
            token.error_display(),
            self.vocabulary.display_name(token.ttype)
        );
    }

    fn trace_error_token(&mut self, token: &Token, conjured: bool) {
        if conjured {
            log::trace!("conjure {}", token.text);
        } else {
            log::trace!("discard {}", token.error_display());
        }
    }

    fn trace_action(&mut self, kind: ActionKind, payload: &str) {
        log::trace!("{kind:?} action {{{payload}}}");
    }

    fn trace_syntax_error(&mut self, error: &SyntaxError) {
        log::debug!("{error}");
    }

    fn trace_recover(&mut self, rule: &str, recovery_set: &TokenSet) {
        log::debug!(
            "{rule} recovers until {}",
            recovery_set.render(self.vocabulary)
        );
    }
}
