//! Token matching and error recovery.
//!
//! Recovery works at three levels:
//!
//! - inline, at a token match: delete one extraneous token or conjure one
//!   missing token
//! - at block and loop boundaries: discard tokens that can neither start
//!   the construct nor follow it
//! - at rule level: unwind to the innermost rule and discard tokens until
//!   one some active caller can continue with
//!
//! A reported error puts the run into error-recovery mode, which mutes
//! further reports until a token is matched again.

use graft_core::TokenType;

use super::parser::{Exec, Halt, Run};
use super::{SyncReporting, Tracer};
use crate::decision::{DecisionProcedure, NoViableAlt};
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::program::{BlockId, RuleId};
use crate::token::{DEFAULT_CHANNEL, Token, escape_whitespace};
use crate::token_set::TokenSet;
use crate::tree::NodeId;

impl<D: DecisionProcedure + ?Sized, T: Tracer> Run<'_, '_, '_, D, T> {
    /// Match LA(1) against `ttype`, repairing a single-token error if possible.
    pub(super) fn match_token(&mut self, ttype: TokenType, node: NodeId) -> Exec<NodeId> {
        if self.input.la(1) == ttype {
            return Ok(self.consume_match(node));
        }

        let vocabulary = self.program.vocabulary();
        let expected = TokenSet::of(ttype).render(vocabulary);

        // The token after the current one is the expected one: drop the current.
        if self.input.la(2) == ttype {
            let extra = self.input.lt(1).clone();
            let message = format!(
                "extraneous input {} expecting {expected}",
                extra.error_display()
            );
            self.report(SyntaxErrorKind::ExtraneousInput, &extra, message);
            self.consume_error();
            return Ok(self.consume_match(node));
        }

        // The current token could follow the expected one: pretend it was there.
        let current = self.input.lt(1).clone();
        if self.frames.follow(self.program).contains(current.ttype) {
            let message = format!("missing {expected} at {}", current.error_display());
            self.report(SyntaxErrorKind::MissingToken, &current, message);
            let conjured = Token {
                ttype,
                text: format!("<missing {}>", vocabulary.display_name(ttype)),
                line: current.line,
                column: current.column,
                index: current.index,
                channel: DEFAULT_CHANNEL,
            };
            self.tracer.trace_error_token(&conjured, true);
            return Ok(self.tree.add_error(node, conjured, true));
        }

        let message = format!(
            "mismatched input {} expecting {expected}",
            current.error_display()
        );
        self.report(SyntaxErrorKind::MismatchedInput, &current, message);
        Err(Halt::Recover)
    }

    fn consume_match(&mut self, node: NodeId) -> NodeId {
        let token = self.input.consume();
        self.error_recovery = false;
        self.tracer.trace_consume(&token);
        self.tree.add_terminal(node, token)
    }

    /// Consume LA(1) into the innermost open rule as an error node.
    fn consume_error(&mut self) {
        let token = self.input.consume();
        self.tracer.trace_error_token(&token, false);
        if let Some(node) = self.frames.current_node() {
            self.tree.add_error(node, token, false);
        }
    }

    /// Tokens a block accepts at its start: its FIRST set, plus `follow`
    /// when the block can be skipped.
    fn block_expecting(&self, id: BlockId, follow: &TokenSet) -> TokenSet {
        let block = self.program.block(id);
        let mut expecting = block.first.clone();
        if block.nullable || block.alts.iter().any(|alt| alt.nullable) {
            expecting.union_with(follow);
        }
        expecting
    }

    /// Before a decision: if LA(1) cannot start or skip the block but LA(2)
    /// can, LA(1) is extraneous.
    pub(super) fn sync_block_start(&mut self, id: BlockId, follow: &TokenSet) {
        if self.muted() {
            return;
        }
        let expecting = self.block_expecting(id, follow);
        if expecting.contains(self.input.la(1)) || !expecting.contains(self.input.la(2)) {
            return;
        }
        let extra = self.input.lt(1).clone();
        let message = format!(
            "extraneous input {} expecting {}",
            extra.error_display(),
            expecting.render(self.program.vocabulary())
        );
        self.report(SyntaxErrorKind::ExtraneousInput, &extra, message);
        self.consume_error();
    }

    /// Before each loop decision: discard tokens until one can start another
    /// iteration, follow the loop, or be used by an enclosing rule.
    pub(super) fn sync_loop(&mut self, id: BlockId, exit_follow: &TokenSet) {
        if self.error_recovery {
            return;
        }
        let expecting = self.program.block(id).first.union(exit_follow);
        if expecting.contains(self.input.la(1)) {
            return;
        }

        let stop = expecting.union(&self.frames.recovery_set(self.program));
        let rendered = expecting.render(self.program.vocabulary());
        let mut discarded = 0;
        while !stop.contains(self.input.la(1)) {
            let extra = self.input.lt(1).clone();
            if discarded == 0 || self.config.sync_reporting == SyncReporting::EachToken {
                let message = format!(
                    "extraneous input {} expecting {rendered}",
                    extra.error_display()
                );
                self.record(SyntaxErrorKind::ExtraneousInput, &extra, message);
            }
            self.error_recovery = true;
            self.consume_error();
            discarded += 1;
        }
    }

    pub(super) fn report_no_viable_alt(
        &mut self,
        id: BlockId,
        follow: &TokenSet,
        failure: NoViableAlt,
    ) {
        if failure.offending == failure.start {
            let current = self.input.lt(1).clone();
            let expecting = self.block_expecting(id, follow);
            let message = format!(
                "mismatched input {} expecting {}",
                current.error_display(),
                expecting.render(self.program.vocabulary())
            );
            self.report(SyntaxErrorKind::MismatchedInput, &current, message);
        } else {
            let text = self.input.text_between(failure.start, failure.offending);
            let offending = self.input.lt_at(failure.offending).clone();
            let message = format!(
                "no viable alternative at input '{}'",
                escape_whitespace(&text)
            );
            self.report(SyntaxErrorKind::NoViableAlt, &offending, message);
        }
        // The chosen alternative runs into the same token again.
        self.mute_until = Some(failure.offending);
    }

    /// Rule-level recovery, run by the failing rule after it unwound.
    pub(super) fn recover(&mut self, rule: RuleId, node: NodeId) {
        let index = self.input.index();
        // Failing again in the same rule at the same token: force progress.
        if self.last_error_index == Some(index)
            && self.last_error_rules.contains(&rule)
            && !self.input.lt(1).is_eof()
        {
            self.consume_error();
        }
        self.last_error_index = Some(self.input.index());
        self.last_error_rules.push(rule);

        let recovery_set = self.frames.recovery_set(self.program);
        let name = self.tree.rule_name(node).unwrap_or_default().to_owned();
        self.tracer.trace_recover(&name, &recovery_set);
        while !recovery_set.contains(self.input.la(1)) {
            self.consume_error();
        }
    }

    /// Record an error unless one is already being recovered from or a
    /// failed prediction already covered this token.
    fn muted(&self) -> bool {
        self.error_recovery || self.mute_until.is_some_and(|i| self.input.index() <= i)
    }

    fn report(&mut self, kind: SyntaxErrorKind, token: &Token, message: String) {
        if self.muted() {
            log::trace!("suppressed: {message}");
            return;
        }
        self.error_recovery = true;
        self.record(kind, token, message);
    }

    fn record(&mut self, kind: SyntaxErrorKind, token: &Token, message: String) {
        let rule = self
            .frames
            .current_rule()
            .map(|r| self.program.rule(r).name.clone())
            .unwrap_or_default();
        let error = SyntaxError {
            kind,
            line: token.line,
            column: token.column,
            message,
            offending: token.clone(),
            rule,
        };
        self.tracer.trace_syntax_error(&error);
        self.errors.push(error);
    }
}
