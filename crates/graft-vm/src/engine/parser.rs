//! Recursive interpreter over a lowered [`Program`].

use graft_core::grammar::Quantifier;

use super::config::ParserConfig;
use super::frame::{Frame, FrameStack};
use super::trace::{NoopTracer, Tracer};
use super::{ActionKind, FiredAction, ParseOutcome};
use crate::decision::{Decision, DecisionProcedure, DecisionRequest, LookaheadPredictor};
use crate::error::{RuntimeError, SyntaxErrors};
use crate::program::{ActionId, BlockId, Program, RuleId, Step};
use crate::token::{TokenBuffer, TokenSource};
use crate::token_set::TokenSet;
use crate::tree::{NodeId, ParseTree};

/// Parses token streams against one program.
///
/// A parser holds no per-run state; each call to [`Parser::parse`] starts
/// fresh, so one parser can serve any number of runs.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'p> {
    program: &'p Program,
    config: ParserConfig,
}

impl<'p> Parser<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `source` from rule `start` with the default decision procedure.
    pub fn parse<'s>(
        &self,
        source: impl TokenSource + 's,
        start: &str,
    ) -> Result<ParseOutcome, RuntimeError> {
        self.parse_with(source, start, &mut LookaheadPredictor::new(), &mut NoopTracer)
    }

    /// Parse with a caller-supplied decision procedure and tracer.
    pub fn parse_with<'s, D, T>(
        &self,
        source: impl TokenSource + 's,
        start: &str,
        oracle: &mut D,
        tracer: &mut T,
    ) -> Result<ParseOutcome, RuntimeError>
    where
        D: DecisionProcedure + ?Sized,
        T: Tracer,
    {
        let rule = self
            .program
            .rule_id(start)
            .ok_or_else(|| RuntimeError::UnknownRule(start.to_owned()))?;

        let mut run = Run {
            program: self.program,
            config: self.config,
            input: TokenBuffer::new(source),
            oracle,
            tracer,
            tree: ParseTree::new(start),
            frames: FrameStack::new(),
            errors: SyntaxErrors::new(),
            actions: Vec::new(),
            error_recovery: false,
            mute_until: None,
            last_error_index: None,
            last_error_rules: Vec::new(),
            fuel: self.config.limits.exec_fuel,
            depth: 0,
        };
        let root = run.tree.root();
        run.exec_rule(rule, root)?;

        Ok(ParseOutcome {
            consumed: run.input.index(),
            tree: run.tree,
            errors: run.errors,
            actions: run.actions,
        })
    }
}

/// Why execution of a rule body stopped early.
pub(super) enum Halt {
    /// A token mismatch that single-token repair could not fix. The
    /// innermost rule resynchronizes and returns.
    Recover,
    Fatal(RuntimeError),
}

impl From<RuntimeError> for Halt {
    fn from(err: RuntimeError) -> Self {
        Halt::Fatal(err)
    }
}

pub(super) type Exec<T = ()> = Result<T, Halt>;

/// State of one parse run.
pub(super) struct Run<'p, 's, 'r, D: ?Sized, T> {
    pub(super) program: &'p Program,
    pub(super) config: ParserConfig,
    pub(super) input: TokenBuffer<'s>,
    pub(super) oracle: &'r mut D,
    pub(super) tracer: &'r mut T,
    pub(super) tree: ParseTree,
    pub(super) frames: FrameStack,
    pub(super) errors: SyntaxErrors,
    pub(super) actions: Vec<FiredAction>,
    /// Set by a reported error, cleared by the next successful match.
    /// Reports are suppressed while set.
    pub(super) error_recovery: bool,
    /// Index of the token a failed prediction stopped at. Reports stay
    /// muted until the input moves past it.
    pub(super) mute_until: Option<usize>,
    pub(super) last_error_index: Option<usize>,
    pub(super) last_error_rules: Vec<RuleId>,
    fuel: u32,
    depth: u32,
}

impl<D: DecisionProcedure + ?Sized, T: Tracer> Run<'_, '_, '_, D, T> {
    pub(super) fn exec_rule(&mut self, rule: RuleId, node: NodeId) -> Result<(), RuntimeError> {
        if self.depth >= self.config.limits.recursion_limit {
            return Err(RuntimeError::RecursionLimitExceeded);
        }
        self.depth += 1;

        let program = self.program;
        let def = program.rule(rule);
        let base = self.frames.len();
        self.frames.push(Frame::Rule { rule, node });
        self.tracer.trace_enter_rule(&def.name, self.input.lt(1));

        if let Some(init) = def.init {
            self.fire(ActionKind::Init, init, node);
        }

        let recovered = match self.exec_block(def.body, node) {
            Ok(()) => {
                if let Some(after) = def.after {
                    self.fire(ActionKind::After, after, node);
                }
                false
            }
            Err(Halt::Recover) => {
                self.frames.truncate(base + 1);
                self.recover(rule, node);
                true
            }
            Err(Halt::Fatal(err)) => return Err(err),
        };

        self.frames.truncate(base);
        self.depth -= 1;
        self.tracer.trace_exit_rule(&def.name, recovered);
        Ok(())
    }

    fn exec_block(&mut self, id: BlockId, node: NodeId) -> Exec {
        let program = self.program;
        let block = program.block(id);
        match block.quantifier {
            Quantifier::One if block.alts.len() == 1 => self.exec_alt(id, 0, node),
            Quantifier::One => {
                let follow = self.frames.follow(program);
                self.sync_block_start(id, &follow);
                let alt = self.predict(id, &follow)?;
                self.exec_alt(id, alt, node)
            }
            Quantifier::Optional => {
                let follow = self.frames.follow(program);
                self.sync_block_start(id, &follow);
                match self.decide(id, true, &follow)? {
                    Decision::Alt(alt) => self.exec_alt(id, alt, node),
                    Decision::Exit | Decision::NoViableAlt(_) => Ok(()),
                }
            }
            Quantifier::ZeroOrMore => self.exec_loop(id, node, false),
            Quantifier::OneOrMore => self.exec_loop(id, node, true),
        }
    }

    fn exec_loop(&mut self, id: BlockId, node: NodeId, at_least_once: bool) -> Exec {
        let exit_follow = self.frames.follow(self.program);
        self.frames.push(Frame::Loop { block: id });

        if at_least_once {
            let follow = exit_follow.union(&self.program.block(id).first);
            self.sync_block_start(id, &follow);
            let alt = self.predict(id, &follow)?;
            self.exec_alt(id, alt, node)?;
        }

        loop {
            self.sync_loop(id, &exit_follow);
            let before = self.input.index();
            match self.decide(id, true, &exit_follow)? {
                Decision::Alt(alt) => self.exec_alt(id, alt, node)?,
                Decision::Exit | Decision::NoViableAlt(_) => break,
            }
            // An iteration that consumed nothing would repeat forever.
            if self.input.index() == before {
                break;
            }
        }

        self.frames.pop();
        Ok(())
    }

    fn exec_alt(&mut self, block: BlockId, alt: usize, node: NodeId) -> Exec {
        let program = self.program;
        self.frames.push(Frame::Seq {
            block,
            alt,
            next: 0,
        });

        for (i, step) in program.block(block).alts[alt].steps.iter().enumerate() {
            self.frames.advance(i + 1);
            self.burn_fuel()?;
            match *step {
                Step::Match { ttype, label } => {
                    let child = self.match_token(ttype, node)?;
                    if let Some(label) = label {
                        self.tree.bind_label(node, program.label(label), child);
                    }
                }
                Step::Call { rule, label } => {
                    let child = self.tree.add_rule(node, &program.rule(rule).name);
                    self.exec_rule(rule, child)?;
                    if let Some(label) = label {
                        self.tree.bind_label(node, program.label(label), child);
                    }
                }
                Step::Block(inner) => self.exec_block(inner, node)?,
                Step::Action(action) => self.fire(ActionKind::Inline, action, node),
            }
        }

        self.frames.pop();
        Ok(())
    }

    pub(super) fn decide(&mut self, id: BlockId, can_exit: bool, follow: &TokenSet) -> Exec<Decision> {
        self.burn_fuel()?;
        let program = self.program;
        let block = program.block(id);
        let request = DecisionRequest {
            program,
            rule: block.rule,
            block: id,
            can_exit,
            follow,
        };
        let decision = self.oracle.decide(&request, &mut self.input);
        self.tracer
            .trace_decision(&program.rule(block.rule).name, id, &decision);
        Ok(decision)
    }

    /// Choose an alternative of a block that must match. A failed prediction
    /// is reported and parsing continues with the best candidate.
    fn predict(&mut self, id: BlockId, follow: &TokenSet) -> Exec<usize> {
        match self.decide(id, false, follow)? {
            Decision::Alt(alt) => Ok(alt),
            Decision::Exit => Ok(0),
            Decision::NoViableAlt(failure) => {
                self.report_no_viable_alt(id, follow, failure);
                Ok(failure.best.unwrap_or(0))
            }
        }
    }

    fn fire(&mut self, kind: ActionKind, action: ActionId, node: NodeId) {
        let program = self.program;
        let payload = program.action(action);
        self.tracer.trace_action(kind, payload);
        self.actions.push(FiredAction {
            kind,
            rule: self.tree.rule_name(node).unwrap_or_default().to_owned(),
            node,
            payload: payload.to_owned(),
        });
    }

    fn burn_fuel(&mut self) -> Exec {
        if self.fuel == 0 {
            return Err(Halt::Fatal(RuntimeError::ExecFuelExhausted));
        }
        self.fuel -= 1;
        Ok(())
    }
}
