//! Decision procedures: choosing an alternative from lookahead.
//!
//! The parser consults a [`DecisionProcedure`] at every block with more than
//! one way forward. Two implementations ship with the runtime:
//!
//! - [`Ll1Predictor`] looks at one token and picks the first alternative
//!   whose FIRST set contains it.
//! - [`LookaheadPredictor`] does the same when that is unambiguous and
//!   otherwise simulates the competing alternatives over the token buffer.

use std::collections::BTreeSet;

use graft_core::grammar::Quantifier;

use crate::program::{BlockId, Program, RuleId, Step};
use crate::token::TokenBuffer;
use crate::token_set::TokenSet;

/// What the parser knows at a decision point.
#[derive(Debug, Clone, Copy)]
pub struct DecisionRequest<'p> {
    pub program: &'p Program,
    pub rule: RuleId,
    pub block: BlockId,
    /// Whether leaving the block without matching an alternative is legal.
    pub can_exit: bool,
    /// Tokens that may follow the block in the current invocation context.
    pub follow: &'p TokenSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Alt(usize),
    Exit,
    NoViableAlt(NoViableAlt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoViableAlt {
    /// Token index the decision started at.
    pub start: usize,
    /// Token index at which the last candidate failed.
    pub offending: usize,
    /// Alternative that got furthest, if any got past `start`.
    pub best: Option<usize>,
}

pub trait DecisionProcedure {
    fn decide(&mut self, request: &DecisionRequest<'_>, input: &mut TokenBuffer<'_>) -> Decision;
}

/// One token of lookahead, first matching alternative wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ll1Predictor;

impl DecisionProcedure for Ll1Predictor {
    fn decide(&mut self, request: &DecisionRequest<'_>, input: &mut TokenBuffer<'_>) -> Decision {
        let candidates = ll1_candidates(request, input);
        ll1_decision(request, input, &candidates)
    }
}

/// Alternatives that can start with LA(1). Alternatives that start with it
/// directly precede those that reach it only through FOLLOW.
fn ll1_candidates(request: &DecisionRequest<'_>, input: &mut TokenBuffer<'_>) -> Vec<usize> {
    let la = input.la(1);
    let block = request.program.block(request.block);

    let direct = block
        .alts
        .iter()
        .enumerate()
        .filter(|(_, alt)| alt.first.contains(la))
        .map(|(i, _)| i);
    let through_follow = block
        .alts
        .iter()
        .enumerate()
        .filter(|(_, alt)| !alt.first.contains(la) && alt.nullable && request.follow.contains(la))
        .map(|(i, _)| i);
    direct.chain(through_follow).collect()
}

fn ll1_decision(
    request: &DecisionRequest<'_>,
    input: &mut TokenBuffer<'_>,
    candidates: &[usize],
) -> Decision {
    let block = request.program.block(request.block);
    let la = input.la(1);
    match candidates.first() {
        // Loops are greedy: an alternative that starts with LA(1) beats exit.
        Some(&alt) if !request.can_exit || block.alts[alt].first.contains(la) => {
            Decision::Alt(alt)
        }
        _ if request.can_exit => Decision::Exit,
        _ => Decision::NoViableAlt(NoViableAlt {
            start: input.index(),
            offending: input.index(),
            best: None,
        }),
    }
}

/// LL(1) where that decides, speculative simulation where it does not.
///
/// Simulation runs each candidate over the buffered input and accepts the
/// first one whose end is followed by a token that may legally come next.
/// Failing that, the first candidate that completes at all is taken. If
/// none completes the decision reports the furthest point any candidate
/// reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookaheadPredictor {
    max_lookahead: Option<usize>,
}

impl LookaheadPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop simulating this many tokens past the decision point and treat
    /// the candidate as viable.
    pub fn with_max_lookahead(mut self, tokens: usize) -> Self {
        self.max_lookahead = Some(tokens);
        self
    }
}

impl DecisionProcedure for LookaheadPredictor {
    fn decide(&mut self, request: &DecisionRequest<'_>, input: &mut TokenBuffer<'_>) -> Decision {
        let candidates = ll1_candidates(request, input);
        if candidates.len() <= 1 {
            return ll1_decision(request, input, &candidates);
        }

        let program = request.program;
        let block = program.block(request.block);
        let start = input.index();

        // After a loop iteration another iteration may follow.
        let mut follow = request.follow.clone();
        if block.quantifier.is_loop() {
            follow.union_with(&block.first);
        }

        let mut sim = Simulation {
            program,
            input,
            limit: self.max_lookahead.map(|n| start + n),
            furthest: start,
            depth: 0,
        };

        let mut completed = None;
        let mut best = None;
        let mut best_reach = start;
        for &alt in &candidates {
            sim.furthest = start;
            let ends = sim.seq(&block.alts[alt].steps, BTreeSet::from([start]));
            if ends.iter().any(|&end| sim.accepts(end, &follow)) {
                log::trace!("alt {alt} of block {} accepted by simulation", request.block);
                return Decision::Alt(alt);
            }
            if !ends.is_empty() && completed.is_none() {
                completed = Some(alt);
            }
            if sim.furthest > best_reach {
                best_reach = sim.furthest;
                best = Some(alt);
            }
        }

        // Exit wins over a candidate that merely completes.
        if request.can_exit && sim.accepts(start, request.follow) {
            return Decision::Exit;
        }
        if let Some(alt) = completed {
            return Decision::Alt(alt);
        }
        Decision::NoViableAlt(NoViableAlt {
            start,
            offending: best_reach,
            best,
        })
    }
}

/// Nested rule calls a simulation follows before giving up on a path.
const SIMULATION_DEPTH: usize = 1024;

/// Position-set simulation of steps over buffered input.
struct Simulation<'p, 'b, 's> {
    program: &'p Program,
    input: &'b mut TokenBuffer<'s>,
    limit: Option<usize>,
    /// Furthest token index examined on the current path.
    furthest: usize,
    depth: usize,
}

impl Simulation<'_, '_, '_> {
    fn past_limit(&self, pos: usize) -> bool {
        self.limit.is_some_and(|limit| pos >= limit)
    }

    fn accepts(&mut self, pos: usize, follow: &TokenSet) -> bool {
        self.past_limit(pos) || follow.contains(self.input.la_at(pos))
    }

    fn seq(&mut self, steps: &[Step], mut positions: BTreeSet<usize>) -> BTreeSet<usize> {
        for step in steps {
            if positions.is_empty() {
                break;
            }
            positions = self.step(*step, positions);
        }
        positions
    }

    fn step(&mut self, step: Step, positions: BTreeSet<usize>) -> BTreeSet<usize> {
        match step {
            Step::Match { ttype, .. } => {
                let mut next = BTreeSet::new();
                for pos in positions {
                    if self.past_limit(pos) {
                        next.insert(pos);
                        continue;
                    }
                    self.furthest = self.furthest.max(pos);
                    let token = self.input.lt_at(pos);
                    if token.ttype == ttype {
                        // EOF never advances.
                        next.insert(if token.is_eof() { pos } else { pos + 1 });
                    }
                }
                next
            }
            Step::Call { rule, .. } => {
                if self.depth >= SIMULATION_DEPTH {
                    return BTreeSet::new();
                }
                self.depth += 1;
                let body = self.program.rule(rule).body;
                let out = self.block(body, positions);
                self.depth -= 1;
                out
            }
            Step::Block(id) => self.block(id, positions),
            Step::Action(_) => positions,
        }
    }

    fn block(&mut self, id: BlockId, positions: BTreeSet<usize>) -> BTreeSet<usize> {
        let block = self.program.block(id);
        match block.quantifier {
            Quantifier::One => self.alts(id, &positions),
            Quantifier::Optional => {
                let mut out = self.alts(id, &positions);
                out.extend(positions);
                out
            }
            Quantifier::ZeroOrMore => self.closure(id, positions),
            Quantifier::OneOrMore => {
                let once = self.alts(id, &positions);
                self.closure(id, once)
            }
        }
    }

    fn alts(&mut self, id: BlockId, positions: &BTreeSet<usize>) -> BTreeSet<usize> {
        let program = self.program;
        let mut out = BTreeSet::new();
        for alt in &program.block(id).alts {
            out.extend(self.seq(&alt.steps, positions.clone()));
        }
        out
    }

    /// Positions reachable by zero or more iterations.
    fn closure(&mut self, id: BlockId, positions: BTreeSet<usize>) -> BTreeSet<usize> {
        let mut reached = positions.clone();
        let mut frontier = positions;
        while !frontier.is_empty() {
            let next: BTreeSet<usize> = self
                .alts(id, &frontier)
                .into_iter()
                .filter(|p| !reached.contains(p))
                .collect();
            reached.extend(next.iter().copied());
            frontier = next;
        }
        reached
    }
}
