//! Stack of open rules, alternatives and loops.
//!
//! The parser keeps its position in the grammar here rather than relying on
//! the native call stack alone, so follow sets and recovery sets can be
//! computed from the frames at any point.

use graft_core::EOF;

use crate::program::{BlockId, Program, RuleId};
use crate::token_set::TokenSet;
use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    /// An invocation of `rule` building `node`.
    Rule { rule: RuleId, node: NodeId },
    /// Inside alternative `alt` of `block`; `next` is the step after the current one.
    Seq {
        block: BlockId,
        alt: usize,
        next: usize,
    },
    /// Inside an iteration of a loop block.
    Loop { block: BlockId },
}

#[derive(Debug, Default)]
pub(crate) struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    /// Record that the step before `next` is executing in the innermost alternative.
    pub fn advance(&mut self, next: usize) {
        if let Some(Frame::Seq { next: n, .. }) = self.frames.last_mut() {
            *n = next;
        }
    }

    /// Innermost open rule.
    pub fn current_rule(&self) -> Option<RuleId> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Rule { rule, .. } => Some(*rule),
            _ => None,
        })
    }

    /// Tree node of the innermost open rule.
    pub fn current_node(&self) -> Option<NodeId> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Rule { node, .. } => Some(*node),
            _ => None,
        })
    }

    /// Tokens that may come next once the current step is done, walking out
    /// through every open invocation. Includes EOF when the start rule can end.
    pub fn follow(&self, program: &Program) -> TokenSet {
        let (mut set, reaches_end) = walk(program, &self.frames, true);
        if reaches_end {
            set.insert(EOF);
        }
        set
    }

    /// Union of the local follow sets of every active call site, plus EOF.
    pub fn recovery_set(&self, program: &Program) -> TokenSet {
        let mut set = TokenSet::of(EOF);
        for (k, frame) in self.frames.iter().enumerate().skip(1) {
            if matches!(frame, Frame::Rule { .. }) {
                set.union_with(&walk(program, &self.frames[..k], false).0);
            }
        }
        set
    }
}

/// FIRST of everything remaining in `frames`, innermost first. Stops at the
/// first non-nullable continuation, or at a rule boundary unless
/// `cross_rules` is set. The flag is true when the walk ran off the end.
fn walk(program: &Program, frames: &[Frame], cross_rules: bool) -> (TokenSet, bool) {
    let mut set = TokenSet::new();
    for frame in frames.iter().rev() {
        match *frame {
            Frame::Seq { block, alt, next } => {
                let steps = &program.block(block).alts[alt].steps;
                let (first, nullable) = program.seq_first(&steps[next.min(steps.len())..]);
                set.union_with(&first);
                if !nullable {
                    return (set, false);
                }
            }
            Frame::Loop { block } => set.union_with(&program.block(block).first),
            Frame::Rule { .. } => {
                if !cross_rules {
                    return (set, true);
                }
            }
        }
    }
    (set, true)
}
