//! Parser rules lowered into an indexed, analyzed form.
//!
//! Lowering resolves every token, literal and rule reference once, so the
//! parser never looks anything up by name. Each block and alternative
//! carries its FIRST set and nullability. A [`Program`] is immutable and
//! can be shared by any number of parse runs.

use indexmap::{IndexMap, IndexSet};

use graft_core::grammar::{Alternative, Element, Quantifier, RuleDef, quote_literal};
use graft_core::{CombinedGrammar, TokenType, Vocabulary};

use crate::error::RuntimeError;
use crate::token_set::TokenSet;

pub type RuleId = usize;
pub type BlockId = usize;
pub type LabelId = usize;
pub type ActionId = usize;

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub body: BlockId,
    pub init: Option<ActionId>,
    pub after: Option<ActionId>,
    pub first: TokenSet,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct Block {
    /// Rule the block belongs to.
    pub rule: RuleId,
    pub quantifier: Quantifier,
    pub alts: Vec<Alt>,
    /// Union of the alternatives' FIRST sets.
    pub first: TokenSet,
    /// Whether the block can match without consuming, quantifier included.
    pub nullable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Alt {
    pub steps: Vec<Step>,
    pub first: TokenSet,
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Match {
        ttype: TokenType,
        label: Option<LabelId>,
    },
    Call {
        rule: RuleId,
        label: Option<LabelId>,
    },
    Block(BlockId),
    Action(ActionId),
}

#[derive(Debug, Clone)]
pub struct Program {
    name: String,
    vocabulary: Vocabulary,
    rules: Vec<Rule>,
    rule_ids: IndexMap<String, RuleId>,
    blocks: Vec<Block>,
    labels: IndexSet<String>,
    actions: IndexSet<String>,
}

impl Program {
    /// Lower the parser rules of a combined grammar.
    pub fn new(grammar: &CombinedGrammar) -> Result<Self, RuntimeError> {
        let rule_ids: IndexMap<String, RuleId> = grammar
            .parser_rules()
            .enumerate()
            .map(|(id, def)| (def.name.clone(), id))
            .collect();

        let mut lowering = Lowering {
            vocabulary: &grammar.vocabulary,
            rule_ids: &rule_ids,
            blocks: Vec::new(),
            labels: IndexSet::new(),
            actions: IndexSet::new(),
        };

        let mut rules = Vec::with_capacity(rule_ids.len());
        for (id, def) in grammar.parser_rules().enumerate() {
            rules.push(lowering.rule(id, def)?);
        }

        let Lowering {
            blocks,
            labels,
            actions,
            ..
        } = lowering;
        let mut program = Self {
            name: grammar.name.clone(),
            vocabulary: grammar.vocabulary.clone(),
            rules,
            rule_ids,
            blocks,
            labels,
            actions,
        };
        program.compute_first();
        log::debug!(
            "lowered `{}`: {} rules, {} blocks",
            program.name,
            program.rules.len(),
            program.blocks.len()
        );
        Ok(program)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.rule_ids.get(name).copied()
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn label(&self, id: LabelId) -> &str {
        &self.labels[id]
    }

    pub fn action(&self, id: ActionId) -> &str {
        &self.actions[id]
    }

    /// FIRST set of a step sequence, and whether the whole sequence is nullable.
    pub fn seq_first(&self, steps: &[Step]) -> (TokenSet, bool) {
        let mut first = TokenSet::new();
        for step in steps {
            let nullable = match *step {
                Step::Match { ttype, .. } => {
                    first.insert(ttype);
                    false
                }
                Step::Call { rule, .. } => {
                    let rule = &self.rules[rule];
                    first.union_with(&rule.first);
                    rule.nullable
                }
                Step::Block(id) => {
                    let block = &self.blocks[id];
                    first.union_with(&block.first);
                    block.nullable
                }
                Step::Action(_) => true,
            };
            if !nullable {
                return (first, false);
            }
        }
        (first, true)
    }

    /// Iterate until no rule's FIRST set or nullability changes.
    fn compute_first(&mut self) {
        loop {
            let mut changed = false;
            for id in 0..self.rules.len() {
                let body = self.rules[id].body;
                self.analyze_block(body);
                let block = &self.blocks[body];
                let (first, nullable) = (block.first.clone(), block.nullable);

                let rule = &mut self.rules[id];
                if rule.first != first || rule.nullable != nullable {
                    rule.first = first;
                    rule.nullable = nullable;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn analyze_block(&mut self, id: BlockId) {
        let mut block_first = TokenSet::new();
        let mut any_nullable = false;

        for alt in 0..self.blocks[id].alts.len() {
            let nested: Vec<BlockId> = self.blocks[id].alts[alt]
                .steps
                .iter()
                .filter_map(|s| match s {
                    Step::Block(b) => Some(*b),
                    _ => None,
                })
                .collect();
            for inner in nested {
                self.analyze_block(inner);
            }

            let (first, nullable) = self.seq_first(&self.blocks[id].alts[alt].steps);
            block_first.union_with(&first);
            any_nullable |= nullable;

            let alt = &mut self.blocks[id].alts[alt];
            alt.first = first;
            alt.nullable = nullable;
        }

        let block = &mut self.blocks[id];
        block.nullable = any_nullable || block.quantifier.is_optional();
        block.first = block_first;
    }
}

struct Lowering<'a> {
    vocabulary: &'a Vocabulary,
    rule_ids: &'a IndexMap<String, RuleId>,
    blocks: Vec<Block>,
    labels: IndexSet<String>,
    actions: IndexSet<String>,
}

impl Lowering<'_> {
    fn rule(&mut self, id: RuleId, def: &RuleDef) -> Result<Rule, RuntimeError> {
        let body = self.block(id, &def.alternatives, Quantifier::One)?;
        Ok(Rule {
            name: def.name.clone(),
            body,
            init: def.init.as_deref().map(|a| self.action(a)),
            after: def.after.as_deref().map(|a| self.action(a)),
            first: TokenSet::new(),
            nullable: false,
        })
    }

    fn block(
        &mut self,
        rule: RuleId,
        alternatives: &[Alternative],
        quantifier: Quantifier,
    ) -> Result<BlockId, RuntimeError> {
        // Reserve the id first so a block precedes the blocks nested in it.
        let id = self.blocks.len();
        self.blocks.push(Block {
            rule,
            quantifier,
            alts: Vec::new(),
            first: TokenSet::new(),
            nullable: false,
        });

        let mut alts = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            let mut steps = Vec::with_capacity(alt.elements.len());
            for element in &alt.elements {
                steps.push(self.step(rule, element)?);
            }
            alts.push(Alt {
                steps,
                ..Alt::default()
            });
        }
        self.blocks[id].alts = alts;
        Ok(id)
    }

    fn step(&mut self, rule: RuleId, element: &Element) -> Result<Step, RuntimeError> {
        let step = match element {
            Element::Literal { value, label } => Step::Match {
                ttype: self
                    .vocabulary
                    .literal_type(value)
                    .ok_or_else(|| RuntimeError::UnknownLiteral(quote_literal(value)))?,
                label: self.label(label),
            },
            Element::Token { name, label } => Step::Match {
                ttype: self
                    .vocabulary
                    .token_type(name)
                    .ok_or_else(|| RuntimeError::UnknownToken(name.clone()))?,
                label: self.label(label),
            },
            Element::Rule { name, label } => Step::Call {
                rule: *self
                    .rule_ids
                    .get(name.as_str())
                    .ok_or_else(|| RuntimeError::UnknownRule(name.clone()))?,
                label: self.label(label),
            },
            Element::Block {
                alternatives,
                quantifier,
            } => Step::Block(self.block(rule, alternatives, *quantifier)?),
            // Character ranges only make sense inside lexer rules.
            Element::Range { .. } => {
                return Err(RuntimeError::UnknownLiteral(element.to_string()));
            }
            Element::Action(payload) => Step::Action(self.action(payload)),
        };
        Ok(step)
    }

    fn label(&mut self, label: &Option<String>) -> Option<LabelId> {
        label.as_ref().map(|l| self.labels.insert_full(l.clone()).0)
    }

    fn action(&mut self, payload: &str) -> ActionId {
        self.actions.insert_full(payload.to_owned()).0
    }
}
