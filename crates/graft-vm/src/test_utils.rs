//! Test helpers: composition shortcuts and a regex lexer driven by the
//! combined grammar's lexer rules.

use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};

use graft_compiler::compose;
use graft_core::grammar::{Element, Quantifier, RuleDef};
use graft_core::{CombinedGrammar, Grammar, TokenType};

use crate::engine::ParseOutcome;
use crate::program::Program;
use crate::token::Token;
use crate::Parser;

pub fn compose_ok(delegator: &Grammar, delegates: &[Grammar]) -> CombinedGrammar {
    let composition = compose(delegator, delegates);
    match composition.grammar() {
        Some(grammar) => grammar.clone(),
        None => panic!(
            "expected valid composition, got:\n{}",
            composition.diagnostics().render()
        ),
    }
}

/// Lex and parse `input` from `start` with the default parser.
pub fn parse_str(grammar: &CombinedGrammar, start: &str, input: &str) -> ParseOutcome {
    let program = Program::new(grammar).expect("grammar lowers");
    let tokens = Lexer::new(grammar).tokenize(input);
    Parser::new(&program)
        .parse(tokens.into_iter(), start)
        .expect("parse run completes")
}

/// Tree on the first line, then one line per syntax error.
pub fn render(outcome: &ParseOutcome) -> String {
    let mut out = outcome.tree.to_string_tree();
    for error in &outcome.errors {
        out.push('\n');
        out.push_str(&error.to_string());
    }
    out
}

pub fn parse_and_render(grammar: &CombinedGrammar, start: &str, input: &str) -> String {
    render(&parse_str(grammar, start, input))
}

/// Token type of a literal, for building token streams by hand.
pub fn lit_type(grammar: &CombinedGrammar, literal: &str) -> TokenType {
    grammar
        .vocabulary
        .literal_type(literal)
        .unwrap_or_else(|| panic!("no type for literal {literal:?}"))
}

struct Pattern {
    regex: Regex,
    ttype: TokenType,
    skip: bool,
    channel: u32,
}

/// Longest-match lexer. On equal length the earlier pattern wins: implicit
/// literals come before lexer rules, lexer rules in grammar order.
pub struct Lexer {
    patterns: Vec<Pattern>,
}

impl Lexer {
    pub fn new(grammar: &CombinedGrammar) -> Self {
        let rules: Vec<&RuleDef> = grammar.lexer_rules().filter(|def| !def.fragment).collect();
        let rule_types: Vec<TokenType> = rules
            .iter()
            .filter_map(|def| grammar.vocabulary.token_type(&def.name))
            .collect();

        let mut patterns = Vec::new();
        // Literals a lexer rule already matches are lexed by that rule.
        for (literal, ttype) in grammar.vocabulary.literals() {
            if rule_types.contains(&ttype) {
                continue;
            }
            patterns.push(Pattern {
                regex: anchored(&regex_syntax::escape(literal)),
                ttype,
                skip: false,
                channel: 0,
            });
        }
        for def in rules {
            let ttype = grammar.vocabulary.token_type(&def.name).unwrap_or(0);
            let channel = if def.commands.iter().any(|c| c.starts_with("channel")) {
                1
            } else {
                0
            };
            patterns.push(Pattern {
                regex: anchored(&rule_pattern(grammar, def)),
                ttype,
                skip: def.has_command("skip"),
                channel,
            });
        }
        Self { patterns }
    }

    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let (mut line, mut column) = (1, 0);
        let mut pos = 0;
        while pos < input.len() {
            let mut best: Option<(usize, &Pattern)> = None;
            for pattern in &self.patterns {
                let search = Input::new(input).range(pos..).anchored(Anchored::Yes);
                if let Some(m) = pattern.regex.search(&search) {
                    let len = m.end() - pos;
                    if len > 0 && best.is_none_or(|(l, _)| len > l) {
                        best = Some((len, pattern));
                    }
                }
            }
            let Some((len, pattern)) = best else {
                panic!("no token matches at {line}:{column} in {input:?}");
            };
            let text = &input[pos..pos + len];
            if !pattern.skip {
                tokens.push(
                    Token::new(pattern.ttype, text)
                        .at(line, column)
                        .on_channel(pattern.channel),
                );
            }
            for c in text.chars() {
                if c == '\n' {
                    line += 1;
                    column = 0;
                } else {
                    column += 1;
                }
            }
            pos += len;
        }
        tokens
    }
}

fn anchored(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("bad lexer pattern {pattern:?}: {e}"))
}

fn rule_pattern(grammar: &CombinedGrammar, def: &RuleDef) -> String {
    let alts: Vec<String> = def
        .alternatives
        .iter()
        .map(|alt| alt.elements.iter().map(|e| element_pattern(grammar, e)).collect())
        .collect();
    format!("(?:{})", alts.join("|"))
}

fn element_pattern(grammar: &CombinedGrammar, element: &Element) -> String {
    match element {
        Element::Literal { value, .. } => regex_syntax::escape(value),
        Element::Range { from, to } => format!(
            "[{}-{}]",
            regex_syntax::escape(&from.to_string()),
            regex_syntax::escape(&to.to_string())
        ),
        Element::Token { name, .. } => match grammar.rule(name) {
            Some(def) => rule_pattern(grammar, def),
            None => panic!("lexer rule {name} is not defined"),
        },
        Element::Block {
            alternatives,
            quantifier,
        } => {
            let alts: Vec<String> = alternatives
                .iter()
                .map(|alt| alt.elements.iter().map(|e| element_pattern(grammar, e)).collect())
                .collect();
            let suffix = match quantifier {
                Quantifier::One => "",
                Quantifier::Optional => "?",
                Quantifier::ZeroOrMore => "*",
                Quantifier::OneOrMore => "+",
            };
            format!("(?:{}){suffix}", alts.join("|"))
        }
        Element::Rule { .. } | Element::Action(_) => String::new(),
    }
}
