//! Rule override resolution.
//!
//! Sources are scanned in priority order and the first definition of a
//! name wins. Later definitions are discarded whole; their alternatives are
//! never blended into the winner. Every rule name from every source is kept,
//! so sub-rules referenced only by a discarded definition stay defined.

use indexmap::{IndexMap, IndexSet};

use graft_core::{Grammar, ResolvedRule};

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};

pub(crate) type RuleSet = IndexMap<String, ResolvedRule>;

pub(crate) fn resolve_rules(sources: &[&Grammar], diag: &mut Diagnostics) -> RuleSet {
    let mut rules = RuleSet::new();

    for grammar in sources {
        let mut local: IndexSet<&str> = IndexSet::new();

        for def in &grammar.rules {
            if !local.insert(def.name.as_str()) {
                diag.report(
                    DiagnosticKind::DuplicateRule,
                    Location::rule(&grammar.name, &def.name),
                )
                .message(&def.name)
                .emit();
                continue;
            }

            check_rule_kind(grammar, &def.name, def.is_lexer_rule(), diag);

            if let Some(winner) = rules.get_mut(&def.name) {
                log::debug!(
                    "rule `{}` from `{}` shadowed by `{}`",
                    def.name,
                    grammar.name,
                    winner.origin
                );
                winner.shadowed.push(grammar.name.clone());
                continue;
            }

            rules.insert(
                def.name.clone(),
                ResolvedRule {
                    def: def.clone(),
                    origin: grammar.name.clone(),
                    shadowed: Vec::new(),
                },
            );
        }
    }

    rules
}

fn check_rule_kind(grammar: &Grammar, name: &str, is_lexer: bool, diag: &mut Diagnostics) {
    let kind = match (is_lexer, grammar.kind.allows_lexer_rules(), grammar.kind.allows_parser_rules()) {
        (true, false, _) => DiagnosticKind::LexerRuleInParser,
        (false, _, false) => DiagnosticKind::ParserRuleInLexer,
        _ => return,
    };
    diag.report(kind, Location::rule(&grammar.name, name))
        .message(name)
        .emit();
}
