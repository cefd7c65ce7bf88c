//! Token unification.
//!
//! One deterministic pass over the flattened sources builds the shared
//! vocabulary. Named tokens come first, in priority order: each grammar's
//! `tokens { ... }` names, then its non-fragment lexer rules. Parser-rule
//! references to undeclared names follow. Literals come last: a literal a
//! lexer rule matches verbatim shares that rule's type, any other literal
//! gets a fresh `T__<n>` type.

use indexmap::IndexSet;

use graft_core::grammar::{Element, RuleDef, quote_literal};
use graft_core::{Grammar, GrammarKind, TokenType, Vocabulary};

use super::config::ImplicitTokens;
use super::rules::RuleSet;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Location, Severity};

pub(crate) fn assign_token_types(
    sources: &[&Grammar],
    rules: &RuleSet,
    kind: GrammarKind,
    policy: ImplicitTokens,
    diag: &mut Diagnostics,
) -> Vocabulary {
    let mut vocab = Vocabulary::new();

    define_declared_names(&mut vocab, sources, rules);
    define_implicit_names(&mut vocab, rules, policy, diag);
    alias_literals(&mut vocab, rules, diag);
    define_implicit_literals(&mut vocab, rules, kind, diag);

    log::debug!("token types: {}", vocab.describe_names());
    vocab
}

fn define_declared_names(vocab: &mut Vocabulary, sources: &[&Grammar], rules: &RuleSet) {
    for grammar in sources {
        for name in &grammar.tokens {
            vocab.define_name(name);
        }
        for def in grammar.lexer_rules() {
            // The surviving definition decides whether the name is a fragment.
            let fragment = rules.get(&def.name).map_or(def.fragment, |r| r.def.fragment);
            if !fragment {
                vocab.define_name(&def.name);
            }
        }
    }
}

fn parser_rules(rules: &RuleSet) -> impl Iterator<Item = (&RuleDef, &str)> {
    rules
        .values()
        .filter(|r| !r.def.is_lexer_rule())
        .map(|r| (&r.def, r.origin.as_str()))
}

fn define_implicit_names(
    vocab: &mut Vocabulary,
    rules: &RuleSet,
    policy: ImplicitTokens,
    diag: &mut Diagnostics,
) {
    for (def, origin) in parser_rules(rules) {
        let mut refs: IndexSet<&str> = IndexSet::new();
        def.walk(|e| {
            if let Element::Token { name, .. } = e {
                refs.insert(name);
            }
        });

        for name in refs {
            if vocab.token_type(name).is_some() {
                continue;
            }
            let severity = match policy {
                ImplicitTokens::Warn => Severity::Warning,
                ImplicitTokens::Error => Severity::Error,
            };
            diag.report(
                DiagnosticKind::ImplicitTokenDefinition,
                Location::rule(origin, &def.name),
            )
            .message(name)
            .severity(severity)
            .emit();
            vocab.define_name(name);
        }
    }
}

fn alias_literals(vocab: &mut Vocabulary, rules: &RuleSet, diag: &mut Diagnostics) {
    // Literal -> rule that first claimed it, for the conflict note.
    let mut claimed: Vec<(String, &str, &str)> = Vec::new();

    for resolved in rules.values() {
        let def = &resolved.def;
        if !def.is_lexer_rule() || def.fragment {
            continue;
        }
        let Some(literal) = def.sole_literal() else {
            continue;
        };
        let Some(ttype) = vocab.token_type(&def.name) else {
            continue;
        };

        match vocab.alias_literal(literal, ttype) {
            Ok(()) => claimed.push((literal.to_owned(), def.name.as_str(), resolved.origin.as_str())),
            Err(existing) => {
                let mut builder = diag
                    .report(
                        DiagnosticKind::ConflictingLiteralTypes,
                        Location::rule(&resolved.origin, &def.name),
                    )
                    .message(conflict_detail(vocab, literal, existing, ttype));
                if let Some((_, rule, origin)) = claimed.iter().find(|(l, ..)| l == literal) {
                    builder = builder.related_to(
                        format!("{} bound by `{rule}`", quote_literal(literal)),
                        Location::rule(*origin, *rule),
                    );
                }
                builder.emit();
            }
        }
    }
}

fn conflict_detail(vocab: &Vocabulary, literal: &str, first: TokenType, second: TokenType) -> String {
    let name = |t: TokenType| vocab.symbolic_name(t).unwrap_or("?").to_owned();
    format!(
        "{} is {} ({first}) and {} ({second})",
        quote_literal(literal),
        name(first),
        name(second)
    )
}

fn define_implicit_literals(
    vocab: &mut Vocabulary,
    rules: &RuleSet,
    kind: GrammarKind,
    diag: &mut Diagnostics,
) {
    let mut reported: IndexSet<&str> = IndexSet::new();

    for (def, origin) in parser_rules(rules) {
        let mut literals: Vec<&str> = Vec::new();
        def.walk(|e| {
            if let Element::Literal { value, .. } = e {
                literals.push(value);
            }
        });

        for literal in literals {
            if vocab.literal_type(literal).is_some() {
                continue;
            }
            if kind == GrammarKind::Combined {
                let ttype = vocab.define_implicit_literal(literal);
                log::debug!("literal {literal:?} gets implicit type {ttype}");
            } else if reported.insert(literal) {
                diag.report(
                    DiagnosticKind::LiteralWithoutToken,
                    Location::rule(origin, &def.name),
                )
                .message(quote_literal(literal))
                .emit();
            }
        }
    }
}
