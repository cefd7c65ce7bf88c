use graft_core::Grammar;
use graft_core::grammar::{RuleDef, action, choice, lit, plus, range, rule, tok};

use crate::test_utils::{expect_invalid, expect_valid, expect_valid_with, expect_warnings};
use crate::{ComposeConfig, Composer, Error, ImportOrder};

fn leaf(name: &str) -> Grammar {
    Grammar::parser(name)
        .tokens(["A"])
        .rule(RuleDef::new(name.to_lowercase()).alt([tok("A")]))
}

fn delegator() -> Grammar {
    Grammar::combined("M")
        .import("S")
        .import("T")
        .rule(RuleDef::new("m").alt([rule("s"), rule("t")]))
        .rule(RuleDef::new("A").alt([lit("a")]))
}

#[test]
fn delegate_imports_precede_the_delegate() {
    let grammar = expect_valid(&delegator(), &[leaf("S").import("U"), leaf("T"), leaf("U")]);
    assert_eq!(grammar.sources, ["M", "U", "S", "T"]);
}

#[test]
fn pre_order_places_importer_first() {
    let config = ComposeConfig::new().with_import_order(ImportOrder::PreOrder);
    let grammar = expect_valid_with(
        &delegator(),
        &[leaf("S").import("U"), leaf("T"), leaf("U")],
        config,
    );
    assert_eq!(grammar.sources, ["M", "S", "U", "T"]);
}

#[test]
fn import_order_decides_transitive_override() {
    // S and its own delegate U both define `u`.
    let s = leaf("S")
        .import("U")
        .rule(RuleDef::new("u").alt([tok("A"), tok("A")]));
    let delegates = [s, leaf("T"), leaf("U")];

    let post = expect_valid(&delegator(), &delegates);
    assert_eq!(post.origin_of("u"), Some("U"));

    let config = ComposeConfig::new().with_import_order(ImportOrder::PreOrder);
    let pre = expect_valid_with(&delegator(), &delegates, config);
    assert_eq!(pre.origin_of("u"), Some("S"));
    assert_eq!(pre.resolved("u").unwrap().shadowed, ["U"]);
}

#[test]
fn repeated_import_is_merged_once() {
    let grammar = expect_valid(&delegator(), &[leaf("S"), leaf("T").import("S")]);
    assert_eq!(grammar.sources, ["M", "S", "T"]);
}

#[test]
fn import_cycle_terminates() {
    let grammar = expect_valid(&delegator(), &[leaf("S").import("T"), leaf("T").import("S")]);
    assert_eq!(grammar.sources, ["M", "T", "S"]);
}

#[test]
fn missing_import_is_an_error() {
    let m = Grammar::combined("M")
        .import("Q")
        .rule(RuleDef::new("s").alt([lit("x")]));

    insta::assert_snapshot!(expect_invalid(&m, &[]), @r"
    error: imported grammar `Q` not found
      --> M
    ");
}

#[test]
fn parser_grammar_cannot_import_lexer_grammar() {
    let p = Grammar::parser("P").import("L");
    let l = Grammar::lexer("L").rule(RuleDef::new("ID").alt([lit("x")]));

    insta::assert_snapshot!(expect_invalid(&p, &[l]), @r"
    error: incompatible grammar import: parser grammar `P` cannot import lexer grammar `L`
      --> P

    warning: grammar `L` is never imported
      --> L
    ");
}

#[test]
fn combined_grammar_imports_combined_grammar() {
    let s = Grammar::combined("S")
        .tokens(["A", "B", "C"])
        .rule(
            RuleDef::new("x").alt([
                lit("x"),
                tok("INT"),
                action("print(\"S.x\")"),
            ]),
        )
        .rule(RuleDef::new("INT").alt([plus([
            range('0', '9'),
        ])]))
        .rule(
            RuleDef::new("WS")
                .alt([choice([[lit(" ")], [lit("\n")]])])
                .command("skip"),
        );
    let m = Grammar::combined("M")
        .import("S")
        .rule(RuleDef::new("s").alt([rule("x"), tok("INT")]));

    let grammar = expect_valid(&m, &[s]);
    insta::assert_snapshot!(grammar.vocabulary.to_string(), @r"
    names:    {EOF=-1, A=1, B=2, C=3, INT=4, WS=5, T__0=6}
    literals: {'x'=6}
    types:    [A, B, C, INT, WS, T__0]
    ");
}

#[test]
fn unimported_delegate_is_reported() {
    let extra = leaf("X");
    let out = expect_warnings(&delegator(), &[leaf("S"), leaf("T"), extra]);
    insta::assert_snapshot!(out, @r"
    warning: grammar `X` is never imported
      --> X
    ");
}

#[test]
fn composer_pool_composes_by_name() {
    let mut composer = Composer::new();
    composer.add(delegator()).add(leaf("S")).add(leaf("T"));

    let composition = composer.compose("M").unwrap();
    assert!(composition.is_valid());
    assert!(composition.diagnostics().is_empty());
    assert!(composer.grammar("S").is_some());

    let err = composer.compose("Nope").unwrap_err();
    assert!(matches!(err, Error::UnknownGrammar(_)));
    assert_eq!(err.to_string(), "grammar `Nope` is not in the pool");
}

#[test]
fn failed_composition_converts_to_error() {
    let m = Grammar::combined("M").import("Q");
    let mut composer = Composer::new();
    composer.add(m);

    let err = composer.compose("M").unwrap().into_result().unwrap_err();
    assert_eq!(err.to_string(), "composition failed with 1 error(s)");
    let Error::CompositionFailed(diagnostics) = err else {
        panic!("expected composition failure");
    };
    assert_eq!(diagnostics.error_count(), 1);
}
