use graft_core::Grammar;
use graft_core::grammar::{RuleDef, choice, lit, opt, plus, range, rule, star, tok};
use indoc::indoc;

use crate::engine::{ActionKind, Parser, ParserConfig, SyncReporting};
use crate::error::SyntaxErrorKind;
use crate::program::Program;
use crate::test_utils::{Lexer, compose_ok, parse_and_render, parse_str, render};

/// Combined grammar `M` with the given parser rules and a lexable `Z : 'z'`.
fn with_z(rules: impl IntoIterator<Item = RuleDef>) -> Grammar {
    let mut m = Grammar::combined("M");
    for def in rules {
        m = m.rule(def);
    }
    m.rule(RuleDef::new("Z").alt([lit("z")]))
}

#[test]
fn extraneous_token_is_deleted() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), lit("y")])]);
    let grammar = compose_ok(&m, &[]);

    let outcome = parse_str(&grammar, "a", "xzy");
    insta::assert_snapshot!(render(&outcome), @r"
    (a x z y)
    line 1:1 extraneous input 'z' expecting 'y'
    ");
    assert_eq!(outcome.errors.kinds(), [SyntaxErrorKind::ExtraneousInput]);
    assert_eq!(outcome.errors[0].rule, "a");
    assert_eq!(outcome.consumed, 3);
}

#[test]
fn no_alternative_matches_first_token() {
    let m = with_z([RuleDef::new("a").alt([lit("x")]).alt([lit("y")])]);
    let grammar = compose_ok(&m, &[]);

    let outcome = parse_str(&grammar, "a", "z");
    insta::assert_snapshot!(render(&outcome), @r"
    (a z)
    line 1:0 mismatched input 'z' expecting {'x', 'y'}
    ");
    assert_eq!(outcome.errors.kinds(), [SyntaxErrorKind::MismatchedInput]);
    assert_eq!(outcome.consumed, 1);
}

#[test]
fn loop_discards_tokens_and_continues() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), star([lit("y")]), lit("!")])]);
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(parse_and_render(&grammar, "a", "xzyy!"), @r"
    (a x z y y !)
    line 1:1 extraneous input 'z' expecting {'y', '!'}
    ");
}

#[test]
fn loop_sync_reports_each_discarded_token_by_default() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), star([lit("y")]), lit("!")])]);
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(parse_and_render(&grammar, "a", "xzzy!"), @r"
    (a x z z y !)
    line 1:1 extraneous input 'z' expecting {'y', '!'}
    line 1:2 extraneous input 'z' expecting {'y', '!'}
    ");
}

#[test]
fn loop_sync_can_report_only_the_first_token() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), star([lit("y")]), lit("!")])]);
    let grammar = compose_ok(&m, &[]);
    let program = Program::new(&grammar).unwrap();
    let tokens = Lexer::new(&grammar).tokenize("xzzy!");
    let config = ParserConfig::new().with_sync_reporting(SyncReporting::FirstToken);

    let outcome = Parser::new(&program)
        .with_config(config)
        .parse(tokens.into_iter(), "a")
        .unwrap();
    insta::assert_snapshot!(render(&outcome), @r"
    (a x z z y !)
    line 1:1 extraneous input 'z' expecting {'y', '!'}
    ");
}

#[test]
fn loop_sync_stops_at_tokens_an_enclosing_rule_needs() {
    let m = with_z([
        RuleDef::new("s").alt([rule("a"), lit(";")]),
        RuleDef::new("a").alt([lit("x"), star([lit("y")])]),
    ]);
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(parse_and_render(&grammar, "s", "xyzz;"), @r"
    (s (a x y z z) ;)
    line 1:2 extraneous input 'z' expecting {';', 'y'}
    line 1:3 extraneous input 'z' expecting {';', 'y'}
    ");
}

#[test]
fn missing_token_is_conjured() {
    let m = Grammar::combined("M").rule(RuleDef::new("a").alt([lit("x"), lit("y"), lit("z")]));
    let grammar = compose_ok(&m, &[]);

    let outcome = parse_str(&grammar, "a", "xz");
    insta::assert_snapshot!(render(&outcome), @r"
    (a x <missing 'y'> z)
    line 1:1 missing 'y' at 'z'
    ");
    assert_eq!(outcome.errors.kinds(), [SyntaxErrorKind::MissingToken]);
    assert_eq!(outcome.tree.text(outcome.tree.root()), "xz");
    assert_eq!(outcome.consumed, 2);
}

#[test]
fn missing_token_before_end_of_input() {
    let m = Grammar::combined("M").rule(RuleDef::new("a").alt([lit("x"), lit("y")]));
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(parse_and_render(&grammar, "a", "x"), @r"
    (a x <missing 'y'>)
    line 1:1 missing 'y' at '<EOF>'
    ");
}

#[test]
fn block_start_drops_one_extraneous_token() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), choice([[lit("y")], [lit("w")]])])]);
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(parse_and_render(&grammar, "a", "xzw"), @r"
    (a x z w)
    line 1:1 extraneous input 'z' expecting {'y', 'w'}
    ");
}

#[test]
fn optional_block_start_considers_what_follows() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), opt([lit("y")]), lit("!")])]);
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(parse_and_render(&grammar, "a", "xz!"), @r"
    (a x z !)
    line 1:1 extraneous input 'z' expecting {'y', '!'}
    ");
}

#[test]
fn mismatch_discards_the_rest_of_the_rule() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), lit("y"), lit("w")])])
        .rule(RuleDef::new("Q").alt([lit("q")]));
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(parse_and_render(&grammar, "a", "xzq"), @r"
    (a x z q)
    line 1:1 mismatched input 'z' expecting 'y'
    ");
}

#[test]
fn failed_rule_resyncs_to_what_its_caller_expects() {
    let m = with_z([
        RuleDef::new("a").after("a done").alt([rule("b"), lit("q")]),
        RuleDef::new("b").after("b done").alt([lit("x"), lit("y")]),
    ]);
    let grammar = compose_ok(&m, &[]);

    let outcome = parse_str(&grammar, "a", "xzzq");
    insta::assert_snapshot!(render(&outcome), @r"
    (a (b x z z) q)
    line 1:1 mismatched input 'z' expecting 'y'
    ");

    // A rule that had to recover skips @after.
    let fired: Vec<_> = outcome
        .actions
        .iter()
        .map(|a| (a.kind, a.payload.as_str()))
        .collect();
    assert_eq!(fired, [(ActionKind::After, "a done")]);
}

#[test]
fn errors_are_muted_until_a_token_matches() {
    let m = with_z([
        RuleDef::new("s").alt([rule("a"), rule("a")]),
        RuleDef::new("a").alt([lit("x"), lit("y")]),
    ]);
    let grammar = compose_ok(&m, &[]);

    // The second `a` fails at EOF without a report.
    insta::assert_snapshot!(parse_and_render(&grammar, "s", "z"), @r"
    (s (a z) a)
    line 1:0 mismatched input 'z' expecting 'x'
    ");
}

#[test]
fn no_viable_alternative_after_lookahead() {
    let m = Grammar::combined("Decl")
        .rule(
            RuleDef::new("decl")
                .alt([rule("type"), tok("ID"), lit(";")])
                .alt([rule("type"), tok("ID"), lit("="), tok("INT"), lit(";")]),
        )
        .rule(RuleDef::new("type").alt([lit("float")]).alt([lit("int")]))
        .rule(RuleDef::new("ID").alt([plus([range('a', 'z')])]))
        .rule(RuleDef::new("INT").alt([plus([range('0', '9')])]))
        .rule(RuleDef::new("WS").alt([plus([lit(" ")])]).command("skip"));
    let grammar = compose_ok(&m, &[]);

    let outcome = parse_str(&grammar, "decl", "float x = ;");
    insta::assert_snapshot!(render(&outcome), @r"
    (decl (type float) x = <missing INT> ;)
    line 1:10 no viable alternative at input 'floatx=;'
    ");
    assert_eq!(outcome.errors.kinds(), [SyntaxErrorKind::NoViableAlt]);
}

#[test]
fn errors_after_a_failed_prediction_are_still_reported() {
    let m = Grammar::combined("Decl")
        .rule(RuleDef::new("prog").alt([rule("decl"), lit("!")]))
        .rule(
            RuleDef::new("decl")
                .alt([rule("type"), tok("ID"), lit(";")])
                .alt([rule("type"), tok("ID"), lit("="), tok("INT"), lit(";")]),
        )
        .rule(RuleDef::new("type").alt([lit("float")]).alt([lit("int")]))
        .rule(RuleDef::new("ID").alt([plus([range('a', 'z')])]))
        .rule(RuleDef::new("INT").alt([plus([range('0', '9')])]))
        .rule(RuleDef::new("WS").alt([plus([lit(" ")])]).command("skip"));
    let grammar = compose_ok(&m, &[]);

    let outcome = parse_str(&grammar, "prog", "float x = ; ;");
    insta::assert_snapshot!(render(&outcome), @r"
    (prog (decl (type float) x = <missing INT> ;) ;)
    line 1:10 no viable alternative at input 'floatx=;'
    line 1:12 mismatched input ';' expecting '!'
    ");
}

#[test]
fn syntax_errors_serialize_as_a_list() {
    let m = with_z([RuleDef::new("a").alt([lit("x"), lit("y")])]);
    let grammar = compose_ok(&m, &[]);
    let outcome = parse_str(&grammar, "a", "xzy");

    let json = serde_json::to_string_pretty(&outcome.errors).unwrap();
    assert_eq!(
        json,
        indoc! {r#"
            [
              {
                "kind": "ExtraneousInput",
                "line": 1,
                "column": 1,
                "message": "extraneous input 'z' expecting 'y'",
                "offending": {
                  "ttype": 1,
                  "text": "z",
                  "line": 1,
                  "column": 1,
                  "index": 1,
                  "channel": 0
                },
                "rule": "a"
              }
            ]"#}
    );
}
