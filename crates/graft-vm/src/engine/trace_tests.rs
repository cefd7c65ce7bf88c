use graft_core::grammar::{RuleDef, action, lit, rule};
use graft_core::{Colors, CombinedGrammar, Grammar};

use crate::decision::LookaheadPredictor;
use crate::engine::{Parser, PrintTracer, Verbosity};
use crate::program::Program;
use crate::test_utils::{Lexer, compose_ok};

fn trace(grammar: &CombinedGrammar, start: &str, input: &str, verbosity: Verbosity) -> String {
    let program = Program::new(grammar).unwrap();
    let tokens = Lexer::new(grammar).tokenize(input);
    let mut tracer = PrintTracer::new(program.vocabulary(), verbosity, Colors::OFF);
    Parser::new(&program)
        .parse_with(
            tokens.into_iter(),
            start,
            &mut LookaheadPredictor::new(),
            &mut tracer,
        )
        .unwrap();
    tracer.render()
}

fn z() -> RuleDef {
    RuleDef::new("Z").alt([lit("z")])
}

#[test]
fn default_trace_shows_rules_tokens_and_errors() {
    let m = Grammar::combined("M")
        .rule(RuleDef::new("a").alt([lit("x"), lit("y")]))
        .rule(z());
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(trace(&grammar, "a", "xzy", Verbosity::Default), @r"
    ▶ a
      ● x
      ✗ line 1:1 extraneous input 'z' expecting 'y'
      ○ z
      ● y
    ◀ a
    ");
}

#[test]
fn verbose_trace_shows_decisions_and_actions() {
    let m = Grammar::combined("M")
        .rule(
            RuleDef::new("a")
                .init("i")
                .alt([lit("x")])
                .alt([lit("y"), action("mid"), rule("b")]),
        )
        .rule(RuleDef::new("b").after("done").alt([lit("w")]));
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(trace(&grammar, "a", "yw", Verbosity::Verbose), @r"
    ▶ a at 'y'
      ⬥ @init {i}
      ◆ a block 0: alt 1
      ● y
      ⬥ {mid}
      ▶ b at 'w'
        ● w
        ⬥ @after {done}
      ◀ b
    ◀ a
    ");
}

#[test]
fn verbose_trace_shows_recovery() {
    let m = Grammar::combined("M")
        .rule(RuleDef::new("a").alt([lit("x")]).alt([lit("y")]))
        .rule(z());
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(trace(&grammar, "a", "z", Verbosity::Verbose), @r"
    ▶ a at 'z'
      ◆ a block 0: no viable alternative
      ✗ line 1:0 mismatched input 'z' expecting {'x', 'y'}
      ↺ a recovers until <EOF>
      ○ z
    ◀ a (recovered)
    ");
}

#[test]
fn very_verbose_trace_shows_positions() {
    let m = Grammar::combined("M")
        .rule(RuleDef::new("a").alt([lit("x"), lit("y")]))
        .rule(RuleDef::new("WS").alt([lit(" ")]).command("skip"));
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(trace(&grammar, "a", "x y", Verbosity::VeryVerbose), @r"
    ▶ a at 'x'
      ● x @1:0
      ● y @1:2
    ◀ a
    ");
}

#[test]
fn conjured_token_is_traced_by_its_text() {
    let m = Grammar::combined("M").rule(RuleDef::new("a").alt([lit("x"), lit("y")]));
    let grammar = compose_ok(&m, &[]);

    insta::assert_snapshot!(trace(&grammar, "a", "x", Verbosity::Default), @r"
    ▶ a
      ● x
      ✗ line 1:1 missing 'y' at '<EOF>'
      ○ <missing 'y'>
    ◀ a
    ");
}
