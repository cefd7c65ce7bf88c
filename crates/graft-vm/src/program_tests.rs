use graft_core::Grammar;
use graft_core::grammar::{RuleDef, action, lit, opt, range, rule, star, tok};

use crate::error::RuntimeError;
use crate::program::{Program, Step};
use crate::test_utils::{compose_ok, lit_type};

fn nullable_chain() -> Program {
    let m = Grammar::combined("M")
        .rule(RuleDef::new("s").alt([rule("a"), opt([lit("z")])]))
        .rule(RuleDef::new("a").alt([lit("x")]).alt([rule("b")]))
        .rule(RuleDef::new("b").alt([star([lit("y")])]));
    Program::new(&compose_ok(&m, &[])).unwrap()
}

#[test]
fn first_sets_flow_through_nullable_rules() {
    let program = nullable_chain();
    let vocab = program.vocabulary();
    let (x, y, z) = (
        vocab.literal_type("x").unwrap(),
        vocab.literal_type("y").unwrap(),
        vocab.literal_type("z").unwrap(),
    );

    let s = program.rule(program.rule_id("s").unwrap());
    assert!(s.nullable);
    assert!(s.first.contains(x) && s.first.contains(y) && s.first.contains(z));

    let b = program.rule(program.rule_id("b").unwrap());
    assert!(b.nullable);
    assert_eq!(b.first.iter().collect::<Vec<_>>(), [y]);
}

#[test]
fn blocks_are_numbered_outside_in() {
    let program = nullable_chain();

    // s body, 'z'?, a body, b body, 'y'*
    assert_eq!(program.blocks().len(), 5);
    let s = program.rule(program.rule_id("s").unwrap());
    assert_eq!(s.body, 0);
    assert_eq!(program.block(0).alts[0].steps[1], Step::Block(1));
    assert!(program.block(4).quantifier.is_loop());
    assert_eq!(program.block(4).rule, program.rule_id("b").unwrap());
}

#[test]
fn labels_and_actions_are_interned() {
    let m = Grammar::combined("M")
        .rule(
            RuleDef::new("r")
                .init("setup")
                .alt([tok("ID").labeled("name"), action("act")])
                .alt([tok("ID").labeled("name"), lit(";"), action("act")]),
        )
        .rule(RuleDef::new("ID").alt([range('a', 'z')]));
    let grammar = compose_ok(&m, &[]);
    let program = Program::new(&grammar).unwrap();

    let r = program.rule(program.rule_id("r").unwrap());
    assert_eq!(r.init.map(|a| program.action(a)), Some("setup"));
    assert_eq!(r.after, None);

    let id = grammar.vocabulary.token_type("ID").unwrap();
    let body = program.block(r.body);
    assert_eq!(
        body.alts[1].steps,
        [
            Step::Match {
                ttype: id,
                label: Some(0)
            },
            Step::Match {
                ttype: lit_type(&grammar, ";"),
                label: None
            },
            Step::Action(0),
        ]
    );
    assert_eq!(program.label(0), "name");
    // Body actions are interned before @init.
    assert_eq!(program.action(0), "act");
    assert_eq!(program.action(1), "setup");
}

#[test]
fn character_range_in_parser_rule_is_rejected() {
    let m = Grammar::combined("M").rule(RuleDef::new("s").alt([lit("x")]));
    let mut grammar = compose_ok(&m, &[]);
    grammar.rules["s"].def.alternatives[0]
        .elements
        .push(range('a', 'z'));

    let err = Program::new(&grammar).unwrap_err();
    assert_eq!(err, RuntimeError::UnknownLiteral("'a'..'z'".into()));
    insta::assert_snapshot!(err.to_string(), @"literal 'a'..'z' has no type in the vocabulary");
}

#[test]
fn program_can_be_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Program>();
}

#[test]
fn rule_ids_follow_definition_order() {
    let program = nullable_chain();

    assert_eq!(program.rule_id("s"), Some(0));
    assert_eq!(program.rule_id("b"), Some(2));
    assert_eq!(program.rule_id("missing"), None);
    assert_eq!(program.rule(2).name, "b");
}
