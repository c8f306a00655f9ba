//! End-to-end: build a scripting tree, resolve its labels and conditions,
//! and render it under both builtin dialects.

use squill::ast::{
    Block, Call, ConditionDecl, HandlerAction, HandlerCondition, HandlerDecl, Ident, Iterate,
    Label, Leave, Literal, LoopHead, LoopStmt, Node, NodeList, Signal, SignalValue, ops,
};
use squill::render::{AnsiDialect, TransactDialect, render};
use squill::resolve::{ControlTarget, resolve};
use squill::types::{Span, SqlState};

fn sp(line: u32) -> Span {
    Span::at(line, 1, 20)
}

fn ident(name: &str, line: u32) -> Node {
    Node::Ident(Ident::simple(name, sp(line)))
}

fn num(v: i64, line: u32) -> Node {
    Node::Literal(Literal::integer(v, sp(line)))
}

/// main: BEGIN
///   DECLARE too_many CONDITION FOR SQLSTATE '54000';
///   DECLARE EXIT HANDLER FOR too_many BEGIN SIGNAL ... END;
///   work: WHILE n < 100 DO
///     IF n = 13 THEN ITERATE work; END IF;
///     SET n = n + 1;
///     LEAVE main;
///   END WHILE work;
/// END main
fn sample_script() -> Node {
    let cond_decl = Node::ConditionDecl(ConditionDecl {
        name: Ident::simple("too_many", sp(2)),
        sqlstate: SqlState::new("54000"),
        span: sp(2),
    });

    let handler_body = Node::Block(Block::new(
        vec![Node::Signal(Signal::raise(
            SignalValue::Sqlstate(SqlState::new("45000").unwrap()),
            Some("giving up".to_owned()),
            sp(3),
        ))],
        sp(3),
    ));
    let handler = Node::HandlerDecl(Box::new(
        HandlerDecl::new(
            HandlerAction::Exit,
            vec![HandlerCondition::Named(Ident::simple("too_many", sp(3)))],
            handler_body,
            sp(3),
        )
        .unwrap(),
    ));

    let iterate = Node::Iterate(Iterate {
        label: Label::new("work", sp(5)),
        span: sp(5),
    });
    let check = Node::Call(
        Call::new(
            &ops::IF,
            vec![
                Some(Node::Call(
                    Call::binary(&ops::EQ, ident("n", 5), num(13, 5), sp(5)).unwrap(),
                )),
                Some(Node::List(NodeList::new(vec![iterate], sp(5)))),
                None,
            ],
            sp(5),
        )
        .unwrap(),
    );
    let bump = Node::Call(
        Call::binary(
            &ops::SET_VAR,
            ident("n", 6),
            Node::Call(Call::binary(&ops::ADD, ident("n", 6), num(1, 6), sp(6)).unwrap()),
            sp(6),
        )
        .unwrap(),
    );
    let leave = Node::Leave(Leave {
        label: Label::new("main", sp(7)),
        span: sp(7),
    });

    let guard = Node::Call(
        Call::binary(&ops::LT, ident("n", 4), num(100, 4), sp(4)).unwrap(),
    );
    let lp = Node::from(
        LoopStmt::labeled(
            Some(Label::new("work", sp(4))),
            Some(Label::new("WORK", sp(8))),
            LoopHead::While(guard),
            vec![check, bump, leave],
            sp(4),
        )
        .unwrap(),
    );

    Node::Block(
        Block::labeled(
            Some(Label::new("main", sp(1))),
            Some(Label::new("main", sp(9))),
            vec![cond_decl, handler, lp],
            sp(1),
        )
        .unwrap(),
    )
}

#[test]
fn script_resolves_cleanly() {
    let script = sample_script();
    let res = resolve(&script);
    assert!(res.is_clean(), "{:?}", res.diagnostics());

    // ITERATE work -> the loop at line 4.
    match res.target_of(sp(5)).expect("iterate bound") {
        ControlTarget::Loop { span, .. } => assert_eq!(*span, sp(4)),
        other => panic!("expected loop target, got {other:?}"),
    }
    // LEAVE main -> the outer block.
    match res.target_of(sp(7)).expect("leave bound") {
        ControlTarget::Block { span, .. } => assert_eq!(*span, sp(1)),
        other => panic!("expected block target, got {other:?}"),
    }
    // The handler's condition name bound to the declaration.
    let binding = res.condition_of(sp(3)).expect("condition bound");
    assert_eq!(binding.declared_at, sp(2));
    assert_eq!(binding.sqlstate, SqlState::new("54000"));
}

#[test]
fn script_renders_identically_in_both_dialects() {
    let script = sample_script();
    let expected = "main: BEGIN \
        DECLARE too_many CONDITION FOR SQLSTATE '54000'; \
        DECLARE EXIT HANDLER FOR too_many \
        BEGIN SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = 'giving up'; END; \
        work: WHILE n < 100 DO \
        IF n = 13 THEN ITERATE work; END IF; \
        SET n = n + 1; \
        LEAVE main; \
        END WHILE work; \
        END main";
    assert_eq!(render(&script, &AnsiDialect), expected);
    // Nothing in this script touches a dialect seam.
    assert_eq!(render(&script, &TransactDialect), expected);
}

#[test]
fn resolution_survives_rerendering() {
    // Rendering is a pure read; resolving again afterwards gives the same
    // bindings.
    let script = sample_script();
    let first = resolve(&script);
    let _ = render(&script, &AnsiDialect);
    let second = resolve(&script);
    assert_eq!(
        first.target_of(sp(7)).map(ControlTarget::span),
        second.target_of(sp(7)).map(ControlTarget::span)
    );
}
