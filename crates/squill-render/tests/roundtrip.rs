//! Property: rendered expression text re-reads to the same tree.
//!
//! A small Pratt reader over the expression operator subset drives the
//! check; whatever structure the renderer flattens or parenthesizes must
//! come back identical under structural comparison (spans ignored).

use proptest::prelude::*;
use squill_ast::equality::{DiffLog, deep_equals};
use squill_ast::{Call, Ident, Literal, Node, Operator, ops};
use squill_types::Span;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Word(String),
    Sym(&'static str),
}

fn lex(text: &str) -> Vec<Tok> {
    let mut toks = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() {
            let mut value = 0i64;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                value = value * 10 + i64::from(d);
                chars.next();
            }
            toks.push(Tok::Int(value));
        } else if c.is_ascii_alphabetic() {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            toks.push(Tok::Word(word));
        } else {
            chars.next();
            let sym = match c {
                '|' => {
                    assert_eq!(chars.next(), Some('|'), "lone | in {text}");
                    "||"
                }
                '=' => "=",
                '<' => "<",
                '+' => "+",
                '*' => "*",
                '(' => "(",
                ')' => ")",
                other => panic!("unexpected character {other:?} in {text}"),
            };
            toks.push(Tok::Sym(sym));
        }
    }
    toks
}

fn infix_op(tok: &Tok) -> Option<&'static Operator> {
    match tok {
        Tok::Word(w) if w == "OR" => Some(&ops::OR),
        Tok::Word(w) if w == "AND" => Some(&ops::AND),
        Tok::Sym("=") => Some(&ops::EQ),
        Tok::Sym("<") => Some(&ops::LT),
        Tok::Sym("+") => Some(&ops::ADD),
        Tok::Sym("*") => Some(&ops::MULTIPLY),
        Tok::Sym("||") => Some(&ops::CONCAT),
        _ => None,
    }
}

struct Reader {
    toks: Vec<Tok>,
    pos: usize,
}

impl Reader {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn primary(&mut self) -> Node {
        match self.next().expect("expression expected") {
            Tok::Int(v) => Node::Literal(Literal::integer(v, Span::ZERO)),
            Tok::Word(w) => Node::Ident(Ident::simple(w, Span::ZERO)),
            Tok::Sym("(") => {
                let inner = self.expr(0);
                assert_eq!(self.next(), Some(Tok::Sym(")")), "missing )");
                inner
            }
            other => panic!("unexpected token {other:?}"),
        }
    }

    fn expr(&mut self, min_bp: u8) -> Node {
        let mut lhs = self.primary();
        while let Some(op) = self.peek().and_then(infix_op) {
            if op.left_power < min_bp {
                break;
            }
            self.next();
            let rhs = self.expr(op.right_power);
            lhs = Node::Call(Call::binary(op, lhs, rhs, Span::ZERO).expect("binary"));
        }
        lhs
    }
}

fn read_back(text: &str) -> Node {
    let mut reader = Reader {
        toks: lex(text),
        pos: 0,
    };
    let node = reader.expr(0);
    assert_eq!(reader.pos, reader.toks.len(), "trailing tokens in {text}");
    node
}

fn arb_op() -> impl Strategy<Value = &'static Operator> {
    prop_oneof![
        Just(&ops::OR),
        Just(&ops::AND),
        Just(&ops::EQ),
        Just(&ops::LT),
        Just(&ops::ADD),
        Just(&ops::MULTIPLY),
        Just(&ops::CONCAT),
    ]
}

fn arb_expr() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        (0i64..1000).prop_map(|v| Node::Literal(Literal::integer(v, Span::ZERO))),
        "[a-z][a-z0-9_]{0,5}".prop_map(|s| Node::Ident(Ident::simple(s, Span::ZERO))),
    ];
    leaf.prop_recursive(6, 48, 2, |inner| {
        (arb_op(), inner.clone(), inner).prop_map(|(op, l, r)| {
            Node::Call(Call::binary(op, l, r, Span::ZERO).expect("binary"))
        })
    })
}

proptest! {
    #[test]
    fn rendered_text_reads_back_to_the_same_tree(tree in arb_expr()) {
        let text = squill_render::to_sql(&tree);
        let reparsed = read_back(&text);
        let mut log = DiffLog::new();
        let equal = deep_equals(&tree, &reparsed, &mut log);
        prop_assert!(equal, "text {text:?} diverged: {:?}", log.diffs);
    }

    #[test]
    fn rendering_is_deterministic(tree in arb_expr()) {
        prop_assert_eq!(squill_render::to_sql(&tree), squill_render::to_sql(&tree));
    }
}

#[test]
fn reader_agrees_on_a_known_shape() {
    let tree = read_back("a + b * c");
    let expected = Node::Call(
        Call::binary(
            &ops::ADD,
            Node::Ident(Ident::simple("a", Span::ZERO)),
            Node::Call(
                Call::binary(
                    &ops::MULTIPLY,
                    Node::Ident(Ident::simple("b", Span::ZERO)),
                    Node::Ident(Ident::simple("c", Span::ZERO)),
                    Span::ZERO,
                )
                .unwrap(),
            ),
            Span::ZERO,
        )
        .unwrap(),
    );
    let mut log = DiffLog::new();
    assert!(deep_equals(&tree, &expected, &mut log), "{:?}", log.diffs);
}
