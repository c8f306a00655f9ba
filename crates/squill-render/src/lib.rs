//! Canonical SQL text rendering.
//!
//! The renderer turns a `squill-ast` tree into deterministic SQL text with
//! minimal parenthesization. Spelling differences between products go
//! through the [`Dialect`] seam; the precedence machinery and statement
//! templates are shared.
//!
//! ```
//! use squill_ast::{Call, Literal, Node, ops};
//! use squill_render::to_sql;
//! use squill_types::Span;
//!
//! let sp = Span::ZERO;
//! let one = Node::Literal(Literal::integer(1, sp));
//! let two = Node::Literal(Literal::integer(2, sp));
//! let sum = Node::Call(Call::binary(&ops::ADD, one, two, sp).unwrap());
//! assert_eq!(to_sql(&sum), "1 + 2");
//! ```

pub mod dialect;
pub mod unparse;
pub mod writer;

pub use dialect::{AnsiDialect, Dialect, TransactDialect};
pub use unparse::{Renderer, render};
pub use writer::{FrameKind, FrameToken, SqlWriter};

use squill_ast::Node;

/// Render under the ANSI dialect.
#[must_use]
pub fn to_sql(node: &Node) -> String {
    render(node, &AnsiDialect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use squill_ast::{Call, Ident, Literal, Node, ops};
    use squill_types::Span;

    fn sp() -> Span {
        Span::ZERO
    }

    fn num(v: i64) -> Node {
        Node::Literal(Literal::integer(v, sp()))
    }

    fn col(name: &str) -> Node {
        Node::Ident(Ident::simple(name, sp()))
    }

    fn bin(op: &'static squill_ast::Operator, l: Node, r: Node) -> Node {
        Node::Call(Call::binary(op, l, r, sp()).expect("binary"))
    }

    #[test]
    fn higher_precedence_child_needs_no_parens() {
        let tree = bin(&ops::ADD, col("a"), bin(&ops::MULTIPLY, col("b"), col("c")));
        assert_eq!(to_sql(&tree), "a + b * c");
    }

    #[test]
    fn lower_precedence_child_takes_parens() {
        let tree = bin(&ops::MULTIPLY, bin(&ops::ADD, col("a"), col("b")), col("c"));
        assert_eq!(to_sql(&tree), "(a + b) * c");
    }

    #[test]
    fn left_associative_chain_stays_flat() {
        let tree = bin(&ops::SUBTRACT, bin(&ops::SUBTRACT, col("a"), col("b")), col("c"));
        assert_eq!(to_sql(&tree), "a - b - c");
    }

    #[test]
    fn right_nested_same_level_takes_parens() {
        let tree = bin(&ops::SUBTRACT, col("a"), bin(&ops::SUBTRACT, col("b"), col("c")));
        assert_eq!(to_sql(&tree), "a - (b - c)");
    }

    #[test]
    fn not_over_comparison_normalizes() {
        let eq = bin(&ops::EQ, col("a"), col("b"));
        let not = Node::Call(Call::unary(&ops::NOT, eq, sp()).expect("unary"));
        assert_eq!(to_sql(&not), "a <> b");
    }

    #[test]
    fn not_without_inverse_keeps_prefix() {
        let conj = bin(&ops::AND, col("a"), col("b"));
        let not = Node::Call(Call::unary(&ops::NOT, conj, sp()).expect("unary"));
        assert_eq!(to_sql(&not), "NOT (a AND b)");
    }

    #[test]
    fn postfix_null_test_binds_tighter_than_or() {
        let disj = bin(&ops::OR, col("a"), col("b"));
        let test = Node::Call(Call::unary(&ops::IS_NULL, disj, sp()).expect("unary"));
        assert_eq!(to_sql(&test), "(a OR b) IS NULL");

        let sum = bin(&ops::ADD, col("a"), col("b"));
        let test = Node::Call(Call::unary(&ops::IS_NULL, sum, sp()).expect("unary"));
        assert_eq!(to_sql(&test), "a + b IS NULL");
    }

    #[test]
    fn double_negation_of_null_test() {
        let test = Node::Call(Call::unary(&ops::IS_NULL, col("a"), sp()).expect("unary"));
        let not = Node::Call(Call::unary(&ops::NOT, test, sp()).expect("unary"));
        assert_eq!(to_sql(&not), "a IS NOT NULL");
    }

    #[test]
    fn collate_is_postfix_with_name() {
        let call = Call::new(
            &ops::COLLATE,
            vec![Some(col("name")), Some(col("latin1_general"))],
            sp(),
        )
        .expect("two slots");
        assert_eq!(to_sql(&Node::Call(call)), "name COLLATE latin1_general");
    }

    #[test]
    fn like_with_escape_clause() {
        let call = Call::new(
            &ops::LIKE,
            vec![
                Some(col("name")),
                Some(Node::Literal(Literal::string("%x!_%", sp()))),
                Some(Node::Literal(Literal::string("!", sp()))),
            ],
            sp(),
        )
        .expect("three slots");
        assert_eq!(to_sql(&Node::Call(call)), "name LIKE '%x!_%' ESCAPE '!'");
    }

    #[test]
    fn between_spells_both_bounds() {
        let call = Call::new(
            &ops::BETWEEN,
            vec![Some(col("x")), Some(num(1)), Some(num(9))],
            sp(),
        )
        .expect("three slots");
        assert_eq!(to_sql(&Node::Call(call)), "x BETWEEN 1 AND 9");
    }

    #[test]
    fn byte_literals_follow_the_dialect() {
        let blob = Node::Literal(Literal::bytes(vec![0x1A, 0x2B, 0x00], sp()));
        assert_eq!(render(&blob, &AnsiDialect), "X'1A2B00'");
        assert_eq!(render(&blob, &TransactDialect), "0x1A2B00");
    }

    #[test]
    fn function_call_glues_parens() {
        let call = Call::function(
            Ident::simple("coalesce", sp()),
            vec![col("a"), Node::Literal(Literal::null(sp()))],
            sp(),
        )
        .expect("function");
        assert_eq!(to_sql(&Node::Call(call)), "coalesce(a, NULL)");
    }

    #[test]
    fn in_with_value_set_takes_parens() {
        let set = Node::List(squill_ast::NodeList::new(vec![num(1), num(2), num(3)], sp()));
        let call = Call::binary(&ops::IN, col("x"), set, sp()).expect("binary");
        assert_eq!(to_sql(&Node::Call(call)), "x IN (1, 2, 3)");
    }

    #[test]
    fn not_in_normalizes_and_keeps_set_parens() {
        let set = Node::List(squill_ast::NodeList::new(vec![num(1), num(2)], sp()));
        let within = Node::Call(Call::binary(&ops::IN, col("x"), set, sp()).expect("binary"));
        let not = Node::Call(Call::unary(&ops::NOT, within, sp()).expect("unary"));
        assert_eq!(to_sql(&not), "x NOT IN (1, 2)");
    }

    #[test]
    fn float_keeps_decimal_point() {
        let lit = Node::Literal(Literal::float(3.0, sp()).expect("finite"));
        assert_eq!(to_sql(&lit), "3.0");
        let lit = Node::Literal(Literal::float(2.5, sp()).expect("finite"));
        assert_eq!(to_sql(&lit), "2.5");
    }
}
