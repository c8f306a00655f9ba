//! Deep structural comparison with diff accumulation.
//!
//! [`deep_equals`] walks two trees in lockstep and reports every point of
//! divergence to a [`DiffSink`] instead of stopping at the first. Spans are
//! ignored: two trees that differ only in source positions are equal. Label
//! comparison is case-insensitive, matching [`Label`](crate::Label)'s own
//! equality.

use crate::{Call, CaseExpr, HandlerDecl, LoopHead, Node};

/// One reported divergence between two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Dotted path from the root to the divergent position, e.g.
    /// `call[SELECT].operand[1].list[0]`.
    pub path: String,
    /// What differs at that position.
    pub detail: String,
}

/// Receives divergences during a deep comparison. Implementations must not
/// fail; comparison always runs to completion.
pub trait DiffSink {
    fn record(&mut self, diff: Diff);
}

/// A sink that collects every diff in order.
#[derive(Debug, Default)]
pub struct DiffLog {
    pub diffs: Vec<Diff>,
}

impl DiffLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }
}

impl DiffSink for DiffLog {
    fn record(&mut self, diff: Diff) {
        self.diffs.push(diff);
    }
}

/// A sink that discards diffs, for callers that only want the boolean.
#[derive(Debug, Default)]
pub struct IgnoreDiffs;

impl DiffSink for IgnoreDiffs {
    fn record(&mut self, _diff: Diff) {}
}

/// Compare two trees structurally, ignoring spans. Every divergence is
/// reported to `sink`; the return value is `true` iff none were found.
pub fn deep_equals(a: &Node, b: &Node, sink: &mut dyn DiffSink) -> bool {
    let mut cmp = Comparator { sink, equal: true };
    cmp.nodes("root", a, b);
    cmp.equal
}

struct Comparator<'s> {
    sink: &'s mut dyn DiffSink,
    equal: bool,
}

impl Comparator<'_> {
    fn diff(&mut self, path: &str, detail: String) {
        self.equal = false;
        self.sink.record(Diff {
            path: path.to_owned(),
            detail,
        });
    }

    fn nodes(&mut self, path: &str, a: &Node, b: &Node) {
        match (a, b) {
            (Node::Ident(x), Node::Ident(y)) => {
                if x.parts != y.parts || x.quoted != y.quoted {
                    self.diff(path, format!("ident {:?} vs {:?}", x.parts, y.parts));
                }
            }
            (Node::Literal(x), Node::Literal(y)) => {
                if x.value != y.value {
                    self.diff(path, format!("literal {:?} vs {:?}", x.value, y.value));
                }
            }
            (Node::List(x), Node::List(y)) => {
                self.slot_lists(path, "list", &x.items, &y.items);
            }
            (Node::Call(x), Node::Call(y)) => self.calls(path, x, y),
            (Node::Case(x), Node::Case(y)) => self.cases(path, x, y),
            (Node::TypeSpec(x), Node::TypeSpec(y)) => {
                if x.spec != y.spec {
                    self.diff(path, format!("type {} vs {}", x.spec, y.spec));
                }
            }
            (Node::Block(x), Node::Block(y)) => {
                if x.label != y.label {
                    self.diff(path, format!("block label {:?} vs {:?}", x.label, y.label));
                }
                self.bodies(path, &x.body, &y.body);
            }
            (Node::Loop(x), Node::Loop(y)) => {
                if x.label != y.label {
                    self.diff(path, format!("loop label {:?} vs {:?}", x.label, y.label));
                }
                self.loop_heads(path, &x.head, &y.head);
                self.bodies(path, &x.body, &y.body);
            }
            (Node::Leave(x), Node::Leave(y)) => {
                if x.label != y.label {
                    self.diff(path, format!("LEAVE {} vs {}", x.label, y.label));
                }
            }
            (Node::Iterate(x), Node::Iterate(y)) => {
                if x.label != y.label {
                    self.diff(path, format!("ITERATE {} vs {}", x.label, y.label));
                }
            }
            (Node::ConditionDecl(x), Node::ConditionDecl(y)) => {
                if x.name.parts != y.name.parts || x.sqlstate != y.sqlstate {
                    self.diff(path, "condition declaration differs".to_owned());
                }
            }
            (Node::HandlerDecl(x), Node::HandlerDecl(y)) => self.handlers(path, x, y),
            (Node::Signal(x), Node::Signal(y)) => {
                if x.resignal != y.resignal || x.value != y.value || x.message != y.message {
                    self.diff(path, "signal differs".to_owned());
                }
            }
            _ => {
                self.diff(path, format!("{} vs {}", variant_name(a), variant_name(b)));
            }
        }
    }

    fn calls(&mut self, path: &str, a: &Call, b: &Call) {
        if !std::ptr::eq(a.op, b.op) {
            self.diff(path, format!("operator {} vs {}", a.op.name, b.op.name));
            return;
        }
        let label = format!("{path}.call[{}]", a.op.name);
        self.slot_lists(&label, "operand", &a.operands, &b.operands);
    }

    fn slot_lists(&mut self, path: &str, what: &str, a: &[Option<Node>], b: &[Option<Node>]) {
        if a.len() != b.len() {
            self.diff(path, format!("{what} count {} vs {}", a.len(), b.len()));
        }
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            let slot = format!("{path}.{what}[{i}]");
            match (x, y) {
                (None, None) => {}
                (Some(x), Some(y)) => self.nodes(&slot, x, y),
                (Some(_), None) => self.diff(&slot, "present vs omitted".to_owned()),
                (None, Some(_)) => self.diff(&slot, "omitted vs present".to_owned()),
            }
        }
    }

    fn bodies(&mut self, path: &str, a: &[Node], b: &[Node]) {
        if a.len() != b.len() {
            self.diff(path, format!("body length {} vs {}", a.len(), b.len()));
        }
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            let slot = format!("{path}.body[{i}]");
            self.nodes(&slot, x, y);
        }
    }

    fn loop_heads(&mut self, path: &str, a: &LoopHead, b: &LoopHead) {
        match (a, b) {
            (LoopHead::Plain, LoopHead::Plain) => {}
            (LoopHead::While(x), LoopHead::While(y))
            | (LoopHead::RepeatUntil(x), LoopHead::RepeatUntil(y)) => {
                self.nodes(&format!("{path}.head"), x, y);
            }
            (
                LoopHead::For { var: vx, source: sx },
                LoopHead::For { var: vy, source: sy },
            ) => {
                if vx.parts != vy.parts {
                    self.diff(
                        &format!("{path}.head"),
                        format!("for variable {:?} vs {:?}", vx.parts, vy.parts),
                    );
                }
                self.nodes(&format!("{path}.head.source"), sx, sy);
            }
            _ => self.diff(&format!("{path}.head"), "loop form differs".to_owned()),
        }
    }

    fn cases(&mut self, path: &str, a: &CaseExpr, b: &CaseExpr) {
        match (&a.operand, &b.operand) {
            (None, None) => {}
            (Some(x), Some(y)) => self.nodes(&format!("{path}.case.operand"), x, y),
            _ => self.diff(path, "simple vs searched CASE".to_owned()),
        }
        if a.branches.len() != b.branches.len() {
            self.diff(
                path,
                format!("branch count {} vs {}", a.branches.len(), b.branches.len()),
            );
        }
        for (i, ((wx, tx), (wy, ty))) in a.branches.iter().zip(b.branches.iter()).enumerate() {
            self.nodes(&format!("{path}.when[{i}]"), wx, wy);
            self.nodes(&format!("{path}.then[{i}]"), tx, ty);
        }
        match (&a.else_value, &b.else_value) {
            (None, None) => {}
            (Some(x), Some(y)) => self.nodes(&format!("{path}.else"), x, y),
            _ => self.diff(path, "ELSE present on one side only".to_owned()),
        }
    }

    fn handlers(&mut self, path: &str, a: &HandlerDecl, b: &HandlerDecl) {
        if a.action != b.action || a.conditions != b.conditions {
            self.diff(path, "handler head differs".to_owned());
        }
        self.nodes(&format!("{path}.handler.body"), &a.body, &b.body);
    }
}

const fn variant_name(node: &Node) -> &'static str {
    match node {
        Node::Ident(_) => "identifier",
        Node::Literal(_) => "literal",
        Node::List(_) => "list",
        Node::Call(_) => "call",
        Node::Case(_) => "case",
        Node::TypeSpec(_) => "type",
        Node::Block(_) => "block",
        Node::Loop(_) => "loop",
        Node::Leave(_) => "leave",
        Node::Iterate(_) => "iterate",
        Node::ConditionDecl(_) => "condition declaration",
        Node::HandlerDecl(_) => "handler declaration",
        Node::Signal(_) => "signal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ident, Literal, NodeList, ops};
    use squill_types::Span;

    fn lit(n: i64, span: Span) -> Node {
        Node::Literal(Literal::integer(n, span))
    }

    #[test]
    fn spans_do_not_participate() {
        let a = lit(7, Span::at(1, 1, 2));
        let b = lit(7, Span::at(40, 3, 4));
        let mut log = DiffLog::new();
        assert!(deep_equals(&a, &b, &mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn all_diffs_are_reported() {
        let sp = Span::ZERO;
        let a = Node::List(NodeList::new(vec![lit(1, sp), lit(2, sp), lit(3, sp)], sp));
        let b = Node::List(NodeList::new(vec![lit(9, sp), lit(2, sp), lit(8, sp)], sp));
        let mut log = DiffLog::new();
        assert!(!deep_equals(&a, &b, &mut log));
        assert_eq!(log.diffs.len(), 2);
        assert_eq!(log.diffs[0].path, "root.list[0]");
        assert_eq!(log.diffs[1].path, "root.list[2]");
    }

    #[test]
    fn gap_vs_value_is_a_diff() {
        let sp = Span::ZERO;
        let a = Node::List(NodeList::with_gaps(vec![Some(lit(1, sp)), None], sp));
        let b = Node::List(NodeList::with_gaps(vec![Some(lit(1, sp)), Some(lit(2, sp))], sp));
        let mut log = DiffLog::new();
        assert!(!deep_equals(&a, &b, &mut log));
        assert_eq!(log.diffs[0].detail, "omitted vs present");
    }

    #[test]
    fn operator_identity_matters() {
        let sp = Span::ZERO;
        let a = Node::Call(
            crate::Call::binary(&ops::ADD, lit(1, sp), lit(2, sp), sp).expect("binary"),
        );
        let b = Node::Call(
            crate::Call::binary(&ops::SUBTRACT, lit(1, sp), lit(2, sp), sp).expect("binary"),
        );
        let mut log = DiffLog::new();
        assert!(!deep_equals(&a, &b, &mut log));
        assert!(log.diffs[0].detail.contains("+ vs -"));
    }

    #[test]
    fn variant_mismatch_names_both_sides() {
        let sp = Span::ZERO;
        let a = lit(1, sp);
        let b = Node::Ident(Ident::simple("x", sp));
        let mut log = DiffLog::new();
        assert!(!deep_equals(&a, &b, &mut log));
        assert_eq!(log.diffs[0].detail, "literal vs identifier");
    }
}
