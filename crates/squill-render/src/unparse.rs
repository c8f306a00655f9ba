//! The precedence-aware unparser.
//!
//! Every node renders through [`Renderer::node`], which carries the binding
//! power the surrounding text imposes on each side. An operator application
//! takes parentheses iff the power it exposes on a side is strictly weaker
//! than the context on that side; inside parentheses both contexts reset to
//! zero. Left/right exposure already encodes associativity, so the single
//! comparison yields minimal, correct parenthesization with no special
//! tie-break.
//!
//! Self-delimiting forms (function calls, CASE, statements) ignore the rule
//! and render their fixed templates, giving children fresh contexts.
//!
//! A prefix NOT over a comparison with a spelled inverse normalizes away:
//! `NOT (a = b)` renders as `a <> b`.

use squill_ast::{
    Call, CaseExpr, HandlerCondition, Ident, Label, Literal, LiteralValue, LoopHead, LoopStmt,
    Node, NodeList, Operator, Signal, SignalValue, TypeSpecNode, inverse_of, ops, prec,
};
use tracing::trace;

use crate::dialect::{Dialect, plain_update};
use crate::writer::{FrameKind, SqlWriter};

/// Render a tree to canonical SQL text in the given dialect.
#[must_use]
pub fn render(node: &Node, dialect: &dyn Dialect) -> String {
    trace!(dialect = dialect.name(), "rendering tree");
    let mut r = Renderer::new(dialect);
    r.node(node, 0, 0);
    let text = r.finish();
    trace!(len = text.len(), "rendered");
    text
}

/// The rendering engine. Dialects receive `&mut Renderer` in their
/// statement-shape hooks and drive it through [`Renderer::operand`] and
/// [`Renderer::writer`].
pub struct Renderer<'d> {
    dialect: &'d dyn Dialect,
    w: SqlWriter,
}

impl<'d> Renderer<'d> {
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            w: SqlWriter::new(),
        }
    }

    /// Direct access to the underlying writer.
    pub fn writer(&mut self) -> &mut SqlWriter {
        &mut self.w
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.w.finish()
    }

    /// Render `call`'s operand at `index` in a fresh context. An omitted
    /// slot renders as NULL.
    pub fn operand(&mut self, call: &Call, index: usize) {
        match call.operand(index) {
            Some(node) => self.node(node, 0, 0),
            None => {
                let null = self.dialect.null_keyword();
                self.w.token(null);
            }
        }
    }

    /// Render `node` under the given left/right context powers.
    pub fn node(&mut self, node: &Node, lctx: u8, rctx: u8) {
        match node {
            Node::Ident(ident) => self.ident(ident),
            Node::Literal(lit) => self.literal(lit),
            Node::List(list) => self.list(list),
            Node::Call(call) => self.call(call, lctx, rctx),
            Node::Case(case) => self.case(case),
            Node::TypeSpec(ts) => self.type_spec(ts),
            Node::Block(block) => self.block(block),
            Node::Loop(lp) => self.loop_stmt(lp),
            Node::Leave(leave) => {
                self.w.token("LEAVE");
                self.label(&leave.label);
            }
            Node::Iterate(iter) => {
                self.w.token("ITERATE");
                self.label(&iter.label);
            }
            Node::ConditionDecl(decl) => {
                self.w.token("DECLARE");
                self.ident(&decl.name);
                self.w.token("CONDITION");
                if let Some(state) = decl.sqlstate {
                    self.w.token("FOR");
                    self.w.token("SQLSTATE");
                    self.w.string_literal(state.as_str());
                }
            }
            Node::HandlerDecl(handler) => {
                self.w.token("DECLARE");
                self.w.token(handler.action.keyword());
                self.w.token("HANDLER");
                self.w.token("FOR");
                let frame = self.w.start_frame(FrameKind::List);
                for cond in &handler.conditions {
                    self.w.item();
                    self.handler_condition(cond);
                }
                self.w.end_frame(frame);
                self.node(&handler.body, 0, 0);
            }
            Node::Signal(signal) => self.signal(signal),
        }
    }

    fn ident(&mut self, ident: &Ident) {
        let mut first = true;
        for part in &ident.parts {
            if !first {
                self.w.qualifier_dot();
            }
            self.w.ident(part);
            first = false;
        }
    }

    fn label(&mut self, label: &Label) {
        self.w.ident(&label.name);
    }

    fn literal(&mut self, lit: &Literal) {
        match &lit.value {
            LiteralValue::Integer(v) => self.w.token(&v.to_string()),
            LiteralValue::Float(v) => {
                // Keep the decimal point so the text re-reads as numeric.
                if v.fract() == 0.0 {
                    self.w.token(&format!("{v:.1}"));
                } else {
                    self.w.token(&format!("{v}"));
                }
            }
            LiteralValue::String { value, charset } => {
                let intro = charset.and_then(|cs| self.dialect.string_introducer(cs));
                if let Some(intro) = intro {
                    self.w.token(intro);
                    self.w.glue_next();
                }
                self.w.string_literal(value);
            }
            LiteralValue::Bytes(bytes) => self.dialect.bytes_literal(&mut self.w, bytes),
            LiteralValue::Boolean(v) => self.w.token(if *v { "TRUE" } else { "FALSE" }),
            LiteralValue::Interval { value, qualifier } => {
                self.w.token("INTERVAL");
                self.w.string_literal(value);
                self.w.token(qualifier.keyword());
            }
            LiteralValue::Null => self.w.token("NULL"),
        }
    }

    fn list(&mut self, list: &NodeList) {
        let frame = self.w.start_frame(FrameKind::List);
        for slot in &list.items {
            self.w.item();
            match slot {
                Some(node) => self.node(node, 0, 0),
                None => {
                    let null = self.dialect.null_keyword();
                    self.w.token(null);
                }
            }
        }
        self.w.end_frame(frame);
    }

    fn call(&mut self, call: &Call, lctx: u8, rctx: u8) {
        // Negation normalization: prefix NOT over an invertible comparison
        // renders the inverse operator directly.
        if std::ptr::eq(call.op, &ops::NOT) {
            if let Some(Node::Call(inner)) = call.operand(0) {
                if let Some(inv) = inverse_of(inner.op) {
                    self.apply(inv, inner, lctx, rctx);
                    return;
                }
            }
        }
        self.apply(call.op, call, lctx, rctx);
    }

    /// Render `call`'s operands under `op` (which differs from `call.op`
    /// only in the normalization path).
    fn apply(&mut self, op: &'static Operator, call: &Call, lctx: u8, rctx: u8) {
        if !op.uses_precedence() {
            self.template(op, call);
            return;
        }
        let parens = op.left_power < lctx || op.right_power < rctx;
        let frame = if parens {
            Some(self.w.start_frame(FrameKind::Paren))
        } else {
            None
        };
        let (lc, rc) = if parens { (0, 0) } else { (lctx, rctx) };

        match op.fixity {
            squill_ast::Fixity::Prefix => {
                self.w.token(op.name);
                self.slot(call, 0, op.right_power, rc);
            }
            squill_ast::Fixity::Postfix => {
                self.slot(call, 0, lc, op.left_power);
                self.w.token(op.name);
                // COLLATE carries its collation name as a second slot.
                if call.operands.len() > 1 {
                    self.slot(call, 1, 0, 0);
                }
            }
            squill_ast::Fixity::Infix => {
                self.slot(call, 0, lc, op.left_power);
                self.w.token(op.name);
                let in_family =
                    std::ptr::eq(op, &ops::IN) || std::ptr::eq(op, &ops::NOT_IN);
                let has_escape = call.operands.len() > 2 && call.operand(2).is_some();
                if in_family && matches!(call.operand(1), Some(Node::List(_))) {
                    // An explicit value set: IN (a, b, c).
                    let p = self.w.start_frame(FrameKind::Paren);
                    self.slot(call, 1, 0, 0);
                    self.w.end_frame(p);
                } else if has_escape {
                    self.slot(call, 1, op.right_power, op.right_power);
                    self.w.token("ESCAPE");
                    self.slot(call, 2, op.right_power, rc);
                } else {
                    self.slot(call, 1, op.right_power, rc);
                }
            }
            squill_ast::Fixity::Call | squill_ast::Fixity::Special => unreachable!(),
        }

        if let Some(frame) = frame {
            self.w.end_frame(frame);
        }
    }

    fn slot(&mut self, call: &Call, index: usize, lctx: u8, rctx: u8) {
        match call.operand(index) {
            Some(node) => self.node(node, lctx, rctx),
            None => {
                let null = self.dialect.null_keyword();
                self.w.token(null);
            }
        }
    }

    /// Fixed templates for the self-delimiting operators.
    fn template(&mut self, op: &'static Operator, call: &Call) {
        use std::ptr::eq as same;

        if same(op, &ops::FUNCTION) {
            self.operand(call, 0);
            self.arg_parens(call, 1);
        } else if same(op, &ops::CAST) {
            self.w.token("CAST");
            self.w.glue_next();
            let p = self.w.start_frame(FrameKind::Paren);
            self.operand(call, 0);
            self.w.token("AS");
            self.operand(call, 1);
            self.w.end_frame(p);
        } else if same(op, &ops::SUBQUERY) {
            let p = self.w.start_frame(FrameKind::Paren);
            self.operand(call, 0);
            self.w.end_frame(p);
        } else if same(op, &ops::EXISTS) {
            self.w.token("EXISTS");
            let p = self.w.start_frame(FrameKind::Paren);
            self.operand(call, 0);
            self.w.end_frame(p);
        } else if same(op, &ops::BETWEEN) || same(op, &ops::NOT_BETWEEN) {
            self.slot(call, 0, prec::EQUALITY, prec::EQUALITY);
            self.w.token(op.name);
            self.slot(call, 1, prec::EQUALITY, prec::EQUALITY);
            self.w.token("AND");
            self.slot(call, 2, prec::EQUALITY, prec::EQUALITY);
        } else if same(op, &ops::SELECT) {
            self.select(call);
        } else if same(op, &ops::DISTINCT) {
            self.w.token("DISTINCT");
            self.operand(call, 0);
        } else if same(op, &ops::INSERT) {
            self.w.token("INSERT");
            self.w.token("INTO");
            self.operand(call, 0);
            if call.operand(1).is_some() {
                let p = self.w.start_frame(FrameKind::Paren);
                self.operand(call, 1);
                self.w.end_frame(p);
            }
            self.operand(call, 2);
        } else if same(op, &ops::VALUES) {
            self.w.token("VALUES");
            let list = self.w.start_frame(FrameKind::List);
            for i in 0..call.operands.len() {
                self.w.item();
                let p = self.w.start_frame(FrameKind::Paren);
                self.operand(call, i);
                self.w.end_frame(p);
            }
            self.w.end_frame(list);
        } else if same(op, &ops::UPDATE) {
            if call.operand(2).is_some() {
                let dialect = self.dialect;
                dialect.update_with_source(self, call);
            } else {
                plain_update(self, call);
            }
        } else if same(op, &ops::ASSIGN) || same(op, &ops::SET_VAR) {
            if same(op, &ops::SET_VAR) {
                self.w.token("SET");
            }
            self.operand(call, 0);
            self.w.token("=");
            self.operand(call, 1);
        } else if same(op, &ops::DELETE) {
            self.w.token("DELETE");
            self.w.token("FROM");
            self.operand(call, 0);
            if call.operand(1).is_some() {
                self.w.token("WHERE");
                self.operand(call, 1);
            }
        } else if same(op, &ops::MERGE) {
            let dialect = self.dialect;
            dialect.merge_statement(self, call);
        } else if same(op, &ops::CALL_PROC) {
            self.w.token("CALL");
            self.operand(call, 0);
            self.arg_parens(call, 1);
        } else if same(op, &ops::RETURN) {
            self.w.token("RETURN");
            if call.operand(0).is_some() {
                self.operand(call, 0);
            }
        } else if same(op, &ops::IF) {
            self.w.token("IF");
            self.operand(call, 0);
            self.w.token("THEN");
            self.stmt_seq_slot(call, 1);
            if call.operand(2).is_some() {
                self.w.token("ELSE");
                self.stmt_seq_slot(call, 2);
            }
            self.w.token("END");
            self.w.token("IF");
        } else if same(op, &ops::DECLARE_VARIABLE) {
            self.w.token("DECLARE");
            self.operand(call, 0);
            self.operand(call, 1);
            if call.operand(2).is_some() {
                self.w.token("DEFAULT");
                self.operand(call, 2);
            }
        } else if same(op, &ops::DECLARE_CURSOR) {
            self.w.token("DECLARE");
            self.operand(call, 0);
            self.w.token("CURSOR");
            self.w.token("FOR");
            self.operand(call, 1);
        } else if same(op, &ops::OPEN) {
            self.w.token("OPEN");
            self.operand(call, 0);
        } else if same(op, &ops::CLOSE) {
            self.w.token("CLOSE");
            self.operand(call, 0);
        } else if same(op, &ops::FETCH) {
            self.w.token("FETCH");
            self.operand(call, 0);
            self.w.token("INTO");
            self.operand(call, 1);
        } else {
            // User-registered operator: call style gets name(args),
            // anything else renders name followed by its operands.
            self.w.token(op.name);
            if op.fixity == squill_ast::Fixity::Call {
                self.arg_parens(call, 0);
            } else {
                for i in 0..call.operands.len() {
                    self.operand(call, i);
                }
            }
        }
    }

    /// `(arg, arg, ...)` glued to the previous token, from slot `from` on.
    fn arg_parens(&mut self, call: &Call, from: usize) {
        self.w.glue_next();
        let p = self.w.start_frame(FrameKind::Paren);
        let list = self.w.start_frame(FrameKind::List);
        for i in from..call.operands.len() {
            self.w.item();
            self.operand(call, i);
        }
        self.w.end_frame(list);
        self.w.end_frame(p);
    }

    /// Slots: [columns, from, where, group_by, having, order_by, fetch].
    fn select(&mut self, call: &Call) {
        self.w.token("SELECT");
        self.operand(call, 0);
        for (index, clause) in [
            (1usize, &["FROM"][..]),
            (2, &["WHERE"][..]),
            (3, &["GROUP", "BY"][..]),
            (4, &["HAVING"][..]),
            (5, &["ORDER", "BY"][..]),
        ] {
            if call.operand(index).is_some() {
                for kw in clause {
                    self.w.token(kw);
                }
                self.operand(call, index);
            }
        }
        if call.operand(6).is_some() {
            self.w.token("FETCH");
            self.w.token("FIRST");
            self.operand(call, 6);
            self.w.token("ROWS");
            self.w.token("ONLY");
        }
    }

    /// A sequence of statements, each terminated with `;`.
    fn stmt_seq(&mut self, stmts: &[Node]) {
        let frame = self.w.start_frame(FrameKind::Body);
        for stmt in stmts {
            self.w.item();
            self.node(stmt, 0, 0);
            self.w.semicolon();
        }
        self.w.end_frame(frame);
    }

    /// A statement-sequence operand: a List slot whose items run as a body.
    fn stmt_seq_slot(&mut self, call: &Call, index: usize) {
        match call.operand(index) {
            Some(Node::List(list)) => {
                let frame = self.w.start_frame(FrameKind::Body);
                for slot in list.present() {
                    self.w.item();
                    self.node(slot, 0, 0);
                    self.w.semicolon();
                }
                self.w.end_frame(frame);
            }
            Some(node) => {
                self.node(node, 0, 0);
                self.w.semicolon();
            }
            None => {}
        }
    }

    fn case(&mut self, case: &CaseExpr) {
        self.w.token("CASE");
        if let Some(operand) = &case.operand {
            self.node(operand, 0, 0);
        }
        for (when, then) in &case.branches {
            self.w.token("WHEN");
            self.node(when, 0, 0);
            self.w.token("THEN");
            self.node(then, 0, 0);
        }
        if let Some(else_value) = &case.else_value {
            self.w.token("ELSE");
            self.node(else_value, 0, 0);
        }
        self.w.token("END");
    }

    fn type_spec(&mut self, ts: &TypeSpecNode) {
        self.w.token(&ts.spec.to_string());
    }

    fn block(&mut self, block: &squill_ast::Block) {
        if let Some(label) = &block.label {
            self.label(label);
            self.w.glued(":");
        }
        self.w.token("BEGIN");
        self.stmt_seq(&block.body);
        self.w.token("END");
        if let Some(label) = &block.label {
            self.label(label);
        }
    }

    fn loop_stmt(&mut self, lp: &LoopStmt) {
        if let Some(label) = &lp.label {
            self.label(label);
            self.w.glued(":");
        }
        let trailer: &[&str] = match &lp.head {
            LoopHead::Plain => {
                self.w.token("LOOP");
                self.stmt_seq(&lp.body);
                &["END", "LOOP"]
            }
            LoopHead::While(cond) => {
                self.w.token("WHILE");
                self.node(cond, 0, 0);
                self.w.token("DO");
                self.stmt_seq(&lp.body);
                &["END", "WHILE"]
            }
            LoopHead::RepeatUntil(cond) => {
                self.w.token("REPEAT");
                self.stmt_seq(&lp.body);
                self.w.token("UNTIL");
                self.node(cond, 0, 0);
                &["END", "REPEAT"]
            }
            LoopHead::For { var, source } => {
                self.w.token("FOR");
                self.ident(var);
                self.w.token("AS");
                self.node(source, 0, 0);
                self.w.token("DO");
                self.stmt_seq(&lp.body);
                &["END", "FOR"]
            }
        };
        for kw in trailer {
            self.w.token(kw);
        }
        if let Some(label) = &lp.label {
            self.label(label);
        }
    }

    fn handler_condition(&mut self, cond: &HandlerCondition) {
        match cond {
            HandlerCondition::Sqlstate(state) => {
                self.w.token("SQLSTATE");
                self.w.string_literal(state.as_str());
            }
            HandlerCondition::Named(name) => self.ident(name),
            HandlerCondition::SqlException => self.w.token("SQLEXCEPTION"),
            HandlerCondition::SqlWarning => self.w.token("SQLWARNING"),
            HandlerCondition::NotFound => {
                self.w.token("NOT");
                self.w.token("FOUND");
            }
        }
    }

    fn signal(&mut self, signal: &Signal) {
        self.w
            .token(if signal.resignal { "RESIGNAL" } else { "SIGNAL" });
        match &signal.value {
            Some(SignalValue::Sqlstate(state)) => {
                self.w.token("SQLSTATE");
                self.w.string_literal(state.as_str());
            }
            Some(SignalValue::Condition(name)) => self.ident(name),
            None => {}
        }
        if let Some(message) = &signal.message {
            self.w.token("SET");
            self.w.token("MESSAGE_TEXT");
            self.w.token("=");
            self.w.string_literal(message);
        }
    }
}
