//! AST node and operator model for squill.
//!
//! The tree is a closed tagged union ([`Node`]) over a small vocabulary:
//! identifiers, literals, slotted lists, operator applications ([`Call`]),
//! and the scripting constructs that need label scoping (blocks, loops,
//! LEAVE/ITERATE, condition and handler declarations, SIGNAL). Optional
//! clauses are `None` slots, never sentinel nodes.
//!
//! Nodes are plain data. Rendering lives in `squill-render`; label and
//! condition resolution lives in `squill-resolve`. Construction enforces the
//! invariants that are checkable without context: operand arity, begin/end
//! label agreement, literal well-formedness, and the bounds table for
//! parameterized types (via `squill-types`).

pub mod equality;
pub mod operator;
pub mod visit;

pub use operator::{Arity, Fixity, MAX_POWER, OpKind, Operator, OperatorRegistry, inverse_of, ops, prec};

use serde::Serialize;
use squill_error::SquillError;
use squill_types::{CharSet, Span, SqlState, TypeSpec};

fn ser_op<S: serde::Serializer>(op: &&'static Operator, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(op.name)
}

// ─── Identifiers and labels ─────────────────────────────────────────────

/// A possibly-qualified identifier (`schema.table.column`).
///
/// `quoted` records that the source spelled the identifier in double quotes;
/// the renderer re-quotes regardless whenever a part needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub parts: Vec<String>,
    pub quoted: bool,
    pub span: Span,
}

impl Ident {
    /// A single-part identifier.
    pub fn simple(name: impl Into<String>, span: Span) -> Self {
        Self {
            parts: vec![name.into()],
            quoted: false,
            span,
        }
    }

    /// A qualified identifier from its parts, outermost first.
    #[must_use]
    pub fn qualified(parts: Vec<String>, span: Span) -> Self {
        Self {
            parts,
            quoted: false,
            span,
        }
    }

    /// The unqualified (last) part.
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }
}

/// A statement label.
///
/// Labels compare and hash case-insensitively (ASCII), per the scripting
/// grammar; the span never participates in equality.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Label {
    pub name: String,
    pub span: Span,
}

impl Label {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl std::hash::Hash for Label {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

// ─── Literals ───────────────────────────────────────────────────────────

/// The unit field of an interval literal (`INTERVAL '1' DAY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntervalQualifier {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    YearToMonth,
    DayToHour,
    DayToMinute,
    DayToSecond,
    HourToMinute,
    HourToSecond,
    MinuteToSecond,
}

impl IntervalQualifier {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Year => "YEAR",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
            Self::YearToMonth => "YEAR TO MONTH",
            Self::DayToHour => "DAY TO HOUR",
            Self::DayToMinute => "DAY TO MINUTE",
            Self::DayToSecond => "DAY TO SECOND",
            Self::HourToMinute => "HOUR TO MINUTE",
            Self::HourToSecond => "HOUR TO SECOND",
            Self::MinuteToSecond => "MINUTE TO SECOND",
        }
    }
}

/// The value carried by a [`Literal`] node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    /// Character string, optionally tagged with a source character set
    /// (which selects the dialect's introducer spelling).
    String {
        value: String,
        charset: Option<CharSet>,
    },
    /// Raw bytes; spelled per dialect (`X'..'` or `0x..`).
    Bytes(Vec<u8>),
    Boolean(bool),
    Interval {
        value: String,
        qualifier: IntervalQualifier,
    },
    Null,
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

impl Literal {
    #[must_use]
    pub const fn integer(value: i64, span: Span) -> Self {
        Self {
            value: LiteralValue::Integer(value),
            span,
        }
    }

    /// A floating-point literal. Non-finite values have no SQL spelling and
    /// are rejected.
    pub fn float(value: f64, span: Span) -> Result<Self, SquillError> {
        if !value.is_finite() {
            return Err(SquillError::MalformedLiteral {
                what: "numeric",
                value: value.to_string(),
                span,
            });
        }
        Ok(Self {
            value: LiteralValue::Float(value),
            span,
        })
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: LiteralValue::String {
                value: value.into(),
                charset: None,
            },
            span,
        }
    }

    pub fn string_with_charset(value: impl Into<String>, charset: CharSet, span: Span) -> Self {
        Self {
            value: LiteralValue::String {
                value: value.into(),
                charset: Some(charset),
            },
            span,
        }
    }

    #[must_use]
    pub const fn bytes(value: Vec<u8>, span: Span) -> Self {
        Self {
            value: LiteralValue::Bytes(value),
            span,
        }
    }

    #[must_use]
    pub const fn boolean(value: bool, span: Span) -> Self {
        Self {
            value: LiteralValue::Boolean(value),
            span,
        }
    }

    /// An interval literal. The value field must be a quoted-form interval
    /// body (digits, sign, colons, dots, spaces).
    pub fn interval(
        value: impl Into<String>,
        qualifier: IntervalQualifier,
        span: Span,
    ) -> Result<Self, SquillError> {
        let value = value.into();
        let ok = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | ':' | '.' | ' '));
        if !ok {
            return Err(SquillError::MalformedLiteral {
                what: "interval",
                value,
                span,
            });
        }
        Ok(Self {
            value: LiteralValue::Interval { value, qualifier },
            span,
        })
    }

    #[must_use]
    pub const fn null(span: Span) -> Self {
        Self {
            value: LiteralValue::Null,
            span,
        }
    }
}

// ─── Lists and calls ────────────────────────────────────────────────────

/// An ordered sequence of optional slots.
///
/// A `None` slot means the position exists but its value was omitted; list
/// consumers (statement templates, VALUES rows) give omitted slots their own
/// meaning. Gaps are preserved through rendering and equality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeList {
    pub items: Vec<Option<Node>>,
    pub span: Span,
}

impl NodeList {
    /// A list where every slot is filled.
    #[must_use]
    pub fn new(items: Vec<Node>, span: Span) -> Self {
        Self {
            items: items.into_iter().map(Some).collect(),
            span,
        }
    }

    /// A list with explicit gaps.
    #[must_use]
    pub const fn with_gaps(items: Vec<Option<Node>>, span: Span) -> Self {
        Self { items, span }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterator over the filled slots.
    pub fn present(&self) -> impl Iterator<Item = &Node> {
        self.items.iter().filter_map(Option::as_ref)
    }
}

/// An operator applied to operand slots. This is the uniform shape for
/// expressions and plain SQL statements alike; the operator's slot
/// conventions (documented on each item in [`ops`]) give positions their
/// meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    #[serde(serialize_with = "ser_op")]
    pub op: &'static Operator,
    pub operands: Vec<Option<Node>>,
    pub span: Span,
}

impl Call {
    /// Apply `op` to `operands`, checking the declared arity. Slots may be
    /// `None` (omitted optional clause); the count still must satisfy the
    /// operator.
    pub fn new(
        op: &'static Operator,
        operands: Vec<Option<Node>>,
        span: Span,
    ) -> Result<Self, SquillError> {
        if !op.arity.accepts(operands.len()) {
            return Err(SquillError::ArityMismatch {
                op: op.name,
                expected: op.arity.to_string(),
                actual: operands.len(),
                span,
            });
        }
        Ok(Self { op, operands, span })
    }

    /// A binary application with both slots filled.
    pub fn binary(op: &'static Operator, lhs: Node, rhs: Node, span: Span) -> Result<Self, SquillError> {
        Self::new(op, vec![Some(lhs), Some(rhs)], span)
    }

    /// A unary application.
    pub fn unary(op: &'static Operator, operand: Node, span: Span) -> Result<Self, SquillError> {
        Self::new(op, vec![Some(operand)], span)
    }

    /// A function call: slot 0 is the function name, the rest are arguments.
    pub fn function(name: Ident, args: Vec<Node>, span: Span) -> Result<Self, SquillError> {
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(Some(Node::Ident(name)));
        operands.extend(args.into_iter().map(Some));
        Self::new(&ops::FUNCTION, operands, span)
    }

    /// The operand at `index`, if the slot exists and is filled.
    #[must_use]
    pub fn operand(&self, index: usize) -> Option<&Node> {
        self.operands.get(index).and_then(Option::as_ref)
    }
}

/// A searched or simple CASE expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseExpr {
    /// Present for the simple form (`CASE expr WHEN ...`).
    pub operand: Option<Node>,
    /// `(when, then)` pairs, at least one.
    pub branches: Vec<(Node, Node)>,
    pub else_value: Option<Node>,
    pub span: Span,
}

impl CaseExpr {
    pub fn new(
        operand: Option<Node>,
        branches: Vec<(Node, Node)>,
        else_value: Option<Node>,
        span: Span,
    ) -> Result<Self, SquillError> {
        if branches.is_empty() {
            return Err(SquillError::ArityMismatch {
                op: "CASE",
                expected: "at least 1".to_owned(),
                actual: 0,
                span,
            });
        }
        Ok(Self {
            operand,
            branches,
            else_value,
            span,
        })
    }
}

/// A type specification in node position (CAST targets, DECLARE).
///
/// The [`TypeSpec`] payload is bounds-checked at its own construction; this
/// wrapper only adds the source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSpecNode {
    pub spec: TypeSpec,
    pub span: Span,
}

impl TypeSpecNode {
    #[must_use]
    pub const fn new(spec: TypeSpec, span: Span) -> Self {
        Self { spec, span }
    }
}

// ─── Scripting constructs ───────────────────────────────────────────────

/// Checks the begin/end label pair shared by blocks and loops.
fn check_labels(
    begin: Option<&Label>,
    end: Option<&Label>,
    span: Span,
) -> Result<(), SquillError> {
    match (begin, end) {
        (_, None) => Ok(()),
        (None, Some(end)) => Err(SquillError::EndLabelWithoutBegin {
            end: end.name.clone(),
            span,
        }),
        (Some(begin), Some(end)) => {
            if begin == end {
                Ok(())
            } else {
                Err(SquillError::label_mismatch(
                    begin.name.clone(),
                    end.name.clone(),
                    span,
                ))
            }
        }
    }
}

/// A compound statement: `[label:] BEGIN ... END [label]`.
///
/// Condition and handler declarations live in the body alongside ordinary
/// statements; the resolver gives them block scope regardless of position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub label: Option<Label>,
    pub body: Vec<Node>,
    pub span: Span,
}

impl Block {
    #[must_use]
    pub const fn new(body: Vec<Node>, span: Span) -> Self {
        Self {
            label: None,
            body,
            span,
        }
    }

    /// A labeled block. The end label, when supplied, must equal the begin
    /// label (case-insensitively); an end label alone is rejected.
    pub fn labeled(
        begin: Option<Label>,
        end: Option<Label>,
        body: Vec<Node>,
        span: Span,
    ) -> Result<Self, SquillError> {
        check_labels(begin.as_ref(), end.as_ref(), span)?;
        Ok(Self {
            label: begin,
            body,
            span,
        })
    }
}

/// The header that distinguishes the loop forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LoopHead {
    /// `LOOP ... END LOOP`.
    Plain,
    /// `WHILE cond DO ... END WHILE`.
    While(Node),
    /// `REPEAT ... UNTIL cond END REPEAT`.
    RepeatUntil(Node),
    /// `FOR var AS source DO ... END FOR`.
    For { var: Ident, source: Node },
}

/// A loop statement in any of its forms, optionally labeled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStmt {
    pub label: Option<Label>,
    pub head: LoopHead,
    pub body: Vec<Node>,
    pub span: Span,
}

impl LoopStmt {
    #[must_use]
    pub const fn new(head: LoopHead, body: Vec<Node>, span: Span) -> Self {
        Self {
            label: None,
            head,
            body,
            span,
        }
    }

    /// A labeled loop; same begin/end label rules as [`Block::labeled`].
    pub fn labeled(
        begin: Option<Label>,
        end: Option<Label>,
        head: LoopHead,
        body: Vec<Node>,
        span: Span,
    ) -> Result<Self, SquillError> {
        check_labels(begin.as_ref(), end.as_ref(), span)?;
        Ok(Self {
            label: begin,
            head,
            body,
            span,
        })
    }
}

/// `LEAVE label` — exits the named enclosing block or loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leave {
    pub label: Label,
    pub span: Span,
}

/// `ITERATE label` — restarts the named enclosing loop. Resolution rejects a
/// target that is a plain block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Iterate {
    pub label: Label,
    pub span: Span,
}

/// `DECLARE name CONDITION [FOR SQLSTATE '..']`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionDecl {
    pub name: Ident,
    pub sqlstate: Option<SqlState>,
    pub span: Span,
}

/// What a handler does after its body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandlerAction {
    Continue,
    Exit,
    Undo,
}

impl HandlerAction {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Continue => "CONTINUE",
            Self::Exit => "EXIT",
            Self::Undo => "UNDO",
        }
    }
}

/// One entry of a handler's FOR list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HandlerCondition {
    Sqlstate(SqlState),
    /// A named condition; bound to its declaration during resolution.
    Named(Ident),
    SqlException,
    SqlWarning,
    NotFound,
}

/// `DECLARE action HANDLER FOR conditions body`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerDecl {
    pub action: HandlerAction,
    pub conditions: Vec<HandlerCondition>,
    pub body: Node,
    pub span: Span,
}

impl HandlerDecl {
    /// The condition list must be non-empty.
    pub fn new(
        action: HandlerAction,
        conditions: Vec<HandlerCondition>,
        body: Node,
        span: Span,
    ) -> Result<Self, SquillError> {
        if conditions.is_empty() {
            return Err(SquillError::ArityMismatch {
                op: "DECLARE HANDLER",
                expected: "at least 1".to_owned(),
                actual: 0,
                span,
            });
        }
        Ok(Self {
            action,
            conditions,
            body,
            span,
        })
    }
}

/// What a SIGNAL raises.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SignalValue {
    Sqlstate(SqlState),
    /// A named condition, resolved against enclosing declarations.
    Condition(Ident),
}

/// `SIGNAL value [SET MESSAGE_TEXT = '..']` or `RESIGNAL [value] [...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub resignal: bool,
    pub value: Option<SignalValue>,
    pub message: Option<String>,
    pub span: Span,
}

impl Signal {
    /// `SIGNAL` proper: a value is mandatory.
    #[must_use]
    pub const fn raise(value: SignalValue, message: Option<String>, span: Span) -> Self {
        Self {
            resignal: false,
            value: Some(value),
            message,
            span,
        }
    }

    /// `RESIGNAL`: the value is optional (bare RESIGNAL re-raises the
    /// condition being handled).
    #[must_use]
    pub const fn reraise(value: Option<SignalValue>, message: Option<String>, span: Span) -> Self {
        Self {
            resignal: true,
            value,
            message,
            span,
        }
    }
}

// ─── The node union ─────────────────────────────────────────────────────

/// Any node in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Ident(Ident),
    Literal(Literal),
    List(NodeList),
    Call(Call),
    Case(Box<CaseExpr>),
    TypeSpec(TypeSpecNode),
    Block(Block),
    Loop(Box<LoopStmt>),
    Leave(Leave),
    Iterate(Iterate),
    ConditionDecl(ConditionDecl),
    HandlerDecl(Box<HandlerDecl>),
    Signal(Signal),
}

impl Node {
    /// The source span of this node.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(n) => n.span,
            Self::Literal(n) => n.span,
            Self::List(n) => n.span,
            Self::Call(n) => n.span,
            Self::Case(n) => n.span,
            Self::TypeSpec(n) => n.span,
            Self::Block(n) => n.span,
            Self::Loop(n) => n.span,
            Self::Leave(n) => n.span,
            Self::Iterate(n) => n.span,
            Self::ConditionDecl(n) => n.span,
            Self::HandlerDecl(n) => n.span,
            Self::Signal(n) => n.span,
        }
    }

    /// Flat ordered view of this node's child slots, preserving gaps.
    ///
    /// For calls and lists this is the operand/item vector as declared,
    /// `None` where a slot was omitted; for every other variant it is the
    /// children with no gaps.
    #[must_use]
    pub fn operands(&self) -> Vec<Option<&Node>> {
        match self {
            Self::Call(call) => call.operands.iter().map(Option::as_ref).collect(),
            Self::List(list) => list.items.iter().map(Option::as_ref).collect(),
            _ => self.children().into_iter().map(Some).collect(),
        }
    }

    /// Structural comparison ignoring spans; divergences go to `sink`.
    pub fn deep_equals(&self, other: &Self, sink: &mut dyn equality::DiffSink) -> bool {
        equality::deep_equals(self, other, sink)
    }

    /// Depth-first traversal. Returns `false` if the visitor stopped early.
    pub fn walk<V: visit::Visitor>(&self, visitor: &mut V) -> bool {
        visit::walk(self, visitor)
    }

    /// Immediate children, in source order, skipping omitted slots.
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::Ident(_)
            | Self::Literal(_)
            | Self::TypeSpec(_)
            | Self::Leave(_)
            | Self::Iterate(_)
            | Self::ConditionDecl(_)
            | Self::Signal(_) => Vec::new(),
            Self::List(list) => list.present().collect(),
            Self::Call(call) => call.operands.iter().filter_map(Option::as_ref).collect(),
            Self::Case(case) => {
                let mut out = Vec::new();
                if let Some(op) = &case.operand {
                    out.push(op);
                }
                for (when, then) in &case.branches {
                    out.push(when);
                    out.push(then);
                }
                if let Some(els) = &case.else_value {
                    out.push(els);
                }
                out
            }
            Self::Block(block) => block.body.iter().collect(),
            Self::Loop(lp) => {
                let mut out = Vec::new();
                match &lp.head {
                    LoopHead::Plain => {}
                    LoopHead::While(cond) | LoopHead::RepeatUntil(cond) => out.push(cond),
                    LoopHead::For { source, .. } => out.push(source),
                }
                out.extend(lp.body.iter());
                out
            }
            Self::HandlerDecl(h) => vec![&h.body],
        }
    }
}

impl From<Ident> for Node {
    fn from(n: Ident) -> Self {
        Self::Ident(n)
    }
}
impl From<Literal> for Node {
    fn from(n: Literal) -> Self {
        Self::Literal(n)
    }
}
impl From<NodeList> for Node {
    fn from(n: NodeList) -> Self {
        Self::List(n)
    }
}
impl From<Call> for Node {
    fn from(n: Call) -> Self {
        Self::Call(n)
    }
}
impl From<CaseExpr> for Node {
    fn from(n: CaseExpr) -> Self {
        Self::Case(Box::new(n))
    }
}
impl From<TypeSpecNode> for Node {
    fn from(n: TypeSpecNode) -> Self {
        Self::TypeSpec(n)
    }
}
impl From<Block> for Node {
    fn from(n: Block) -> Self {
        Self::Block(n)
    }
}
impl From<LoopStmt> for Node {
    fn from(n: LoopStmt) -> Self {
        Self::Loop(Box::new(n))
    }
}
impl From<HandlerDecl> for Node {
    fn from(n: HandlerDecl) -> Self {
        Self::HandlerDecl(Box::new(n))
    }
}
impl From<Signal> for Node {
    fn from(n: Signal) -> Self {
        Self::Signal(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::ZERO
    }

    #[test]
    fn labels_compare_case_insensitively() {
        let a = Label::new("Outer", Span::at(1, 1, 6));
        let b = Label::new("OUTER", Span::at(9, 1, 6));
        assert_eq!(a, b);
        let c = Label::new("inner", sp());
        assert_ne!(a, c);
    }

    #[test]
    fn call_checks_arity() {
        let lhs = Node::Literal(Literal::integer(1, sp()));
        let rhs = Node::Literal(Literal::integer(2, sp()));
        assert!(Call::binary(&ops::ADD, lhs.clone(), rhs, sp()).is_ok());

        let err = Call::new(&ops::ADD, vec![Some(lhs)], sp()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operator + expects exactly 2 operand(s), got 1 at 0:0..0:0"
        );
    }

    #[test]
    fn call_slots_may_be_gaps() {
        // SELECT with only the column list present.
        let cols = Node::List(NodeList::new(
            vec![Node::Ident(Ident::simple("x", sp()))],
            sp(),
        ));
        let select = Call::new(
            &ops::SELECT,
            vec![Some(cols), None, None, None, None, None, None],
            sp(),
        )
        .expect("seven slots");
        assert!(select.operand(0).is_some());
        assert!(select.operand(1).is_none());
        assert!(select.operand(99).is_none());
    }

    #[test]
    fn mismatched_end_label_rejected() {
        let err = Block::labeled(
            Some(Label::new("a", sp())),
            Some(Label::new("b", sp())),
            Vec::new(),
            sp(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("end label 'b'"));

        // Case difference alone is fine.
        let block = Block::labeled(
            Some(Label::new("outer", sp())),
            Some(Label::new("OUTER", sp())),
            Vec::new(),
            sp(),
        )
        .expect("case-insensitive match");
        assert_eq!(block.label.as_ref().map(|l| l.name.as_str()), Some("outer"));
    }

    #[test]
    fn end_label_without_begin_rejected() {
        let err =
            LoopStmt::labeled(None, Some(Label::new("l", sp())), LoopHead::Plain, Vec::new(), sp())
                .unwrap_err();
        assert!(err.to_string().contains("without a begin label"));
    }

    #[test]
    fn handler_requires_conditions() {
        let body = Node::Block(Block::new(Vec::new(), sp()));
        let err = HandlerDecl::new(HandlerAction::Exit, Vec::new(), body, sp()).unwrap_err();
        assert!(err.to_string().contains("DECLARE HANDLER"));
    }

    #[test]
    fn interval_body_validated() {
        assert!(Literal::interval("1 12:30", IntervalQualifier::DayToMinute, sp()).is_ok());
        let err = Literal::interval("one day", IntervalQualifier::Day, sp()).unwrap_err();
        assert!(err.to_string().contains("interval literal 'one day'"));
    }

    #[test]
    fn non_finite_float_rejected() {
        assert!(Literal::float(1.5, sp()).is_ok());
        assert!(Literal::float(f64::NAN, sp()).is_err());
        assert!(Literal::float(f64::INFINITY, sp()).is_err());
    }

    #[test]
    fn list_preserves_gaps() {
        let list = NodeList::with_gaps(
            vec![
                Some(Node::Literal(Literal::integer(1, sp()))),
                None,
                Some(Node::Literal(Literal::integer(3, sp()))),
            ],
            sp(),
        );
        assert_eq!(list.len(), 3);
        assert_eq!(list.present().count(), 2);
    }

    #[test]
    fn operands_preserve_gaps_where_children_skip_them() {
        let cols = Node::List(NodeList::new(
            vec![Node::Ident(Ident::simple("x", sp()))],
            sp(),
        ));
        let select = Node::Call(
            Call::new(
                &ops::SELECT,
                vec![Some(cols), None, None, None, None, None, None],
                sp(),
            )
            .expect("seven slots"),
        );
        assert_eq!(select.operands().len(), 7);
        assert!(select.operands()[1].is_none());
        assert_eq!(select.children().len(), 1);
    }

    #[test]
    fn children_cover_loop_head() {
        let cond = Node::Literal(Literal::boolean(true, sp()));
        let body = vec![Node::Leave(Leave {
            label: Label::new("l", sp()),
            span: sp(),
        })];
        let lp = Node::from(LoopStmt::new(LoopHead::While(cond), body, sp()));
        assert_eq!(lp.children().len(), 2);
    }

    #[test]
    fn loops_nest_inside_loops() {
        let inner = LoopStmt::new(
            LoopHead::While(Node::Literal(Literal::boolean(true, sp()))),
            vec![Node::Iterate(Iterate {
                label: Label::new("outer", sp()),
                span: sp(),
            })],
            sp(),
        );
        let outer = Node::from(
            LoopStmt::labeled(
                Some(Label::new("outer", sp())),
                Some(Label::new("outer", sp())),
                LoopHead::Plain,
                vec![Node::from(inner)],
                sp(),
            )
            .expect("matching labels"),
        );
        let Node::Loop(outer_loop) = &outer else {
            panic!("expected a loop");
        };
        assert!(matches!(outer_loop.body[0], Node::Loop(_)));
        assert_eq!(outer.children().len(), 1);
        assert_eq!(outer.children()[0].children().len(), 2);
    }
}
