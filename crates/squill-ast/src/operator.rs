//! Operator descriptors and the precedence registry.
//!
//! Every [`Call`](crate::Call) node references exactly one [`Operator`]: an
//! immutable descriptor with a name, a kind tag, a fixity, and left/right
//! binding powers. Builtin operators are `static` items in [`ops`]; an
//! explicit [`OperatorRegistry`] value resolves `(kind, name)` lookups and
//! accepts user-defined registrations. Nodes never own or mutate operators.
//!
//! Precedence levels follow the SQL grammar, lowest to highest:
//!
//! ```text
//!   OR
//!   AND
//!   NOT (prefix)
//!   = <> IS [NOT] LIKE BETWEEN IN  /  IS NULL (postfix)
//!   < <= > >=
//!   & | << >> (bitwise)
//!   + - (binary)
//!   * / %
//!   || (concat)
//!   COLLATE (postfix)
//!   ~ - + (unary prefix)
//! ```

use std::collections::HashMap;
use std::fmt;

/// Kind tag grouping operators by role. Lookup in the registry is keyed by
/// `(OpKind, name)` so a statement keyword and an expression operator may
/// share a spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// `=`, `<`, `IS`, `LIKE`, ...
    Comparison,
    /// `+`, `*`, unary minus, ...
    Arithmetic,
    /// `AND`, `OR`, `NOT`.
    Logical,
    /// `||`, `COLLATE`.
    StringOp,
    /// SQL statement keywords (SELECT, INSERT, MERGE, ...).
    Statement,
    /// Procedural scripting keywords (OPEN, FETCH, RETURN, ...).
    Script,
    /// Function-call style forms (generic call, CAST).
    Call,
    /// Registered by an embedder, not part of the builtin set.
    UserDefined,
}

/// Where an operator's token sits relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
    /// `NAME(arg, ...)` — self-delimiting; arguments render in a fresh
    /// context and never take outer parentheses.
    Call,
    /// Explicit structural template (CASE, BETWEEN, statements); exempt from
    /// the generic precedence rule.
    Special,
}

/// Declared operand-count constraint, checked at `Call` construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many operand slots (slots may still hold `None`).
    Exact(usize),
    /// At least this many operand slots.
    AtLeast(usize),
    /// No constraint.
    Any,
}

impl Arity {
    /// Whether `count` operand slots satisfy this constraint.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::Any => f.write_str("any number of"),
        }
    }
}

/// Binding power ceiling: operators at `MAX_POWER` never parenthesize
/// themselves on that side.
pub const MAX_POWER: u8 = u8::MAX;

/// An immutable operator descriptor.
///
/// The left/right powers encode what the operator *exposes* on each side:
/// an infix left-associative operator at level `p` exposes `(p, p + 1)`, a
/// prefix operator exposes `(MAX_POWER, p)`, a postfix operator
/// `(p, MAX_POWER)`. A call renders inside parentheses iff either exposed
/// power is strictly weaker than the context imposed on that side — this one
/// rule yields both minimal parenthesization and the associativity
/// tie-break.
#[derive(Debug, PartialEq, Eq)]
pub struct Operator {
    /// Keyword or symbol as written in SQL.
    pub name: &'static str,
    /// Role tag, part of the registry key.
    pub kind: OpKind,
    /// Token position.
    pub fixity: Fixity,
    /// Strength exposed toward the left context.
    pub left_power: u8,
    /// Strength exposed toward the right context.
    pub right_power: u8,
    /// Operand-slot constraint checked at construction.
    pub arity: Arity,
}

impl Operator {
    /// An infix, left-associative operator at precedence level `p`.
    #[must_use]
    pub const fn infix_left(name: &'static str, kind: OpKind, p: u8) -> Self {
        Self {
            name,
            kind,
            fixity: Fixity::Infix,
            left_power: p,
            right_power: p + 1,
            arity: Arity::Exact(2),
        }
    }

    /// An infix, right-associative operator at precedence level `p`.
    #[must_use]
    pub const fn infix_right(name: &'static str, kind: OpKind, p: u8) -> Self {
        Self {
            name,
            kind,
            fixity: Fixity::Infix,
            left_power: p + 1,
            right_power: p,
            arity: Arity::Exact(2),
        }
    }

    /// A prefix operator whose operand binds at level `p`.
    #[must_use]
    pub const fn prefix(name: &'static str, kind: OpKind, p: u8) -> Self {
        Self {
            name,
            kind,
            fixity: Fixity::Prefix,
            left_power: MAX_POWER,
            right_power: p,
            arity: Arity::Exact(1),
        }
    }

    /// A postfix operator at level `p` taking `arity` operand slots
    /// (slot 0 is always the expression it trails).
    #[must_use]
    pub const fn postfix(name: &'static str, kind: OpKind, p: u8, arity: Arity) -> Self {
        Self {
            name,
            kind,
            fixity: Fixity::Postfix,
            left_power: p,
            right_power: MAX_POWER,
            arity,
        }
    }

    /// A self-delimiting call-style operator.
    #[must_use]
    pub const fn call(name: &'static str, kind: OpKind, arity: Arity) -> Self {
        Self {
            name,
            kind,
            fixity: Fixity::Call,
            left_power: MAX_POWER,
            right_power: MAX_POWER,
            arity,
        }
    }

    /// A special template form (statements, CASE-like shapes).
    #[must_use]
    pub const fn special(name: &'static str, kind: OpKind, arity: Arity) -> Self {
        Self {
            name,
            kind,
            fixity: Fixity::Special,
            left_power: MAX_POWER,
            right_power: MAX_POWER,
            arity,
        }
    }

    /// Whether this operator participates in the generic precedence rule
    /// (special and call forms are self-delimiting).
    #[must_use]
    pub const fn uses_precedence(&self) -> bool {
        matches!(self.fixity, Fixity::Prefix | Fixity::Infix | Fixity::Postfix)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Precedence levels, lowest binding to highest.
pub mod prec {
    pub const OR: u8 = 1;
    pub const AND: u8 = 3;
    pub const NOT: u8 = 5;
    pub const EQUALITY: u8 = 7;
    pub const COMPARISON: u8 = 9;
    pub const BITWISE: u8 = 13;
    pub const ADD: u8 = 15;
    pub const MUL: u8 = 17;
    pub const CONCAT: u8 = 19;
    pub const COLLATE: u8 = 21;
    pub const UNARY: u8 = 23;
}

/// The builtin operator set.
///
/// Operand-slot conventions for the statement and scripting templates are
/// documented on each item; `None` slots mark omitted optional clauses.
pub mod ops {
    use super::{Arity, Fixity, OpKind, Operator, prec};

    // ── Logical ─────────────────────────────────────────────────────────
    pub static OR: Operator = Operator::infix_left("OR", OpKind::Logical, prec::OR);
    pub static AND: Operator = Operator::infix_left("AND", OpKind::Logical, prec::AND);
    pub static NOT: Operator = Operator::prefix("NOT", OpKind::Logical, prec::NOT);

    // ── Comparison ──────────────────────────────────────────────────────
    pub static EQ: Operator = Operator::infix_left("=", OpKind::Comparison, prec::EQUALITY);
    pub static NE: Operator = Operator::infix_left("<>", OpKind::Comparison, prec::EQUALITY);
    pub static IS: Operator = Operator::infix_left("IS", OpKind::Comparison, prec::EQUALITY);
    pub static IS_NOT: Operator =
        Operator::infix_left("IS NOT", OpKind::Comparison, prec::EQUALITY);
    pub static LT: Operator = Operator::infix_left("<", OpKind::Comparison, prec::COMPARISON);
    pub static LE: Operator = Operator::infix_left("<=", OpKind::Comparison, prec::COMPARISON);
    pub static GT: Operator = Operator::infix_left(">", OpKind::Comparison, prec::COMPARISON);
    pub static GE: Operator = Operator::infix_left(">=", OpKind::Comparison, prec::COMPARISON);

    /// `expr LIKE pattern [ESCAPE esc]` — operands: [expr, pattern, escape?].
    pub static LIKE: Operator = Operator {
        name: "LIKE",
        kind: OpKind::Comparison,
        fixity: Fixity::Infix,
        left_power: prec::EQUALITY,
        right_power: prec::EQUALITY + 1,
        arity: Arity::Exact(3),
    };
    pub static NOT_LIKE: Operator = Operator {
        name: "NOT LIKE",
        kind: OpKind::Comparison,
        fixity: Fixity::Infix,
        left_power: prec::EQUALITY,
        right_power: prec::EQUALITY + 1,
        arity: Arity::Exact(3),
    };

    /// `expr IN list-or-subquery` — operands: [expr, set].
    pub static IN: Operator = Operator::infix_left("IN", OpKind::Comparison, prec::EQUALITY);
    pub static NOT_IN: Operator =
        Operator::infix_left("NOT IN", OpKind::Comparison, prec::EQUALITY);

    /// `expr BETWEEN low AND high` — structural template, operands:
    /// [expr, low, high].
    pub static BETWEEN: Operator =
        Operator::special("BETWEEN", OpKind::Comparison, Arity::Exact(3));
    pub static NOT_BETWEEN: Operator =
        Operator::special("NOT BETWEEN", OpKind::Comparison, Arity::Exact(3));

    /// Postfix `expr IS NULL`.
    pub static IS_NULL: Operator = Operator::postfix(
        "IS NULL",
        OpKind::Comparison,
        prec::EQUALITY,
        Arity::Exact(1),
    );
    pub static IS_NOT_NULL: Operator = Operator::postfix(
        "IS NOT NULL",
        OpKind::Comparison,
        prec::EQUALITY,
        Arity::Exact(1),
    );

    /// `EXISTS (subquery)` — self-delimiting.
    pub static EXISTS: Operator = Operator::call("EXISTS", OpKind::Comparison, Arity::Exact(1));

    // ── Arithmetic / string ─────────────────────────────────────────────
    pub static BIT_AND: Operator = Operator::infix_left("&", OpKind::Arithmetic, prec::BITWISE);
    pub static BIT_OR: Operator = Operator::infix_left("|", OpKind::Arithmetic, prec::BITWISE);
    pub static SHIFT_LEFT: Operator =
        Operator::infix_left("<<", OpKind::Arithmetic, prec::BITWISE);
    pub static SHIFT_RIGHT: Operator =
        Operator::infix_left(">>", OpKind::Arithmetic, prec::BITWISE);
    pub static ADD: Operator = Operator::infix_left("+", OpKind::Arithmetic, prec::ADD);
    pub static SUBTRACT: Operator = Operator::infix_left("-", OpKind::Arithmetic, prec::ADD);
    pub static MULTIPLY: Operator = Operator::infix_left("*", OpKind::Arithmetic, prec::MUL);
    pub static DIVIDE: Operator = Operator::infix_left("/", OpKind::Arithmetic, prec::MUL);
    pub static MODULO: Operator = Operator::infix_left("%", OpKind::Arithmetic, prec::MUL);
    pub static CONCAT: Operator = Operator::infix_left("||", OpKind::StringOp, prec::CONCAT);
    pub static NEGATE: Operator = Operator::prefix("-", OpKind::Arithmetic, prec::UNARY);
    pub static UNARY_PLUS: Operator = Operator::prefix("+", OpKind::Arithmetic, prec::UNARY);
    pub static BIT_NOT: Operator = Operator::prefix("~", OpKind::Arithmetic, prec::UNARY);

    /// Postfix `expr COLLATE name` — operands: [expr, collation ident].
    pub static COLLATE: Operator =
        Operator::postfix("COLLATE", OpKind::StringOp, prec::COLLATE, Arity::Exact(2));

    // ── Call-style ──────────────────────────────────────────────────────
    /// Generic function call — operands: [name ident, args...].
    pub static FUNCTION: Operator = Operator::call("()", OpKind::Call, Arity::AtLeast(1));
    /// `CAST(expr AS type)` — operands: [expr, type spec].
    pub static CAST: Operator = Operator::call("CAST", OpKind::Call, Arity::Exact(2));
    /// A parenthesized scalar subquery — operands: [select call].
    pub static SUBQUERY: Operator = Operator::call("SUBQUERY", OpKind::Call, Arity::Exact(1));

    // ── Statements ──────────────────────────────────────────────────────
    /// Operands: [columns, from?, where?, group_by?, having?, order_by?,
    /// limit?].
    pub static SELECT: Operator =
        Operator::special("SELECT", OpKind::Statement, Arity::Exact(7));
    /// Wraps a result-column list: `SELECT DISTINCT ...`. Operands: [list].
    pub static DISTINCT: Operator =
        Operator::special("DISTINCT", OpKind::Statement, Arity::Exact(1));
    /// Operands: [target ident, columns?, source (VALUES or SELECT)].
    pub static INSERT: Operator =
        Operator::special("INSERT", OpKind::Statement, Arity::Exact(3));
    /// Operands: one list per row; `None` entries inside a row are omitted
    /// values and render as the dialect NULL.
    pub static VALUES: Operator =
        Operator::special("VALUES", OpKind::Statement, Arity::AtLeast(1));
    /// Operands: [target ident, assignment list, from?, where?].
    pub static UPDATE: Operator =
        Operator::special("UPDATE", OpKind::Statement, Arity::Exact(4));
    /// Operands: [column ident, value] — one SET assignment.
    pub static ASSIGN: Operator =
        Operator::special("=", OpKind::Statement, Arity::Exact(2));
    /// Operands: [target ident, where?].
    pub static DELETE: Operator =
        Operator::special("DELETE", OpKind::Statement, Arity::Exact(2));
    /// Operands: [target, source, on condition, matched-assignment list,
    /// not-matched-insert?].
    pub static MERGE: Operator =
        Operator::special("MERGE", OpKind::Statement, Arity::Exact(5));

    // ── Scripting ───────────────────────────────────────────────────────
    /// Operands: [variable ident, value].
    pub static SET_VAR: Operator = Operator::special("SET", OpKind::Script, Arity::Exact(2));
    /// Operands: [name ident, args...].
    pub static CALL_PROC: Operator =
        Operator::special("CALL", OpKind::Script, Arity::AtLeast(1));
    /// Operands: [value?].
    pub static RETURN: Operator = Operator::special("RETURN", OpKind::Script, Arity::Exact(1));
    /// Operands: [condition, then body list, else body list?].
    pub static IF: Operator = Operator::special("IF", OpKind::Script, Arity::Exact(3));
    /// Operands: [cursor ident, query].
    pub static DECLARE_CURSOR: Operator =
        Operator::special("DECLARE CURSOR", OpKind::Script, Arity::Exact(2));
    /// Operands: [variable ident, type spec, default?].
    pub static DECLARE_VARIABLE: Operator =
        Operator::special("DECLARE", OpKind::Script, Arity::Exact(3));
    /// Operands: [cursor ident].
    pub static OPEN: Operator = Operator::special("OPEN", OpKind::Script, Arity::Exact(1));
    /// Operands: [cursor ident].
    pub static CLOSE: Operator = Operator::special("CLOSE", OpKind::Script, Arity::Exact(1));
    /// Operands: [cursor ident, target list].
    pub static FETCH: Operator = Operator::special("FETCH", OpKind::Script, Arity::Exact(2));

    /// All builtin operators, in registry insertion order.
    pub(super) static ALL: &[&Operator] = &[
        &OR, &AND, &NOT, &EQ, &NE, &IS, &IS_NOT, &LT, &LE, &GT, &GE, &LIKE, &NOT_LIKE, &IN,
        &NOT_IN, &BETWEEN, &NOT_BETWEEN, &IS_NULL, &IS_NOT_NULL, &EXISTS, &BIT_AND, &BIT_OR,
        &SHIFT_LEFT, &SHIFT_RIGHT, &ADD, &SUBTRACT, &MULTIPLY, &DIVIDE, &MODULO, &CONCAT,
        &NEGATE, &UNARY_PLUS, &BIT_NOT, &COLLATE, &FUNCTION, &CAST, &SUBQUERY, &SELECT,
        &DISTINCT, &INSERT, &VALUES, &UPDATE, &ASSIGN, &DELETE, &MERGE, &SET_VAR, &CALL_PROC,
        &RETURN, &IF, &DECLARE_CURSOR, &DECLARE_VARIABLE, &OPEN, &CLOSE, &FETCH,
    ];
}

/// The comparison inverse used by negation normalization: `NOT (a = b)`
/// unparses as `a <> b`.
///
/// Returns `None` for operators without a single-token inverse (those keep
/// their prefix NOT when negated).
#[must_use]
pub fn inverse_of(op: &Operator) -> Option<&'static Operator> {
    let inv: &'static Operator = match (op.kind, op.name) {
        (OpKind::Comparison, "=") => &ops::NE,
        (OpKind::Comparison, "<>") => &ops::EQ,
        (OpKind::Comparison, "<") => &ops::GE,
        (OpKind::Comparison, ">=") => &ops::LT,
        (OpKind::Comparison, ">") => &ops::LE,
        (OpKind::Comparison, "<=") => &ops::GT,
        (OpKind::Comparison, "IS") => &ops::IS_NOT,
        (OpKind::Comparison, "IS NOT") => &ops::IS,
        (OpKind::Comparison, "LIKE") => &ops::NOT_LIKE,
        (OpKind::Comparison, "NOT LIKE") => &ops::LIKE,
        (OpKind::Comparison, "IN") => &ops::NOT_IN,
        (OpKind::Comparison, "NOT IN") => &ops::IN,
        (OpKind::Comparison, "BETWEEN") => &ops::NOT_BETWEEN,
        (OpKind::Comparison, "NOT BETWEEN") => &ops::BETWEEN,
        (OpKind::Comparison, "IS NULL") => &ops::IS_NOT_NULL,
        (OpKind::Comparison, "IS NOT NULL") => &ops::IS_NULL,
        _ => return None,
    };
    Some(inv)
}

/// An explicit, immutable operator registry.
///
/// Construct one at startup with [`OperatorRegistry::standard`] and pass it
/// by reference wherever operators need to be resolved by name; there is no
/// hidden global. User-defined operators are added with
/// [`OperatorRegistry::register`] before the registry is shared.
#[derive(Debug)]
pub struct OperatorRegistry {
    by_key: HashMap<(OpKind, &'static str), &'static Operator>,
}

impl OperatorRegistry {
    /// A registry holding the builtin operator set.
    #[must_use]
    pub fn standard() -> Self {
        let mut by_key = HashMap::with_capacity(ops::ALL.len());
        for op in ops::ALL {
            by_key.insert((op.kind, op.name), *op);
        }
        Self { by_key }
    }

    /// Look up an operator by kind and name.
    #[must_use]
    pub fn lookup(&self, kind: OpKind, name: &str) -> Option<&'static Operator> {
        self.by_key.get(&(kind, name)).copied()
    }

    /// Register an additional (user-defined) operator. Returns `false` if an
    /// operator with the same key already exists (the registry keeps the
    /// original).
    pub fn register(&mut self, op: &'static Operator) -> bool {
        match self.by_key.entry((op.kind, op.name)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(op);
                true
            }
        }
    }

    /// Number of registered operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_assoc_powers() {
        assert_eq!(ops::ADD.left_power, prec::ADD);
        assert_eq!(ops::ADD.right_power, prec::ADD + 1);
        assert!(ops::MULTIPLY.left_power > ops::ADD.right_power);
    }

    #[test]
    fn prefix_and_postfix_exposure() {
        assert_eq!(ops::NOT.left_power, MAX_POWER);
        assert_eq!(ops::NOT.right_power, prec::NOT);
        assert_eq!(ops::IS_NULL.left_power, prec::EQUALITY);
        assert_eq!(ops::IS_NULL.right_power, MAX_POWER);
    }

    #[test]
    fn registry_lookup_by_kind_and_name() {
        let reg = OperatorRegistry::standard();
        assert!(std::ptr::eq(
            reg.lookup(OpKind::Logical, "AND").expect("registered"),
            &ops::AND
        ));
        // The assignment '=' (statement) and comparison '=' share a
        // spelling but not a key.
        assert!(std::ptr::eq(
            reg.lookup(OpKind::Statement, "=").expect("registered"),
            &ops::ASSIGN
        ));
        assert!(std::ptr::eq(
            reg.lookup(OpKind::Comparison, "=").expect("registered"),
            &ops::EQ
        ));
        assert!(reg.lookup(OpKind::Logical, "XOR").is_none());
    }

    #[test]
    fn register_user_defined() {
        static SOUNDS_LIKE: Operator =
            Operator::infix_left("SOUNDS LIKE", OpKind::UserDefined, prec::EQUALITY);
        let mut reg = OperatorRegistry::standard();
        let before = reg.len();
        assert!(reg.register(&SOUNDS_LIKE));
        assert!(!reg.register(&SOUNDS_LIKE));
        assert_eq!(reg.len(), before + 1);
        assert!(reg.lookup(OpKind::UserDefined, "SOUNDS LIKE").is_some());
    }

    #[test]
    fn inverses_are_symmetric() {
        for op in ops::ALL {
            if let Some(inv) = inverse_of(op) {
                let back = inverse_of(inv).expect("inverse of an inverse");
                assert!(std::ptr::eq(back, *op), "{}", op.name);
            }
        }
        assert!(inverse_of(&ops::ADD).is_none());
        assert!(inverse_of(&ops::EXISTS).is_none());
    }

    #[test]
    fn arity_accepts() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(1).accepts(4));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert!(Arity::Any.accepts(0));
    }
}
