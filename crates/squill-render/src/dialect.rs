//! The dialect seam.
//!
//! A [`Dialect`] owns the spellings that differ between SQL products: byte
//! literals, national-string introducers, and the shapes of sourced UPDATE
//! and MERGE statements. Everything else renders identically. The trait's
//! default methods are the ANSI forms; [`TransactDialect`] overrides the
//! ones that differ.

use squill_ast::Call;
use squill_types::CharSet;

use crate::unparse::Renderer;
use crate::writer::SqlWriter;

/// Product-specific spelling choices.
pub trait Dialect {
    /// Short name for diagnostics and logs.
    fn name(&self) -> &'static str;

    /// Spelling for an omitted slot.
    fn null_keyword(&self) -> &'static str {
        "NULL"
    }

    /// Write a byte-string literal. ANSI form: `X'1A2B'`.
    fn bytes_literal(&self, w: &mut SqlWriter, bytes: &[u8]) {
        let mut text = String::with_capacity(bytes.len() * 2 + 3);
        text.push_str("X'");
        for b in bytes {
            text.push_str(&format!("{b:02X}"));
        }
        text.push('\'');
        w.token(&text);
    }

    /// Introducer for a character-set-tagged string literal, or `None` to
    /// spell it plainly. ANSI uses `N` for the wide sets.
    fn string_introducer(&self, charset: CharSet) -> Option<&'static str> {
        match charset {
            CharSet::Ucs2 | CharSet::Utf16 => Some("N"),
            CharSet::Ascii | CharSet::Latin1 => None,
        }
    }

    /// Render an UPDATE whose source slot is filled. The ANSI shape is a
    /// MERGE: `MERGE INTO target USING source ON cond WHEN MATCHED THEN
    /// UPDATE SET ...`. Operand slots: [target, assignments, source, cond].
    fn update_with_source(&self, r: &mut Renderer<'_>, call: &Call) {
        let w = r.writer();
        w.token("MERGE");
        w.token("INTO");
        r.operand(call, 0);
        r.writer().token("USING");
        r.operand(call, 2);
        r.writer().token("ON");
        r.operand(call, 3);
        let w = r.writer();
        w.token("WHEN");
        w.token("MATCHED");
        w.token("THEN");
        w.token("UPDATE");
        w.token("SET");
        r.operand(call, 1);
    }

    /// Render a MERGE. Operand slots: [target, source, on, matched
    /// assignments, not-matched insert]. The ANSI shape is `MERGE INTO
    /// target USING source ON cond WHEN MATCHED THEN UPDATE SET ...
    /// [WHEN NOT MATCHED THEN INSERT ...]`.
    fn merge_statement(&self, r: &mut Renderer<'_>, call: &Call) {
        let w = r.writer();
        w.token("MERGE");
        w.token("INTO");
        r.operand(call, 0);
        r.writer().token("USING");
        r.operand(call, 1);
        r.writer().token("ON");
        r.operand(call, 2);
        let w = r.writer();
        w.token("WHEN");
        w.token("MATCHED");
        w.token("THEN");
        w.token("UPDATE");
        w.token("SET");
        r.operand(call, 3);
        if call.operand(4).is_some() {
            let w = r.writer();
            w.token("WHEN");
            w.token("NOT");
            w.token("MATCHED");
            w.token("THEN");
            w.token("INSERT");
            r.operand(call, 4);
        }
    }
}

/// The ANSI/ISO dialect: trait defaults all the way down.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }
}

/// A Transact-style dialect: `0x..` byte literals, the
/// `UPDATE .. SET .. FROM .. WHERE ..` sourced-update shape, and the
/// T-SQL MERGE spelling.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactDialect;

impl Dialect for TransactDialect {
    fn name(&self) -> &'static str {
        "transact"
    }

    fn bytes_literal(&self, w: &mut SqlWriter, bytes: &[u8]) {
        let mut text = String::with_capacity(bytes.len() * 2 + 2);
        text.push_str("0x");
        for b in bytes {
            text.push_str(&format!("{b:02X}"));
        }
        w.token(&text);
    }

    fn update_with_source(&self, r: &mut Renderer<'_>, call: &Call) {
        let w = r.writer();
        w.token("UPDATE");
        r.operand(call, 0);
        r.writer().token("SET");
        r.operand(call, 1);
        r.writer().token("FROM");
        r.operand(call, 2);
        r.writer().token("WHERE");
        r.operand(call, 3);
    }

    // T-SQL spelling: no INTO, NOT MATCHED takes BY TARGET, and the
    // statement requires its terminating semicolon.
    fn merge_statement(&self, r: &mut Renderer<'_>, call: &Call) {
        r.writer().token("MERGE");
        r.operand(call, 0);
        r.writer().token("USING");
        r.operand(call, 1);
        r.writer().token("ON");
        r.operand(call, 2);
        let w = r.writer();
        w.token("WHEN");
        w.token("MATCHED");
        w.token("THEN");
        w.token("UPDATE");
        w.token("SET");
        r.operand(call, 3);
        if call.operand(4).is_some() {
            let w = r.writer();
            w.token("WHEN");
            w.token("NOT");
            w.token("MATCHED");
            w.token("BY");
            w.token("TARGET");
            w.token("THEN");
            w.token("INSERT");
            r.operand(call, 4);
        }
        r.writer().semicolon();
    }
}

/// Helper shared by both shapes for the simple (sourceless) UPDATE:
/// `UPDATE target SET assignments [WHERE cond]`.
pub(crate) fn plain_update(r: &mut Renderer<'_>, call: &Call) {
    r.writer().token("UPDATE");
    r.operand(call, 0);
    r.writer().token("SET");
    r.operand(call, 1);
    if call.operand(3).is_some() {
        r.writer().token("WHERE");
        r.operand(call, 3);
    }
}
