//! The low-level SQL text writer.
//!
//! [`SqlWriter`] appends space-separated tokens to a growing string and
//! tracks a stack of frames (parenthesized groups, comma lists, statement
//! bodies). Frames are opened with [`SqlWriter::start_frame`] and closed
//! with the returned [`FrameToken`]; closing out of order or finishing with
//! open frames is a programming error and panics. Well-formed trees never
//! trip these checks, so the renderer itself stays infallible.

/// What a frame delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `( ... )` — emits the delimiters itself.
    Paren,
    /// A comma-separated list; [`SqlWriter::item`] inserts separators.
    List,
    /// A statement body (BEGIN..END, THEN..). Purely a balance check.
    Body,
}

/// Proof of an open frame; must be passed back to [`SqlWriter::end_frame`].
#[derive(Debug)]
#[must_use = "an unclosed frame panics at finish()"]
pub struct FrameToken {
    index: usize,
    kind: FrameKind,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    items: usize,
}

/// Token-oriented writer over an owned string.
#[derive(Debug, Default)]
pub struct SqlWriter {
    out: String,
    frames: Vec<Frame>,
    /// Suppress the separating space before the next token.
    glue: bool,
}

impl SqlWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sep(&mut self) {
        if !self.out.is_empty() && !self.glue {
            self.out.push(' ');
        }
        self.glue = false;
    }

    /// Append a keyword or symbol as its own token.
    pub fn token(&mut self, t: &str) {
        self.sep();
        self.out.push_str(t);
    }

    /// Append a token directly against the previous character (no space).
    pub fn glued(&mut self, t: &str) {
        self.out.push_str(t);
        self.glue = false;
    }

    /// Append one identifier part, quoting when it is not a plain name.
    /// Embedded double quotes are doubled.
    pub fn ident(&mut self, part: &str) {
        self.sep();
        if needs_quoting(part) {
            self.out.push('"');
            for c in part.chars() {
                if c == '"' {
                    self.out.push('"');
                }
                self.out.push(c);
            }
            self.out.push('"');
        } else {
            self.out.push_str(part);
        }
    }

    /// Append `.` between identifier parts.
    pub fn qualifier_dot(&mut self) {
        self.out.push('.');
        self.glue = true;
    }

    /// Suppress the space before the next token (function-call parens).
    pub fn glue_next(&mut self) {
        self.glue = true;
    }

    /// Append a single-quoted string literal, doubling embedded quotes.
    pub fn string_literal(&mut self, s: &str) {
        self.sep();
        self.out.push('\'');
        for c in s.chars() {
            if c == '\'' {
                self.out.push('\'');
            }
            self.out.push(c);
        }
        self.out.push('\'');
    }

    /// Terminate a statement. Attaches to the previous token.
    pub fn semicolon(&mut self) {
        self.out.push(';');
    }

    /// Open a frame. `Paren` frames emit `(` immediately.
    pub fn start_frame(&mut self, kind: FrameKind) -> FrameToken {
        if kind == FrameKind::Paren {
            self.sep();
            self.out.push('(');
            self.glue = true;
        }
        let index = self.frames.len();
        self.frames.push(Frame { kind, items: 0 });
        FrameToken { index, kind }
    }

    /// Mark the start of the next item in the innermost frame. In a `List`
    /// frame this writes the comma separator.
    ///
    /// # Panics
    ///
    /// Panics when no frame is open.
    pub fn item(&mut self) {
        let frame = self
            .frames
            .last_mut()
            .unwrap_or_else(|| panic!("item() outside any frame"));
        if frame.items > 0 && frame.kind == FrameKind::List {
            self.out.push(',');
            self.glue = false;
        }
        frame.items += 1;
    }

    /// Close a frame. `Paren` frames emit `)`.
    ///
    /// # Panics
    ///
    /// Panics when `token` does not name the innermost open frame.
    pub fn end_frame(&mut self, token: FrameToken) {
        assert_eq!(
            token.index + 1,
            self.frames.len(),
            "frame closed out of order"
        );
        let frame = self.frames.pop().unwrap_or_else(|| unreachable!());
        assert_eq!(frame.kind, token.kind, "frame kind mismatch");
        if frame.kind == FrameKind::Paren {
            self.out.push(')');
            self.glue = false;
        }
    }

    /// Consume the writer, returning the rendered text.
    ///
    /// # Panics
    ///
    /// Panics when frames are still open.
    #[must_use]
    pub fn finish(self) -> String {
        assert!(
            self.frames.is_empty(),
            "finish() with {} open frame(s)",
            self.frames.len()
        );
        self.out
    }

    /// The text written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }
}

/// Whether an identifier part must be double-quoted: empty, a leading digit,
/// or any character outside `[A-Za-z0-9_]`.
#[must_use]
pub fn needs_quoting(part: &str) -> bool {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return true;
    }
    chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_space_separated() {
        let mut w = SqlWriter::new();
        w.token("SELECT");
        w.token("*");
        w.token("FROM");
        w.ident("t");
        assert_eq!(w.finish(), "SELECT * FROM t");
    }

    #[test]
    fn paren_frames_glue_contents() {
        let mut w = SqlWriter::new();
        w.token("SUM");
        let p = w.start_frame(FrameKind::Paren);
        w.ident("x");
        w.end_frame(p);
        assert_eq!(w.finish(), "SUM (x)");
    }

    #[test]
    fn list_frame_inserts_commas() {
        let mut w = SqlWriter::new();
        let l = w.start_frame(FrameKind::List);
        for name in ["a", "b", "c"] {
            w.item();
            w.ident(name);
        }
        w.end_frame(l);
        assert_eq!(w.finish(), "a, b, c");
    }

    #[test]
    fn idents_quote_when_needed() {
        let mut w = SqlWriter::new();
        w.ident("plain_1");
        w.ident("mixed case");
        w.ident("has\"quote");
        w.ident("9lives");
        assert_eq!(w.finish(), "plain_1 \"mixed case\" \"has\"\"quote\" \"9lives\"");
    }

    #[test]
    fn string_literal_doubles_quotes() {
        let mut w = SqlWriter::new();
        w.string_literal("it's");
        assert_eq!(w.finish(), "'it''s'");
    }

    #[test]
    #[should_panic(expected = "frame closed out of order")]
    fn out_of_order_close_panics() {
        let mut w = SqlWriter::new();
        let outer = w.start_frame(FrameKind::Paren);
        let _inner = w.start_frame(FrameKind::List);
        w.end_frame(outer);
    }

    #[test]
    #[should_panic(expected = "open frame")]
    fn finish_with_open_frame_panics() {
        let mut w = SqlWriter::new();
        let _p = w.start_frame(FrameKind::Body);
        let _ = w.finish();
    }
}
