//! Source text formatter for the emission engine.
//!
//! A small indented line buffer in the spirit of srcgen formatters:
//! `line` appends one indented line, `indent_with` wraps a block in
//! prefix/suffix lines, `doc_comment` renders `///` comments, and
//! `multiline` re-indents an opaque fragment verbatim.

/// Number of spaces per indentation level.
const SHIFT_WIDTH: usize = 4;

/// An indented source text buffer.
#[derive(Debug, Default)]
pub struct Formatter {
    indent: usize,
    lines: Vec<String>,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current indentation.
    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.blank();
            return;
        }
        let mut out = " ".repeat(self.indent * SHIFT_WIDTH);
        out.push_str(text);
        self.lines.push(out);
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Append a `///` doc comment at the current indentation.
    pub fn doc_comment(&mut self, text: &str) {
        for part in text.lines() {
            if part.is_empty() {
                self.line("///");
            } else {
                self.line(&format!("/// {part}"));
            }
        }
    }

    /// Raise the indentation level.
    pub fn indent_push(&mut self) {
        self.indent += 1;
    }

    /// Lower the indentation level.
    pub fn indent_pop(&mut self) {
        debug_assert!(self.indent > 0);
        self.indent -= 1;
    }

    /// Emit `before`, run `body` one level deeper, then emit `after`.
    pub fn indent_with<F>(&mut self, before: &str, after: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.line(before);
        self.indent += 1;
        body(self);
        self.indent -= 1;
        self.line(after);
    }

    /// Append a verbatim fragment, re-indented line by line.
    ///
    /// The fragment's own relative indentation is preserved; only the
    /// base indentation is adjusted to the current level.
    pub fn multiline(&mut self, fragment: &str) {
        for part in fragment.lines() {
            if part.trim().is_empty() {
                self.blank();
            } else {
                self.line(part.trim_end());
            }
        }
    }

    /// Render the buffer, newline-terminated.
    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
