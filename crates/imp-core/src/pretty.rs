//! Indentation-aware text dumps.

use std::fmt::{self, Formatter, Write as _};

#[derive(Debug, Clone)]
pub struct PrettyOptions {
    pub indent_size: usize,
    /// Print `%n: ty = …` instead of `%n = …`.
    pub show_types: bool,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            show_types: true,
        }
    }
}

pub struct PrettyCtx<'a> {
    pub options: &'a PrettyOptions,
    depth: usize,
}

impl<'a> PrettyCtx<'a> {
    pub fn new(options: &'a PrettyOptions) -> Self {
        Self { options, depth: 0 }
    }

    /// Writes one line at the current depth.
    pub fn writeln(&self, f: &mut Formatter<'_>, line: impl AsRef<str>) -> fmt::Result {
        let pad = self.depth * self.options.indent_size;
        writeln!(f, "{:pad$}{}", "", line.as_ref())
    }

    pub fn with_indent(
        &mut self,
        body: impl FnOnce(&mut Self) -> fmt::Result,
    ) -> fmt::Result {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}

pub trait PrettyPrintable {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result;
}

/// `Display` adapter returned by [`pretty`].
pub struct Pretty<'a, T> {
    value: &'a T,
    options: PrettyOptions,
}

impl<T: PrettyPrintable> fmt::Display for Pretty<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.value.fmt_pretty(f, &mut PrettyCtx::new(&self.options))
    }
}

pub fn pretty<T: PrettyPrintable>(value: &T, options: PrettyOptions) -> Pretty<'_, T> {
    Pretty { value, options }
}

/// Escapes `input` for use inside a double-quoted literal.
pub fn escape_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let _ = match ch {
            '"' | '\\' => write!(out, "\\{ch}"),
            '\n' => write!(out, "\\n"),
            '\t' => write!(out, "\\t"),
            '\r' => write!(out, "\\r"),
            c if c.is_control() => write!(out, "\\u{{{:x}}}", c as u32),
            c => write!(out, "{c}"),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_controls() {
        assert_eq!(escape_string("a\"b\\\n\u{1}"), "a\\\"b\\\\\\n\\u{1}");
    }
}
