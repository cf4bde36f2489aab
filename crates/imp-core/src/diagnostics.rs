//! User-facing problems reported by a pass.
//!
//! Passes keep going after an error and collect one [`Diagnostic`] per
//! independent problem; callers decide how to render them.

use std::fmt::{self, Display, Formatter};

use strum_macros::Display;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub span: Option<Span>,
    pub suggestions: Vec<String>,
    /// The pass that produced the diagnostic, e.g. `ast→ir`.
    pub source_context: Option<String>,
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: None,
            suggestions: Vec::new(),
            source_context: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message)
    }

    pub fn with_span(self, span: Span) -> Self {
        Self {
            span: Some(span),
            ..self
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source_context(self, context: impl Into<String>) -> Self {
        Self {
            source_context: Some(context.into()),
            ..self
        }
    }

    pub fn with_code(self, code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..self
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    /// Header line followed by the location and any suggestions.
    pub fn render_plain(&self, fallback_context: &str) -> Vec<String> {
        let context = self.source_context.as_deref().unwrap_or(fallback_context);
        let mut header = format!("[{context}] {}: {}", self.level, self.message);
        if let Some(code) = &self.code {
            header.push_str(&format!(" ({code})"));
        }
        let span = self.span.iter().map(|span| format!("   at {span}"));
        let hints = self
            .suggestions
            .iter()
            .map(|hint| format!("   suggestion: {hint}"));
        std::iter::once(header).chain(span).chain(hints).collect()
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        Ok(())
    }
}

/// Diagnostics collected during one pass.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticManager {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_with_code_and_span() {
        let diagnostic = Diagnostic::error("missing return")
            .with_code("E0001")
            .with_span(Span::new(1, 4, 9))
            .with_suggestion("add a trailing expression");

        let lines = diagnostic.render_plain("lower");
        assert_eq!(lines[0], "[lower] ERROR: missing return (E0001)");
        assert_eq!(lines[1], "   at Span(1:4-9)");
        assert_eq!(lines[2], "   suggestion: add a trailing expression");
    }

    #[test]
    fn manager_tracks_errors() {
        let mut manager = DiagnosticManager::new();
        manager.add_diagnostic(Diagnostic::warning("unused"));
        assert!(!manager.has_errors());
        manager.add_diagnostic(Diagnostic::error("bad").with_source_context("ast→ir"));
        assert!(manager.has_errors());
        assert_eq!(manager.into_diagnostics().len(), 2);
    }
}
