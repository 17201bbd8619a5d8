//! Shared diagnostics model for the interception resolution pass.
//!
//! Rendering is owned by the host; this module only defines the structured
//! stream (severity, code, message, labels, suggestions) the engine emits.

mod files;

use blake3::Hasher;
pub use files::{FileId, LineCol, SourceFile, SourceFiles};
use serde::Serialize;
use std::fmt;

/// Span into a source file (byte offsets).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub file_id: FileId,
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            file_id: FileId::UNKNOWN,
            start,
            end,
        }
    }

    #[must_use]
    pub fn in_file(file_id: FileId, start: usize, end: usize) -> Self {
        Self {
            file_id,
            start,
            end,
        }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

/// Structured identifier for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticCode {
    pub code: String,
    pub category: Option<String>,
}

impl DiagnosticCode {
    #[must_use]
    pub fn new(code: impl Into<String>, category: Option<String>) -> Self {
        Self {
            code: code.into(),
            category,
        }
    }
}

/// Highlight for a particular span within the diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    #[must_use]
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    #[must_use]
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// Fix-it suggestion for the developer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub message: String,
    pub span: Option<Span>,
    pub replacement: Option<String>,
}

impl Suggestion {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        span: Option<Span>,
        replacement: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            span,
            replacement,
        }
    }
}

/// Structured diagnostic entry with optional labels, notes, and suggestions.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<DiagnosticCode>,
    pub message: String,
    pub primary_label: Option<Label>,
    pub secondary_labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::new(Severity::Error, message, span)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::new(Severity::Warning, message, span)
    }

    #[must_use]
    pub fn note(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::new(Severity::Note, message, span)
    }

    #[must_use]
    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary_labels.push(label);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.primary_label.as_ref().map(|label| label.span)
    }

    #[must_use]
    fn new(severity: Severity, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            primary_label: span.map(|span| Label::primary(span, String::new())),
            secondary_labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// Collection helper used to accumulate diagnostics during the pass.
#[derive(Debug)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    category: String,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            diagnostics: Vec::new(),
            category: category.into(),
        }
    }

    pub fn push(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.code.is_none() {
            diagnostic.code = Some(self.auto_code(&diagnostic));
        }
        self.diagnostics.push(diagnostic);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity.is_error())
            .count()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // Diagnostics arriving without a code still need a stable identity for
    // suppression tables; derive one from the category, message, and span.
    fn auto_code(&self, diagnostic: &Diagnostic) -> DiagnosticCode {
        let mut hasher = Hasher::new();
        hasher.update(self.category.as_bytes());
        hasher.update(diagnostic.message.as_bytes());
        if let Some(label) = diagnostic.primary_label.as_ref() {
            hasher.update(&label.span.start.to_le_bytes());
            hasher.update(&label.span.end.to_le_bytes());
        }
        let hash = hasher.finalize();
        let raw = u32::from_le_bytes(hash.as_bytes()[..4].try_into().unwrap_or([0, 0, 0, 0]));
        let suffix = raw % 100_000;
        let code = format!("{}{suffix:05}", self.category.to_ascii_uppercase());
        DiagnosticCode::new(code, Some(self.category.clone()))
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new("gen")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self
            .code
            .as_ref()
            .map(|c| c.code.as_str())
            .unwrap_or("UNKNOWN");
        write!(f, "{}[{code}]: {}", self.severity.as_str(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_assigns_auto_codes_from_category() {
        let mut sink = DiagnosticSink::new("icp");
        sink.push(Diagnostic::error("bad path", Some(Span::new(0, 4))));
        let diagnostics = sink.into_vec();
        let code = diagnostics[0].code.as_ref().unwrap();
        assert!(code.code.starts_with("ICP"));
        assert_eq!(code.category.as_deref(), Some("icp"));
    }

    #[test]
    fn explicit_codes_are_preserved() {
        let mut sink = DiagnosticSink::new("icp");
        sink.push(
            Diagnostic::error("bad path", None)
                .with_code(DiagnosticCode::new("ICP0002", Some("intercept".into()))),
        );
        let diagnostics = sink.into_vec();
        assert_eq!(diagnostics[0].code.as_ref().unwrap().code, "ICP0002");
    }

    #[test]
    fn display_includes_severity_and_code() {
        let diagnostic = Diagnostic::warning("names differ", None)
            .with_code(DiagnosticCode::new("ICP0503", None));
        assert_eq!(diagnostic.to_string(), "warning[ICP0503]: names differ");
    }

    #[test]
    fn error_count_ignores_warnings() {
        let mut sink = DiagnosticSink::new("icp");
        sink.push(Diagnostic::error("one", None));
        sink.push(Diagnostic::warning("two", None));
        assert_eq!(sink.error_count(), 1);
    }
}
