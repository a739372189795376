//! Diagnostic types produced by highlighting visitors.

use serde::Serialize;

use hilite_ast::Span;

/// Identity of the visitor that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ToolId(&'static str);

impl ToolId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Severity level for diagnostics, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational highlight.
    #[default]
    Info,
    /// Low-priority warning.
    WeakWarning,
    /// Warning - should be reviewed.
    Warning,
    /// Error - suppresses highlighting of enclosing elements.
    Error,
}

impl Severity {
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::WeakWarning => "weak_warning",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A diagnostic annotation for one text range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HighlightInfo {
    /// Byte span in the source.
    pub span: Span,

    /// Severity level.
    pub severity: Severity,

    /// The diagnostic message.
    pub message: String,

    /// The visitor that produced this diagnostic. Set by the runner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<ToolId>,

    /// Range of the element being visited when this diagnostic was
    /// produced. Set by the runner; `None` for diagnostics reported from
    /// the before/after hooks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visiting_range: Option<Span>,
}

impl HighlightInfo {
    /// Creates a new diagnostic.
    pub fn new(severity: Severity, span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            severity,
            message: message.into(),
            tool_id: None,
            visiting_range: None,
        }
    }

    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, span, message)
    }

    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, span, message)
    }

    pub fn info(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, span, message)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}
