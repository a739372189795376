//! The highlighting visitor contract.

use std::path::Path;

use thiserror::Error;

use hilite_ast::{Element, SyntaxTree};

use crate::{HighlightInfo, InfoHolder, ToolId};

/// The file a pass runs over.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub tree: &'a SyntaxTree,
    pub source: &'a str,
    pub path: Option<&'a Path>,
    pub language: &'a str,
}

impl<'a> SourceFile<'a> {
    pub fn new(tree: &'a SyntaxTree, source: &'a str) -> Self {
        Self {
            tree,
            source,
            path: None,
            language: "",
        }
    }

    pub fn with_path(mut self, path: &'a Path) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_language(mut self, language: &'a str) -> Self {
        self.language = language;
        self
    }

    /// Name used in log messages.
    pub fn display_name(&self) -> String {
        self.path
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }
}

/// Host state consulted when selecting visitors.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostState {
    /// Indices are being rebuilt; only dumb-aware visitors may run.
    pub dumb_mode: bool,
}

/// Errors a visitor can raise.
///
/// `Cancelled`, `Disposed` and `IndexNotReady` abort the pass. `Failed` is
/// recovered by the runner, which logs it and moves on to the next element.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VisitError {
    #[error("highlighting cancelled")]
    Cancelled,

    #[error("host disposed: {0}")]
    Disposed(String),

    #[error("indices are not ready")]
    IndexNotReady,

    #[error("{0}")]
    Failed(String),
}

impl VisitError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn disposed(message: impl Into<String>) -> Self {
        Self::Disposed(message.into())
    }

    /// Returns true for errors that must abort the pass instead of being
    /// recovered.
    pub fn is_propagating(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// A diagnostic producer invoked once per syntax element.
///
/// One instance is used by one worker for the duration of a pass; state kept
/// in `&mut self` between [`before_pass`](Self::before_pass) and
/// [`after_pass`](Self::after_pass) never needs synchronization. When
/// several passes overlap, the pool hands out instances created by
/// [`fresh_instance`](Self::fresh_instance).
///
/// # Example
///
/// ```rust
/// use hilite_ast::{Element, NodeKind};
/// use hilite_core::{HighlightInfo, HighlightVisitor, InfoHolder, SourceFile, ToolId, VisitError};
///
/// struct ErrorNodes;
///
/// impl HighlightVisitor for ErrorNodes {
///     fn id(&self) -> ToolId {
///         ToolId::new("error-nodes")
///     }
///
///     fn suitable_for(&self, _file: &SourceFile<'_>) -> bool {
///         true
///     }
///
///     fn fresh_instance(&self) -> Box<dyn HighlightVisitor> {
///         Box::new(ErrorNodes)
///     }
///
///     fn visit(
///         &mut self,
///         _file: &SourceFile<'_>,
///         element: Element<'_>,
///         holder: &mut InfoHolder,
///     ) -> Result<(), VisitError> {
///         if element.kind() == NodeKind::Error {
///             holder.add(HighlightInfo::error(element.span(), "unexpected text"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait HighlightVisitor: Send {
    /// Identity used to tag this visitor's diagnostics and sink batches.
    fn id(&self) -> ToolId;

    /// Returns true if this visitor applies to `file`.
    fn suitable_for(&self, file: &SourceFile<'_>) -> bool;

    /// Returns true if this visitor works without indices.
    fn is_dumb_aware(&self) -> bool {
        false
    }

    /// Returns true for purely decorative rainbow visitors.
    fn is_rainbow(&self) -> bool {
        false
    }

    /// Applies user options from the configuration file.
    fn configure(&mut self, _options: &serde_json::Value) -> Result<(), VisitError> {
        Ok(())
    }

    /// Creates an independent instance of the same visitor, carrying its
    /// configuration but none of its per-pass state.
    fn fresh_instance(&self) -> Box<dyn HighlightVisitor>;

    /// Called once before the element walk. Diagnostics pushed to `infos`
    /// are reported under [`SinkTarget::BeforePass`](crate::SinkTarget).
    fn before_pass(
        &mut self,
        _file: &SourceFile<'_>,
        _update_all: bool,
        _infos: &mut Vec<HighlightInfo>,
    ) -> Result<(), VisitError> {
        Ok(())
    }

    /// Visits one element, reporting diagnostics to `holder`.
    fn visit(
        &mut self,
        file: &SourceFile<'_>,
        element: Element<'_>,
        holder: &mut InfoHolder,
    ) -> Result<(), VisitError>;

    /// Called once after the element walk. Diagnostics pushed to `infos`
    /// are reported under [`SinkTarget::AfterPass`](crate::SinkTarget).
    ///
    /// Returning `false` marks this visitor's contribution as incomplete
    /// without raising an error.
    fn after_pass(
        &mut self,
        _file: &SourceFile<'_>,
        _infos: &mut Vec<HighlightInfo>,
    ) -> Result<bool, VisitError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propagating_errors() {
        assert!(VisitError::Cancelled.is_propagating());
        assert!(VisitError::disposed("gone").is_propagating());
        assert!(VisitError::IndexNotReady.is_propagating());
        assert!(!VisitError::failed("oops").is_propagating());
    }

    #[test]
    fn test_display_name() {
        let tree = hilite_ast::TreeBuilder::new().finish();
        let file = SourceFile::new(&tree, "");
        assert_eq!(file.display_name(), "<memory>");

        let file = file.with_path(Path::new("a/b.sx")).with_language("bracket");
        assert!(file.display_name().ends_with("b.sx"));
        assert_eq!(file.language, "bracket");
    }
}
